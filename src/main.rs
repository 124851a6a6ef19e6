use clap::Parser;
use colored::Colorize;
use flightops::aircraft::AircraftStatus;
use flightops::logging::Verbosity;
use flightops::staff::{StaffAvailabilityStatus, StaffRole};
use flightops::{Clock, Config, Dashboard, Error, JsonFileStore, Schedule, SystemClock, Time, Trip, TripStatus, init_logging};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::{Context, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};
use tracing::warn;

#[derive(Parser)]
#[command(name = "flightops", about = "Trip operations console")]
struct Args {
    /// Path to the JSON scenario file
    #[arg(short, long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more, repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Helper, Hinter, Highlighter, Validator)]
pub struct CompleteHelper {
    pub commands: Vec<String>,
}

impl Completer for CompleteHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let mut candidates = Vec::new();

        for cmd in &self.commands {
            if cmd.starts_with(line) {
                candidates.push(Pair {
                    display: cmd.clone(),
                    replacement: format!("{} ", cmd),
                });
            }
        }

        Ok((0, candidates))
    }
}

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "Flight")]
    flight: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Aircraft")]
    aircraft: String,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "ETA")]
    eta: String,
    #[tabled(rename = "Delay")]
    delay: i64,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct StaffRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Trips")]
    trips: usize,
    #[tabled(rename = "Hours")]
    hours: String,
}

#[derive(Tabled)]
struct AircraftRow {
    #[tabled(rename = "Registration")]
    registration: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Seats")]
    seats: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Operated")]
    operated: usize,
    #[tabled(rename = "Last flight")]
    last_flight: String,
}

fn trip_status_label(status: TripStatus) -> String {
    let label = status.to_string();
    match status {
        TripStatus::OnTime => label.green().to_string(),
        TripStatus::Delayed => label.red().to_string(),
        TripStatus::Cancelled => label.bright_black().to_string(),
        TripStatus::Scheduled => label.yellow().to_string(),
        TripStatus::Completed => label.blue().to_string(),
    }
}

fn staff_status_label(status: StaffAvailabilityStatus) -> String {
    let label = status.to_string();
    match status {
        StaffAvailabilityStatus::Available => label.green().to_string(),
        StaffAvailabilityStatus::OnDuty => label.cyan().to_string(),
        StaffAvailabilityStatus::Unavailable => label.bright_black().to_string(),
    }
}

fn aircraft_status_label(status: AircraftStatus) -> String {
    let label = status.to_string();
    match status {
        AircraftStatus::Available => label.green().to_string(),
        AircraftStatus::Assigned => label.cyan().to_string(),
    }
}

fn trip_row(schedule: &Schedule, trip: &Trip) -> TripRow {
    TripRow {
        flight: trip.flight_number.clone(),
        route: schedule.route_summary(&trip.route),
        aircraft: schedule
            .aircraft
            .get(&trip.aircraft_id)
            .map(|a| a.registration_number.clone())
            .unwrap_or_default(),
        departure: trip.scheduled_departure_time.to_string(),
        eta: trip.estimated_arrival_time().to_string(),
        delay: trip.total_delayed_minutes(),
        status: trip_status_label(trip.current_status()),
    }
}

fn paginate(content: &str) {
    let spawned = Command::new("less")
        .arg("-R")
        .stdin(Stdio::piped())
        .spawn()
        // Fallback to 'more' if 'less' isn't available
        .or_else(|_| Command::new("more").stdin(Stdio::piped()).spawn());

    let mut pager = match spawned {
        Ok(pager) => pager,
        Err(_) => {
            println!("{}", content);
            return;
        }
    };

    if let Some(mut stdin) = pager.stdin.take() {
        if let Err(e) = stdin.write_all(content.as_bytes()) {
            // Broken pipe is common if the user quits the pager early
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                eprintln!("Error writing to pager: {}", e);
            }
        }
    }

    // Wait for the user to close the pager before returning to the ">> " prompt
    let _ = pager.wait();
}

fn show<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }
    let paged = rows.len() > 20;
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.with(Alignment::left());
    if paged {
        paginate(&table.to_string());
    } else {
        println!("{}", table);
    }
}

fn time_or_now(arg: Option<&&str>, clock: &dyn Clock) -> flightops::Result<Time> {
    match arg {
        Some(input) => input.parse(),
        None => Ok(clock.now()),
    }
}

fn list_trips(schedule: &Schedule, filter: &str) {
    let rows: Vec<TripRow> = schedule
        .trips_by_departure()
        .into_iter()
        .filter(|t| {
            let status = t.current_status();
            match filter {
                "s" | "scheduled" => status == TripStatus::Scheduled,
                "o" | "ontime" => status == TripStatus::OnTime,
                "d" | "delayed" => status == TripStatus::Delayed,
                "c" | "cancelled" => status == TripStatus::Cancelled,
                "x" | "completed" => status == TripStatus::Completed,
                _ => true, // 'ls' or 'ls a'
            }
        })
        .map(|t| trip_row(schedule, t))
        .collect();
    show(rows, "No matching trips found.");
}

fn list_crew(schedule: &Schedule) {
    let mut staff: Vec<_> = schedule.staff.values().collect();
    staff.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.name.cmp(&b.name)));
    let rows: Vec<StaffRow> = staff
        .into_iter()
        .map(|s| StaffRow {
            name: s.name.clone(),
            role: s.role.to_string(),
            status: staff_status_label(s.current_status()),
            trips: s.commitments.trips.len(),
            hours: format!("{:.1}", s.total_trip_hours(&schedule.trips)),
        })
        .collect();
    show(rows, "No crew registered.");
}

fn list_fleet(schedule: &Schedule) {
    let mut aircraft: Vec<_> = schedule.aircraft.values().collect();
    aircraft.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
    let rows: Vec<AircraftRow> = aircraft
        .into_iter()
        .map(|a| AircraftRow {
            registration: a.registration_number.clone(),
            kind: a.kind.clone(),
            seats: a.seating_capacity,
            status: aircraft_status_label(a.current_status()),
            operated: a.total_trips_operated(&schedule.trips),
            last_flight: a
                .last_flight_date(&schedule.trips)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    show(rows, "No aircraft registered.");
}

fn check_availability(schedule: &Schedule, registration: &str, from: &str, to: &str) -> flightops::Result<()> {
    let from: Time = from.parse()?;
    let to: Time = to.parse()?;
    let aircraft = schedule.aircraft_by_registration(registration)?;

    if schedule.is_aircraft_available(aircraft.id, from, to)? {
        println!("{} is {} from {} to {}.", aircraft, "available".green(), from, to);
    } else {
        println!("{} is {} from {} to {}.", aircraft, "not available".red(), from, to);
    }

    let free = schedule.available_staff_counts(from, to);
    for role in StaffRole::ALL {
        let needed = aircraft.minimum_staff_required.get(&role).copied().unwrap_or(0);
        let on_hand = free.get(&role).copied().unwrap_or(0);
        println!("  {:<11} {} free, {} needed", role.to_string(), on_hand, needed);
    }
    Ok(())
}

fn print_dashboard(schedule: &Schedule, now: Time, window_hours: u32) {
    let dashboard = Dashboard::build(schedule, now, window_hours);

    println!("\n{} {}", "Operations for".bold(), dashboard.day);
    println!("  On-time:  {}%", dashboard.on_time_percentage.to_string().bold());
    println!("  Delayed:  {}", dashboard.delayed_count.to_string().bold());
    let trips: Vec<String> = dashboard
        .trip_status
        .iter()
        .map(|(status, count)| format!("{} {}", trip_status_label(*status), count))
        .collect();
    println!("  Trips:    {}", trips.join(", "));
    let crew: Vec<String> = dashboard
        .crew_status
        .iter()
        .map(|(status, count)| format!("{} {}", staff_status_label(*status), count))
        .collect();
    println!("  Crew:     {}", crew.join(", "));
    let fleet: Vec<String> = dashboard
        .aircraft_status
        .iter()
        .map(|(status, count)| format!("{} {}", aircraft_status_label(*status), count))
        .collect();
    println!("  Fleet:    {}", fleet.join(", "));

    println!("\n{} {} hours", "Upcoming, next".bold(), window_hours);
    let rows: Vec<TripRow> = dashboard
        .upcoming
        .iter()
        .map(|t| trip_row(schedule, t))
        .collect();
    show(rows, "  Nothing departing.");
    println!();
}

fn run(
    parts: &[&str],
    schedule: &mut Schedule,
    store: &mut JsonFileStore,
    clock: &dyn Clock,
    config: &Config,
) -> flightops::Result<()> {
    match parts[0] {
        "ls" => list_trips(schedule, parts.get(1).copied().unwrap_or("a")),
        "crew" => list_crew(schedule),
        "fleet" => list_fleet(schedule),
        "start" | "depart" | "arrive" => {
            let Some(flight) = parts.get(1) else {
                println!("Usage: {} <flight> [time]", parts[0]);
                return Ok(());
            };
            let trip_id = schedule.trip_id_for_flight(flight)?;
            let time = time_or_now(parts.get(2), clock)?;
            let event = match parts[0] {
                "start" => schedule.start_trip(trip_id, time)?,
                "depart" => schedule.record_departure(trip_id, time)?,
                _ => schedule.record_arrival(trip_id, time)?,
            };
            let trip = schedule.trip(trip_id)?;
            println!(
                "{}: {:?}, now {} (ETA {})",
                trip.flight_number,
                event,
                trip_status_label(trip.current_status()),
                trip.estimated_arrival_time()
            );
        }
        "cancel" => {
            let Some(flight) = parts.get(1) else {
                println!("Usage: cancel <flight>");
                return Ok(());
            };
            let trip_id = schedule.trip_id_for_flight(flight)?;
            let event = schedule.cancel_trip(trip_id)?;
            println!("{}: {:?}", flight, event);
        }
        "avail" => {
            if let (Some(registration), Some(from), Some(to)) = (parts.get(1), parts.get(2), parts.get(3)) {
                check_availability(schedule, registration, from, to)?;
            } else {
                println!("Usage: avail <registration> <from> <to>");
            }
        }
        "dash" => print_dashboard(schedule, clock.now(), config.upcoming_window_hours),
        "save" => {
            schedule.commit(store)?;
            println!("Saved to {}.", store.path().display());
        }
        "help" | "?" => {
            println!("\nAvailable Commands:");
            println!("  ls [status]                - List trips, optionally by status: s - scheduled, o - on-time, d - delayed, c - cancelled, x - completed");
            println!("  crew                       - List crew and their duty status");
            println!("  fleet                      - List aircraft and their status");
            println!("  start <flight> [time]      - Depart the origin (time defaults to now, YYYY-MM-DDTHH:MM)");
            println!("  depart <flight> [time]     - Depart the current stop");
            println!("  arrive <flight> [time]     - Arrive at the current stop");
            println!("  cancel <flight>            - Cancel a trip");
            println!("  avail <reg> <from> <to>    - Check whether an aircraft and enough crew are free");
            println!("  dash                       - Show today's operations summary");
            println!("  save                       - Write the schedule back to the scenario file");
            println!("  help / ?                   - Show this help menu");
            println!("  exit / quit                - Exit the console\n");
        }
        _ => println!("Unknown command: {}", parts[0]),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = Config::load_from(args.config)?;
    if let Some(scenario) = args.scenario {
        config.scenario = scenario;
    }
    if let Some(verbosity) = Verbosity::from_flags(args.quiet, args.verbose) {
        config.verbosity = verbosity;
    }
    init_logging(config.verbosity);

    let mut store = JsonFileStore::new(&config.scenario);
    let mut schedule = match Schedule::load(&store) {
        Ok(schedule) => schedule,
        Err(e @ Error::Persistence { .. }) => {
            warn!(error = %e, "starting with an empty schedule");
            Schedule::new()
        }
        Err(e) => return Err(e.into()),
    };
    let clock = SystemClock;
    println!(
        "Operations online. Loaded {} trips from {}",
        schedule.trips.len(),
        config.scenario.display()
    );

    let rl_config = rustyline::Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();

    let helper = CompleteHelper {
        commands: [
            "ls", "crew", "fleet", "start", "depart", "arrive", "cancel", "avail", "dash", "save", "help", "exit",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
    };

    let mut rl = Editor::with_config(rl_config)?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(trimmed)?;

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                if matches!(parts[0], "exit" | "quit") {
                    break;
                }
                if let Err(e) = run(&parts, &mut schedule, &mut store, &clock, &config) {
                    println!("{} {}", "Error:".red(), e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
