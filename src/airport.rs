use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Formatter;
use tabled::Tabled;
use uuid::Uuid;

pub type AirportId = Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Airport {
    #[tabled(skip)]
    pub id: AirportId,
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

impl Airport {
    pub fn new(code: &str, name: &str, city: &str, country: &str) -> Self {
        Airport {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}
