use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    Economy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "economy" => Some(CabinClass::Economy),
            "business" => Some(CabinClass::Business),
            "first" => Some(CabinClass::First),
            _ => None,
        }
    }
}

/// A bookable flight. `seats_available` is the capacity counter mutated by
/// the booking engine; it never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub city: String,
    pub price_cents: i32,
    pub cabin_class: CabinClass,
    pub direct: bool,
    pub seats_available: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabin_class_parse() {
        assert_eq!(CabinClass::parse("business"), Some(CabinClass::Business));
        assert_eq!(CabinClass::parse("premium"), None);
    }
}
