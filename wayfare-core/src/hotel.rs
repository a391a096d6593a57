use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable hotel. `available_rooms` is the capacity counter mutated by
/// the booking engine; `free_cancellation` gates the cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub price_per_night_cents: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub free_cancellation: bool,
    pub available_rooms: i32,
}
