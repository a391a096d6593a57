use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryKind {
    Flight,
    Hotel,
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryKind::Flight => write!(f, "flight"),
            InventoryKind::Hotel => write!(f, "hotel"),
        }
    }
}

/// Reference to exactly one inventory item. Persisted as a pair of nullable
/// columns; in memory the variant makes "one of flight/hotel" unrepresentable
/// any other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum ItemRef {
    Flight(Uuid),
    Hotel(Uuid),
}

impl ItemRef {
    pub fn kind(&self) -> InventoryKind {
        match self {
            ItemRef::Flight(_) => InventoryKind::Flight,
            ItemRef::Hotel(_) => InventoryKind::Hotel,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ItemRef::Flight(id) | ItemRef::Hotel(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Booked,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "booked",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "booked" => Some(ReservationStatus::Booked),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

/// One booking or cancellation event. The reservation log is append-only:
/// cancelling a booking appends a new Cancelled row, it never mutates or
/// deletes the Booked row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item: ItemRef,
    pub status: ReservationStatus,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub total_price_cents: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ref_accessors() {
        let id = Uuid::new_v4();
        let item = ItemRef::Hotel(id);
        assert_eq!(item.kind(), InventoryKind::Hotel);
        assert_eq!(item.id(), id);
    }

    #[test]
    fn status_round_trip() {
        assert_eq!(
            ReservationStatus::parse("booked"),
            Some(ReservationStatus::Booked)
        );
        assert_eq!(ReservationStatus::parse("pending"), None);
        assert_eq!(ReservationStatus::Cancelled.as_str(), "cancelled");
    }
}
