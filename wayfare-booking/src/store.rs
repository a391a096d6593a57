use async_trait::async_trait;
use uuid::Uuid;

use crate::inventory::Bookable;
use wayfare_core::error::StoreResult;
use wayfare_core::reservation::{InventoryKind, ItemRef, Reservation, ReservationStatus};

/// A reservation event to append to the log. The store assigns the row id
/// and timestamp when the entry commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationEntry {
    pub user_id: Uuid,
    pub item: ItemRef,
    pub status: ReservationStatus,
}

impl ReservationEntry {
    pub fn booked(user_id: Uuid, item: ItemRef) -> Self {
        Self {
            user_id,
            item,
            status: ReservationStatus::Booked,
        }
    }

    pub fn cancelled(user_id: Uuid, item: ItemRef) -> Self {
        Self {
            user_id,
            item,
            status: ReservationStatus::Cancelled,
        }
    }

    /// Capacity delta the entry applies when it commits.
    pub fn capacity_delta(&self) -> i32 {
        match self.status {
            ReservationStatus::Booked => -1,
            ReservationStatus::Cancelled => 1,
        }
    }
}

/// Result of an atomic commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Reservation row appended and capacity adjusted.
    Applied,
    /// The guarded decrement matched no row: capacity hit zero after the
    /// engine's read. Nothing was written.
    CapacityExhausted,
}

/// Storage contract of the booking engine for one inventory kind.
///
/// `commit` must append the reservation row and apply the capacity delta in
/// a single atomic scope: both take effect or neither does. For a Booked
/// entry the decrement is conditional on remaining capacity, so two racing
/// bookings of the last unit serialize in the store and the loser observes
/// `CommitOutcome::CapacityExhausted` rather than driving the counter
/// negative.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    type Item: Bookable + Send;

    const KIND: InventoryKind;

    async fn load(&self, id: Uuid) -> StoreResult<Option<Self::Item>>;

    /// Every reservation event the user has for this inventory kind,
    /// regardless of status. The engine derives active holdings from the
    /// full log.
    async fn reservations_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>>;

    async fn commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome>;
}
