use thiserror::Error;
use uuid::Uuid;

use crate::inventory::Bookable;
use crate::store::{CommitOutcome, InventoryStore, ReservationEntry};
use wayfare_core::error::StoreError;
use wayfare_core::reservation::{InventoryKind, ItemRef, Reservation, ReservationStatus};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid {0} id")]
    InvalidInput(&'static str),

    #[error("{kind} {id} not found")]
    NotFound { kind: InventoryKind, id: Uuid },

    #[error("no capacity left on {kind} {id}")]
    CapacityExhausted { kind: InventoryKind, id: Uuid },

    #[error("user {user_id} already holds a booking for {kind} {id}")]
    DuplicateBooking {
        kind: InventoryKind,
        id: Uuid,
        user_id: Uuid,
    },

    #[error("user {user_id} has no active booking for {kind} {id}")]
    NoActiveBooking {
        kind: InventoryKind,
        id: Uuid,
        user_id: Uuid,
    },

    #[error("{kind} {id} does not allow free cancellation")]
    CancellationNotAllowed { kind: InventoryKind, id: Uuid },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Coordinates the capacity counter on an inventory record with the
/// append-only reservation log. One engine instance serves one inventory
/// kind; the store decides atomicity, the engine decides policy.
///
/// The engine holds no state of its own and never retries: every failure is
/// surfaced to the caller on first occurrence.
pub struct BookingEngine<S> {
    store: S,
}

impl<S: InventoryStore> BookingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Book one unit of the item for the user.
    pub async fn book(&self, user_id: Uuid, item_id: Uuid) -> Result<(), BookingError> {
        if user_id.is_nil() {
            return Err(BookingError::InvalidInput("user"));
        }
        if item_id.is_nil() {
            return Err(BookingError::InvalidInput("item"));
        }

        let item = self
            .store
            .load(item_id)
            .await?
            .ok_or(BookingError::NotFound {
                kind: S::KIND,
                id: item_id,
            })?;

        // Fast path only. The store re-checks under its own atomic guard,
        // so a stale read here cannot oversell.
        if item.capacity_remaining() <= 0 {
            return Err(BookingError::CapacityExhausted {
                kind: S::KIND,
                id: item_id,
            });
        }

        let log = self.store.reservations_for_user(user_id).await?;
        if holds_active_booking(&log, item.item_ref()) {
            return Err(BookingError::DuplicateBooking {
                kind: S::KIND,
                id: item_id,
                user_id,
            });
        }

        let entry = ReservationEntry::booked(user_id, item.item_ref());
        match self.store.commit(entry).await? {
            CommitOutcome::Applied => {
                tracing::info!(%user_id, %item_id, kind = %S::KIND, "booking confirmed");
                Ok(())
            }
            CommitOutcome::CapacityExhausted => {
                tracing::info!(%user_id, %item_id, kind = %S::KIND, "lost race for last unit");
                Err(BookingError::CapacityExhausted {
                    kind: S::KIND,
                    id: item_id,
                })
            }
        }
    }

    /// Cancel the user's booking on the item. Appends a cancellation event
    /// and returns the unit to inventory; the booked row is left untouched.
    pub async fn cancel(&self, user_id: Uuid, item_id: Uuid) -> Result<(), BookingError> {
        if user_id.is_nil() {
            return Err(BookingError::InvalidInput("user"));
        }
        if item_id.is_nil() {
            return Err(BookingError::InvalidInput("item"));
        }

        let item = self
            .store
            .load(item_id)
            .await?
            .ok_or(BookingError::NotFound {
                kind: S::KIND,
                id: item_id,
            })?;

        let log = self.store.reservations_for_user(user_id).await?;
        if !holds_active_booking(&log, item.item_ref()) {
            return Err(BookingError::NoActiveBooking {
                kind: S::KIND,
                id: item_id,
                user_id,
            });
        }

        // Checked after the booking lookup so a caller without the right to
        // cancel still learns that distinctly from "no booking found".
        if !item.supports_cancellation() {
            return Err(BookingError::CancellationNotAllowed {
                kind: S::KIND,
                id: item_id,
            });
        }

        let entry = ReservationEntry::cancelled(user_id, item.item_ref());
        match self.store.commit(entry).await? {
            CommitOutcome::Applied => {
                tracing::info!(%user_id, %item_id, kind = %S::KIND, "booking cancelled");
                Ok(())
            }
            CommitOutcome::CapacityExhausted => Err(StoreError::corrupt(
                "commit cancellation",
                "guarded decrement reported for a capacity increment",
            )
            .into()),
        }
    }
}

/// A user holds an active booking when their Booked events for the item
/// outnumber their Cancelled ones. The log is append-only, so this is the
/// only way "currently booked" can be derived.
///
/// The original system matched any reservation row regardless of status,
/// which blocked rebooking after a cancellation; counting the balance keeps
/// the duplicate guard while letting cancel-then-rebook through.
fn holds_active_booking(log: &[Reservation], item: ItemRef) -> bool {
    let mut balance = 0i32;
    for event in log.iter().filter(|r| r.item == item) {
        match event.status {
            ReservationStatus::Booked => balance += 1,
            ReservationStatus::Cancelled => balance -= 1,
        }
    }
    balance > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wayfare_core::error::StoreResult;
    use wayfare_core::flight::{CabinClass, Flight};
    use wayfare_core::hotel::Hotel;

    trait TestItem: Bookable + Clone + Send + Sync {
        fn adjust(&mut self, delta: i32);
    }

    impl TestItem for Flight {
        fn adjust(&mut self, delta: i32) {
            self.seats_available += delta;
        }
    }

    impl TestItem for Hotel {
        fn adjust(&mut self, delta: i32) {
            self.available_rooms += delta;
        }
    }

    /// In-memory stand-in for the Postgres store with the same commit
    /// semantics: the guarded decrement and the log append happen under one
    /// lock.
    struct MemoryInventory<T> {
        items: Mutex<HashMap<Uuid, T>>,
        log: Mutex<Vec<Reservation>>,
    }

    impl<T: TestItem> MemoryInventory<T> {
        fn with_item(item: T) -> Self {
            let mut items = HashMap::new();
            items.insert(item.item_ref().id(), item);
            Self {
                items: Mutex::new(items),
                log: Mutex::new(Vec::new()),
            }
        }

        fn capacity_of(&self, id: Uuid) -> i32 {
            self.items.lock().unwrap()[&id].capacity_remaining()
        }

        fn log_len(&self) -> usize {
            self.log.lock().unwrap().len()
        }

        fn rows_for(&self, user_id: Uuid) -> Vec<Reservation> {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect()
        }

        fn do_load(&self, id: Uuid) -> Option<T> {
            self.items.lock().unwrap().get(&id).cloned()
        }

        fn do_commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome> {
            let mut items = self.items.lock().unwrap();
            let item = items
                .get_mut(&entry.item.id())
                .ok_or_else(|| StoreError::corrupt("commit", "inventory row missing"))?;

            if entry.status == ReservationStatus::Booked && item.capacity_remaining() <= 0 {
                return Ok(CommitOutcome::CapacityExhausted);
            }

            item.adjust(entry.capacity_delta());
            self.log.lock().unwrap().push(Reservation {
                id: Uuid::new_v4(),
                user_id: entry.user_id,
                item: entry.item,
                status: entry.status,
                check_in: None,
                check_out: None,
                total_price_cents: None,
                created_at: Utc::now(),
            });
            Ok(CommitOutcome::Applied)
        }
    }

    #[async_trait::async_trait]
    impl InventoryStore for MemoryInventory<Flight> {
        type Item = Flight;
        const KIND: InventoryKind = InventoryKind::Flight;

        async fn load(&self, id: Uuid) -> StoreResult<Option<Flight>> {
            Ok(self.do_load(id))
        }

        async fn reservations_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
            Ok(self.rows_for(user_id))
        }

        async fn commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome> {
            self.do_commit(entry)
        }
    }

    #[async_trait::async_trait]
    impl InventoryStore for MemoryInventory<Hotel> {
        type Item = Hotel;
        const KIND: InventoryKind = InventoryKind::Hotel;

        async fn load(&self, id: Uuid) -> StoreResult<Option<Hotel>> {
            Ok(self.do_load(id))
        }

        async fn reservations_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
            Ok(self.rows_for(user_id))
        }

        async fn commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome> {
            self.do_commit(entry)
        }
    }

    fn flight(seats: i32) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            airline: "Aurora Air".to_string(),
            origin: "AMS".to_string(),
            destination: "NRT".to_string(),
            departure: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
            arrival: Utc.with_ymd_and_hms(2026, 10, 1, 21, 30, 0).unwrap(),
            city: "Tokyo".to_string(),
            price_cents: 78_000,
            cabin_class: CabinClass::Economy,
            direct: true,
            seats_available: seats,
        }
    }

    fn hotel(rooms: i32, free_cancellation: bool) -> Hotel {
        Hotel {
            id: Uuid::new_v4(),
            name: "Hotel Meridian".to_string(),
            city: "Lisbon".to_string(),
            address: "Rua Augusta 12".to_string(),
            description: "City centre".to_string(),
            price_per_night_cents: 14_500,
            check_in_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            free_cancellation,
            available_rooms: rooms,
        }
    }

    #[tokio::test]
    async fn book_decrements_capacity_and_appends_one_row() {
        let item = flight(5);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();

        assert_eq!(engine.store.capacity_of(item_id), 4);
        let rows = engine.store.rows_for(user);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ReservationStatus::Booked);
        assert_eq!(rows[0].item, ItemRef::Flight(item_id));
    }

    #[tokio::test]
    async fn cancel_appends_row_and_restores_capacity() {
        let item = flight(2);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();
        engine.cancel(user, item_id).await.unwrap();

        assert_eq!(engine.store.capacity_of(item_id), 2);
        let rows = engine.store.rows_for(user);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, ReservationStatus::Booked);
        assert_eq!(rows[1].status, ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn booking_sold_out_flight_performs_no_writes() {
        let item = flight(0);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));

        let err = engine.book(Uuid::new_v4(), item_id).await.unwrap_err();
        assert!(matches!(err, BookingError::CapacityExhausted { .. }));
        assert_eq!(engine.store.capacity_of(item_id), 0);
        assert_eq!(engine.store.log_len(), 0);
    }

    #[tokio::test]
    async fn duplicate_booking_rejected_without_double_decrement() {
        let item = flight(5);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();
        let err = engine.book(user, item_id).await.unwrap_err();

        assert!(matches!(err, BookingError::DuplicateBooking { .. }));
        assert_eq!(engine.store.capacity_of(item_id), 4);
        assert_eq!(engine.store.log_len(), 1);
    }

    #[tokio::test]
    async fn rebooking_after_cancellation_is_allowed() {
        let item = flight(3);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();
        engine.cancel(user, item_id).await.unwrap();
        engine.book(user, item_id).await.unwrap();

        assert_eq!(engine.store.capacity_of(item_id), 2);
        assert_eq!(engine.store.rows_for(user).len(), 3);
    }

    #[tokio::test]
    async fn cancel_without_booking_fails() {
        let item = flight(3);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));

        let err = engine.cancel(Uuid::new_v4(), item_id).await.unwrap_err();
        assert!(matches!(err, BookingError::NoActiveBooking { .. }));
        assert_eq!(engine.store.capacity_of(item_id), 3);
        assert_eq!(engine.store.log_len(), 0);
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let engine = BookingEngine::new(MemoryInventory::with_item(flight(1)));
        let err = engine
            .book(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn nil_ids_are_rejected() {
        let item = flight(1);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));

        let err = engine.book(Uuid::nil(), item_id).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput("user")));
        let err = engine.cancel(Uuid::new_v4(), Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput("item")));
        assert_eq!(engine.store.log_len(), 0);
    }

    #[tokio::test]
    async fn last_seat_contention_scenario() {
        let item = flight(1);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        engine.book(user_a, item_id).await.unwrap();
        assert_eq!(engine.store.capacity_of(item_id), 0);

        let err = engine.book(user_b, item_id).await.unwrap_err();
        assert!(matches!(err, BookingError::CapacityExhausted { .. }));

        engine.cancel(user_a, item_id).await.unwrap();
        assert_eq!(engine.store.capacity_of(item_id), 1);
        assert_eq!(engine.store.rows_for(user_a).len(), 2);

        engine.book(user_b, item_id).await.unwrap();
        assert_eq!(engine.store.capacity_of(item_id), 0);
    }

    #[tokio::test]
    async fn non_cancellable_hotel_reports_distinct_error() {
        let item = hotel(4, false);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();
        assert_eq!(engine.store.capacity_of(item_id), 3);

        let err = engine.cancel(user, item_id).await.unwrap_err();
        assert!(matches!(err, BookingError::CancellationNotAllowed { .. }));
        // The booking itself stands; no cancellation row, no capacity change.
        assert_eq!(engine.store.capacity_of(item_id), 3);
        assert_eq!(engine.store.log_len(), 1);
    }

    #[tokio::test]
    async fn cancellable_hotel_round_trip() {
        let item = hotel(2, true);
        let item_id = item.id;
        let engine = BookingEngine::new(MemoryInventory::with_item(item));
        let user = Uuid::new_v4();

        engine.book(user, item_id).await.unwrap();
        engine.cancel(user, item_id).await.unwrap();
        assert_eq!(engine.store.capacity_of(item_id), 2);
        assert_eq!(engine.store.rows_for(user).len(), 2);
    }

    #[tokio::test]
    async fn commit_guard_blocks_oversell_at_the_store() {
        // Two commits racing past the engine's read both reach the store;
        // only one may win the last unit.
        let item = flight(1);
        let item_id = item.id;
        let store = MemoryInventory::with_item(item);

        let first = store
            .do_commit(ReservationEntry::booked(Uuid::new_v4(), ItemRef::Flight(item_id)))
            .unwrap();
        let second = store
            .do_commit(ReservationEntry::booked(Uuid::new_v4(), ItemRef::Flight(item_id)))
            .unwrap();

        assert_eq!(first, CommitOutcome::Applied);
        assert_eq!(second, CommitOutcome::CapacityExhausted);
        assert_eq!(store.capacity_of(item_id), 0);
        assert_eq!(store.log_len(), 1);
    }
}
