use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_booking::store::{CommitOutcome, InventoryStore, ReservationEntry};
use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::flight::Flight;
use wayfare_core::hotel::Hotel;
use wayfare_core::repository::{FlightStore, HotelStore};
use wayfare_core::reservation::{InventoryKind, ItemRef, Reservation, ReservationStatus};

use crate::flight_repo::PgFlightStore;
use crate::hotel_repo::PgHotelStore;

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: Uuid,
    flight_id: Option<Uuid>,
    hotel_id: Option<Uuid>,
    status: String,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    total_price_cents: Option<i32>,
    created_at: DateTime<Utc>,
}

impl ReservationRow {
    fn into_reservation(self, op: &'static str) -> StoreResult<Reservation> {
        let item = match (self.flight_id, self.hotel_id) {
            (Some(flight_id), None) => ItemRef::Flight(flight_id),
            (None, Some(hotel_id)) => ItemRef::Hotel(hotel_id),
            _ => {
                return Err(StoreError::corrupt(
                    op,
                    format!("reservation {} references neither or both item kinds", self.id),
                ))
            }
        };
        let status = ReservationStatus::parse(&self.status).ok_or_else(|| {
            StoreError::corrupt(op, format!("unknown reservation status '{}'", self.status))
        })?;
        Ok(Reservation {
            id: self.id,
            user_id: self.user_id,
            item,
            status,
            check_in: self.check_in,
            check_out: self.check_out,
            total_price_cents: self.total_price_cents,
            created_at: self.created_at,
        })
    }
}

const RESERVATION_COLUMNS: &str =
    "id, user_id, flight_id, hotel_id, status, check_in, check_out, total_price_cents, created_at";

/// Appends the reservation row and applies the capacity delta inside one
/// transaction. The decrement carries its own `capacity > 0` guard, so the
/// row lock taken by UPDATE serializes racing bookings of the last unit and
/// the loser rolls back without writing anything.
async fn commit_entry(
    pool: &PgPool,
    op: &'static str,
    entry: ReservationEntry,
    ref_column: &str,
    capacity_sql_booked: &str,
    capacity_sql_cancelled: &str,
) -> StoreResult<CommitOutcome> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| StoreError::backend(op, e))?;

    let insert = format!(
        "INSERT INTO reservations (id, user_id, {ref_column}, status, created_at) \
         VALUES ($1, $2, $3, $4, $5)"
    );
    sqlx::query(&insert)
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.item.id())
        .bind(entry.status.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::backend(op, e))?;

    let capacity_sql = match entry.status {
        ReservationStatus::Booked => capacity_sql_booked,
        ReservationStatus::Cancelled => capacity_sql_cancelled,
    };
    let result = sqlx::query(capacity_sql)
        .bind(entry.item.id())
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::backend(op, e))?;

    if result.rows_affected() == 0 {
        tx.rollback()
            .await
            .map_err(|e| StoreError::backend(op, e))?;
        return match entry.status {
            ReservationStatus::Booked => Ok(CommitOutcome::CapacityExhausted),
            ReservationStatus::Cancelled => Err(StoreError::corrupt(
                op,
                format!("{} {} vanished mid-cancellation", entry.item.kind(), entry.item.id()),
            )),
        };
    }

    tx.commit().await.map_err(|e| StoreError::backend(op, e))?;
    Ok(CommitOutcome::Applied)
}

async fn reservations_for_user(
    pool: &PgPool,
    op: &'static str,
    user_id: Uuid,
    ref_column: &str,
) -> StoreResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations \
         WHERE user_id = $1 AND {ref_column} IS NOT NULL ORDER BY created_at"
    );
    let rows = sqlx::query_as::<_, ReservationRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::backend(op, e))?;
    rows.into_iter().map(|r| r.into_reservation(op)).collect()
}

pub struct PgFlightInventory {
    pool: PgPool,
    flights: PgFlightStore,
}

impl PgFlightInventory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            flights: PgFlightStore::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl InventoryStore for PgFlightInventory {
    type Item = Flight;

    const KIND: InventoryKind = InventoryKind::Flight;

    async fn load(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        self.flights.get_by_id(id).await
    }

    async fn reservations_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
        reservations_for_user(
            &self.pool,
            "list flight reservations for user",
            user_id,
            "flight_id",
        )
        .await
    }

    async fn commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome> {
        commit_entry(
            &self.pool,
            "commit flight reservation",
            entry,
            "flight_id",
            "UPDATE flights SET seats_available = seats_available - 1 \
             WHERE id = $1 AND seats_available > 0",
            "UPDATE flights SET seats_available = seats_available + 1 WHERE id = $1",
        )
        .await
    }
}

pub struct PgHotelInventory {
    pool: PgPool,
    hotels: PgHotelStore,
}

impl PgHotelInventory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            hotels: PgHotelStore::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl InventoryStore for PgHotelInventory {
    type Item = Hotel;

    const KIND: InventoryKind = InventoryKind::Hotel;

    async fn load(&self, id: Uuid) -> StoreResult<Option<Hotel>> {
        self.hotels.get_by_id(id).await
    }

    async fn reservations_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Reservation>> {
        reservations_for_user(
            &self.pool,
            "list hotel reservations for user",
            user_id,
            "hotel_id",
        )
        .await
    }

    async fn commit(&self, entry: ReservationEntry) -> StoreResult<CommitOutcome> {
        commit_entry(
            &self.pool,
            "commit hotel reservation",
            entry,
            "hotel_id",
            "UPDATE hotels SET available_rooms = available_rooms - 1 \
             WHERE id = $1 AND available_rooms > 0",
            "UPDATE hotels SET available_rooms = available_rooms + 1 WHERE id = $1",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(flight_id: Option<Uuid>, hotel_id: Option<Uuid>, status: &str) -> ReservationRow {
        ReservationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            flight_id,
            hotel_id,
            status: status.to_string(),
            check_in: None,
            check_out: None,
            total_price_cents: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_maps_to_tagged_item_ref() {
        let flight_id = Uuid::new_v4();
        let reservation = row(Some(flight_id), None, "booked")
            .into_reservation("test")
            .unwrap();
        assert_eq!(reservation.item, ItemRef::Flight(flight_id));
        assert_eq!(reservation.status, ReservationStatus::Booked);
    }

    #[test]
    fn row_with_both_references_is_corrupt() {
        let err = row(Some(Uuid::new_v4()), Some(Uuid::new_v4()), "booked")
            .into_reservation("test")
            .unwrap_err();
        assert_eq!(err.operation(), "test");
    }

    #[test]
    fn row_with_no_reference_is_corrupt() {
        assert!(row(None, None, "cancelled").into_reservation("test").is_err());
    }

    #[test]
    fn row_with_unknown_status_is_corrupt() {
        assert!(row(Some(Uuid::new_v4()), None, "held")
            .into_reservation("test")
            .is_err());
    }
}
