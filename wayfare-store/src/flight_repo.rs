use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::flight::{CabinClass, Flight};
use wayfare_core::repository::{FlightStore, PriceOrder};

pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        op: &'static str,
        clause: &str,
        bind_text: Option<&str>,
    ) -> StoreResult<Vec<Flight>> {
        let sql = format!("SELECT {COLUMNS} FROM flights {clause}");
        let mut query = sqlx::query_as::<_, FlightRow>(&sql);
        if let Some(value) = bind_text {
            query = query.bind(value.to_owned());
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::backend(op, e))?;
        rows.into_iter().map(|r| r.into_flight(op)).collect()
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: Uuid,
    airline: String,
    origin: String,
    destination: String,
    departure: DateTime<Utc>,
    arrival: DateTime<Utc>,
    city: String,
    price_cents: i32,
    cabin_class: String,
    direct: bool,
    seats_available: i32,
}

impl FlightRow {
    fn into_flight(self, op: &'static str) -> StoreResult<Flight> {
        let cabin_class = CabinClass::parse(&self.cabin_class).ok_or_else(|| {
            StoreError::corrupt(op, format!("unknown cabin class '{}'", self.cabin_class))
        })?;
        Ok(Flight {
            id: self.id,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            departure: self.departure,
            arrival: self.arrival,
            city: self.city,
            price_cents: self.price_cents,
            cabin_class,
            direct: self.direct,
            seats_available: self.seats_available,
        })
    }
}

const COLUMNS: &str = "id, airline, origin, destination, departure, arrival, city, \
                       price_cents, cabin_class, direct, seats_available";

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn create(&self, flight: &Flight) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO flights (id, airline, origin, destination, departure, arrival, \
             city, price_cents, cabin_class, direct, seats_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(flight.id)
        .bind(&flight.airline)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure)
        .bind(flight.arrival)
        .bind(&flight.city)
        .bind(flight.price_cents)
        .bind(flight.cabin_class.as_str())
        .bind(flight.direct)
        .bind(flight.seats_available)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("create flight", e))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {COLUMNS} FROM flights WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get flight by id", e))?;
        row.map(|r| r.into_flight("get flight by id")).transpose()
    }

    async fn update(&self, flight: &Flight) -> StoreResult<()> {
        sqlx::query(
            "UPDATE flights SET airline = $2, origin = $3, destination = $4, departure = $5, \
             arrival = $6, city = $7, price_cents = $8, cabin_class = $9, direct = $10, \
             seats_available = $11 WHERE id = $1",
        )
        .bind(flight.id)
        .bind(&flight.airline)
        .bind(&flight.origin)
        .bind(&flight.destination)
        .bind(flight.departure)
        .bind(flight.arrival)
        .bind(&flight.city)
        .bind(flight.price_cents)
        .bind(flight.cabin_class.as_str())
        .bind(flight.direct)
        .bind(flight.seats_available)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("update flight", e))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM flights WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("delete flight", e))?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Flight>> {
        self.fetch_where("list flights", "ORDER BY departure", None)
            .await
    }

    async fn list_by_city(&self, city: &str) -> StoreResult<Vec<Flight>> {
        self.fetch_where(
            "list flights by city",
            "WHERE city = $1 ORDER BY departure",
            Some(city),
        )
        .await
    }

    async fn list_by_departure_date(&self, date: NaiveDate) -> StoreResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {COLUMNS} FROM flights WHERE DATE(departure) = $1 ORDER BY departure"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list flights by departure date", e))?;
        rows.into_iter()
            .map(|r| r.into_flight("list flights by departure date"))
            .collect()
    }

    async fn list_by_class(&self, class: CabinClass) -> StoreResult<Vec<Flight>> {
        self.fetch_where(
            "list flights by class",
            "WHERE cabin_class = $1 ORDER BY departure",
            Some(class.as_str()),
        )
        .await
    }

    async fn list_direct(&self, direct: bool) -> StoreResult<Vec<Flight>> {
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {COLUMNS} FROM flights WHERE direct = $1 ORDER BY departure"
        ))
        .bind(direct)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list direct flights", e))?;
        rows.into_iter()
            .map(|r| r.into_flight("list direct flights"))
            .collect()
    }

    async fn list_sorted_by_price(&self, order: PriceOrder) -> StoreResult<Vec<Flight>> {
        let clause = match order {
            PriceOrder::LowToHigh => "ORDER BY price_cents ASC",
            PriceOrder::HighToLow => "ORDER BY price_cents DESC",
        };
        self.fetch_where("list flights sorted by price", clause, None)
            .await
    }

    async fn list_booked_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Flight>> {
        // Active = the user's booked events for the flight outnumber their
        // cancelled ones; the reservation log is append-only.
        let rows = sqlx::query_as::<_, FlightRow>(&format!(
            "SELECT {COLUMNS} FROM flights WHERE id IN ( \
                 SELECT flight_id FROM reservations \
                 WHERE user_id = $1 AND flight_id IS NOT NULL \
                 GROUP BY flight_id \
                 HAVING COUNT(*) FILTER (WHERE status = 'booked') \
                      > COUNT(*) FILTER (WHERE status = 'cancelled') \
             ) ORDER BY departure"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list flights booked by user", e))?;
        rows.into_iter()
            .map(|r| r.into_flight("list flights booked by user"))
            .collect()
    }
}
