use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::hotel::Hotel;
use wayfare_core::repository::{HotelStore, PriceOrder};

pub struct PgHotelStore {
    pool: PgPool,
}

impl PgHotelStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, op: &'static str, sql: String) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::backend(op, e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }
}

#[derive(sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    city: String,
    address: String,
    description: String,
    price_per_night_cents: i32,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    free_cancellation: bool,
    available_rooms: i32,
}

impl HotelRow {
    fn into_hotel(self) -> Hotel {
        Hotel {
            id: self.id,
            name: self.name,
            city: self.city,
            address: self.address,
            description: self.description,
            price_per_night_cents: self.price_per_night_cents,
            check_in_date: self.check_in_date,
            check_out_date: self.check_out_date,
            free_cancellation: self.free_cancellation,
            available_rooms: self.available_rooms,
        }
    }
}

const COLUMNS: &str = "id, name, city, address, description, price_per_night_cents, \
                       check_in_date, check_out_date, free_cancellation, available_rooms";

#[async_trait]
impl HotelStore for PgHotelStore {
    async fn create(&self, hotel: &Hotel) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO hotels (id, name, city, address, description, price_per_night_cents, \
             check_in_date, check_out_date, free_cancellation, available_rooms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.address)
        .bind(&hotel.description)
        .bind(hotel.price_per_night_cents)
        .bind(hotel.check_in_date)
        .bind(hotel.check_out_date)
        .bind(hotel.free_cancellation)
        .bind(hotel.available_rooms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("create hotel", e))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Hotel>> {
        let row = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get hotel by id", e))?;
        Ok(row.map(HotelRow::into_hotel))
    }

    async fn update(&self, hotel: &Hotel) -> StoreResult<()> {
        sqlx::query(
            "UPDATE hotels SET name = $2, city = $3, address = $4, description = $5, \
             price_per_night_cents = $6, check_in_date = $7, check_out_date = $8, \
             free_cancellation = $9, available_rooms = $10 WHERE id = $1",
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.address)
        .bind(&hotel.description)
        .bind(hotel.price_per_night_cents)
        .bind(hotel.check_in_date)
        .bind(hotel.check_out_date)
        .bind(hotel.free_cancellation)
        .bind(hotel.available_rooms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("update hotel", e))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("delete hotel", e))?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Hotel>> {
        self.fetch_all("list hotels", format!("SELECT {COLUMNS} FROM hotels ORDER BY name"))
            .await
    }

    async fn list_by_city(&self, city: &str) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE city = $1 ORDER BY name"
        ))
        .bind(city)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list hotels by city", e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }

    async fn list_by_check_in(&self, date: NaiveDate) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE check_in_date = $1 ORDER BY name"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list hotels by check-in date", e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }

    async fn list_by_check_out(&self, date: NaiveDate) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE check_out_date = $1 ORDER BY name"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list hotels by check-out date", e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }

    async fn list_free_cancellation(&self, free: bool) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE free_cancellation = $1 ORDER BY name"
        ))
        .bind(free)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list hotels by cancellation option", e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }

    async fn list_sorted_by_price(&self, order: PriceOrder) -> StoreResult<Vec<Hotel>> {
        let clause = match order {
            PriceOrder::LowToHigh => "ASC",
            PriceOrder::HighToLow => "DESC",
        };
        self.fetch_all(
            "list hotels sorted by price",
            format!("SELECT {COLUMNS} FROM hotels ORDER BY price_per_night_cents {clause}"),
        )
        .await
    }

    async fn list_booked_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(&format!(
            "SELECT {COLUMNS} FROM hotels WHERE id IN ( \
                 SELECT hotel_id FROM reservations \
                 WHERE user_id = $1 AND hotel_id IS NOT NULL \
                 GROUP BY hotel_id \
                 HAVING COUNT(*) FILTER (WHERE status = 'booked') \
                      > COUNT(*) FILTER (WHERE status = 'cancelled') \
             ) ORDER BY name"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list hotels booked by user", e))?;
        Ok(rows.into_iter().map(HotelRow::into_hotel).collect())
    }
}
