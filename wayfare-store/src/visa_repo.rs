use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::repository::VisaStore;
use wayfare_core::visa::{VisaApplication, VisaStatus};
use wayfare_shared::Masked;

pub struct PgVisaStore {
    pool: PgPool,
}

impl PgVisaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VisaRow {
    id: Uuid,
    user_id: Uuid,
    visa_type: String,
    destination: String,
    travel_date: NaiveDate,
    passport_number: String,
    nationality: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl VisaRow {
    fn into_visa(self, op: &'static str) -> StoreResult<VisaApplication> {
        let status = VisaStatus::parse(&self.status).ok_or_else(|| {
            StoreError::corrupt(op, format!("unknown visa status '{}'", self.status))
        })?;
        Ok(VisaApplication {
            id: self.id,
            user_id: self.user_id,
            visa_type: self.visa_type,
            destination: self.destination,
            travel_date: self.travel_date,
            passport_number: Masked(self.passport_number),
            nationality: self.nationality,
            status,
            created_at: self.created_at,
        })
    }
}

const COLUMNS: &str = "id, user_id, visa_type, destination, travel_date, passport_number, \
                       nationality, status, created_at";

#[async_trait]
impl VisaStore for PgVisaStore {
    async fn create(&self, visa: &VisaApplication) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO visa_applications (id, user_id, visa_type, destination, travel_date, \
             passport_number, nationality, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(visa.id)
        .bind(visa.user_id)
        .bind(&visa.visa_type)
        .bind(&visa.destination)
        .bind(visa.travel_date)
        .bind(visa.passport_number.inner())
        .bind(&visa.nationality)
        .bind(visa.status.as_str())
        .bind(visa.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("create visa application", e))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<VisaApplication>> {
        let row = sqlx::query_as::<_, VisaRow>(&format!(
            "SELECT {COLUMNS} FROM visa_applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get visa application by id", e))?;
        row.map(|r| r.into_visa("get visa application by id"))
            .transpose()
    }

    async fn update(&self, visa: &VisaApplication) -> StoreResult<()> {
        sqlx::query(
            "UPDATE visa_applications SET visa_type = $2, destination = $3, travel_date = $4, \
             passport_number = $5, nationality = $6, status = $7 WHERE id = $1",
        )
        .bind(visa.id)
        .bind(&visa.visa_type)
        .bind(&visa.destination)
        .bind(visa.travel_date)
        .bind(visa.passport_number.inner())
        .bind(&visa.nationality)
        .bind(visa.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("update visa application", e))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM visa_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("delete visa application", e))?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<VisaApplication>> {
        let rows = sqlx::query_as::<_, VisaRow>(&format!(
            "SELECT {COLUMNS} FROM visa_applications ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list visa applications", e))?;
        rows.into_iter()
            .map(|r| r.into_visa("list visa applications"))
            .collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> StoreResult<Vec<VisaApplication>> {
        let rows = sqlx::query_as::<_, VisaRow>(&format!(
            "SELECT {COLUMNS} FROM visa_applications WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list visa applications by user", e))?;
        rows.into_iter()
            .map(|r| r.into_visa("list visa applications by user"))
            .collect()
    }

    async fn list_by_status(&self, status: VisaStatus) -> StoreResult<Vec<VisaApplication>> {
        let rows = sqlx::query_as::<_, VisaRow>(&format!(
            "SELECT {COLUMNS} FROM visa_applications WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list visa applications by status", e))?;
        rows.into_iter()
            .map(|r| r.into_visa("list visa applications by status"))
            .collect()
    }

    async fn list_by_destination(&self, destination: &str) -> StoreResult<Vec<VisaApplication>> {
        let rows = sqlx::query_as::<_, VisaRow>(&format!(
            "SELECT {COLUMNS} FROM visa_applications WHERE destination = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(destination)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list visa applications by destination", e))?;
        rows.into_iter()
            .map(|r| r.into_visa("list visa applications by destination"))
            .collect()
    }
}
