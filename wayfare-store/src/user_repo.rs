use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use wayfare_core::error::{StoreError, StoreResult};
use wayfare_core::repository::UserStore;
use wayfare_core::user::{Role, User};

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, op: &'static str) -> StoreResult<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::corrupt(op, format!("unknown role '{}'", self.role)))?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

const COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("create user", e))?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get user by id", e))?;
        row.map(|r| r.into_user("get user by id")).transpose()
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::backend("get user by email", e))?;
        row.map(|r| r.into_user("get user by email")).transpose()
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::backend("check email exists", e))?;
        Ok(count > 0)
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role = $5 \
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::backend("update user", e))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::backend("delete user", e))?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list users", e))?;
        rows.into_iter().map(|r| r.into_user("list users")).collect()
    }

    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY created_at"
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::backend("list users by role", e))?;
        rows.into_iter()
            .map(|r| r.into_user("list users by role"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_unknown_role_is_corrupt() {
        let row = UserRow {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "root".to_string(),
            created_at: Utc::now(),
        };
        let err = row.into_user("get user by id").unwrap_err();
        assert_eq!(err.operation(), "get user by id");
    }
}
