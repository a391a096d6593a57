use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::{AuthUser, Claims};
use crate::state::{AppState, AuthConfig};
use wayfare_core::user::{Role, User};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

// ============================================================================
// Validation helpers
// ============================================================================

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

pub fn validate_name(name: &str) -> Result<(), AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("name is required".to_string()));
    }
    if trimmed.len() < 2 {
        return Err(AppError::ValidationError(
            "name must be at least 2 characters".to_string(),
        ));
    }
    if trimmed.len() > 100 {
        return Err(AppError::ValidationError(
            "name must not exceed 100 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.trim().is_empty() {
        return Err(AppError::ValidationError("password is required".to_string()));
    }
    if password.len() < 8 {
        return Err(AppError::ValidationError(
            "password must be at least 8 characters".to_string(),
        ));
    }
    // bcrypt truncates past 72 bytes
    if password.len() > 72 {
        return Err(AppError::ValidationError(
            "password must not exceed 72 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

// ============================================================================
// Handlers
// ============================================================================

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_name(&req.name)?;
    if !is_valid_email(&req.email) {
        return Err(AppError::ValidationError("invalid email format".to_string()));
    }
    validate_password(&req.password)?;

    if state.users.email_exists(&req.email).await? {
        return Err(AppError::ConflictError("email already registered".to_string()));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {}", e)))?;

    let user = User {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        email: req.email,
        password_hash,
        role: Role::User,
        created_at: Utc::now(),
    };
    state.users.create(&user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(Json(user.into()))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "email and password are required".to_string(),
        ));
    }

    // A missing user and a bad password answer identically.
    let user = state
        .users
        .get_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("invalid email or password".to_string()))?;

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::AuthenticationError(
            "invalid email or password".to_string(),
        ));
    }

    let token = issue_token(&state.auth, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .get_by_id(auth_user.id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@nodot"));
        assert!(!is_valid_email("ada@.example.com"));
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough-password").is_ok());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("A").is_err());
        assert!(validate_name("Ada Lovelace").is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }
}
