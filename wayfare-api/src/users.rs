use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{is_valid_email, validate_name, validate_password, UserResponse};
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use wayfare_core::user::Role;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/users/{id}/password", post(change_password))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/role/{role}", get(list_users_by_role))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    if !auth_user.can_act_for(id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's account".to_string(),
        ));
    }
    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;
    Ok(Json(user.into()))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if !auth_user.can_act_for(id) {
        return Err(AppError::AuthorizationError(
            "cannot modify another user's account".to_string(),
        ));
    }

    let mut user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;

    if let Some(name) = req.name {
        validate_name(&name)?;
        user.name = name.trim().to_string();
    }

    if let Some(email) = req.email {
        if email != user.email {
            if !is_valid_email(&email) {
                return Err(AppError::ValidationError("invalid email format".to_string()));
            }
            if state.users.email_exists(&email).await? {
                return Err(AppError::ConflictError("email already registered".to_string()));
            }
            user.email = email;
        }
    }

    if let Some(password) = req.password {
        validate_password(&password)?;
        user.password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {}", e)))?;
    }

    state.users.update(&user).await?;
    Ok(Json(user.into()))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !auth_user.can_act_for(id) {
        return Err(AppError::AuthorizationError(
            "cannot delete another user's account".to_string(),
        ));
    }
    state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;
    state.users.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    // Password changes require knowing the old secret, so no admin override.
    if auth_user.id != id {
        return Err(AppError::AuthorizationError(
            "cannot change another user's password".to_string(),
        ));
    }
    validate_password(&req.new_password)?;

    let mut user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("user not found".to_string()))?;

    let valid = bcrypt::verify(&req.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("password verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::AuthenticationError(
            "old password is incorrect".to_string(),
        ));
    }

    user.password_hash = bcrypt::hash(&req.new_password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("failed to hash password: {}", e)))?;
    state.users.update(&user).await?;

    Ok(Json(serde_json::json!({ "updated": id })))
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

async fn list_users_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let role = Role::parse(&role).ok_or_else(|| {
        AppError::ValidationError("invalid role. Must be 'user' or 'admin'".to_string())
    })?;
    let users = state.users.list_by_role(role).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
