use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use wayfare_core::support::{SupportTicket, TicketStatus};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
    pub status: Option<String>,
}

fn validate_subject(subject: &str) -> Result<(), AppError> {
    let trimmed = subject.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("ticket subject is required".to_string()));
    }
    if trimmed.len() < 5 {
        return Err(AppError::ValidationError(
            "ticket subject must be at least 5 characters".to_string(),
        ));
    }
    if trimmed.len() > 200 {
        return Err(AppError::ValidationError(
            "ticket subject must not exceed 200 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<(), AppError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError("ticket message is required".to_string()));
    }
    if trimmed.len() < 10 {
        return Err(AppError::ValidationError(
            "ticket message must be at least 10 characters".to_string(),
        ));
    }
    if trimmed.len() > 2000 {
        return Err(AppError::ValidationError(
            "ticket message must not exceed 2000 characters".to_string(),
        ));
    }
    Ok(())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/support", post(create_ticket))
        .route(
            "/support/{id}",
            get(get_ticket).put(update_ticket).delete(delete_ticket),
        )
        .route("/support/user/{user_id}", get(list_tickets_for_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/support", get(list_tickets))
}

async fn create_ticket(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Json<SupportTicket>, AppError> {
    validate_subject(&req.subject)?;
    validate_message(&req.message)?;

    let ticket = SupportTicket {
        id: Uuid::new_v4(),
        user_id: user.id,
        subject: req.subject.trim().to_string(),
        message: req.message.trim().to_string(),
        status: TicketStatus::Open,
        created_at: Utc::now(),
    };
    state.support.create(&ticket).await?;
    Ok(Json(ticket))
}

async fn get_ticket(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupportTicket>, AppError> {
    let ticket = state
        .support
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("ticket not found".to_string()))?;
    if !auth_user.can_act_for(ticket.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's ticket".to_string(),
        ));
    }
    Ok(Json(ticket))
}

async fn list_tickets_for_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<SupportTicket>>, AppError> {
    if !auth_user.can_act_for(user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's tickets".to_string(),
        ));
    }
    Ok(Json(state.support.list_by_user(user_id).await?))
}

async fn update_ticket(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<SupportTicket>, AppError> {
    let mut ticket = state
        .support
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("ticket not found".to_string()))?;
    if !auth_user.can_act_for(ticket.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot modify another user's ticket".to_string(),
        ));
    }

    if let Some(subject) = req.subject {
        validate_subject(&subject)?;
        ticket.subject = subject.trim().to_string();
    }
    if let Some(message) = req.message {
        validate_message(&message)?;
        ticket.message = message.trim().to_string();
    }
    if let Some(status) = req.status {
        let next = TicketStatus::parse(&status).ok_or_else(|| {
            AppError::ValidationError(
                "invalid ticket status. Must be: open, in_progress, resolved, or closed"
                    .to_string(),
            )
        })?;
        if !ticket.status.can_transition_to(next) {
            return Err(AppError::ConflictError(
                "cannot reopen a closed ticket".to_string(),
            ));
        }
        ticket.status = next;
    }

    state.support.update(&ticket).await?;
    Ok(Json(ticket))
}

async fn delete_ticket(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let ticket = state
        .support
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("ticket not found".to_string()))?;
    if !auth_user.can_act_for(ticket.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot delete another user's ticket".to_string(),
        ));
    }
    state.support.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn list_tickets(
    State(state): State<AppState>,
) -> Result<Json<Vec<SupportTicket>>, AppError> {
    Ok(Json(state.support.list().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_and_message_bounds() {
        assert!(validate_subject("Helppp").is_ok());
        assert!(validate_subject("Hi").is_err());
        assert!(validate_subject(&"s".repeat(201)).is_err());
        assert!(validate_message("My booking is stuck").is_ok());
        assert!(validate_message("too short").is_err());
        assert!(validate_message(&"m".repeat(2001)).is_err());
    }
}
