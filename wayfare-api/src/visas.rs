use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use wayfare_core::visa::{VisaApplication, VisaStatus};
use wayfare_shared::Masked;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateVisaRequest {
    pub visa_type: String,
    pub destination: String,
    pub travel_date: NaiveDate,
    pub passport_number: String,
    pub nationality: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVisaRequest {
    pub visa_type: Option<String>,
    pub destination: Option<String>,
    pub travel_date: Option<NaiveDate>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VisaStatsResponse {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

fn validate_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    if trimmed.len() < min || trimmed.len() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

impl CreateVisaRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_length("visa type", &self.visa_type, 2, 50)?;
        validate_length("destination", &self.destination, 2, 100)?;
        validate_length("nationality", &self.nationality, 2, 50)?;
        validate_length("passport number", &self.passport_number, 6, 20)?;
        Ok(())
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/visas", post(create_visa))
        .route("/visas/{id}", get(get_visa).put(update_visa).delete(delete_visa))
        .route("/visas/user/{user_id}", get(list_visas_for_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/visas", get(list_visas))
        .route("/visas/pending", get(list_pending))
        .route("/visas/approved", get(list_approved))
        .route("/visas/rejected", get(list_rejected))
        .route("/visas/stats", get(visa_stats))
        .route("/visas/{id}/approve", post(approve_visa))
        .route("/visas/{id}/reject", post(reject_visa))
}

// ============================================================================
// Applicant Handlers
// ============================================================================

async fn create_visa(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateVisaRequest>,
) -> Result<Json<VisaApplication>, AppError> {
    req.validate()?;

    let visa = VisaApplication {
        id: Uuid::new_v4(),
        user_id: user.id,
        visa_type: req.visa_type.trim().to_string(),
        destination: req.destination.trim().to_string(),
        travel_date: req.travel_date,
        passport_number: Masked(req.passport_number.trim().to_string()),
        nationality: req.nationality.trim().to_string(),
        status: VisaStatus::Pending,
        created_at: Utc::now(),
    };
    state.visas.create(&visa).await?;

    tracing::info!(visa_id = %visa.id, user_id = %user.id, "visa application submitted");
    Ok(Json(visa))
}

async fn get_visa(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisaApplication>, AppError> {
    let visa = state
        .visas
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("visa application not found".to_string()))?;
    if !auth_user.can_act_for(visa.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's visa application".to_string(),
        ));
    }
    Ok(Json(visa))
}

async fn list_visas_for_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<VisaApplication>>, AppError> {
    if !auth_user.can_act_for(user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's visa applications".to_string(),
        ));
    }
    Ok(Json(state.visas.list_by_user(user_id).await?))
}

async fn update_visa(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVisaRequest>,
) -> Result<Json<VisaApplication>, AppError> {
    let mut visa = state
        .visas
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("visa application not found".to_string()))?;
    if !auth_user.can_act_for(visa.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot modify another user's visa application".to_string(),
        ));
    }
    visa.ensure_editable()?;

    if let Some(visa_type) = req.visa_type {
        validate_length("visa type", &visa_type, 2, 50)?;
        visa.visa_type = visa_type.trim().to_string();
    }
    if let Some(destination) = req.destination {
        validate_length("destination", &destination, 2, 100)?;
        visa.destination = destination.trim().to_string();
    }
    if let Some(nationality) = req.nationality {
        validate_length("nationality", &nationality, 2, 50)?;
        visa.nationality = nationality.trim().to_string();
    }
    if let Some(passport_number) = req.passport_number {
        validate_length("passport number", &passport_number, 6, 20)?;
        visa.passport_number = Masked(passport_number.trim().to_string());
    }
    if let Some(travel_date) = req.travel_date {
        visa.travel_date = travel_date;
    }

    state.visas.update(&visa).await?;
    Ok(Json(visa))
}

async fn delete_visa(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let visa = state
        .visas
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("visa application not found".to_string()))?;
    if !auth_user.can_act_for(visa.user_id) {
        return Err(AppError::AuthorizationError(
            "cannot delete another user's visa application".to_string(),
        ));
    }
    visa.ensure_deletable()?;
    state.visas.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ============================================================================
// Admin Handlers
// ============================================================================

async fn list_visas(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisaApplication>>, AppError> {
    Ok(Json(state.visas.list().await?))
}

async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisaApplication>>, AppError> {
    Ok(Json(state.visas.list_by_status(VisaStatus::Pending).await?))
}

async fn list_approved(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisaApplication>>, AppError> {
    Ok(Json(state.visas.list_by_status(VisaStatus::Approved).await?))
}

async fn list_rejected(
    State(state): State<AppState>,
) -> Result<Json<Vec<VisaApplication>>, AppError> {
    Ok(Json(state.visas.list_by_status(VisaStatus::Rejected).await?))
}

async fn visa_stats(
    State(state): State<AppState>,
) -> Result<Json<VisaStatsResponse>, AppError> {
    let visas = state.visas.list().await?;
    let mut stats = VisaStatsResponse {
        total: visas.len(),
        pending: 0,
        approved: 0,
        rejected: 0,
    };
    for visa in &visas {
        match visa.status {
            VisaStatus::Pending => stats.pending += 1,
            VisaStatus::Approved => stats.approved += 1,
            VisaStatus::Rejected => stats.rejected += 1,
        }
    }
    Ok(Json(stats))
}

async fn approve_visa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisaApplication>, AppError> {
    let mut visa = state
        .visas
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("visa application not found".to_string()))?;
    visa.approve()?;
    state.visas.update(&visa).await?;
    tracing::info!(visa_id = %visa.id, "visa application approved");
    Ok(Json(visa))
}

async fn reject_visa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisaApplication>, AppError> {
    let mut visa = state
        .visas
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("visa application not found".to_string()))?;
    visa.reject()?;
    state.visas.update(&visa).await?;
    tracing::info!(visa_id = %visa.id, "visa application rejected");
    Ok(Json(visa))
}
