use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use wayfare_core::hotel::Hotel;
use wayfare_core::repository::PriceOrder;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListHotelsQuery {
    pub sort: Option<String>,
    pub free_cancellation: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct HotelBookingRequest {
    pub hotel_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BookingStatusResponse {
    pub hotel_id: Uuid,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UpsertHotelRequest {
    pub name: String,
    pub city: String,
    pub address: String,
    #[serde(default)]
    pub description: String,
    pub price_per_night_cents: i32,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub free_cancellation: bool,
    pub available_rooms: i32,
}

impl UpsertHotelRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError("hotel name is required".to_string()));
        }
        if self.city.trim().is_empty() {
            return Err(AppError::ValidationError("hotel city is required".to_string()));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::ValidationError("hotel address is required".to_string()));
        }
        if self.price_per_night_cents <= 0 {
            return Err(AppError::ValidationError(
                "price per night must be greater than 0".to_string(),
            ));
        }
        if self.available_rooms < 0 {
            return Err(AppError::ValidationError(
                "available rooms cannot be negative".to_string(),
            ));
        }
        if self.check_out_date <= self.check_in_date {
            return Err(AppError::ValidationError(
                "check-out must be after check-in".to_string(),
            ));
        }
        Ok(())
    }

    fn into_hotel(self, id: Uuid) -> Hotel {
        Hotel {
            id,
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

// ============================================================================
// Routes
// ============================================================================

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/hotels", get(list_hotels))
        .route("/hotels/{id}", get(get_hotel))
        .route("/hotels/city/{city}", get(list_hotels_by_city))
        .route("/hotels/checkin/{date}", get(list_hotels_by_check_in))
        .route("/hotels/checkout/{date}", get(list_hotels_by_check_out))
}

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/hotels/book", post(book_hotel))
        .route("/hotels/cancel", post(cancel_hotel))
        .route("/hotels/user/{user_id}", get(list_hotels_for_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/hotels", post(create_hotel))
        .route("/hotels/{id}", put(update_hotel).delete(delete_hotel))
}

// ============================================================================
// Public Handlers
// ============================================================================

async fn list_hotels(
    State(state): State<AppState>,
    Query(query): Query<ListHotelsQuery>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    if let Some(sort) = query.sort.as_deref() {
        let order = match sort {
            "price_asc" => PriceOrder::LowToHigh,
            "price_desc" => PriceOrder::HighToLow,
            other => {
                return Err(AppError::ValidationError(format!(
                    "unknown sort option '{other}'"
                )))
            }
        };
        return Ok(Json(state.hotels.list_sorted_by_price(order).await?));
    }

    if let Some(free) = query.free_cancellation {
        return Ok(Json(state.hotels.list_free_cancellation(free).await?));
    }

    Ok(Json(state.hotels.list().await?))
}

async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, AppError> {
    let hotel = state
        .hotels
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("hotel not found".to_string()))?;
    Ok(Json(hotel))
}

async fn list_hotels_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    if city.trim().is_empty() {
        return Err(AppError::ValidationError("city is required".to_string()));
    }
    Ok(Json(state.hotels.list_by_city(&city).await?))
}

async fn list_hotels_by_check_in(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    Ok(Json(state.hotels.list_by_check_in(date).await?))
}

async fn list_hotels_by_check_out(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    Ok(Json(state.hotels.list_by_check_out(date).await?))
}

// ============================================================================
// Booking Handlers
// ============================================================================

async fn book_hotel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<HotelBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    state.hotel_bookings.book(user.id, req.hotel_id).await?;
    Ok(Json(BookingStatusResponse {
        hotel_id: req.hotel_id,
        status: "booked",
    }))
}

async fn cancel_hotel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<HotelBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    state.hotel_bookings.cancel(user.id, req.hotel_id).await?;
    Ok(Json(BookingStatusResponse {
        hotel_id: req.hotel_id,
        status: "cancelled",
    }))
}

async fn list_hotels_for_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Hotel>>, AppError> {
    if !auth_user.can_act_for(user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's bookings".to_string(),
        ));
    }
    Ok(Json(state.hotels.list_booked_by_user(user_id).await?))
}

// ============================================================================
// Admin Handlers
// ============================================================================

async fn create_hotel(
    State(state): State<AppState>,
    Json(req): Json<UpsertHotelRequest>,
) -> Result<Json<Hotel>, AppError> {
    req.validate()?;
    let hotel = req.into_hotel(Uuid::new_v4());
    state.hotels.create(&hotel).await?;
    tracing::info!(hotel_id = %hotel.id, "hotel created");
    Ok(Json(hotel))
}

async fn update_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertHotelRequest>,
) -> Result<Json<Hotel>, AppError> {
    req.validate()?;
    state
        .hotels
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("hotel not found".to_string()))?;
    let hotel = req.into_hotel(id);
    state.hotels.update(&hotel).await?;
    Ok(Json(hotel))
}

async fn delete_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .hotels
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("hotel not found".to_string()))?;
    state.hotels.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
