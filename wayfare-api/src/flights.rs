use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use wayfare_core::flight::{CabinClass, Flight};
use wayfare_core::repository::PriceOrder;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListFlightsQuery {
    pub sort: Option<String>,
    pub class: Option<String>,
    pub direct: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct FlightBookingRequest {
    pub flight_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct BookingStatusResponse {
    pub flight_id: Uuid,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct UpsertFlightRequest {
    pub airline: String,
    pub origin: String,
    pub destination: String,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub city: String,
    pub price_cents: i32,
    pub cabin_class: CabinClass,
    pub direct: bool,
    pub seats_available: i32,
}

impl UpsertFlightRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.city.trim().is_empty() {
            return Err(AppError::ValidationError("flight city is required".to_string()));
        }
        if self.airline.trim().is_empty() {
            return Err(AppError::ValidationError("airline is required".to_string()));
        }
        if self.price_cents <= 0 {
            return Err(AppError::ValidationError(
                "flight price must be greater than 0".to_string(),
            ));
        }
        if self.seats_available < 0 {
            return Err(AppError::ValidationError(
                "seats available cannot be negative".to_string(),
            ));
        }
        if self.arrival <= self.departure {
            return Err(AppError::ValidationError(
                "arrival must be after departure".to_string(),
            ));
        }
        Ok(())
    }

    fn into_flight(self, id: Uuid) -> Flight {
        Flight {
            id,
            airline: self.airline,
            origin: self.origin,
            destination: self.destination,
            departure: self.departure,
            arrival: self.arrival,
            city: self.city,
            price_cents: self.price_cents,
            cabin_class: self.cabin_class,
            direct: self.direct,
            seats_available: self.seats_available,
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights))
        .route("/flights/{id}", get(get_flight))
        .route("/flights/city/{city}", get(list_flights_by_city))
        .route("/flights/date/{date}", get(list_flights_by_date))
}

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/flights/book", post(book_flight))
        .route("/flights/cancel", post(cancel_flight))
        .route("/flights/user/{user_id}", get(list_flights_for_user))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/flights", post(create_flight))
        .route("/flights/{id}", put(update_flight).delete(delete_flight))
}

// ============================================================================
// Public Handlers
// ============================================================================

async fn list_flights(
    State(state): State<AppState>,
    Query(query): Query<ListFlightsQuery>,
) -> Result<Json<Vec<Flight>>, AppError> {
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
        return Ok(Json(state.flights.list_sorted_by_price(order).await?));
    }

    if let Some(class) = query.class.as_deref() {
        let class = CabinClass::parse(class).ok_or_else(|| {
            AppError::ValidationError(
                "invalid flight class. Must be economy, business, or first".to_string(),
            )
        })?;
        return Ok(Json(state.flights.list_by_class(class).await?));
    }

    if let Some(direct) = query.direct {
        return Ok(Json(state.flights.list_direct(direct).await?));
    }

    Ok(Json(state.flights.list().await?))
}

async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flight>, AppError> {
    let flight = state
        .flights
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("flight not found".to_string()))?;
    Ok(Json(flight))
}

async fn list_flights_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<Vec<Flight>>, AppError> {
    if city.trim().is_empty() {
        return Err(AppError::ValidationError("city is required".to_string()));
    }
    Ok(Json(state.flights.list_by_city(&city).await?))
}

async fn list_flights_by_date(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Flight>>, AppError> {
    Ok(Json(state.flights.list_by_departure_date(date).await?))
}

// ============================================================================
// Booking Handlers
// ============================================================================

async fn book_flight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<FlightBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    state.flight_bookings.book(user.id, req.flight_id).await?;
    Ok(Json(BookingStatusResponse {
        flight_id: req.flight_id,
        status: "booked",
    }))
}

async fn cancel_flight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<FlightBookingRequest>,
) -> Result<Json<BookingStatusResponse>, AppError> {
    state.flight_bookings.cancel(user.id, req.flight_id).await?;
    Ok(Json(BookingStatusResponse {
        flight_id: req.flight_id,
        status: "cancelled",
    }))
}

async fn list_flights_for_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Flight>>, AppError> {
    if !auth_user.can_act_for(user_id) {
        return Err(AppError::AuthorizationError(
            "cannot access another user's bookings".to_string(),
        ));
    }
    Ok(Json(state.flights.list_booked_by_user(user_id).await?))
}

// ============================================================================
// Admin Handlers
// ============================================================================

async fn create_flight(
    State(state): State<AppState>,
    Json(req): Json<UpsertFlightRequest>,
) -> Result<Json<Flight>, AppError> {
    req.validate()?;
    let flight = req.into_flight(Uuid::new_v4());
    state.flights.create(&flight).await?;
    tracing::info!(flight_id = %flight.id, "flight created");
    Ok(Json(flight))
}

async fn update_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpsertFlightRequest>,
) -> Result<Json<Flight>, AppError> {
    req.validate()?;
    state
        .flights
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("flight not found".to_string()))?;
    let flight = req.into_flight(id);
    state.flights.update(&flight).await?;
    Ok(Json(flight))
}

async fn delete_flight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .flights
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("flight not found".to_string()))?;
    state.flights.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
