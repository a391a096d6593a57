use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use wayfare_booking::BookingError;
use wayfare_core::error::StoreError;
use wayfare_core::visa::VisaError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(op = err.operation(), error = %err, "storage failure");
        Self::InternalServerError(err.to_string())
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::InvalidInput(_) => Self::ValidationError(message),
            BookingError::NotFound { .. } => Self::NotFoundError(message),
            BookingError::CapacityExhausted { .. }
            | BookingError::DuplicateBooking { .. }
            | BookingError::NoActiveBooking { .. }
            | BookingError::CancellationNotAllowed { .. } => Self::ConflictError(message),
            BookingError::Storage(inner) => inner.into(),
        }
    }
}

impl From<VisaError> for AppError {
    fn from(err: VisaError) -> Self {
        Self::ConflictError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wayfare_core::reservation::InventoryKind;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn booking_errors_map_to_transport_codes() {
        assert_eq!(
            status_of(BookingError::InvalidInput("user").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(
                BookingError::NotFound {
                    kind: InventoryKind::Flight,
                    id: Uuid::new_v4(),
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                BookingError::CapacityExhausted {
                    kind: InventoryKind::Hotel,
                    id: Uuid::new_v4(),
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                BookingError::Storage(StoreError::corrupt("op", "bad row")).into()
            ),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_errors_hide_details_from_the_caller() {
        let response = AppError::from(StoreError::corrupt("get flight by id", "boom"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
