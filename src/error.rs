use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::reservations::ReservationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::InvalidSeat { .. } | ReservationError::Validation(_) => {
                AppError::BadRequest(err.to_string())
            }
            ReservationError::BusNotFound => AppError::NotFound("Bus not found".to_string()),
            ReservationError::BusUnavailable => {
                AppError::NotFound("Bus is not open for booking".to_string())
            }
            ReservationError::BookingNotFound => {
                AppError::NotFound("Booking not found".to_string())
            }
            ReservationError::SeatTaken { .. } => AppError::Conflict(err.to_string()),
            ReservationError::AlreadyCancelled => {
                AppError::Conflict("Booking is already cancelled".to_string())
            }
            ReservationError::Db(db_err) => AppError::Database(db_err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({ "message": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_conflict_maps_to_conflict() {
        let err: AppError = ReservationError::SeatTaken { seat: 12 }.into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn already_cancelled_maps_to_conflict() {
        let err: AppError = ReservationError::AlreadyCancelled.into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn bus_and_booking_lookups_map_to_not_found() {
        assert!(matches!(
            AppError::from(ReservationError::BusNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(ReservationError::BusUnavailable),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(ReservationError::BookingNotFound),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn validation_failures_map_to_bad_request() {
        assert!(matches!(
            AppError::from(ReservationError::Validation("passenger name")),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(ReservationError::InvalidSeat { seat: 0, total_seats: 40 }),
            AppError::BadRequest(_)
        ));
    }
}
