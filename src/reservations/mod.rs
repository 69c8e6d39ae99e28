pub mod availability;
pub mod ledger;
pub mod lifecycle;

use sea_orm::DbErr;
use thiserror::Error;

/// Outcome of a seat-ledger or booking-lifecycle operation. A seat conflict
/// is a normal business outcome here, not a transient fault; nothing in this
/// module retries.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("seat {seat} is outside the valid range 1..={total_seats}")]
    InvalidSeat { seat: i32, total_seats: i32 },

    #[error("bus not found")]
    BusNotFound,

    #[error("bus is not open for booking")]
    BusUnavailable,

    #[error("seat {seat} is already booked")]
    SeatTaken { seat: i32 },

    #[error("booking not found")]
    BookingNotFound,

    #[error("booking is already cancelled")]
    AlreadyCancelled,

    #[error("{0} must not be empty")]
    Validation(&'static str),

    #[error(transparent)]
    Db(#[from] DbErr),
}
