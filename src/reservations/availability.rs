use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::bus;
use crate::reservations::{ledger, ReservationError};

/// Seat-picker view of one bus. Display only: booking decisions go through
/// the ledger claim, which re-checks occupancy at write time.
#[derive(Debug, Serialize)]
pub struct SeatMap {
    pub available_seats: Vec<i32>,
    pub booked_seats: Vec<i32>,
    pub total_seats: i32,
}

pub async fn seat_map(
    db: &DatabaseConnection,
    bus: &bus::Model,
) -> Result<SeatMap, ReservationError> {
    let booked_seats = ledger::booked_seats(db, bus.id).await?;
    let available_seats = ledger::free_seats(bus.total_seats, &booked_seats);

    Ok(SeatMap {
        available_seats,
        booked_seats,
        total_seats: bus.total_seats,
    })
}

/// Count of free seats, reported next to bus metadata in listings.
pub async fn available_seat_count(
    db: &DatabaseConnection,
    bus: &bus::Model,
) -> Result<i32, ReservationError> {
    let booked = booking::Entity::find()
        .filter(booking::Column::BusId.eq(bus.id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .count(db)
        .await?;

    // Confirmed seats are unique per bus and range-checked at claim time,
    // so the count never exceeds total_seats.
    Ok(bus.total_seats - booked as i32)
}
