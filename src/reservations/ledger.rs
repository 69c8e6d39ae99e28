use std::collections::HashSet;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::bus::{self, BusStatus};
use crate::reservations::ReservationError;

/// Everything the ledger needs to record a claim. Built by the lifecycle
/// manager after input validation; `amount` is the price at claim time.
pub struct SeatClaim<'a> {
    pub user_id: Uuid,
    pub seat_number: i32,
    pub passenger_name: &'a str,
    pub passenger_phone: &'a str,
    pub amount: Decimal,
}

/// Atomically claim a seat on a bus by inserting the confirmed booking row.
///
/// The check-and-claim is a single INSERT: the partial unique index on
/// (bus_id, seat_number) over confirmed rows serializes concurrent claims
/// for the same seat, so the loser gets a unique violation and no row.
/// No availability read gates this write.
pub async fn claim_seat(
    db: &DatabaseConnection,
    bus: &bus::Model,
    claim: SeatClaim<'_>,
) -> Result<booking::Model, ReservationError> {
    check_claimable(bus, claim.seat_number)?;

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(claim.user_id),
        bus_id: Set(bus.id),
        seat_number: Set(claim.seat_number),
        passenger_name: Set(claim.passenger_name.to_string()),
        passenger_phone: Set(claim.passenger_phone.to_string()),
        amount: Set(claim.amount),
        status: Set(BookingStatus::Confirmed),
        ..Default::default()
    };

    match new_booking.insert(db).await {
        Ok(model) => Ok(model),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(ReservationError::SeatTaken {
                seat: claim.seat_number,
            }),
            _ => Err(err.into()),
        },
    }
}

/// Release the seat held by a confirmed booking by marking it cancelled.
///
/// The transition is a compare-and-set on status, so of two concurrent
/// releases exactly one flips the row; the other reports `AlreadyCancelled`.
pub async fn release_seat(
    db: &DatabaseConnection,
    booking_id: Uuid,
) -> Result<(), ReservationError> {
    let released = booking::Entity::update_many()
        .col_expr(booking::Column::Status, BookingStatus::Cancelled.as_enum())
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .exec(db)
        .await?;

    if released.rows_affected == 1 {
        return Ok(());
    }

    // Zero rows updated: unknown id or already terminal. Look again to
    // report which.
    match booking::Entity::find_by_id(booking_id).one(db).await? {
        Some(_) => Err(ReservationError::AlreadyCancelled),
        None => Err(ReservationError::BookingNotFound),
    }
}

/// Seat numbers on a bus currently held by a confirmed booking, ascending.
pub async fn booked_seats(
    db: &DatabaseConnection,
    bus_id: Uuid,
) -> Result<Vec<i32>, ReservationError> {
    let bookings = booking::Entity::find()
        .filter(booking::Column::BusId.eq(bus_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .order_by_asc(booking::Column::SeatNumber)
        .all(db)
        .await?;

    Ok(bookings.into_iter().map(|b| b.seat_number).collect())
}

/// Seats with no confirmed booking, ascending. Recomputed from current
/// state on every call.
pub async fn list_available_seats(
    db: &DatabaseConnection,
    bus: &bus::Model,
) -> Result<Vec<i32>, ReservationError> {
    let taken = booked_seats(db, bus.id).await?;
    Ok(free_seats(bus.total_seats, &taken))
}

fn check_claimable(bus: &bus::Model, seat_number: i32) -> Result<(), ReservationError> {
    if seat_number < 1 || seat_number > bus.total_seats {
        return Err(ReservationError::InvalidSeat {
            seat: seat_number,
            total_seats: bus.total_seats,
        });
    }

    if bus.status != BusStatus::Active {
        return Err(ReservationError::BusUnavailable);
    }

    Ok(())
}

/// Complement of `taken` over 1..=total_seats, ascending.
pub(crate) fn free_seats(total_seats: i32, taken: &[i32]) -> Vec<i32> {
    let taken: HashSet<i32> = taken.iter().copied().collect();
    (1..=total_seats).filter(|s| !taken.contains(s)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;

    fn test_bus(total_seats: i32, status: BusStatus) -> bus::Model {
        bus::Model {
            id: Uuid::new_v4(),
            bus_number: "KA-101".to_string(),
            from_location: "Springfield".to_string(),
            to_location: "Shelbyville".to_string(),
            departure_time: Utc::now().into(),
            arrival_time: Utc::now().into(),
            total_seats,
            price: dec!(500.00),
            status,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn seat_zero_and_negative_are_rejected() {
        let bus = test_bus(40, BusStatus::Active);
        assert!(matches!(
            check_claimable(&bus, 0),
            Err(ReservationError::InvalidSeat { seat: 0, total_seats: 40 })
        ));
        assert!(matches!(
            check_claimable(&bus, -3),
            Err(ReservationError::InvalidSeat { seat: -3, .. })
        ));
    }

    #[test]
    fn seat_above_capacity_is_rejected() {
        let bus = test_bus(40, BusStatus::Active);
        assert!(matches!(
            check_claimable(&bus, 41),
            Err(ReservationError::InvalidSeat { seat: 41, total_seats: 40 })
        ));
    }

    #[test]
    fn boundary_seats_are_claimable() {
        let bus = test_bus(40, BusStatus::Active);
        assert!(check_claimable(&bus, 1).is_ok());
        assert!(check_claimable(&bus, 40).is_ok());
    }

    #[test]
    fn inactive_bus_is_not_claimable() {
        let bus = test_bus(40, BusStatus::Inactive);
        assert!(matches!(
            check_claimable(&bus, 12),
            Err(ReservationError::BusUnavailable)
        ));
    }

    #[test]
    fn free_seats_is_the_complement_of_taken() {
        assert_eq!(free_seats(5, &[2, 4]), vec![1, 3, 5]);
        assert_eq!(free_seats(3, &[]), vec![1, 2, 3]);
        assert_eq!(free_seats(3, &[1, 2, 3]), Vec::<i32>::new());
    }

    #[test]
    fn free_seats_of_empty_bus_is_empty() {
        assert_eq!(free_seats(0, &[]), Vec::<i32>::new());
    }
}
