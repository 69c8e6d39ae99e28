use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::bus::{self, BusStatus};
use crate::reservations::ledger::{self, SeatClaim};
use crate::reservations::ReservationError;

/// Validated input for one booking attempt.
pub struct NewBooking {
    pub bus_id: Uuid,
    pub seat_number: i32,
    pub passenger_name: String,
    pub passenger_phone: String,
}

/// Create a confirmed booking for `user_id`.
///
/// Passenger fields are checked before any storage access. The claim and the
/// booking persist are the same INSERT, so a lost seat race leaves no partial
/// record behind. The charged amount is the bus price at this instant and is
/// never re-derived.
pub async fn create_booking(
    db: &DatabaseConnection,
    user_id: Uuid,
    new_booking: NewBooking,
) -> Result<booking::Model, ReservationError> {
    let passenger_name = new_booking.passenger_name.trim();
    if passenger_name.is_empty() {
        return Err(ReservationError::Validation("passenger name"));
    }

    let passenger_phone = new_booking.passenger_phone.trim();
    if passenger_phone.is_empty() {
        return Err(ReservationError::Validation("passenger phone"));
    }

    // A missing bus and an inactive one look the same to the caller.
    let bus = bus::Entity::find_by_id(new_booking.bus_id)
        .filter(bus::Column::Status.eq(BusStatus::Active))
        .one(db)
        .await?
        .ok_or(ReservationError::BusNotFound)?;

    ledger::claim_seat(
        db,
        &bus,
        SeatClaim {
            user_id,
            seat_number: new_booking.seat_number,
            passenger_name,
            passenger_phone,
            amount: bus.price,
        },
    )
    .await
}

/// Cancel a booking owned by `requesting_user_id`. Cancellation is terminal;
/// the seat goes back to the ledger. Whether the id is unknown or belongs to
/// someone else is deliberately not distinguishable from the result.
pub async fn cancel_booking(
    db: &DatabaseConnection,
    booking_id: Uuid,
    requesting_user_id: Uuid,
) -> Result<(), ReservationError> {
    let booking = booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(requesting_user_id))
        .one(db)
        .await?
        .ok_or(ReservationError::BookingNotFound)?;

    if booking.status == BookingStatus::Cancelled {
        return Err(ReservationError::AlreadyCancelled);
    }

    ledger::release_seat(db, booking.id).await
}

/// Fetch one booking, scoped to its owner.
pub async fn get_booking(
    db: &DatabaseConnection,
    booking_id: Uuid,
    requesting_user_id: Uuid,
) -> Result<booking::Model, ReservationError> {
    booking::Entity::find_by_id(booking_id)
        .filter(booking::Column::UserId.eq(requesting_user_id))
        .one(db)
        .await?
        .ok_or(ReservationError::BookingNotFound)
}

/// All bookings of a user, newest first.
pub async fn bookings_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<booking::Model>, ReservationError> {
    Ok(booking::Entity::find()
        .filter(booking::Column::UserId.eq(user_id))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn test_bus(id: Uuid, total_seats: i32) -> bus::Model {
        bus::Model {
            id,
            bus_number: "KA-101".to_string(),
            from_location: "Springfield".to_string(),
            to_location: "Shelbyville".to_string(),
            departure_time: Utc::now().into(),
            arrival_time: Utc::now().into(),
            total_seats,
            price: dec!(500.00),
            status: BusStatus::Active,
            created_at: Utc::now().into(),
        }
    }

    fn test_booking(user_id: Uuid, bus_id: Uuid, status: BookingStatus) -> booking::Model {
        booking::Model {
            id: Uuid::new_v4(),
            user_id,
            bus_id,
            seat_number: 12,
            passenger_name: "Alice".to_string(),
            passenger_phone: "555-0001".to_string(),
            amount: dec!(500.00),
            status,
            created_at: Utc::now().into(),
        }
    }

    fn request(bus_id: Uuid, name: &str, phone: &str) -> NewBooking {
        NewBooking {
            bus_id,
            seat_number: 12,
            passenger_name: name.to_string(),
            passenger_phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_passenger_name_fails_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = create_booking(&db, Uuid::new_v4(), request(Uuid::new_v4(), "  ", "555-0001"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReservationError::Validation("passenger name")));
    }

    #[tokio::test]
    async fn empty_passenger_phone_fails_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = create_booking(&db, Uuid::new_v4(), request(Uuid::new_v4(), "Alice", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, ReservationError::Validation("passenger phone")));
    }

    #[tokio::test]
    async fn unknown_bus_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<bus::Model>::new()])
            .into_connection();

        let err = create_booking(&db, Uuid::new_v4(), request(Uuid::new_v4(), "Alice", "555-0001"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReservationError::BusNotFound));
    }

    #[tokio::test]
    async fn successful_booking_copies_the_bus_price() {
        let user_id = Uuid::new_v4();
        let bus_id = Uuid::new_v4();
        let bus = test_bus(bus_id, 40);
        let stored = test_booking(user_id, bus_id, BookingStatus::Confirmed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![bus.clone()]])
            .append_query_results([vec![stored.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let created = create_booking(&db, user_id, request(bus_id, "Alice", "555-0001"))
            .await
            .unwrap();

        assert_eq!(created.amount, bus.price);
        assert_eq!(created.status, BookingStatus::Confirmed);
        assert_eq!(created.seat_number, 12);
    }

    #[tokio::test]
    async fn out_of_range_seat_is_rejected_without_insert() {
        let bus_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![test_bus(bus_id, 10)]])
            .into_connection();

        let mut req = request(bus_id, "Alice", "555-0001");
        req.seat_number = 11;

        let err = create_booking(&db, Uuid::new_v4(), req).await.unwrap_err();

        assert!(matches!(
            err,
            ReservationError::InvalidSeat { seat: 11, total_seats: 10 }
        ));
    }

    #[tokio::test]
    async fn missing_booking_maps_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<booking::Model>::new()])
            .into_connection();

        let err = get_booking(&db, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ReservationError::BookingNotFound));
    }

    #[tokio::test]
    async fn cancel_of_cancelled_booking_is_rejected_without_update() {
        let user_id = Uuid::new_v4();
        let cancelled = test_booking(user_id, Uuid::new_v4(), BookingStatus::Cancelled);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![cancelled.clone()]])
            .into_connection();

        let err = cancel_booking(&db, cancelled.id, user_id).await.unwrap_err();

        assert!(matches!(err, ReservationError::AlreadyCancelled));
    }

    #[tokio::test]
    async fn cancel_releases_a_confirmed_booking() {
        let user_id = Uuid::new_v4();
        let confirmed = test_booking(user_id, Uuid::new_v4(), BookingStatus::Confirmed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![confirmed.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        assert!(cancel_booking(&db, confirmed.id, user_id).await.is_ok());
    }

    #[tokio::test]
    async fn cancel_losing_the_release_race_reports_already_cancelled() {
        let user_id = Uuid::new_v4();
        let confirmed = test_booking(user_id, Uuid::new_v4(), BookingStatus::Confirmed);
        let mut flipped = confirmed.clone();
        flipped.status = BookingStatus::Cancelled;

        // The ownership fetch still sees a confirmed row, but the CAS update
        // affects zero rows because a concurrent cancel got there first.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![confirmed.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![flipped]])
            .into_connection();

        let err = cancel_booking(&db, confirmed.id, user_id).await.unwrap_err();

        assert!(matches!(err, ReservationError::AlreadyCancelled));
    }
}
