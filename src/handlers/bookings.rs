use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::entities::bus;
use crate::error::{AppError, AppResult};
use crate::handlers::MessageResponse;
use crate::reservations::lifecycle::{self, NewBooking};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub bus_id: Uuid,
    pub seat_number: i32,
    pub passenger_name: String,
    pub passenger_phone: String,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub message: String,
    pub booking: booking::Model,
}

/// Booking row joined with the route and schedule of its bus
#[derive(Debug, Serialize)]
pub struct BookingDetail {
    pub id: Uuid,
    pub bus_id: Uuid,
    pub seat_number: i32,
    pub passenger_name: String,
    pub passenger_phone: String,
    pub amount: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub bus_number: String,
    pub from_location: String,
    pub to_location: String,
    pub departure_time: DateTimeWithTimeZone,
    pub arrival_time: DateTimeWithTimeZone,
}

impl BookingDetail {
    fn new(booking: booking::Model, bus: &bus::Model) -> Self {
        Self {
            id: booking.id,
            bus_id: booking.bus_id,
            seat_number: booking.seat_number,
            passenger_name: booking.passenger_name,
            passenger_phone: booking.passenger_phone,
            amount: booking.amount,
            status: booking.status,
            created_at: booking.created_at,
            bus_number: bus.bus_number.clone(),
            from_location: bus.from_location.clone(),
            to_location: bus.to_location.clone(),
            departure_time: bus.departure_time,
            arrival_time: bus.arrival_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<BookingDetail>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: BookingDetail,
}

/// Book a seat on a bus
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<CreateBookingResponse>)> {
    let booking = lifecycle::create_booking(
        &state.db,
        claims.sub,
        NewBooking {
            bus_id: payload.bus_id,
            seat_number: payload.seat_number,
            passenger_name: payload.passenger_name,
            passenger_phone: payload.passenger_phone,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            message: "Booking created successfully".to_string(),
            booking,
        }),
    ))
}

/// List the authenticated user's bookings, newest first
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<BookingsResponse>> {
    let bookings = lifecycle::bookings_for_user(&state.db, claims.sub).await?;

    let bus_ids: Vec<Uuid> = bookings.iter().map(|b| b.bus_id).collect();
    let buses: HashMap<Uuid, bus::Model> = bus::Entity::find()
        .filter(bus::Column::Id.is_in(bus_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let bookings = bookings
        .into_iter()
        .filter_map(|b| {
            let bus = buses.get(&b.bus_id)?;
            Some(BookingDetail::new(b, bus))
        })
        .collect();

    Ok(Json(BookingsResponse { bookings }))
}

/// Fetch one of the authenticated user's bookings
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingResponse>> {
    let booking = lifecycle::get_booking(&state.db, booking_id, claims.sub).await?;

    let bus = bus::Entity::find_by_id(booking.bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Bus record missing for booking".to_string()))?;

    Ok(Json(BookingResponse {
        booking: BookingDetail::new(booking, &bus),
    }))
}

/// Cancel one of the authenticated user's bookings
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    lifecycle::cancel_booking(&state.db, booking_id, claims.sub).await?;
    Ok(Json(MessageResponse::new("Booking cancelled successfully")))
}
