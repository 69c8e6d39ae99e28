use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::bus::{self, BusStatus};
use crate::error::{AppError, AppResult};
use crate::reservations::availability::{self, SeatMap};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchBusesRequest {
    pub from: String,
    pub to: String,
    pub date: String,
}

/// Bus row plus how many seats are still free, as shown in listings
#[derive(Debug, Serialize)]
pub struct BusListing {
    #[serde(flatten)]
    pub bus: bus::Model,
    pub available_seat_count: i32,
}

#[derive(Debug, Serialize)]
pub struct BusesResponse {
    pub buses: Vec<BusListing>,
}

#[derive(Debug, Serialize)]
pub struct BusResponse {
    pub bus: bus::Model,
}

/// List all active buses, soonest departure first
pub async fn list_buses(State(state): State<AppState>) -> AppResult<Json<BusesResponse>> {
    let buses = bus::Entity::find()
        .filter(bus::Column::Status.eq(BusStatus::Active))
        .order_by_asc(bus::Column::DepartureTime)
        .all(&state.db)
        .await?;

    let buses = with_counts(&state.db, buses).await?;
    Ok(Json(BusesResponse { buses }))
}

/// Search active buses on a route departing on a given calendar day (UTC)
pub async fn search_buses(
    State(state): State<AppState>,
    Json(payload): Json<SearchBusesRequest>,
) -> AppResult<Json<BusesResponse>> {
    if payload.from.trim().is_empty()
        || payload.to.trim().is_empty()
        || payload.date.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "From, to, and date are required".to_string(),
        ));
    }

    let (day_start, day_end) = day_bounds(&payload.date)?;

    let buses = bus::Entity::find()
        .filter(bus::Column::FromLocation.eq(payload.from.trim()))
        .filter(bus::Column::ToLocation.eq(payload.to.trim()))
        .filter(bus::Column::DepartureTime.gte(day_start))
        .filter(bus::Column::DepartureTime.lt(day_end))
        .filter(bus::Column::Status.eq(BusStatus::Active))
        .order_by_asc(bus::Column::DepartureTime)
        .all(&state.db)
        .await?;

    let buses = with_counts(&state.db, buses).await?;
    Ok(Json(BusesResponse { buses }))
}

/// Fetch one active bus
pub async fn get_bus(
    State(state): State<AppState>,
    Path(bus_id): Path<Uuid>,
) -> AppResult<Json<BusResponse>> {
    let bus = bus::Entity::find_by_id(bus_id)
        .filter(bus::Column::Status.eq(BusStatus::Active))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    Ok(Json(BusResponse { bus }))
}

/// Seat map for a bus, for the seat picker
pub async fn get_bus_seats(
    State(state): State<AppState>,
    Path(bus_id): Path<Uuid>,
) -> AppResult<Json<SeatMap>> {
    let bus = bus::Entity::find_by_id(bus_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Bus not found".to_string()))?;

    let seat_map = availability::seat_map(&state.db, &bus).await?;
    Ok(Json(seat_map))
}

async fn with_counts(
    db: &DatabaseConnection,
    buses: Vec<bus::Model>,
) -> AppResult<Vec<BusListing>> {
    let mut listings = Vec::with_capacity(buses.len());
    for bus in buses {
        let available_seat_count = availability::available_seat_count(db, &bus).await?;
        listings.push(BusListing {
            bus,
            available_seat_count,
        });
    }
    Ok(listings)
}

/// Half-open UTC range covering one calendar day
fn day_bounds(date: &str) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest("Date must be formatted as YYYY-MM-DD".to_string()))?;

    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    Ok((start, start + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_cover_twenty_four_hours() {
        let (start, end) = day_bounds("2026-03-14").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-03-14T00:00:00+00:00");
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn day_bounds_reject_garbage() {
        assert!(day_bounds("14-03-2026").is_err());
        assert!(day_bounds("2026-13-40").is_err());
        assert!(day_bounds("tomorrow").is_err());
    }

    #[test]
    fn day_bounds_trim_whitespace() {
        assert!(day_bounds(" 2026-03-14 ").is_ok());
    }
}
