use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};

use crate::handlers::{auth, bookings, buses, MessageResponse};
use crate::middleware::auth::auth_middleware;
use crate::middleware::rate_limit::{create_auth_governor, create_public_governor};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_governor = create_public_governor();
    let auth_governor = create_auth_governor();

    // Credential endpoints get the stricter per-IP limiter
    let credential_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_governor);

    // Profile endpoints (requires auth)
    let profile_routes = Router::new()
        .route("/profile", get(auth::get_profile))
        .route("/profile", put(auth::update_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Bus catalogue is public: browsing and seat maps need no account
    let bus_routes = Router::new()
        .route("/", get(buses::list_buses))
        .route("/search", post(buses::search_buses))
        .route("/{id}", get(buses::get_bus))
        .route("/{id}/seats", get(buses::get_bus_seats))
        .layer(public_governor.clone());

    // Booking routes (requires auth)
    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/", get(bookings::my_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .layer(public_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", credential_routes.merge(profile_routes))
        .nest("/api/buses", bus_routes)
        .nest("/api/bookings", booking_routes)
        .fallback(not_found)
        .with_state(state)
}

async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new("Bus ticket API is running"))
}

async fn not_found() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::new("Route not found")),
    )
}
