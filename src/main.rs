use std::net::SocketAddr;

use axum::middleware;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use bus_ticket_backend::{
    config::Config,
    db,
    entities::bus::{self, BusStatus},
    middleware::rate_limit::log_request,
    routes,
    utils::mailer::Mailer,
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bus_ticket_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    // Seed sample routes if the bus table is empty
    seed_buses(&db).await;

    // Create app state
    let mailer = Mailer::from_config(&config);
    let state = AppState {
        db,
        config: config.clone(),
        mailer,
    };

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(log_request));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Seed a few active buses so a fresh database is browsable
async fn seed_buses(db: &sea_orm::DatabaseConnection) {
    let existing = bus::Entity::find()
        .one(db)
        .await
        .expect("Failed to check for buses");

    if existing.is_some() {
        return;
    }

    let routes = [
        ("BUS-101", "Mumbai", "Pune", 1, 40, Decimal::new(50000, 2)),
        ("BUS-205", "Delhi", "Jaipur", 1, 36, Decimal::new(65000, 2)),
        ("BUS-310", "Bangalore", "Chennai", 2, 44, Decimal::new(80000, 2)),
    ];

    for (bus_number, from, to, days_ahead, total_seats, price) in routes {
        let departure = (Utc::now() + Duration::days(days_ahead)).fixed_offset();
        let bus = bus::ActiveModel {
            id: Set(Uuid::new_v4()),
            bus_number: Set(bus_number.to_string()),
            from_location: Set(from.to_string()),
            to_location: Set(to.to_string()),
            departure_time: Set(departure),
            arrival_time: Set(departure + Duration::hours(4)),
            total_seats: Set(total_seats),
            price: Set(price),
            status: Set(BusStatus::Active),
            ..Default::default()
        };

        bus.insert(db).await.expect("Failed to seed bus");
    }

    tracing::info!("Seeded {} sample buses", routes.len());
}
