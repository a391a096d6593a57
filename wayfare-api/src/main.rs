use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wayfare_api::{
    app,
    state::{AppState, AuthConfig},
};
use wayfare_booking::BookingEngine;
use wayfare_store::{
    PgFlightInventory, PgFlightStore, PgHotelInventory, PgHotelStore, PgSupportStore,
    PgUserStore, PgVisaStore,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = wayfare_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Wayfare API on port {}", config.server.port);

    let db = wayfare_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let pool = db.pool.clone();
    let app_state = AppState {
        users: Arc::new(PgUserStore::new(pool.clone())),
        flights: Arc::new(PgFlightStore::new(pool.clone())),
        hotels: Arc::new(PgHotelStore::new(pool.clone())),
        visas: Arc::new(PgVisaStore::new(pool.clone())),
        support: Arc::new(PgSupportStore::new(pool.clone())),
        flight_bookings: Arc::new(BookingEngine::new(PgFlightInventory::new(pool.clone()))),
        hotel_bookings: Arc::new(BookingEngine::new(PgHotelInventory::new(pool))),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
