use std::net::SocketAddr;
use std::sync::Arc;

use aerix_api::{app, state::AuthConfig, AppState};
use aerix_booking::{BookingEngine, CheckInIssuer, PaymentRecorder};
use aerix_core::payment::MockCardGateway;
use aerix_directory::FlightDirectory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aerix_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = aerix_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Aerix API on port {}", config.server.port);

    let db = aerix_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to open database");
    db.migrate().await.expect("Failed to run migrations");

    let gateway = Arc::new(MockCardGateway);
    let app_state = AppState {
        directory: FlightDirectory::new(db.clone()),
        bookings: BookingEngine::new(db.clone(), config.booking_rules.clone()),
        payments: PaymentRecorder::new(db.clone(), config.booking_rules.clone(), gateway),
        checkin: CheckInIssuer::new(db.clone(), config.booking_rules.clone()),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        db,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
