use aerix_booking::{BookingEngine, CheckInIssuer, PaymentRecorder};
use aerix_directory::FlightDirectory;
use aerix_store::DbClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub directory: FlightDirectory,
    pub bookings: BookingEngine,
    pub payments: PaymentRecorder,
    pub checkin: CheckInIssuer,
    pub auth: AuthConfig,
}
