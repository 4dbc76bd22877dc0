use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub booking_rules: BookingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Operational knobs for the booking core. Defaults match the documented
/// behavior: 10-minute seat holds, flat mock pricing, 24h..1h check-in window.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_seat_hold_minutes")]
    pub seat_hold_minutes: i64,
    #[serde(default = "default_ticket_price")]
    pub ticket_price: f64,
    #[serde(default = "default_checkin_opens_hours")]
    pub checkin_opens_hours: i64,
    #[serde(default = "default_checkin_closes_hours")]
    pub checkin_closes_hours: i64,
}

fn default_seat_hold_minutes() -> i64 {
    10
}

fn default_ticket_price() -> f64 {
    100.0
}

fn default_checkin_opens_hours() -> i64 {
    24
}

fn default_checkin_closes_hours() -> i64 {
    1
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            seat_hold_minutes: default_seat_hold_minutes(),
            ticket_price: default_ticket_price(),
            checkin_opens_hours: default_checkin_opens_hours(),
            checkin_closes_hours: default_checkin_closes_hours(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of AERIX)
            // Eg.. `AERIX__SERVER__PORT=9090` would set `server.port`
            .add_source(config::Environment::with_prefix("AERIX").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
