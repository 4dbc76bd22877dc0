#![allow(dead_code)]

use aerix_api::middleware::auth::Claims;
use aerix_api::{app, state::AuthConfig, AppState};
use aerix_booking::{BookingEngine, CheckInIssuer, PaymentRecorder};
use aerix_core::model::{FlightStatus, SeatTemplate};
use aerix_core::payment::MockCardGateway;
use aerix_core::principal::Role;
use aerix_directory::FlightDirectory;
use aerix_store::app_config::BookingRules;
use aerix_store::directory_repo::{NewAirplane, NewFlight};
use aerix_store::profile_repo::{NewUser, ProfileData};
use aerix_store::{DbClient, DirectoryRepository, ProfileRepository};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-only-secret";

pub struct TestApp {
    pub app: Router,
    pub db: DbClient,
    pub now: DateTime<Utc>,
    pub passenger: i64,
    pub profile: i64,
    pub passenger2: i64,
    pub profile2: i64,
    /// Passenger without a profile.
    pub bare_passenger: i64,
    pub staff: i64,
    pub origin: i64,
    pub destination: i64,
    pub airplane: i64,
    /// Six-seat flight departing 48h after `now`.
    pub flight: i64,
    /// Return leg departing 72h after `now`.
    pub return_flight: i64,
}

async fn seed_user(db: &DbClient, username: &str, role: Role, now: DateTime<Utc>) -> i64 {
    let mut conn = db.pool.acquire().await.unwrap();
    ProfileRepository::insert_user(
        &mut conn,
        &NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            hashed_password: "not-a-real-hash".to_string(),
            role,
            is_active: true,
        },
        now,
    )
    .await
    .unwrap()
    .id
}

async fn seed_profile(db: &DbClient, user_id: i64, full_name: &str) -> i64 {
    let mut conn = db.pool.acquire().await.unwrap();
    ProfileRepository::upsert_profile(
        &mut conn,
        user_id,
        &ProfileData {
            full_name: full_name.to_string(),
            email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
            phone: Some("+1-555-0100".to_string()),
            passport_number: Some("P7654321".to_string()),
            nationality: Some("USA".to_string()),
            date_of_birth: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn spawn_app() -> TestApp {
    let db = DbClient::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();

    let now = Utc::now();

    let passenger = seed_user(&db, "alice", Role::Passenger, now).await;
    let profile = seed_profile(&db, passenger, "Alice Tan").await;
    let passenger2 = seed_user(&db, "bob", Role::Passenger, now).await;
    let profile2 = seed_profile(&db, passenger2, "Bob Iyer").await;
    let bare_passenger = seed_user(&db, "carol", Role::Passenger, now).await;
    let staff = seed_user(&db, "sam", Role::Staff, now).await;

    let mut conn = db.pool.acquire().await.unwrap();
    let origin = DirectoryRepository::insert_airport(
        &mut conn,
        "JFK",
        "John F. Kennedy International Airport",
        "New York",
        "USA",
    )
    .await
    .unwrap()
    .id;
    let destination = DirectoryRepository::insert_airport(
        &mut conn,
        "LAX",
        "Los Angeles International Airport",
        "Los Angeles",
        "USA",
    )
    .await
    .unwrap()
    .id;

    let airplane = DirectoryRepository::insert_airplane(
        &mut conn,
        &NewAirplane {
            model: "Boeing 737-800".to_string(),
            registration_number: "N123AX".to_string(),
            seat_template: SeatTemplate {
                rows: 2,
                seats_per_row: 3,
                layout: "3-3".to_string(),
            },
            total_seats: 6,
        },
    )
    .await
    .unwrap()
    .id;

    let flight = DirectoryRepository::insert_flight(
        &mut conn,
        &NewFlight {
            flight_number: "AX100".to_string(),
            origin_id: origin,
            destination_id: destination,
            airplane_id: airplane,
            scheduled_departure: now + Duration::hours(48),
            scheduled_arrival: now + Duration::hours(54),
            gate: Some("A1".to_string()),
            terminal: Some("1".to_string()),
            status: FlightStatus::Scheduled,
        },
        now,
    )
    .await
    .unwrap()
    .id;
    let return_flight = DirectoryRepository::insert_flight(
        &mut conn,
        &NewFlight {
            flight_number: "AX101".to_string(),
            origin_id: destination,
            destination_id: origin,
            airplane_id: airplane,
            scheduled_departure: now + Duration::hours(72),
            scheduled_arrival: now + Duration::hours(78),
            gate: None,
            terminal: None,
            status: FlightStatus::Scheduled,
        },
        now,
    )
    .await
    .unwrap()
    .id;
    drop(conn);

    let rules = BookingRules::default();
    let state = AppState {
        directory: FlightDirectory::new(db.clone()),
        bookings: BookingEngine::new(db.clone(), rules.clone()),
        payments: PaymentRecorder::new(db.clone(), rules.clone(), Arc::new(MockCardGateway)),
        checkin: CheckInIssuer::new(db.clone(), rules),
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            expiration: 3600,
        },
        db: db.clone(),
    };

    TestApp {
        app: app(state),
        db,
        now,
        passenger,
        profile,
        passenger2,
        profile2,
        bare_passenger,
        staff,
        origin,
        destination,
        airplane,
        flight,
        return_flight,
    }
}

impl TestApp {
    pub fn token_for(&self, user_id: i64) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            role: String::new(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    /// Add another flight on the seeded route with the given departure.
    pub async fn add_flight(&self, number: &str, departure: DateTime<Utc>) -> i64 {
        let mut conn = self.db.pool.acquire().await.unwrap();
        DirectoryRepository::insert_flight(
            &mut conn,
            &NewFlight {
                flight_number: number.to_string(),
                origin_id: self.origin,
                destination_id: self.destination,
                airplane_id: self.airplane,
                scheduled_departure: departure,
                scheduled_arrival: departure + Duration::hours(6),
                gate: Some("B2".to_string()),
                terminal: Some("2".to_string()),
                status: FlightStatus::Scheduled,
            },
            self.now,
        )
        .await
        .unwrap()
        .id
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }
}
