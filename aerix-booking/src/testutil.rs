//! Shared fixtures for engine tests: an in-memory database seeded with two
//! passengers (with profiles), one profileless user, and a two-seat flight.

use aerix_core::model::{BookingStatus, FlightStatus, SeatTemplate};
use aerix_core::principal::Role;
use aerix_store::directory_repo::{NewAirplane, NewFlight};
use aerix_store::profile_repo::{NewUser, ProfileData};
use aerix_store::{DbClient, DirectoryRepository, ProfileRepository};
use chrono::{DateTime, Duration, Utc};

pub struct Fixture {
    pub db: DbClient,
    pub now: DateTime<Utc>,
    pub passenger: i64,
    pub profile: i64,
    pub passenger2: i64,
    pub profile2: i64,
    /// A passenger without a profile.
    pub bare_user: i64,
    pub origin: i64,
    pub destination: i64,
    pub airplane: i64,
    /// Two-seat flight departing 48h after `now`.
    pub flight: i64,
}

async fn seed_user(
    db: &DbClient,
    username: &str,
    role: Role,
    now: DateTime<Utc>,
) -> i64 {
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
            phone: None,
            passport_number: Some("P1234567".to_string()),
            nationality: Some("USA".to_string()),
            date_of_birth: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed() -> Fixture {
    let db = DbClient::new("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();

    let now = Utc::now();

    let passenger = seed_user(&db, "alice", Role::Passenger, now).await;
    let profile = seed_profile(&db, passenger, "Alice Tan").await;
    let passenger2 = seed_user(&db, "bob", Role::Passenger, now).await;
    let profile2 = seed_profile(&db, passenger2, "Bob Iyer").await;
    let bare_user = seed_user(&db, "carol", Role::Passenger, now).await;

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
            model: "Embraer E175".to_string(),
            registration_number: "N990AX".to_string(),
            seat_template: SeatTemplate {
                rows: 1,
                seats_per_row: 2,
                layout: "1-1".to_string(),
            },
            total_seats: 2,
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
            scheduled_arrival: now + Duration::hours(53),
            gate: Some("A1".to_string()),
            terminal: Some("1".to_string()),
            status: FlightStatus::Scheduled,
        },
        now,
    )
    .await
    .unwrap()
    .id;

    drop(conn);

    Fixture {
        db,
        now,
        passenger,
        profile,
        passenger2,
        profile2,
        bare_user,
        origin,
        destination,
        airplane,
        flight,
    }
}

/// Add another flight on the fixture's route/airplane with the given
/// departure time.
pub async fn add_flight(fx: &Fixture, number: &str, departure: DateTime<Utc>) -> i64 {
    let mut conn = fx.db.pool.acquire().await.unwrap();
    DirectoryRepository::insert_flight(
        &mut conn,
        &NewFlight {
            flight_number: number.to_string(),
            origin_id: fx.origin,
            destination_id: fx.destination,
            airplane_id: fx.airplane,
            scheduled_departure: departure,
            scheduled_arrival: departure + Duration::hours(5),
            gate: None,
            terminal: None,
            status: FlightStatus::Scheduled,
        },
        fx.now,
    )
    .await
    .unwrap()
    .id
}

pub async fn booking_status(db: &DbClient, booking_id: i64) -> BookingStatus {
    let (status,): (String,) = sqlx::query_as("SELECT status FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_one(&db.pool)
        .await
        .unwrap();
    status.parse().unwrap()
}

pub async fn booking_count(db: &DbClient) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    count
}

pub async fn ticket_count(db: &DbClient) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets")
        .fetch_one(&db.pool)
        .await
        .unwrap();
    count
}
