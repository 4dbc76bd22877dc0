use aerix_core::model::{
    Airplane, Airport, Announcement, AnnouncementType, Flight, FlightStatus, SeatTemplate,
};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::StoreError;

pub struct NewAirplane {
    pub model: String,
    pub registration_number: String,
    pub seat_template: SeatTemplate,
    pub total_seats: i64,
}

pub struct NewFlight {
    pub flight_number: String,
    pub origin_id: i64,
    pub destination_id: i64,
    pub airplane_id: i64,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: FlightStatus,
}

/// Optional filters applied by the flight search. Codes are resolved to
/// airport ids by the caller; an unresolved code leaves its filter unset.
#[derive(Debug, Default)]
pub struct FlightFilters {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
    pub departs_from: Option<DateTime<Utc>>,
    pub departs_until: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: i64,
    code: String,
    name: String,
    city: String,
    country: String,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            code: row.code,
            name: row.name,
            city: row.city,
            country: row.country,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AirplaneRow {
    id: i64,
    model: String,
    registration_number: String,
    seat_template: String,
    total_seats: i64,
}

impl TryFrom<AirplaneRow> for Airplane {
    type Error = StoreError;

    fn try_from(row: AirplaneRow) -> Result<Self, Self::Error> {
        Ok(Airplane {
            id: row.id,
            model: row.model,
            registration_number: row.registration_number,
            seat_template: serde_json::from_str(&row.seat_template)?,
            total_seats: row.total_seats,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    id: i64,
    flight_number: String,
    origin_id: i64,
    destination_id: i64,
    airplane_id: i64,
    scheduled_departure: DateTime<Utc>,
    scheduled_arrival: DateTime<Utc>,
    gate: Option<String>,
    terminal: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FlightRow> for Flight {
    type Error = StoreError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        Ok(Flight {
            id: row.id,
            flight_number: row.flight_number,
            origin_id: row.origin_id,
            destination_id: row.destination_id,
            airplane_id: row.airplane_id,
            scheduled_departure: row.scheduled_departure,
            scheduled_arrival: row.scheduled_arrival,
            gate: row.gate,
            terminal: row.terminal,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AnnouncementRow {
    id: i64,
    flight_id: i64,
    announcement_type: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AnnouncementRow> for Announcement {
    type Error = StoreError;

    fn try_from(row: AnnouncementRow) -> Result<Self, Self::Error> {
        Ok(Announcement {
            id: row.id,
            flight_id: row.flight_id,
            announcement_type: row.announcement_type.parse()?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

pub struct DirectoryRepository;

impl DirectoryRepository {
    pub async fn insert_airport(
        conn: &mut SqliteConnection,
        code: &str,
        name: &str,
        city: &str,
        country: &str,
    ) -> Result<Airport, StoreError> {
        let result = sqlx::query(
            "INSERT INTO airports (code, name, city, country) VALUES (?, ?, ?, ?)",
        )
        .bind(code)
        .bind(name)
        .bind(city)
        .bind(country)
        .execute(&mut *conn)
        .await?;

        Ok(Airport {
            id: result.last_insert_rowid(),
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
        })
    }

    pub async fn airport_by_code(
        conn: &mut SqliteConnection,
        code: &str,
    ) -> Result<Option<Airport>, StoreError> {
        let row = sqlx::query_as::<_, AirportRow>(
            "SELECT id, code, name, city, country FROM airports WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Airport::from))
    }

    pub async fn airport_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Airport>, StoreError> {
        let row = sqlx::query_as::<_, AirportRow>(
            "SELECT id, code, name, city, country FROM airports WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Airport::from))
    }

    pub async fn insert_airplane(
        conn: &mut SqliteConnection,
        airplane: &NewAirplane,
    ) -> Result<Airplane, StoreError> {
        let template = serde_json::to_string(&airplane.seat_template)?;
        let result = sqlx::query(
            "INSERT INTO airplanes (model, registration_number, seat_template, total_seats) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&airplane.model)
        .bind(&airplane.registration_number)
        .bind(&template)
        .bind(airplane.total_seats)
        .execute(&mut *conn)
        .await?;

        Ok(Airplane {
            id: result.last_insert_rowid(),
            model: airplane.model.clone(),
            registration_number: airplane.registration_number.clone(),
            seat_template: airplane.seat_template.clone(),
            total_seats: airplane.total_seats,
        })
    }

    pub async fn list_airplanes(conn: &mut SqliteConnection) -> Result<Vec<Airplane>, StoreError> {
        let rows = sqlx::query_as::<_, AirplaneRow>(
            "SELECT id, model, registration_number, seat_template, total_seats FROM airplanes",
        )
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(Airplane::try_from).collect()
    }

    pub async fn airplane_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Airplane>, StoreError> {
        let row = sqlx::query_as::<_, AirplaneRow>(
            "SELECT id, model, registration_number, seat_template, total_seats \
             FROM airplanes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Airplane::try_from).transpose()
    }

    pub async fn insert_flight(
        conn: &mut SqliteConnection,
        flight: &NewFlight,
        now: DateTime<Utc>,
    ) -> Result<Flight, StoreError> {
        let result = sqlx::query(
            "INSERT INTO flights (flight_number, origin_id, destination_id, airplane_id, \
             scheduled_departure, scheduled_arrival, gate, terminal, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&flight.flight_number)
        .bind(flight.origin_id)
        .bind(flight.destination_id)
        .bind(flight.airplane_id)
        .bind(flight.scheduled_departure)
        .bind(flight.scheduled_arrival)
        .bind(&flight.gate)
        .bind(&flight.terminal)
        .bind(flight.status.as_str())
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Flight {
            id: result.last_insert_rowid(),
            flight_number: flight.flight_number.clone(),
            origin_id: flight.origin_id,
            destination_id: flight.destination_id,
            airplane_id: flight.airplane_id,
            scheduled_departure: flight.scheduled_departure,
            scheduled_arrival: flight.scheduled_arrival,
            gate: flight.gate.clone(),
            terminal: flight.terminal.clone(),
            status: flight.status,
            created_at: now,
        })
    }

    pub async fn flight_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Flight>, StoreError> {
        let row = sqlx::query_as::<_, FlightRow>("SELECT * FROM flights WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(Flight::try_from).transpose()
    }

    pub async fn list_flights(conn: &mut SqliteConnection) -> Result<Vec<Flight>, StoreError> {
        let rows = sqlx::query_as::<_, FlightRow>("SELECT * FROM flights")
            .fetch_all(&mut *conn)
            .await?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    pub async fn search_flights(
        conn: &mut SqliteConnection,
        filters: &FlightFilters,
    ) -> Result<Vec<Flight>, StoreError> {
        let rows = sqlx::query_as::<_, FlightRow>(
            "SELECT * FROM flights \
             WHERE (?1 IS NULL OR origin_id = ?1) \
               AND (?2 IS NULL OR destination_id = ?2) \
               AND (?3 IS NULL OR scheduled_departure >= ?3) \
               AND (?4 IS NULL OR scheduled_departure < ?4)",
        )
        .bind(filters.origin_id)
        .bind(filters.destination_id)
        .bind(filters.departs_from)
        .bind(filters.departs_until)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    /// Overwrite the mutable columns of a flight with the given state.
    pub async fn update_flight(
        conn: &mut SqliteConnection,
        flight: &Flight,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE flights SET origin_id = ?, destination_id = ?, airplane_id = ?, \
             scheduled_departure = ?, scheduled_arrival = ?, gate = ?, terminal = ?, status = ? \
             WHERE id = ?",
        )
        .bind(flight.origin_id)
        .bind(flight.destination_id)
        .bind(flight.airplane_id)
        .bind(flight.scheduled_departure)
        .bind(flight.scheduled_arrival)
        .bind(&flight.gate)
        .bind(&flight.terminal)
        .bind(flight.status.as_str())
        .bind(flight.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn insert_announcement(
        conn: &mut SqliteConnection,
        flight_id: i64,
        announcement_type: AnnouncementType,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Announcement, StoreError> {
        let result = sqlx::query(
            "INSERT INTO announcements (flight_id, announcement_type, message, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(flight_id)
        .bind(announcement_type.as_str())
        .bind(message)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Announcement {
            id: result.last_insert_rowid(),
            flight_id,
            announcement_type,
            message: message.to_string(),
            created_at: now,
        })
    }

    /// Announcements for any of the given flights, newest first.
    pub async fn announcements_for_flights(
        conn: &mut SqliteConnection,
        flight_ids: &[i64],
    ) -> Result<Vec<Announcement>, StoreError> {
        if flight_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; flight_ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM announcements WHERE flight_id IN ({}) ORDER BY created_at DESC",
            placeholders
        );

        let mut query = sqlx::query_as::<_, AnnouncementRow>(&sql);
        for &id in flight_ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&mut *conn).await?;
        rows.into_iter().map(Announcement::try_from).collect()
    }
}
