use aerix_core::model::{Booking, BookingStatus, Ticket};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use std::collections::HashSet;

use crate::error::StoreError;

/// Which side of "now" a trip listing looks at. Flights departing at exactly
/// the current instant fall into neither bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelWindow {
    Upcoming,
    Past,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    pnr: String,
    user_id: i64,
    flight_id: i64,
    status: String,
    seat_hold_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            pnr: row.pnr,
            user_id: row.user_id,
            flight_id: row.flight_id,
            status: row.status.parse()?,
            seat_hold_expires_at: row.seat_hold_expires_at,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: i64,
    ticket_number: String,
    booking_id: i64,
    passenger_profile_id: i64,
    seat_number: String,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            ticket_number: row.ticket_number,
            booking_id: row.booking_id,
            passenger_profile_id: row.passenger_profile_id,
            seat_number: row.seat_number,
        }
    }
}

pub struct BookingRepository;

impl BookingRepository {
    pub async fn insert_booking(
        conn: &mut SqliteConnection,
        pnr: &str,
        user_id: i64,
        flight_id: i64,
        hold_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        let result = sqlx::query(
            "INSERT INTO bookings (pnr, user_id, flight_id, status, seat_hold_expires_at, created_at) \
             VALUES (?, ?, ?, 'CREATED', ?, ?)",
        )
        .bind(pnr)
        .bind(user_id)
        .bind(flight_id)
        .bind(hold_expires_at)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Booking {
            id: result.last_insert_rowid(),
            pnr: pnr.to_string(),
            user_id,
            flight_id,
            status: BookingStatus::Created,
            seat_hold_expires_at: Some(hold_expires_at),
            created_at: now,
        })
    }

    pub async fn booking_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    pub async fn pnr_exists(conn: &mut SqliteConnection, pnr: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM bookings WHERE pnr = ?")
            .bind(pnr)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }

    pub async fn ticket_number_exists(
        conn: &mut SqliteConnection,
        ticket_number: &str,
    ) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tickets WHERE ticket_number = ?")
            .bind(ticket_number)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.is_some())
    }

    pub async fn insert_ticket(
        conn: &mut SqliteConnection,
        ticket_number: &str,
        booking_id: i64,
        passenger_profile_id: i64,
        seat_number: &str,
    ) -> Result<Ticket, StoreError> {
        let result = sqlx::query(
            "INSERT INTO tickets (ticket_number, booking_id, passenger_profile_id, seat_number) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(ticket_number)
        .bind(booking_id)
        .bind(passenger_profile_id)
        .bind(seat_number)
        .execute(&mut *conn)
        .await?;

        Ok(Ticket {
            id: result.last_insert_rowid(),
            ticket_number: ticket_number.to_string(),
            booking_id,
            passenger_profile_id,
            seat_number: seat_number.to_string(),
        })
    }

    pub async fn ticket_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Ticket>, StoreError> {
        let row = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(Ticket::from))
    }

    pub async fn tickets_for_booking(
        conn: &mut SqliteConnection,
        booking_id: i64,
    ) -> Result<Vec<Ticket>, StoreError> {
        let rows = sqlx::query_as::<_, TicketRow>("SELECT * FROM tickets WHERE booking_id = ?")
            .bind(booking_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(Ticket::from).collect())
    }

    pub async fn ticket_count(
        conn: &mut SqliteConnection,
        booking_id: i64,
    ) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tickets WHERE booking_id = ?")
                .bind(booking_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(count)
    }

    pub async fn set_status(
        conn: &mut SqliteConnection,
        booking_id: i64,
        status: BookingStatus,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(booking_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Transition every expired hold on the flight to CANCELLED. Returns the
    /// number of bookings swept.
    pub async fn sweep_expired_holds(
        conn: &mut SqliteConnection,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED' \
             WHERE flight_id = ? AND status = 'CREATED' AND seat_hold_expires_at < ?",
        )
        .bind(flight_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// The occupied seat set for a flight at `now`: seats of tickets whose
    /// booking is not CANCELLED and not a lapsed CREATED hold.
    pub async fn occupied_seats(
        conn: &mut SqliteConnection,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.seat_number FROM tickets t \
             JOIN bookings b ON b.id = t.booking_id \
             WHERE b.flight_id = ?1 \
               AND b.status != 'CANCELLED' \
               AND NOT (b.status = 'CREATED' AND b.seat_hold_expires_at < ?2)",
        )
        .bind(flight_id)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(|(seat,)| seat).collect())
    }

    /// Same as [`Self::occupied_seats`] but ignoring one ticket, for seat
    /// reassignment conflict checks.
    pub async fn occupied_seats_excluding_ticket(
        conn: &mut SqliteConnection,
        flight_id: i64,
        excluded_ticket_id: i64,
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.seat_number FROM tickets t \
             JOIN bookings b ON b.id = t.booking_id \
             WHERE b.flight_id = ?1 \
               AND t.id != ?2 \
               AND b.status != 'CANCELLED' \
               AND NOT (b.status = 'CREATED' AND b.seat_hold_expires_at < ?3)",
        )
        .bind(flight_id)
        .bind(excluded_ticket_id)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(|(seat,)| seat).collect())
    }

    pub async fn update_ticket_seat(
        conn: &mut SqliteConnection,
        ticket_id: i64,
        seat_number: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE tickets SET seat_number = ? WHERE id = ?")
            .bind(seat_number)
            .bind(ticket_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// A user's bookings whose flight departs strictly after (upcoming) or
    /// strictly before (past) `now`.
    pub async fn bookings_for_user(
        conn: &mut SqliteConnection,
        user_id: i64,
        window: TravelWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let sql = match window {
            TravelWindow::Upcoming => {
                "SELECT b.* FROM bookings b JOIN flights f ON f.id = b.flight_id \
                 WHERE b.user_id = ? AND f.scheduled_departure > ?"
            }
            TravelWindow::Past => {
                "SELECT b.* FROM bookings b JOIN flights f ON f.id = b.flight_id \
                 WHERE b.user_id = ? AND f.scheduled_departure < ?"
            }
        };

        let rows = sqlx::query_as::<_, BookingRow>(sql)
            .bind(user_id)
            .bind(now)
            .fetch_all(&mut *conn)
            .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    /// All bookings, optionally narrowed to one flight (staff listing).
    pub async fn list_bookings(
        conn: &mut SqliteConnection,
        flight_id: Option<i64>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE (?1 IS NULL OR flight_id = ?1)",
        )
        .bind(flight_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }
}
