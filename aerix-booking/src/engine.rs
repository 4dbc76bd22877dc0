use aerix_core::ident::{self, CodeSpaceExhausted};
use aerix_core::model::{Booking, BookingStatus, Flight, Payment, Ticket};
use aerix_store::app_config::BookingRules;
use aerix_store::booking_repo::TravelWindow;
use aerix_store::{
    BookingRepository, DbClient, DirectoryRepository, PaymentRepository, ProfileRepository,
    StoreError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::selection;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Flight not found")]
    FlightNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Please complete your passenger profile before booking")]
    ProfileRequired,

    #[error("Seat {0} is already booked")]
    SeatTaken(String),

    #[error("Passenger profile {0} not found or does not belong to user")]
    ProfileNotOwned(i64),

    #[error("Not authorized to cancel this booking")]
    NotBookingOwner,

    #[error(transparent)]
    CodeSpace(#[from] CodeSpaceExhausted),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One requested `(passenger profile, seat)` pair of a booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatSelection {
    pub passenger_profile_id: i64,
    pub seat_number: String,
}

/// A booking joined with everything a trip listing needs.
#[derive(Debug, Serialize)]
pub struct TripView {
    pub booking: Booking,
    pub flight: Flight,
    pub tickets: Vec<Ticket>,
    pub payment: Option<Payment>,
}

/// The booking/hold state machine. Every mutation of bookings and tickets
/// goes through here.
#[derive(Clone)]
pub struct BookingEngine {
    db: DbClient,
    rules: BookingRules,
}

impl BookingEngine {
    pub fn new(db: DbClient, rules: BookingRules) -> Self {
        Self { db, rules }
    }

    /// Create a booking with a timed seat hold. The expiry sweep, occupancy
    /// check, and inserts all run inside one write transaction so concurrent
    /// requests cannot both observe a seat as free.
    pub async fn create_booking(
        &self,
        user_id: i64,
        flight_id: i64,
        selections: &[SeatSelection],
        now: DateTime<Utc>,
    ) -> Result<(Booking, Vec<Ticket>), BookingError> {
        let mut tx = self.db.pool.begin().await.map_err(StoreError::from)?;

        DirectoryRepository::flight_by_id(&mut tx, flight_id)
            .await?
            .ok_or(BookingError::FlightNotFound)?;

        ProfileRepository::profile_for_user(&mut tx, user_id)
            .await?
            .ok_or(BookingError::ProfileRequired)?;

        let swept = BookingRepository::sweep_expired_holds(&mut tx, flight_id, now).await?;
        if swept > 0 {
            tracing::debug!(flight_id, swept, "swept expired seat holds");
        }

        // Validate every pair before anything is persisted; claims accumulate
        // so one request cannot take the same seat twice.
        let mut occupied = BookingRepository::occupied_seats(&mut tx, flight_id, now).await?;
        for requested in selections {
            selection::claim(&mut occupied, &requested.seat_number)
                .map_err(|conflict| BookingError::SeatTaken(conflict.0))?;

            let owned = ProfileRepository::profile_belongs_to_user(
                &mut tx,
                requested.passenger_profile_id,
                user_id,
            )
            .await?;
            if !owned {
                return Err(BookingError::ProfileNotOwned(requested.passenger_profile_id));
            }
        }

        let pnr = Self::unique_pnr(&mut tx).await?;
        let hold_expires_at = now + Duration::minutes(self.rules.seat_hold_minutes);
        let booking =
            BookingRepository::insert_booking(&mut tx, &pnr, user_id, flight_id, hold_expires_at, now)
                .await?;

        let mut tickets = Vec::with_capacity(selections.len());
        for requested in selections {
            let ticket_number = Self::unique_ticket_number(&mut tx).await?;
            let ticket = BookingRepository::insert_ticket(
                &mut tx,
                &ticket_number,
                booking.id,
                requested.passenger_profile_id,
                &requested.seat_number,
            )
            .await?;
            tickets.push(ticket);
        }

        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(
            booking_id = booking.id,
            pnr = %booking.pnr,
            seats = tickets.len(),
            "booking created with seat hold"
        );

        Ok((booking, tickets))
    }

    /// Cancel a booking. Passing a requesting user enforces ownership; staff
    /// callers pass `None`. Cancelling an already-cancelled booking succeeds.
    pub async fn cancel_booking(
        &self,
        booking_id: i64,
        requesting_user: Option<i64>,
    ) -> Result<Booking, BookingError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let mut booking = BookingRepository::booking_by_id(&mut conn, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if let Some(user_id) = requesting_user {
            if booking.user_id != user_id {
                return Err(BookingError::NotBookingOwner);
            }
        }

        BookingRepository::set_status(&mut conn, booking_id, BookingStatus::Cancelled).await?;
        booking.status = BookingStatus::Cancelled;

        tracing::info!(booking_id, "booking cancelled");
        Ok(booking)
    }

    /// Trips for a user: upcoming means the flight departs strictly after
    /// `now`, past strictly before.
    pub async fn user_bookings(
        &self,
        user_id: i64,
        window: TravelWindow,
        now: DateTime<Utc>,
    ) -> Result<Vec<TripView>, BookingError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let bookings =
            BookingRepository::bookings_for_user(&mut conn, user_id, window, now).await?;
        Self::assemble_trips(&mut conn, bookings).await
    }

    /// Every booking, optionally narrowed to one flight (staff listing).
    pub async fn list_bookings(
        &self,
        flight_id: Option<i64>,
    ) -> Result<Vec<TripView>, BookingError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let bookings = BookingRepository::list_bookings(&mut conn, flight_id).await?;
        Self::assemble_trips(&mut conn, bookings).await
    }

    /// Move a ticket to a new seat after checking the seat is free among all
    /// other live tickets on the flight. Immediate and unconditional once the
    /// conflict check passes; no hold is involved.
    pub async fn reassign_seat(
        &self,
        booking_id: i64,
        ticket_id: i64,
        new_seat: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket, BookingError> {
        let mut tx = self.db.pool.begin().await.map_err(StoreError::from)?;

        let booking = BookingRepository::booking_by_id(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        let mut ticket = BookingRepository::ticket_by_id(&mut tx, ticket_id)
            .await?
            .filter(|ticket| ticket.booking_id == booking_id)
            .ok_or(BookingError::TicketNotFound)?;

        let occupied = BookingRepository::occupied_seats_excluding_ticket(
            &mut tx,
            booking.flight_id,
            ticket_id,
            now,
        )
        .await?;
        if occupied.contains(new_seat) {
            return Err(BookingError::SeatTaken(new_seat.to_string()));
        }

        BookingRepository::update_ticket_seat(&mut tx, ticket_id, new_seat).await?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(booking_id, ticket_id, seat = new_seat, "seat reassigned");

        ticket.seat_number = new_seat.to_string();
        Ok(ticket)
    }

    async fn assemble_trips(
        conn: &mut SqliteConnection,
        bookings: Vec<Booking>,
    ) -> Result<Vec<TripView>, BookingError> {
        let mut trips = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let flight = DirectoryRepository::flight_by_id(&mut *conn, booking.flight_id)
                .await?
                .ok_or_else(|| {
                    StoreError::Corrupt(format!("missing flight {}", booking.flight_id))
                })?;
            let tickets = BookingRepository::tickets_for_booking(&mut *conn, booking.id).await?;
            let payment = PaymentRepository::by_booking(&mut *conn, booking.id).await?;
            trips.push(TripView {
                booking,
                flight,
                tickets,
                payment,
            });
        }
        Ok(trips)
    }

    async fn unique_pnr(conn: &mut SqliteConnection) -> Result<String, BookingError> {
        for _ in 0..ident::MAX_CODE_ATTEMPTS {
            let pnr = ident::candidate(ident::PNR_LEN);
            if !BookingRepository::pnr_exists(&mut *conn, &pnr).await? {
                return Ok(pnr);
            }
        }
        Err(CodeSpaceExhausted { attempts: ident::MAX_CODE_ATTEMPTS }.into())
    }

    async fn unique_ticket_number(conn: &mut SqliteConnection) -> Result<String, BookingError> {
        for _ in 0..ident::MAX_CODE_ATTEMPTS {
            let number = ident::candidate(ident::TICKET_NUMBER_LEN);
            if !BookingRepository::ticket_number_exists(&mut *conn, &number).await? {
                return Ok(number);
            }
        }
        Err(CodeSpaceExhausted { attempts: ident::MAX_CODE_ATTEMPTS }.into())
    }
}
