use aerix_core::model::CheckIn;
use aerix_store::app_config::BookingRules;
use aerix_store::{
    BookingRepository, CheckInRepository, DbClient, DirectoryRepository, ProfileRepository,
    StoreError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("Ticket not found")]
    TicketNotFound,

    #[error("Flight not found")]
    FlightNotFound,

    #[error("Not authorized to check in for this ticket")]
    NotTicketOwner,

    #[error("Check-in opens {0} hours before departure")]
    TooEarly(i64),

    #[error("Check-in closes {0} hours before departure")]
    TooLate(i64),

    #[error("could not encode boarding pass: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The payload serialized into the boarding QR code.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardingPass {
    pub ticket_number: String,
    pub pnr: String,
    pub flight_number: String,
    pub passenger_name: String,
    pub seat: String,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub departure: DateTime<Utc>,
}

/// Both boundaries are inclusive: exactly `opens_hours` before departure is
/// open, exactly `closes_hours` before departure still admits.
pub fn verify_window(
    departure: DateTime<Utc>,
    now: DateTime<Utc>,
    opens_hours: i64,
    closes_hours: i64,
) -> Result<(), CheckInError> {
    let until_departure = departure - now;
    if until_departure > Duration::hours(opens_hours) {
        return Err(CheckInError::TooEarly(opens_hours));
    }
    if until_departure < Duration::hours(closes_hours) {
        return Err(CheckInError::TooLate(closes_hours));
    }
    Ok(())
}

/// Issues boarding credentials inside the check-in window, once per ticket.
#[derive(Clone)]
pub struct CheckInIssuer {
    db: DbClient,
    rules: BookingRules,
}

impl CheckInIssuer {
    pub fn new(db: DbClient, rules: BookingRules) -> Self {
        Self { db, rules }
    }

    pub async fn check_in(
        &self,
        ticket_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<CheckIn, CheckInError> {
        let mut tx = self.db.pool.begin().await.map_err(StoreError::from)?;

        let ticket = BookingRepository::ticket_by_id(&mut tx, ticket_id)
            .await?
            .ok_or(CheckInError::TicketNotFound)?;

        let booking = BookingRepository::booking_by_id(&mut tx, ticket.booking_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("missing booking {}", ticket.booking_id)))?;
        if booking.user_id != user_id {
            return Err(CheckInError::NotTicketOwner);
        }

        // Defensive; referential integrity should make this unreachable.
        let flight = DirectoryRepository::flight_by_id(&mut tx, booking.flight_id)
            .await?
            .ok_or(CheckInError::FlightNotFound)?;

        verify_window(
            flight.scheduled_departure,
            now,
            self.rules.checkin_opens_hours,
            self.rules.checkin_closes_hours,
        )?;

        if let Some(existing) = CheckInRepository::by_ticket(&mut tx, ticket_id).await? {
            return Ok(existing);
        }

        let passenger = ProfileRepository::profile_by_id(&mut tx, ticket.passenger_profile_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!("missing profile {}", ticket.passenger_profile_id))
            })?;

        let pass = BoardingPass {
            ticket_number: ticket.ticket_number.clone(),
            pnr: booking.pnr.clone(),
            flight_number: flight.flight_number.clone(),
            passenger_name: passenger.full_name.clone(),
            seat: ticket.seat_number.clone(),
            gate: flight.gate.clone(),
            terminal: flight.terminal.clone(),
            departure: flight.scheduled_departure,
        };
        let qr_code = serde_json::to_string(&pass)?;

        let checkin = CheckInRepository::insert(&mut tx, ticket_id, &qr_code, now).await?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(ticket_id, pnr = %booking.pnr, "boarding pass issued");
        Ok(checkin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BookingEngine, SeatSelection};
    use crate::testutil;

    #[test]
    fn test_window_boundaries() {
        let now = Utc::now();
        let at = |hours: i64, minutes: i64| now + Duration::hours(hours) + Duration::minutes(minutes);

        assert!(matches!(
            verify_window(at(25, 0), now, 24, 1),
            Err(CheckInError::TooEarly(24))
        ));
        // Exactly 24h out is already open.
        assert!(verify_window(at(24, 0), now, 24, 1).is_ok());
        assert!(verify_window(at(23, 0), now, 24, 1).is_ok());
        // Exactly 1h out still admits.
        assert!(verify_window(at(1, 0), now, 24, 1).is_ok());
        assert!(matches!(
            verify_window(at(0, 30), now, 24, 1),
            Err(CheckInError::TooLate(1))
        ));
    }

    async fn ticket_on_flight_departing_in(
        fx: &testutil::Fixture,
        hours: i64,
    ) -> i64 {
        let flight =
            testutil::add_flight(fx, "AX200", fx.now + Duration::hours(hours)).await;
        let engine = BookingEngine::new(fx.db.clone(), BookingRules::default());
        let (_, tickets) = engine
            .create_booking(
                fx.passenger,
                flight,
                &[SeatSelection {
                    passenger_profile_id: fx.profile,
                    seat_number: "1A".to_string(),
                }],
                fx.now,
            )
            .await
            .unwrap();
        tickets[0].id
    }

    #[tokio::test]
    async fn test_check_in_issues_boarding_pass() {
        let fx = testutil::seed().await;
        let ticket_id = ticket_on_flight_departing_in(&fx, 23).await;
        let issuer = CheckInIssuer::new(fx.db.clone(), BookingRules::default());

        let checkin = issuer.check_in(ticket_id, fx.passenger, fx.now).await.unwrap();

        let pass: BoardingPass = serde_json::from_str(&checkin.qr_code).unwrap();
        assert_eq!(pass.flight_number, "AX200");
        assert_eq!(pass.passenger_name, "Alice Tan");
        assert_eq!(pass.seat, "1A");
        assert_eq!(pass.ticket_number.len(), 10);
    }

    #[tokio::test]
    async fn test_check_in_is_idempotent() {
        let fx = testutil::seed().await;
        let ticket_id = ticket_on_flight_departing_in(&fx, 23).await;
        let issuer = CheckInIssuer::new(fx.db.clone(), BookingRules::default());

        let first = issuer.check_in(ticket_id, fx.passenger, fx.now).await.unwrap();
        let second = issuer.check_in(ticket_id, fx.passenger, fx.now).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.qr_code, second.qr_code);
    }

    #[tokio::test]
    async fn test_check_in_window_is_enforced() {
        let fx = testutil::seed().await;
        let issuer = CheckInIssuer::new(fx.db.clone(), BookingRules::default());

        let early = ticket_on_flight_departing_in(&fx, 25).await;
        assert!(matches!(
            issuer.check_in(early, fx.passenger, fx.now).await.unwrap_err(),
            CheckInError::TooEarly(_)
        ));

        // Same flight, evaluated 30 minutes before departure.
        let at_gate = fx.now + Duration::hours(25) - Duration::minutes(30);
        assert!(matches!(
            issuer.check_in(early, fx.passenger, at_gate).await.unwrap_err(),
            CheckInError::TooLate(_)
        ));
    }

    #[tokio::test]
    async fn test_check_in_requires_ownership() {
        let fx = testutil::seed().await;
        let ticket_id = ticket_on_flight_departing_in(&fx, 23).await;
        let issuer = CheckInIssuer::new(fx.db.clone(), BookingRules::default());

        let err = issuer
            .check_in(ticket_id, fx.passenger2, fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckInError::NotTicketOwner));

        let missing = issuer.check_in(4242, fx.passenger, fx.now).await.unwrap_err();
        assert!(matches!(missing, CheckInError::TicketNotFound));
    }
}
