use aerix_core::model::{BookingStatus, Payment, PaymentMethod, PaymentStatus};
use aerix_core::payment::{ChargeOutcome, ChargeRequest, PaymentGateway};
use aerix_store::app_config::BookingRules;
use aerix_store::{BookingRepository, DbClient, PaymentRepository, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Cannot process payment for cancelled booking")]
    BookingCancelled,

    #[error("Payment already processed")]
    AlreadyProcessed,

    #[error("Payment was declined")]
    Declined,

    #[error("payment gateway failure: {0}")]
    Gateway(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Records payment captures and confirms bookings. Fully idempotent on the
/// caller-supplied transaction reference.
#[derive(Clone)]
pub struct PaymentRecorder {
    db: DbClient,
    rules: BookingRules,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentRecorder {
    pub fn new(db: DbClient, rules: BookingRules, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { db, rules, gateway }
    }

    pub async fn process(
        &self,
        booking_id: i64,
        transaction_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, PaymentError> {
        let mut tx = self.db.pool.begin().await.map_err(StoreError::from)?;

        // Token replay returns the recorded payment untouched, regardless of
        // which booking it targeted.
        if let Some(existing) =
            PaymentRepository::by_transaction_ref(&mut tx, transaction_ref).await?
        {
            tracing::debug!(transaction_ref, "payment token replayed");
            return Ok(existing);
        }

        let booking = BookingRepository::booking_by_id(&mut tx, booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound)?;
        if booking.status == BookingStatus::Cancelled {
            return Err(PaymentError::BookingCancelled);
        }

        if let Some(existing) = PaymentRepository::by_booking(&mut tx, booking_id).await? {
            if existing.status == PaymentStatus::Paid {
                return Err(PaymentError::AlreadyProcessed);
            }

            self.authorize(booking_id, existing.amount, transaction_ref).await?;

            PaymentRepository::mark_paid(&mut tx, existing.id, transaction_ref).await?;
            BookingRepository::set_status(&mut tx, booking_id, BookingStatus::Confirmed).await?;
            tx.commit().await.map_err(StoreError::from)?;

            tracing::info!(booking_id, payment_id = existing.id, "pending payment captured");
            return Ok(Payment {
                status: PaymentStatus::Paid,
                transaction_ref: transaction_ref.to_string(),
                ..existing
            });
        }

        let ticket_count = BookingRepository::ticket_count(&mut tx, booking_id).await?;
        let amount = ticket_count as f64 * self.rules.ticket_price;

        self.authorize(booking_id, amount, transaction_ref).await?;

        let payment = PaymentRepository::insert(
            &mut tx,
            booking_id,
            amount,
            PaymentMethod::Card,
            PaymentStatus::Paid,
            transaction_ref,
            now,
        )
        .await?;
        BookingRepository::set_status(&mut tx, booking_id, BookingStatus::Confirmed).await?;
        tx.commit().await.map_err(StoreError::from)?;

        tracing::info!(booking_id, payment_id = payment.id, amount, "payment captured");
        Ok(payment)
    }

    async fn authorize(
        &self,
        booking_id: i64,
        amount: f64,
        transaction_ref: &str,
    ) -> Result<(), PaymentError> {
        let charge = ChargeRequest {
            booking_id,
            amount,
            transaction_ref: transaction_ref.to_string(),
        };
        let outcome = self
            .gateway
            .authorize(&charge)
            .await
            .map_err(|err| PaymentError::Gateway(err.to_string()))?;

        match outcome {
            ChargeOutcome::Approved => Ok(()),
            ChargeOutcome::Declined => Err(PaymentError::Declined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BookingEngine, SeatSelection};
    use crate::testutil;
    use aerix_core::payment::MockCardGateway;

    fn recorder(db: &DbClient) -> PaymentRecorder {
        PaymentRecorder::new(db.clone(), BookingRules::default(), Arc::new(MockCardGateway))
    }

    async fn payment_count(db: &DbClient) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        count
    }

    async fn booked(fx: &testutil::Fixture, seats: &[&str]) -> i64 {
        let engine = BookingEngine::new(fx.db.clone(), BookingRules::default());
        let selections: Vec<SeatSelection> = seats
            .iter()
            .map(|seat| SeatSelection {
                passenger_profile_id: fx.profile,
                seat_number: seat.to_string(),
            })
            .collect();
        let (booking, _) = engine
            .create_booking(fx.passenger, fx.flight, &selections, fx.now)
            .await
            .unwrap();
        booking.id
    }

    #[tokio::test]
    async fn test_flat_pricing_and_confirmation() {
        let fx = testutil::seed().await;
        let booking_id = booked(&fx, &["1A", "1B", "2A"]).await;

        let payment = recorder(&fx.db)
            .process(booking_id, "tok-1", fx.now)
            .await
            .unwrap();

        assert_eq!(payment.amount, 300.0);
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.payment_method, PaymentMethod::Card);
        assert_eq!(
            testutil::booking_status(&fx.db, booking_id).await,
            aerix_core::model::BookingStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_token_replay_is_idempotent() {
        let fx = testutil::seed().await;
        let booking_id = booked(&fx, &["1A"]).await;
        let recorder = recorder(&fx.db);

        let first = recorder.process(booking_id, "tok-1", fx.now).await.unwrap();
        let second = recorder.process(booking_id, "tok-1", fx.now).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.transaction_ref, second.transaction_ref);
        assert_eq!(payment_count(&fx.db).await, 1);
    }

    #[tokio::test]
    async fn test_repeat_payment_with_new_token_conflicts() {
        let fx = testutil::seed().await;
        let booking_id = booked(&fx, &["1A"]).await;
        let recorder = recorder(&fx.db);

        recorder.process(booking_id, "tok-1", fx.now).await.unwrap();
        let err = recorder.process(booking_id, "tok-2", fx.now).await.unwrap_err();
        assert!(matches!(err, PaymentError::AlreadyProcessed));
    }

    #[tokio::test]
    async fn test_pending_payment_is_captured_in_place() {
        let fx = testutil::seed().await;
        let booking_id = booked(&fx, &["1A"]).await;

        {
            let mut conn = fx.db.pool.acquire().await.unwrap();
            PaymentRepository::insert(
                &mut conn,
                booking_id,
                100.0,
                PaymentMethod::Card,
                PaymentStatus::Pending,
                "tok-old",
                fx.now,
            )
            .await
            .unwrap();
        }

        let payment = recorder(&fx.db)
            .process(booking_id, "tok-new", fx.now)
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.transaction_ref, "tok-new");
        assert_eq!(payment_count(&fx.db).await, 1);
        assert_eq!(
            testutil::booking_status(&fx.db, booking_id).await,
            aerix_core::model::BookingStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_cancelled_booking_rejects_payment() {
        let fx = testutil::seed().await;
        let booking_id = booked(&fx, &["1A"]).await;

        let engine = BookingEngine::new(fx.db.clone(), BookingRules::default());
        engine.cancel_booking(booking_id, None).await.unwrap();

        let err = recorder(&fx.db)
            .process(booking_id, "tok-1", fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::BookingCancelled));
    }

    #[tokio::test]
    async fn test_unknown_booking() {
        let fx = testutil::seed().await;
        let err = recorder(&fx.db)
            .process(4242, "tok-1", fx.now)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::BookingNotFound));
    }
}
