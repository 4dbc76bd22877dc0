use aerix_core::model::{Payment, PaymentMethod, PaymentStatus};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::StoreError;

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    booking_id: i64,
    amount: f64,
    payment_method: String,
    status: String,
    transaction_ref: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            booking_id: row.booking_id,
            amount: row.amount,
            payment_method: row.payment_method.parse()?,
            status: row.status.parse()?,
            transaction_ref: row.transaction_ref,
            created_at: row.created_at,
        })
    }
}

pub struct PaymentRepository;

impl PaymentRepository {
    pub async fn by_transaction_ref(
        conn: &mut SqliteConnection,
        transaction_ref: &str,
    ) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE transaction_ref = ?",
        )
        .bind(transaction_ref)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    pub async fn by_booking(
        conn: &mut SqliteConnection,
        booking_id: i64,
    ) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>("SELECT * FROM payments WHERE booking_id = ?")
            .bind(booking_id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(Payment::try_from).transpose()
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        booking_id: i64,
        amount: f64,
        method: PaymentMethod,
        status: PaymentStatus,
        transaction_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<Payment, StoreError> {
        let result = sqlx::query(
            "INSERT INTO payments (booking_id, amount, payment_method, status, transaction_ref, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(booking_id)
        .bind(amount)
        .bind(method.as_str())
        .bind(status.as_str())
        .bind(transaction_ref)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(Payment {
            id: result.last_insert_rowid(),
            booking_id,
            amount,
            payment_method: method,
            status,
            transaction_ref: transaction_ref.to_string(),
            created_at: now,
        })
    }

    /// Flip an existing payment to PAID under a new idempotency token.
    pub async fn mark_paid(
        conn: &mut SqliteConnection,
        payment_id: i64,
        transaction_ref: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE payments SET status = 'PAID', transaction_ref = ? WHERE id = ?")
            .bind(transaction_ref)
            .bind(payment_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
