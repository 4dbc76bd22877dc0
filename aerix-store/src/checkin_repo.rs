use aerix_core::model::CheckIn;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::StoreError;

#[derive(sqlx::FromRow)]
struct CheckInRow {
    id: i64,
    ticket_id: i64,
    qr_code: String,
    checked_in_at: DateTime<Utc>,
}

impl From<CheckInRow> for CheckIn {
    fn from(row: CheckInRow) -> Self {
        CheckIn {
            id: row.id,
            ticket_id: row.ticket_id,
            qr_code: row.qr_code,
            checked_in_at: row.checked_in_at,
        }
    }
}

pub struct CheckInRepository;

impl CheckInRepository {
    pub async fn by_ticket(
        conn: &mut SqliteConnection,
        ticket_id: i64,
    ) -> Result<Option<CheckIn>, StoreError> {
        let row = sqlx::query_as::<_, CheckInRow>("SELECT * FROM checkins WHERE ticket_id = ?")
            .bind(ticket_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map(CheckIn::from))
    }

    pub async fn insert(
        conn: &mut SqliteConnection,
        ticket_id: i64,
        qr_code: &str,
        now: DateTime<Utc>,
    ) -> Result<CheckIn, StoreError> {
        let result =
            sqlx::query("INSERT INTO checkins (ticket_id, qr_code, checked_in_at) VALUES (?, ?, ?)")
                .bind(ticket_id)
                .bind(qr_code)
                .bind(now)
                .execute(&mut *conn)
                .await?;

        Ok(CheckIn {
            id: result.last_insert_rowid(),
            ticket_id,
            qr_code: qr_code.to_string(),
            checked_in_at: now,
        })
    }
}
