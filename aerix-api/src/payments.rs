use aerix_core::model::Payment;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: i64,
    /// Caller-supplied idempotency token; replays return the original record.
    pub transaction_id: String,
}

/// POST /api/v1/passenger/payments
pub async fn process_payment(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let payment = state
        .payments
        .process(req.booking_id, &req.transaction_id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
