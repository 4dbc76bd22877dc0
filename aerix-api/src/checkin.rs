use aerix_core::model::CheckIn;
use aerix_core::principal::CurrentUser;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/v1/passenger/check-in/{ticket_id}
///
/// Issues the boarding credential inside the check-in window; repeat calls
/// return the existing one.
pub async fn check_in(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
) -> Result<Json<CheckIn>, AppError> {
    let checkin = state.checkin.check_in(ticket_id, user.id, Utc::now()).await?;
    Ok(Json(checkin))
}
