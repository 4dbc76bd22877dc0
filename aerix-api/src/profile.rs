use aerix_core::model::PassengerProfile;
use aerix_core::principal::CurrentUser;
use aerix_store::profile_repo::ProfileData;
use aerix_store::ProfileRepository;
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// POST /api/v1/passenger/profile
///
/// Creates the caller's profile, or updates it in place.
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<PassengerProfile>), AppError> {
    let data = ProfileData {
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        passport_number: req.passport_number,
        nationality: req.nationality,
        date_of_birth: req.date_of_birth,
    };

    let mut conn = state
        .db
        .pool
        .acquire()
        .await
        .map_err(|err| AppError::Internal(err.into()))?;
    let profile = ProfileRepository::upsert_profile(&mut conn, user.id, &data).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/passenger/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<PassengerProfile>, AppError> {
    let mut conn = state
        .db
        .pool
        .acquire()
        .await
        .map_err(|err| AppError::Internal(err.into()))?;

    let profile = ProfileRepository::profile_for_user(&mut conn, user.id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Profile not found. Please create your profile first.".to_string())
        })?;

    Ok(Json(profile))
}
