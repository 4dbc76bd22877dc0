use aerix_core::model::Flight;
use aerix_core::principal::CurrentUser;
use aerix_directory::service::AnnouncementFeedItem;
use aerix_directory::{FlightDetails, SearchQuery, SeatMap};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
}

fn parse_search_date(raw: &str) -> Result<NaiveDate, AppError> {
    if let Ok(datetime) = raw.parse::<DateTime<Utc>>() {
        return Ok(datetime.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(
            "Invalid date format. Use ISO format (YYYY-MM-DDTHH:MM:SS) or YYYY-MM-DD".to_string(),
        )
    })
}

/// GET /api/v1/passenger/flights/search
pub async fn search_flights(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Flight>>, AppError> {
    let date = params.date.as_deref().map(parse_search_date).transpose()?;

    let query = SearchQuery {
        origin: params.origin,
        destination: params.destination,
        date,
    };
    Ok(Json(state.directory.search_flights(&query).await?))
}

/// GET /api/v1/passenger/flights/{flight_id}
pub async fn flight_details(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
) -> Result<Json<FlightDetails>, AppError> {
    let details = state.directory.flight_details(flight_id, Utc::now()).await?;
    Ok(Json(details))
}

/// GET /api/v1/passenger/flights/{flight_id}/seat-map
pub async fn seat_map(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
) -> Result<Json<SeatMap>, AppError> {
    let map = state.directory.seat_map(flight_id, Utc::now()).await?;
    Ok(Json(map))
}

/// GET /api/v1/passenger/announcements
///
/// Announcements for the caller's upcoming flights, newest first.
pub async fn announcements(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<AnnouncementFeedItem>>, AppError> {
    let feed = state
        .directory
        .announcements_for_user(user.id, Utc::now())
        .await?;
    Ok(Json(feed))
}
