use aerix_booking::{SeatSelection, TripView};
use aerix_core::model::{Booking, Ticket};
use aerix_core::principal::CurrentUser;
use aerix_store::booking_repo::TravelWindow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub flight_id: i64,
    /// `(passenger_profile_id, seat_number)` pairs, honored in order.
    pub passenger_profiles: Vec<SeatSelection>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub tickets: Vec<Ticket>,
}

/// POST /api/v1/passenger/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let (booking, tickets) = state
        .bookings
        .create_booking(user.id, req.flight_id, &req.passenger_profiles, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse { booking, tickets })))
}

/// GET /api/v1/passenger/bookings/upcoming
pub async fn upcoming_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<TripView>>, AppError> {
    let trips = state
        .bookings
        .user_bookings(user.id, TravelWindow::Upcoming, Utc::now())
        .await?;
    Ok(Json(trips))
}

/// GET /api/v1/passenger/bookings/past
pub async fn past_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<TripView>>, AppError> {
    let trips = state
        .bookings
        .user_bookings(user.id, TravelWindow::Past, Utc::now())
        .await?;
    Ok(Json(trips))
}

/// POST /api/v1/passenger/bookings/{booking_id}/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .cancel_booking(booking_id, Some(user.id))
        .await?;
    Ok(Json(booking))
}
