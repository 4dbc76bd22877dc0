use aerix_booking::TripView;
use aerix_core::model::{
    Airplane, Announcement, AnnouncementType, Booking, Flight, FlightStatus, SeatTemplate, Ticket,
};
use aerix_directory::FlightChanges;
use aerix_store::directory_repo::{NewAirplane, NewFlight};
use aerix_store::DirectoryRepository;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::Sqlite;

use crate::error::AppError;
use crate::state::AppState;

async fn acquire(state: &AppState) -> Result<PoolConnection<Sqlite>, AppError> {
    state
        .db
        .pool
        .acquire()
        .await
        .map_err(|err| AppError::Internal(err.into()))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAirplaneRequest {
    pub model: String,
    pub registration_number: String,
    pub seat_template: SeatTemplate,
    pub total_seats: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateFlightRequest {
    pub flight_number: String,
    pub origin_id: i64,
    pub destination_id: i64,
    pub airplane_id: i64,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: Option<FlightStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFlightRequest {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
    pub airplane_id: Option<i64>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: Option<FlightStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncementRequest {
    pub flight_id: i64,
    pub announcement_type: AnnouncementType,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub flight_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub flight_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReassignSeatRequest {
    pub ticket_id: i64,
    pub new_seat: String,
}

// ============================================================================
// Airplane Handlers
// ============================================================================

/// POST /api/v1/staff/airplanes
pub async fn create_airplane(
    State(state): State<AppState>,
    Json(req): Json<CreateAirplaneRequest>,
) -> Result<(StatusCode, Json<Airplane>), AppError> {
    let mut conn = acquire(&state).await?;

    let airplane = DirectoryRepository::insert_airplane(
        &mut conn,
        &NewAirplane {
            model: req.model,
            registration_number: req.registration_number,
            seat_template: req.seat_template,
            total_seats: req.total_seats,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(airplane)))
}

/// GET /api/v1/staff/airplanes
pub async fn list_airplanes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Airplane>>, AppError> {
    let mut conn = acquire(&state).await?;
    Ok(Json(DirectoryRepository::list_airplanes(&mut conn).await?))
}

// ============================================================================
// Flight Handlers
// ============================================================================

/// POST /api/v1/staff/flights
pub async fn create_flight(
    State(state): State<AppState>,
    Json(req): Json<CreateFlightRequest>,
) -> Result<(StatusCode, Json<Flight>), AppError> {
    let mut conn = acquire(&state).await?;

    let flight = DirectoryRepository::insert_flight(
        &mut conn,
        &NewFlight {
            flight_number: req.flight_number,
            origin_id: req.origin_id,
            destination_id: req.destination_id,
            airplane_id: req.airplane_id,
            scheduled_departure: req.scheduled_departure,
            scheduled_arrival: req.scheduled_arrival,
            gate: req.gate,
            terminal: req.terminal,
            status: req.status.unwrap_or(FlightStatus::Scheduled),
        },
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(flight)))
}

/// GET /api/v1/staff/flights
pub async fn list_flights(State(state): State<AppState>) -> Result<Json<Vec<Flight>>, AppError> {
    let mut conn = acquire(&state).await?;
    Ok(Json(DirectoryRepository::list_flights(&mut conn).await?))
}

/// GET /api/v1/staff/flights/{flight_id}
pub async fn get_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
) -> Result<Json<Flight>, AppError> {
    let mut conn = acquire(&state).await?;

    let flight = DirectoryRepository::flight_by_id(&mut conn, flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    Ok(Json(flight))
}

/// PUT /api/v1/staff/flights/{flight_id}
///
/// Partial update: only supplied fields are applied.
pub async fn update_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
    Json(req): Json<UpdateFlightRequest>,
) -> Result<Json<Flight>, AppError> {
    let mut conn = acquire(&state).await?;

    let mut flight = DirectoryRepository::flight_by_id(&mut conn, flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let changes = FlightChanges {
        origin_id: req.origin_id,
        destination_id: req.destination_id,
        airplane_id: req.airplane_id,
        scheduled_departure: req.scheduled_departure,
        scheduled_arrival: req.scheduled_arrival,
        gate: req.gate,
        terminal: req.terminal,
        status: req.status,
    };
    changes.apply(&mut flight);

    DirectoryRepository::update_flight(&mut conn, &flight).await?;
    Ok(Json(flight))
}

// ============================================================================
// Announcement Handlers
// ============================================================================

/// POST /api/v1/staff/announcements
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), AppError> {
    let mut conn = acquire(&state).await?;

    let flight = DirectoryRepository::flight_by_id(&mut conn, req.flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let announcement = DirectoryRepository::insert_announcement(
        &mut conn,
        req.flight_id,
        req.announcement_type,
        &req.message,
        Utc::now(),
    )
    .await?;

    tracing::info!(
        flight_id = req.flight_id,
        kind = announcement.announcement_type.as_str(),
        "announcement published"
    );

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse {
            announcement,
            flight_number: flight.flight_number,
        }),
    ))
}

// ============================================================================
// Booking Handlers
// ============================================================================

/// GET /api/v1/staff/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<TripView>>, AppError> {
    let trips = state.bookings.list_bookings(query.flight_id).await?;
    Ok(Json(trips))
}

/// POST /api/v1/staff/bookings/{booking_id}/cancel
///
/// Staff cancellation skips the ownership check.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.cancel_booking(booking_id, None).await?;
    Ok(Json(booking))
}

/// PUT /api/v1/staff/bookings/{booking_id}/reassign-seat
pub async fn reassign_seat(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<ReassignSeatRequest>,
) -> Result<Json<Ticket>, AppError> {
    let ticket = state
        .bookings
        .reassign_seat(booking_id, req.ticket_id, &req.new_seat, Utc::now())
        .await?;
    Ok(Json(ticket))
}
