use aerix_booking::{BookingError, CheckInError, PaymentError};
use aerix_directory::DirectoryError;
use aerix_store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    InvalidState(String),
    PaymentRequired(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::FlightNotFound => AppError::NotFound(err.to_string()),
            DirectoryError::Store(inner) => inner.into(),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::FlightNotFound
            | BookingError::BookingNotFound
            | BookingError::TicketNotFound => AppError::NotFound(err.to_string()),
            BookingError::ProfileRequired | BookingError::ProfileNotOwned(_) => {
                AppError::Validation(err.to_string())
            }
            BookingError::SeatTaken(_) => AppError::Conflict(err.to_string()),
            BookingError::NotBookingOwner => AppError::Authorization(err.to_string()),
            BookingError::CodeSpace(inner) => AppError::Internal(inner.into()),
            BookingError::Store(inner) => inner.into(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::BookingNotFound => AppError::NotFound(err.to_string()),
            PaymentError::BookingCancelled => AppError::InvalidState(err.to_string()),
            PaymentError::AlreadyProcessed => AppError::Conflict(err.to_string()),
            PaymentError::Declined => AppError::PaymentRequired(err.to_string()),
            PaymentError::Gateway(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            PaymentError::Store(inner) => inner.into(),
        }
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        match err {
            CheckInError::TicketNotFound | CheckInError::FlightNotFound => {
                AppError::NotFound(err.to_string())
            }
            CheckInError::NotTicketOwner => AppError::Authorization(err.to_string()),
            CheckInError::TooEarly(_) | CheckInError::TooLate(_) => {
                AppError::InvalidState(err.to_string())
            }
            CheckInError::Encode(inner) => AppError::Internal(inner.into()),
            CheckInError::Store(inner) => inner.into(),
        }
    }
}
