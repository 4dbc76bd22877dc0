use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pii::Masked;
use crate::principal::Role;

/// Raised when a status string read from the store does not match any known
/// variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! status_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }
    };
}

status_enum!(FlightStatus, "flight status", {
    Scheduled => "SCHEDULED",
    Delayed => "DELAYED",
    Boarding => "BOARDING",
    Departed => "DEPARTED",
    Arrived => "ARRIVED",
    Cancelled => "CANCELLED",
});

status_enum!(BookingStatus, "booking status", {
    Created => "CREATED",
    Confirmed => "CONFIRMED",
    Cancelled => "CANCELLED",
});

status_enum!(PaymentStatus, "payment status", {
    Pending => "PENDING",
    Paid => "PAID",
    Failed => "FAILED",
});

status_enum!(PaymentMethod, "payment method", {
    Card => "CARD",
});

status_enum!(AnnouncementType, "announcement type", {
    Delay => "DELAY",
    Cancellation => "CANCELLATION",
    GateChange => "GATE_CHANGE",
    Boarding => "BOARDING",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport_number: Option<Masked<String>>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

/// Cabin geometry carried by each airplane, e.g. `{"rows": 30,
/// "seats_per_row": 6, "layout": "3-3"}`. Stored as a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatTemplate {
    pub rows: u32,
    pub seats_per_row: u32,
    pub layout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airplane {
    pub id: i64,
    pub model: String,
    pub registration_number: String,
    pub seat_template: SeatTemplate,
    pub total_seats: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    pub origin_id: i64,
    pub destination_id: i64,
    pub airplane_id: i64,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub pnr: String,
    pub user_id: i64,
    pub flight_id: i64,
    pub status: BookingStatus,
    /// Set while the booking is `CREATED`; once it passes, the booking no
    /// longer holds its seats and will be swept to `CANCELLED`.
    pub seat_hold_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// True when a `CREATED` booking's hold has lapsed at `now`.
    pub fn hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Created
            && self.seat_hold_expires_at.is_some_and(|at| at < now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub ticket_number: String,
    pub booking_id: i64,
    pub passenger_profile_id: i64,
    pub seat_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    /// Caller-supplied idempotency token; unique across all payments.
    pub transaction_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: i64,
    pub ticket_id: i64,
    pub qr_code: String,
    pub checked_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub flight_id: i64,
    pub announcement_type: AnnouncementType,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(BookingStatus::Created.as_str(), "CREATED");
        assert_eq!("CONFIRMED".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!("GATE_CHANGE".parse::<AnnouncementType>().unwrap(), AnnouncementType::GateChange);
        assert!("BOOKED".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_hold_expiry_check() {
        let now = Utc::now();
        let mut booking = Booking {
            id: 1,
            pnr: "AB12CD".to_string(),
            user_id: 1,
            flight_id: 1,
            status: BookingStatus::Created,
            seat_hold_expires_at: Some(now - Duration::seconds(1)),
            created_at: now - Duration::minutes(11),
        };
        assert!(booking.hold_expired(now));

        // A live hold is not expired, and terminal states never are.
        booking.seat_hold_expires_at = Some(now + Duration::minutes(10));
        assert!(!booking.hold_expired(now));
        booking.status = BookingStatus::Confirmed;
        booking.seat_hold_expires_at = Some(now - Duration::minutes(1));
        assert!(!booking.hold_expired(now));
    }
}
