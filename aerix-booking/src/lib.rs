pub mod checkin;
pub mod engine;
pub mod payment;
pub mod selection;

pub use checkin::{CheckInError, CheckInIssuer};
pub use engine::{BookingEngine, BookingError, SeatSelection, TripView};
pub use payment::{PaymentError, PaymentRecorder};

#[cfg(test)]
pub(crate) mod testutil;
