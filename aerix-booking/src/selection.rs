use std::collections::HashSet;

/// The requested seat is already part of the occupied set.
#[derive(Debug, thiserror::Error)]
#[error("Seat {0} is already booked")]
pub struct SeatConflict(pub String);

/// Claim one seat against the occupied set. On success the seat is added to
/// the set, so claims made earlier in the same request block later duplicates
/// exactly like pre-existing tickets do.
pub fn claim(occupied: &mut HashSet<String>, seat: &str) -> Result<(), SeatConflict> {
    if occupied.contains(seat) {
        return Err(SeatConflict(seat.to_string()));
    }
    occupied.insert(seat.to_string());
    Ok(())
}
