use aerix_core::model::{
    Airplane, Airport, Announcement, Flight, FlightStatus,
};
use aerix_store::booking_repo::TravelWindow;
use aerix_store::directory_repo::FlightFilters;
use aerix_store::{BookingRepository, DbClient, DirectoryRepository, StoreError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::seat_map::{self, SeatMap};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Flight not found")]
    FlightNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Search input as supplied by the caller; airport codes are matched
/// case-insensitively and unknown codes silently drop their filter.
#[derive(Debug, Default)]
pub struct SearchQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct FlightDetails {
    #[serde(flatten)]
    pub flight: Flight,
    pub origin_airport: Airport,
    pub destination_airport: Airport,
    pub airplane: Airplane,
    pub total_seats: i64,
    pub available_seats: i64,
}

/// A staff flight update; only supplied fields are applied.
#[derive(Debug, Default)]
pub struct FlightChanges {
    pub origin_id: Option<i64>,
    pub destination_id: Option<i64>,
    pub airplane_id: Option<i64>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub gate: Option<String>,
    pub terminal: Option<String>,
    pub status: Option<FlightStatus>,
}

impl FlightChanges {
    pub fn apply(&self, flight: &mut Flight) {
        if let Some(origin_id) = self.origin_id {
            flight.origin_id = origin_id;
        }
        if let Some(destination_id) = self.destination_id {
            flight.destination_id = destination_id;
        }
        if let Some(airplane_id) = self.airplane_id {
            flight.airplane_id = airplane_id;
        }
        if let Some(departure) = self.scheduled_departure {
            flight.scheduled_departure = departure;
        }
        if let Some(arrival) = self.scheduled_arrival {
            flight.scheduled_arrival = arrival;
        }
        if let Some(gate) = &self.gate {
            flight.gate = Some(gate.clone());
        }
        if let Some(terminal) = &self.terminal {
            flight.terminal = Some(terminal.clone());
        }
        if let Some(status) = self.status {
            flight.status = status;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnnouncementFeedItem {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub flight_number: String,
}

/// Read-mostly lookups over the flight directory.
#[derive(Clone)]
pub struct FlightDirectory {
    db: DbClient,
}

impl FlightDirectory {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    pub async fn search_flights(&self, query: &SearchQuery) -> Result<Vec<Flight>, DirectoryError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;
        let mut filters = FlightFilters::default();

        if let Some(code) = &query.origin {
            // Unknown codes drop the filter rather than failing the search.
            filters.origin_id =
                DirectoryRepository::airport_by_code(&mut conn, &code.to_uppercase())
                    .await?
                    .map(|airport| airport.id);
            if filters.origin_id.is_none() {
                tracing::debug!(%code, "unknown origin code in search, filter ignored");
            }
        }
        if let Some(code) = &query.destination {
            filters.destination_id =
                DirectoryRepository::airport_by_code(&mut conn, &code.to_uppercase())
                    .await?
                    .map(|airport| airport.id);
        }
        if let Some(date) = query.date {
            let start = date.and_time(NaiveTime::MIN).and_utc();
            filters.departs_from = Some(start);
            filters.departs_until = Some(start + Duration::days(1));
        }

        Ok(DirectoryRepository::search_flights(&mut conn, &filters).await?)
    }

    pub async fn flight_details(
        &self,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<FlightDetails, DirectoryError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let flight = DirectoryRepository::flight_by_id(&mut conn, flight_id)
            .await?
            .ok_or(DirectoryError::FlightNotFound)?;

        let origin_airport = DirectoryRepository::airport_by_id(&mut conn, flight.origin_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("missing airport {}", flight.origin_id)))?;
        let destination_airport =
            DirectoryRepository::airport_by_id(&mut conn, flight.destination_id)
                .await?
                .ok_or_else(|| {
                    StoreError::Corrupt(format!("missing airport {}", flight.destination_id))
                })?;
        let airplane = DirectoryRepository::airplane_by_id(&mut conn, flight.airplane_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!("missing airplane {}", flight.airplane_id))
            })?;

        let occupied = BookingRepository::occupied_seats(&mut conn, flight_id, now).await?;
        let total_seats = airplane.total_seats;
        let available_seats = total_seats - occupied.len() as i64;

        Ok(FlightDetails {
            flight,
            origin_airport,
            destination_airport,
            airplane,
            total_seats,
            available_seats,
        })
    }

    /// Seat designators held by non-cancelled, non-lapsed bookings at `now`.
    pub async fn occupied_seats(
        &self,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<HashSet<String>, DirectoryError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;
        Ok(BookingRepository::occupied_seats(&mut conn, flight_id, now).await?)
    }

    pub async fn seat_map(
        &self,
        flight_id: i64,
        now: DateTime<Utc>,
    ) -> Result<SeatMap, DirectoryError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let flight = DirectoryRepository::flight_by_id(&mut conn, flight_id)
            .await?
            .ok_or(DirectoryError::FlightNotFound)?;
        let airplane = DirectoryRepository::airplane_by_id(&mut conn, flight.airplane_id)
            .await?
            .ok_or_else(|| {
                StoreError::Corrupt(format!("missing airplane {}", flight.airplane_id))
            })?;

        let occupied = BookingRepository::occupied_seats(&mut conn, flight_id, now).await?;

        Ok(seat_map::generate(
            &airplane.seat_template,
            airplane.total_seats,
            &occupied,
        ))
    }

    /// Announcements for the flights of the user's upcoming bookings, newest
    /// first, with the flight number attached.
    pub async fn announcements_for_user(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementFeedItem>, DirectoryError> {
        let mut conn = self.db.pool.acquire().await.map_err(StoreError::from)?;

        let bookings =
            BookingRepository::bookings_for_user(&mut conn, user_id, TravelWindow::Upcoming, now)
                .await?;

        let mut flight_ids: Vec<i64> = bookings.iter().map(|b| b.flight_id).collect();
        flight_ids.sort_unstable();
        flight_ids.dedup();

        let announcements =
            DirectoryRepository::announcements_for_flights(&mut conn, &flight_ids).await?;

        let mut flight_numbers: HashMap<i64, String> = HashMap::new();
        for &flight_id in &flight_ids {
            if let Some(flight) = DirectoryRepository::flight_by_id(&mut conn, flight_id).await? {
                flight_numbers.insert(flight_id, flight.flight_number);
            }
        }

        Ok(announcements
            .into_iter()
            .map(|announcement| {
                let flight_number = flight_numbers
                    .get(&announcement.flight_id)
                    .cloned()
                    .unwrap_or_default();
                AnnouncementFeedItem {
                    announcement,
                    flight_number,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_changes_apply_only_supplied_fields() {
        let mut flight = Flight {
            id: 1,
            flight_number: "AX100".to_string(),
            origin_id: 1,
            destination_id: 2,
            airplane_id: 1,
            scheduled_departure: Utc::now(),
            scheduled_arrival: Utc::now() + Duration::hours(5),
            gate: Some("A1".to_string()),
            terminal: Some("1".to_string()),
            status: FlightStatus::Scheduled,
            created_at: Utc::now(),
        };

        let changes = FlightChanges {
            gate: Some("B4".to_string()),
            status: Some(FlightStatus::Delayed),
            ..Default::default()
        };
        changes.apply(&mut flight);

        assert_eq!(flight.gate.as_deref(), Some("B4"));
        assert_eq!(flight.status, FlightStatus::Delayed);
        // Untouched fields survive.
        assert_eq!(flight.terminal.as_deref(), Some("1"));
        assert_eq!(flight.origin_id, 1);
    }
}
