pub mod seat_map;
pub mod service;

pub use seat_map::{SeatCell, SeatMap};
pub use service::{DirectoryError, FlightChanges, FlightDetails, FlightDirectory, SearchQuery};
