//! Data model for the transit timetable index.

pub mod index;
pub mod types;

pub use index::TransitIndex;
pub use types::{Route, RouteId, Stop, StopDepartures, StopId, Time, Transfer, Trip, TripId};
