//! Core engine of the pendla journey planner.
//!
//! Builds an in-memory timetable index from a GTFS feed, keeps it fresh with
//! daily static rebuilds and intra-day realtime patches, and answers
//! point-to-point queries with a multi-departure RAPTOR search.

pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod loading;
pub mod model;
pub mod realtime;
pub mod refresh;
pub mod routing;
pub mod time;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::Error;
pub use model::{Route, RouteId, Stop, StopId, Time, TransitIndex, Trip, TripId};
pub use refresh::FeedSource;
pub use routing::{Journey, Leg, RaptorError, SearchRequest};
