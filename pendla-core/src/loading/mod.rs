//! Loading the static GTFS feed and deriving the timetable index from it.

mod builder;
pub mod gtfs;

pub use builder::build_timetable;
pub use gtfs::{FeedTables, load_feed_tables};
