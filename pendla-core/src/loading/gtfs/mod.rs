//! Typed rows for the static GTFS tables.

mod de;
mod parser;
mod raw_types;

pub use parser::{read_gtfs, read_gtfs_file};
pub use raw_types::{FeedCalendarDate, FeedRoute, FeedStop, FeedStopTime, FeedTransfer, FeedTrip};

use std::path::Path;

use crate::Error;

/// The six static feed tables the engine consumes.
#[derive(Debug)]
pub struct FeedTables {
    pub stops: Vec<FeedStop>,
    pub trips: Vec<FeedTrip>,
    pub routes: Vec<FeedRoute>,
    pub transfers: Vec<FeedTransfer>,
    pub stop_times: Vec<FeedStopTime>,
    pub calendar_dates: Vec<FeedCalendarDate>,
}

/// Read all six tables from an extracted feed directory.
pub fn load_feed_tables(dir: &Path) -> Result<FeedTables, Error> {
    Ok(FeedTables {
        stops: read_gtfs_file(&dir.join("stops.txt"))?,
        trips: read_gtfs_file(&dir.join("trips.txt"))?,
        routes: read_gtfs_file(&dir.join("routes.txt"))?,
        transfers: read_gtfs_file(&dir.join("transfers.txt"))?,
        stop_times: read_gtfs_file(&dir.join("stop_times.txt"))?,
        calendar_dates: read_gtfs_file(&dir.join("calendar_dates.txt"))?,
    })
}
