use std::path::PathBuf;

use crate::refresh::REQUESTS_TABLE;

/// Construction parameters for the engine and its timetable index.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory the static feed is extracted into and loaded from.
    pub data_dir: PathBuf,
    /// Walking speed in km/h.
    pub walk_speed: f64,
    /// Maximum walking distance in km, for footpaths and query endpoints.
    pub max_walk_radius: f64,
    /// Multiplier on raw walking times to discourage walk-heavy paths.
    pub walk_penalty: f64,
    /// Maximum number of boardings per seed departure.
    pub max_raptor_rounds: usize,
    /// Realtime pulls per hour of the day.
    pub requests_table: [u32; 24],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            walk_speed: 5.0,
            max_walk_radius: 1.0,
            walk_penalty: 2.0,
            max_raptor_rounds: 3,
            requests_table: REQUESTS_TABLE,
        }
    }
}
