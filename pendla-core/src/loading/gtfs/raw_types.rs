use serde::Deserialize;

use super::de;
use crate::Time;

#[derive(Debug, Clone, Deserialize)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(default)]
    pub platform_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedRoute {
    pub route_id: String,
    #[serde(default)]
    pub route_desc: String,
    #[serde(default)]
    pub route_short_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    #[serde(default)]
    pub min_transfer_time: Option<Time>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedStopTime {
    pub trip_id: String,
    pub stop_id: String,
    /// 1-based position within the trip.
    pub stop_sequence: u32,
    #[serde(deserialize_with = "de::gtfs_time")]
    pub arrival_time: Time,
    #[serde(deserialize_with = "de::gtfs_time")]
    pub departure_time: Time,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedCalendarDate {
    pub service_id: String,
    /// YYYYMMDD.
    pub date: u32,
    /// 1 = service added on this date, 2 = removed.
    pub exception_type: u8,
}
