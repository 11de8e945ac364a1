//! Dual-cadence refresh: daily static rebuilds at local midnight and
//! quota-driven realtime pulls through the day.

use std::time::Duration;

use chrono::{Days, Local, NaiveTime, TimeZone, Timelike, Utc};

use crate::Error;

/// Upstream feed endpoints, supplied by the caller.
///
/// `download_static` refreshes the extracted CSV tables on disk. The three
/// realtime calls return raw GTFS-realtime protobuf payloads; the engine
/// consumes trip updates only, alerts and vehicle positions are part of the
/// upstream surface for other consumers.
pub trait FeedSource: Send + Sync + 'static {
    fn download_static(&self) -> Result<(), Error>;
    fn service_alerts(&self) -> Result<Vec<u8>, Error>;
    fn trip_updates(&self) -> Result<Vec<u8>, Error>;
    fn vehicle_positions(&self) -> Result<Vec<u8>, Error>;
}

/// Realtime pulls per hour of the day. The quiet hours 03-05 spare the
/// monthly call quota.
pub const REQUESTS_TABLE: [u32; 24] = [
    12, 12, 12, 0, 0, 0, 12, 48, 48, 48, 24, 24, 48, 48, 48, 48, 48, 48, 48, 24, 24, 24, 24, 24,
];

/// Second-of-day offsets of every scheduled pull, ascending: an hour with
/// `v` calls gets one pull every `3600 / v` seconds.
pub(crate) fn pull_offsets(table: &[u32; 24]) -> Vec<f64> {
    let mut offsets = Vec::new();
    for (hour, &calls) in table.iter().enumerate() {
        for i in 0..calls {
            offsets.push(hour as f64 * 3600.0 + f64::from(i) * 3600.0 / f64::from(calls));
        }
    }
    offsets
}

/// Sleep length until the next scheduled realtime pull, wrapping to the
/// first pull of the next day after the last one.
pub(crate) fn next_pull_delay(second_of_day: f64, table: &[u32; 24]) -> Duration {
    let offsets = pull_offsets(table);
    match offsets.iter().find(|&&t| t > second_of_day) {
        Some(&next) => Duration::from_secs_f64(next - second_of_day),
        None => {
            let first = offsets.first().copied().unwrap_or(0.0);
            Duration::from_secs_f64(86_400.0 - second_of_day + first)
        }
    }
}

pub(crate) fn second_of_day_now() -> f64 {
    let now = Utc::now();
    f64::from(now.num_seconds_from_midnight()) + f64::from(now.nanosecond()) / 1e9
}

/// Sleep length until the next local midnight.
pub(crate) fn until_next_midnight() -> Duration {
    let now = Local::now();
    let Some(tomorrow) = now.date_naive().checked_add_days(Days::new(1)) else {
        return Duration::from_secs(86_400);
    };
    match Local.from_local_datetime(&tomorrow.and_time(NaiveTime::MIN)).earliest() {
        Some(midnight) => (midnight - now).to_std().unwrap_or(Duration::ZERO),
        None => Duration::from_secs(86_400),
    }
}

/// Epoch second of local midnight of the current day, the base realtime
/// timestamps are converted against.
pub(crate) fn local_midnight_epoch() -> i64 {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.timestamp(),
        None => midnight.and_utc().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::{REQUESTS_TABLE, next_pull_delay, pull_offsets};

    #[test]
    fn one_offset_per_scheduled_call() {
        let offsets = pull_offsets(&REQUESTS_TABLE);
        let total: u32 = REQUESTS_TABLE.iter().sum();
        assert_eq!(offsets.len(), total as usize);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        // the quiet hours have no pulls
        assert!(!offsets.iter().any(|&t| (3.0 * 3600.0..6.0 * 3600.0).contains(&t)));
    }

    #[test]
    fn busy_hours_pull_every_75_seconds() {
        let offsets = pull_offsets(&REQUESTS_TABLE);
        let seven: Vec<f64> = offsets
            .iter()
            .copied()
            .filter(|&t| (7.0 * 3600.0..8.0 * 3600.0).contains(&t))
            .collect();
        assert_eq!(seven.len(), 48);
        assert!((seven[1] - seven[0] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn delay_wraps_past_the_last_pull_of_the_day() {
        let mut table = [0u32; 24];
        table[6] = 2; // pulls at 06:00:00 and 06:30:00
        let base = 6.0 * 3600.0;
        assert_eq!(next_pull_delay(base + 60.0, &table).as_secs(), 1740);
        // 06:33:20 is past the last pull; wait for tomorrow's 06:00
        assert_eq!(next_pull_delay(base + 2000.0, &table).as_secs(), 86_400 - 2000);
    }
}
