//! Clock-time conversions for GTFS service days.
//!
//! Feed times are seconds since local midnight of the service day and may
//! exceed 24:00:00 for trips running into the early hours of the next day.

use crate::{Error, Time};

/// Parse an `HH:MM:SS` string into seconds since midnight. Hours may
/// exceed 23.
pub fn str_to_seconds(s: &str) -> Result<Time, Error> {
    let bad = || Error::InvalidData(format!("bad time string {s:?}"));
    let b = s.as_bytes();
    if b.len() != 8 || b[2] != b':' || b[5] != b':' {
        return Err(bad());
    }
    let digit = |i: usize| match b[i] {
        c @ b'0'..=b'9' => Ok(u32::from(c - b'0')),
        _ => Err(bad()),
    };
    let hours = digit(0)? * 10 + digit(1)?;
    let minutes = digit(3)? * 10 + digit(4)?;
    let seconds = digit(6)? * 10 + digit(7)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(bad());
    }
    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Format seconds since midnight as `HH:MM:SS`. The inverse of
/// [`str_to_seconds`]; hours may exceed 23.
pub fn seconds_to_str(t: Time) -> String {
    format!("{:02}:{:02}:{:02}", t / 3600, t % 3600 / 60, t % 60)
}
