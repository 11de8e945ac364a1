use serde::{Deserialize, Deserializer};

use crate::{Time, time::str_to_seconds};

pub(super) fn gtfs_time<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    let time_str = String::deserialize(deserializer)?;
    str_to_seconds(&time_str).map_err(serde::de::Error::custom)
}
