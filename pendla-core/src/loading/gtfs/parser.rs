use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::Error;

/// Deserialize one GTFS table from CSV. A malformed row aborts the read so
/// a broken feed never replaces a live index.
pub fn read_gtfs<T, R>(reader: R) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
    R: Read,
{
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(Error::from)
}

pub fn read_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("failed to open {}: {e}", path.display()))
    })?;
    read_gtfs(file)
}
