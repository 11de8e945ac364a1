//! Trafiklab upstream client: the static GTFS zip plus the three
//! GTFS-realtime protobuf endpoints.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use pendla_core::{Error, FeedSource};
use tracing::info;

pub struct TrafikLab {
    static_url: String,
    service_alerts_url: String,
    trip_updates_url: String,
    vehicle_positions_url: String,
    data_dir: PathBuf,
    client: reqwest::blocking::Client,
}

impl TrafikLab {
    pub fn new(
        operator: &str,
        static_key: &str,
        realtime_key: &str,
        data_dir: PathBuf,
    ) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Feed(e.to_string()))?;
        Ok(Self {
            static_url: format!(
                "https://opendata.samtrafiken.se/gtfs/{operator}/{operator}.zip?key={static_key}"
            ),
            service_alerts_url: format!(
                "https://opendata.samtrafiken.se/gtfs-rt/{operator}/ServiceAlerts.pb?key={realtime_key}"
            ),
            trip_updates_url: format!(
                "https://opendata.samtrafiken.se/gtfs-rt/{operator}/TripUpdates.pb?key={realtime_key}"
            ),
            vehicle_positions_url: format!(
                "https://opendata.samtrafiken.se/gtfs-rt/{operator}/VehiclePositions.pb?key={realtime_key}"
            ),
            data_dir,
            client,
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Feed(e.to_string()))?;
        let bytes = response.bytes().map_err(|e| Error::Feed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl FeedSource for TrafikLab {
    fn download_static(&self) -> Result<(), Error> {
        let bytes = self.fetch(&self.static_url)?;
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| Error::Feed(e.to_string()))?;
        archive.extract(&self.data_dir).map_err(|e| Error::Feed(e.to_string()))?;
        info!(dir = %self.data_dir.display(), "extracted static feed");
        Ok(())
    }

    fn service_alerts(&self) -> Result<Vec<u8>, Error> {
        self.fetch(&self.service_alerts_url)
    }

    fn trip_updates(&self) -> Result<Vec<u8>, Error> {
        self.fetch(&self.trip_updates_url)
    }

    fn vehicle_positions(&self) -> Result<Vec<u8>, Error> {
        self.fetch(&self.vehicle_positions_url)
    }
}
