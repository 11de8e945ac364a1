//! The in-memory timetable index shared by the query path and the
//! realtime patcher.

use chrono::NaiveDate;
use hashbrown::HashMap;

use super::types::{Route, RouteId, Stop, StopDepartures, StopId, Time, Transfer, Trip, TripId};

/// Every derived structure the router needs, rebuilt in full by each static
/// refresh and mutated in place by realtime patches.
#[derive(Debug, Clone)]
pub struct TransitIndex {
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub routes: Vec<Route>,
    /// Routes serving each stop.
    pub stop_routes: Vec<Vec<RouteId>>,
    /// First position of a stop along a route.
    pub route_stop_pos: HashMap<(RouteId, StopId), usize>,
    /// All departures from each stop, sorted by time.
    pub stop_departures: Vec<StopDepartures>,
    /// Walkable edges from each stop.
    pub transits: Vec<Vec<Transfer>>,
    /// Feed stop id to dense index.
    pub stop_lookup: HashMap<String, StopId>,
    /// Feed trip id to dense index.
    pub trip_lookup: HashMap<String, TripId>,
    /// The day this index was built for.
    pub service_day: NaiveDate,
}

impl TransitIndex {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub(crate) fn routes_for_stop(&self, stop: StopId) -> &[RouteId] {
        &self.stop_routes[stop]
    }

    pub(crate) fn transfers_from(&self, stop: StopId) -> &[Transfer] {
        &self.transits[stop]
    }

    /// Departure of `trip` at the first occurrence of `stop` along its route.
    pub(crate) fn trip_departure_at(&self, trip: TripId, stop: StopId) -> Option<Time> {
        let t = &self.trips[trip];
        let pos = self.routes[t.route].stops.iter().position(|&s| s == stop)?;
        t.departures.get(pos).copied()
    }

    /// Walking seconds of the footpath `from -> to`, if one exists.
    pub(crate) fn walk_seconds(&self, from: StopId, to: StopId) -> Option<Time> {
        self.transits[from]
            .iter()
            .find(|t| t.target_stop == to)
            .map(|t| t.duration)
    }
}
