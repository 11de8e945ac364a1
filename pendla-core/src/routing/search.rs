//! Walk-reachable endpoints, seed departures and search orchestration.

use chrono::{Local, Timelike};
use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::debug;
use serde::Deserialize;

use crate::{
    EngineConfig,
    geo::haversine,
    model::{RouteId, StopId, Time, TransitIndex, TripId},
    routing::{
        journey::{self, Journey},
        raptor::{self, RaptorError, RaptorLabels},
    },
    time::str_to_seconds,
};

/// A point-to-point query. Coordinates are `(lat, lon)`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub origin: (f64, f64),
    pub destination: (f64, f64),
    /// `HH:MM:SS`, or absent for "now".
    #[serde(default)]
    pub departure_time: Option<String>,
}

/// Answer one query against the current index.
pub fn search(
    index: &TransitIndex,
    request: &SearchRequest,
    config: &EngineConfig,
) -> Result<Vec<Journey>, RaptorError> {
    let departure = match &request.departure_time {
        Some(s) => str_to_seconds(s).map_err(|_| RaptorError::InvalidTime)?,
        None => Local::now().time().num_seconds_from_midnight(),
    };

    let starting = walk_reachable(index, request.origin, config);
    let ending = walk_reachable(index, request.destination, config);
    debug!("{} starting stops, {} ending stops", starting.len(), ending.len());
    if starting.is_empty() || ending.is_empty() {
        return Ok(Vec::new());
    }

    let starting = prune_starting_stops(index, starting);
    let seeds = seed_departures(index, &starting, departure);
    debug!("{} seed departures", seeds.len());

    let labels: Vec<RaptorLabels> = seeds
        .iter()
        .map(|&seed| raptor::run(index, &starting, seed, config.max_raptor_rounds))
        .collect();

    journey::collect(index, &labels, &starting, &ending)
}

/// Stops within the walking radius of a coordinate with their penalized walk
/// seconds, closest first.
fn walk_reachable(
    index: &TransitIndex,
    (lat, lon): (f64, f64),
    config: &EngineConfig,
) -> Vec<(StopId, Time)> {
    let points: Vec<Point<f64>> = index.stops.iter().map(|s| s.geometry).collect();
    let walk_seconds_per_km = 3600.0 / config.walk_speed * config.walk_penalty;

    let mut reachable: Vec<(StopId, Time)> = haversine(Point::new(lon, lat), &points)
        .into_iter()
        .enumerate()
        .filter(|&(_, dist)| dist < config.max_walk_radius)
        .map(|(stop, dist)| (stop, (dist * walk_seconds_per_km).round() as Time))
        .collect();
    reachable.sort_by_key(|&(_, walk)| walk);
    reachable
}

/// Keep, per route, only the starting stop with the smallest walk time. A
/// slower-walk seed on the same route can never board an earlier trip, so
/// nothing Pareto-optimal is lost.
fn prune_starting_stops(index: &TransitIndex, starting: Vec<(StopId, Time)>) -> Vec<(StopId, Time)> {
    let mut best_for_route: HashMap<RouteId, StopId> = HashMap::new();
    for &(stop, _) in &starting {
        for &rid in index.routes_for_stop(stop) {
            best_for_route.entry(rid).or_insert(stop);
        }
    }
    let keep: HashSet<StopId> = best_for_route.into_values().collect();
    starting.into_iter().filter(|(stop, _)| keep.contains(stop)).collect()
}

/// Seed departure times: the earliest boardable departure of each unique
/// trip within a one-hour horizon, expressed as an effective
/// start-from-origin time, then coalesced to at most one seed per 600 s.
fn seed_departures(index: &TransitIndex, starting: &[(StopId, Time)], departure: Time) -> Vec<Time> {
    let mut per_trip: HashMap<TripId, Time> = HashMap::new();
    for &(stop, walk) in starting {
        let stop_deps = &index.stop_departures[stop];
        let earliest = departure + walk;
        let from = stop_deps.times.partition_point(|&t| t < earliest);
        for i in from..stop_deps.times.len() {
            if stop_deps.times[i] - earliest > 3600 {
                break;
            }
            per_trip
                .entry(stop_deps.trips[i])
                .or_insert_with(|| stop_deps.times[i].saturating_sub(walk));
        }
    }

    let mut departures: Vec<Time> = per_trip.into_values().collect();
    departures.sort_unstable();

    let mut seeds: Vec<Time> = Vec::new();
    for t in departures {
        if seeds.last().map_or(true, |&last| t - last > 600) {
            seeds.push(t);
        }
    }
    seeds
}
