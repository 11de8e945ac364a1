//! Derives the routing index from the raw feed tables.

use chrono::NaiveDate;
use geo::Point;
use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    EngineConfig, Error,
    geo::haversine,
    loading::gtfs::{FeedStopTime, FeedTables},
    model::{Route, RouteId, Stop, StopDepartures, StopId, Time, Transfer, TransitIndex, Trip, TripId},
};

fn date_num(date: NaiveDate) -> u32 {
    date.format("%Y%m%d").to_string().parse().unwrap_or(0)
}

/// Build the timetable index for one service day.
///
/// Stop times departing before 86400 are matched against the service day
/// itself, later ones against the next calendar day, so that late-night
/// trips of the previous service day stay searchable.
pub fn build_timetable(
    tables: &FeedTables,
    service_day: NaiveDate,
    config: &EngineConfig,
) -> Result<TransitIndex, Error> {
    let today = date_num(service_day);
    let tomorrow = service_day
        .succ_opt()
        .map(date_num)
        .ok_or_else(|| Error::InvalidData("service day out of range".into()))?;

    // services running per (service_id, date)
    let active: HashSet<(&str, u32)> = tables
        .calendar_dates
        .iter()
        .filter(|cd| cd.exception_type == 1)
        .map(|cd| (cd.service_id.as_str(), cd.date))
        .collect();

    let trip_info: HashMap<&str, (&str, &str)> = tables
        .trips
        .iter()
        .map(|t| (t.trip_id.as_str(), (t.service_id.as_str(), t.route_id.as_str())))
        .collect();

    let surviving: Vec<&FeedStopTime> = tables
        .stop_times
        .iter()
        .filter(|st| {
            let Some(&(service_id, _)) = trip_info.get(st.trip_id.as_str()) else {
                return false;
            };
            let date = if st.departure_time < 86400 { today } else { tomorrow };
            active.contains(&(service_id, date))
        })
        .collect();
    if surviving.is_empty() {
        warn!("no stop times are active on {service_day}; building an empty index");
    }

    // only stops referenced by a surviving stop time are kept
    let referenced: HashSet<&str> = surviving.iter().map(|st| st.stop_id.as_str()).collect();
    let mut stops: Vec<Stop> = Vec::with_capacity(referenced.len());
    let mut stop_lookup: HashMap<String, StopId> = HashMap::with_capacity(referenced.len());
    for fs in &tables.stops {
        if referenced.contains(fs.stop_id.as_str()) && !stop_lookup.contains_key(fs.stop_id.as_str()) {
            stop_lookup.insert(fs.stop_id.clone(), stops.len());
            stops.push(Stop {
                stop_id: fs.stop_id.clone(),
                stop_name: fs.stop_name.clone(),
                platform_code: fs.platform_code.clone(),
                geometry: Point::new(fs.stop_lon, fs.stop_lat),
            });
        }
    }

    let mut by_trip: HashMap<&str, Vec<&FeedStopTime>> = HashMap::new();
    let mut orphans = 0usize;
    for &st in &surviving {
        if stop_lookup.contains_key(st.stop_id.as_str()) {
            by_trip.entry(st.trip_id.as_str()).or_default().push(st);
        } else {
            orphans += 1;
        }
    }
    if orphans > 0 {
        warn!("{orphans} stop times reference stops missing from stops.txt");
    }
    for rows in by_trip.values_mut() {
        rows.sort_by_key(|st| st.stop_sequence);
    }

    let route_names: HashMap<&str, String> = tables
        .routes
        .iter()
        .map(|r| (r.route_id.as_str(), format!("{} {}", r.route_desc, r.route_short_name)))
        .collect();

    // one dense route id per distinct ordered stop sequence
    let mut trips: Vec<Trip> = Vec::with_capacity(by_trip.len());
    let mut trip_lookup: HashMap<String, TripId> = HashMap::with_capacity(by_trip.len());
    let mut rid_by_sequence: HashMap<Vec<StopId>, RouteId> = HashMap::new();
    let mut route_sequences: Vec<Vec<StopId>> = Vec::new();
    let mut route_members: Vec<Vec<TripId>> = Vec::new();

    for (trip_id, rows) in by_trip.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        let sequence: Vec<StopId> = rows.iter().map(|st| stop_lookup[st.stop_id.as_str()]).collect();
        let rid = *rid_by_sequence.entry(sequence.clone()).or_insert_with(|| {
            route_sequences.push(sequence.clone());
            route_members.push(Vec::new());
            route_sequences.len() - 1
        });

        let tid = trips.len();
        trip_lookup.insert(trip_id.to_string(), tid);
        route_members[rid].push(tid);
        let (_, route_id) = trip_info[trip_id];
        trips.push(Trip {
            trip_id: trip_id.to_string(),
            route: rid,
            route_name: route_names.get(route_id).cloned().unwrap_or_default(),
            arrivals: rows.iter().map(|st| st.arrival_time).collect(),
            departures: rows.iter().map(|st| st.departure_time).collect(),
        });
    }

    // per-position departure lists, sorted so binary search stays valid even
    // if trips on a route overtake one another
    let mut routes: Vec<Route> = Vec::with_capacity(route_sequences.len());
    for (rid, sequence) in route_sequences.into_iter().enumerate() {
        let mut members = route_members[rid].clone();
        members.sort_by_key(|&t| trips[t].departures.first().copied().unwrap_or(Time::MAX));

        let mut departures = Vec::with_capacity(sequence.len());
        let mut trips_by_pos = Vec::with_capacity(sequence.len());
        for pos in 0..sequence.len() {
            let mut pairs: Vec<(Time, TripId)> =
                members.iter().map(|&t| (trips[t].departures[pos], t)).collect();
            pairs.sort_by_key(|&(dep, _)| dep);
            departures.push(pairs.iter().map(|&(dep, _)| dep).collect());
            trips_by_pos.push(pairs.iter().map(|&(_, t)| t).collect());
        }
        routes.push(Route { stops: sequence, departures, trips: trips_by_pos });
    }

    let mut stop_routes: Vec<Vec<RouteId>> = vec![Vec::new(); stops.len()];
    let mut route_stop_pos: HashMap<(RouteId, StopId), usize> = HashMap::new();
    for (rid, route) in routes.iter().enumerate() {
        for (pos, &stop) in route.stops.iter().enumerate() {
            route_stop_pos.entry((rid, stop)).or_insert(pos);
            if !stop_routes[stop].contains(&rid) {
                stop_routes[stop].push(rid);
            }
        }
    }

    let mut per_stop: Vec<Vec<(Time, TripId)>> = vec![Vec::new(); stops.len()];
    for (tid, trip) in trips.iter().enumerate() {
        for (pos, &stop) in routes[trip.route].stops.iter().enumerate() {
            per_stop[stop].push((trip.departures[pos], tid));
        }
    }
    let stop_departures: Vec<StopDepartures> = per_stop
        .into_iter()
        .map(|mut pairs| {
            pairs.sort_by_key(|&(dep, _)| dep);
            StopDepartures {
                times: pairs.iter().map(|&(dep, _)| dep).collect(),
                trips: pairs.iter().map(|&(_, t)| t).collect(),
            }
        })
        .collect();

    let transits = discover_transits(&stops, &stop_lookup, tables, config);

    info!(
        "timetable for {service_day}: {} stops, {} trips, {} routes",
        stops.len(),
        trips.len(),
        routes.len()
    );

    // CSV deserialization leaves a lot of freed memory at the tail of the
    // heap; hand it back to the system
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("malloc_trim failed");
        }
    }

    Ok(TransitIndex {
        stops,
        trips,
        routes,
        stop_routes,
        route_stop_pos,
        stop_departures,
        transits,
        stop_lookup,
        trip_lookup,
        service_day,
    })
}

/// Footpaths: haversine estimates for all pairs within the walking radius,
/// overwritten by the feed's explicit transfers.
fn discover_transits(
    stops: &[Stop],
    stop_lookup: &HashMap<String, StopId>,
    tables: &FeedTables,
    config: &EngineConfig,
) -> Vec<Vec<Transfer>> {
    use rayon::prelude::*;

    let points: Vec<Point<f64>> = stops.iter().map(|s| s.geometry).collect();
    let walk_seconds_per_km = 3600.0 / config.walk_speed * config.walk_penalty;

    let mut estimated: Vec<HashMap<StopId, Time>> = points
        .par_iter()
        .enumerate()
        .map(|(i, &p)| {
            haversine(p, &points)
                .into_iter()
                .enumerate()
                .filter(|&(j, dist)| i != j && dist < config.max_walk_radius)
                .map(|(j, dist)| (j, (dist * walk_seconds_per_km).round() as Time))
                .collect()
        })
        .collect();

    for tr in &tables.transfers {
        let (Some(&from), Some(&to)) = (
            stop_lookup.get(tr.from_stop_id.as_str()),
            stop_lookup.get(tr.to_stop_id.as_str()),
        ) else {
            continue;
        };
        if from != to {
            estimated[from].insert(to, tr.min_transfer_time.unwrap_or(0));
        }
    }

    estimated
        .into_iter()
        .map(|edges| {
            edges
                .into_iter()
                .sorted_by_key(|&(target, _)| target)
                .map(|(target_stop, duration)| Transfer { target_stop, duration })
                .collect()
        })
        .collect()
}
