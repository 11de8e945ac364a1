//! Applies GTFS-realtime trip-update deltas to the live index.

use gtfs_realtime::FeedMessage;
use hashbrown::HashSet;
use log::warn;
use prost::Message;

use crate::{
    Error,
    model::{StopId, Time, TransitIndex, TripId},
};

/// One stop-level delta from a trip update. Times are epoch seconds.
#[derive(Debug, Clone)]
pub struct StopTimePatch {
    pub stop_id: String,
    pub stop_sequence: u32,
    pub arrival_epoch: i64,
    pub departure_epoch: i64,
}

#[derive(Debug, Clone)]
pub struct TripPatch {
    pub trip_id: String,
    pub stop_updates: Vec<StopTimePatch>,
}

/// Decode a TripUpdates protobuf payload. Updates missing ids or times are
/// skipped; a payload that does not decode at all is an error.
pub fn decode_trip_updates(bytes: &[u8]) -> Result<Vec<TripPatch>, Error> {
    let feed = FeedMessage::decode(bytes)?;
    let mut patches = Vec::new();
    for entity in feed.entity {
        let Some(update) = entity.trip_update else { continue };
        let Some(trip_id) = update.trip.trip_id.clone() else {
            warn!("trip update entity {} has no trip_id", entity.id);
            continue;
        };
        let mut stop_updates = Vec::new();
        for stu in update.stop_time_update {
            let (Some(stop_id), Some(stop_sequence)) = (stu.stop_id.clone(), stu.stop_sequence)
            else {
                warn!("trip {trip_id}: stop time update without stop_id or stop_sequence");
                continue;
            };
            let (Some(arrival_epoch), Some(departure_epoch)) = (
                stu.arrival.as_ref().and_then(|e| e.time),
                stu.departure.as_ref().and_then(|e| e.time),
            ) else {
                warn!("trip {trip_id}: stop time update without arrival or departure time");
                continue;
            };
            stop_updates.push(StopTimePatch { stop_id, stop_sequence, arrival_epoch, departure_epoch });
        }
        patches.push(TripPatch { trip_id, stop_updates });
    }
    Ok(patches)
}

/// Apply a batch of trip patches to the index in place.
///
/// `midnight_epoch` is the epoch second of local midnight of the service
/// day; realtime times are converted to seconds-of-day against it. Unknown
/// trips or stops and out-of-range sequences are skipped, never fatal.
pub fn apply_trip_updates(index: &mut TransitIndex, patches: &[TripPatch], midnight_epoch: i64) {
    let mut touched_positions: HashSet<(usize, usize)> = HashSet::new();
    let mut touched_stops: HashSet<StopId> = HashSet::new();

    for patch in patches {
        let Some(&trip) = index.trip_lookup.get(patch.trip_id.as_str()) else {
            warn!("realtime update for unknown trip {}", patch.trip_id);
            continue;
        };
        for su in &patch.stop_updates {
            let arrival = su.arrival_epoch - midnight_epoch;
            let departure = su.departure_epoch - midnight_epoch;
            if arrival < 0 || departure < 0 {
                warn!("trip {}: realtime times before the service day", patch.trip_id);
                continue;
            }
            let (arrival, departure) = (arrival as Time, departure as Time);

            let pos = su.stop_sequence as usize;
            if pos == 0 || pos > index.trips[trip].arrivals.len() {
                warn!("trip {}: stop_sequence {} out of range", patch.trip_id, su.stop_sequence);
                continue;
            }
            let pos = pos - 1;
            index.trips[trip].arrivals[pos] = arrival;
            index.trips[trip].departures[pos] = departure;

            // the trip's slot in the per-position list is fixed at build time
            let rid = index.trips[trip].route;
            if let Some(rank) = index.routes[rid].trips[pos].iter().position(|&t| t == trip) {
                index.routes[rid].departures[pos][rank] = departure;
                touched_positions.insert((rid, pos));
            }

            match index.stop_lookup.get(su.stop_id.as_str()) {
                Some(&stop) => {
                    let sd = &mut index.stop_departures[stop];
                    if let Some(i) = sd.trips.iter().position(|&t| t == trip) {
                        sd.times[i] = departure;
                        touched_stops.insert(stop);
                    }
                }
                None => warn!("trip {}: realtime update for unknown stop {}", patch.trip_id, su.stop_id),
            }
        }
    }

    // binary search over these lists requires ascending order; a large delay
    // can push an entry past its neighbour
    for (rid, pos) in touched_positions {
        let route = &mut index.routes[rid];
        if !route.departures[pos].is_sorted() {
            warn!("realtime patch broke departure order on route {rid} at position {pos}");
            resort_aligned(&mut route.departures[pos], &mut route.trips[pos]);
        }
    }
    for stop in touched_stops {
        if !index.stop_departures[stop].times.is_sorted() {
            warn!("realtime patch broke departure order at stop {}", index.stops[stop].stop_id);
            let sd = &mut index.stop_departures[stop];
            resort_aligned(&mut sd.times, &mut sd.trips);
        }
    }
}

fn resort_aligned(times: &mut Vec<Time>, trips: &mut Vec<TripId>) {
    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by_key(|&i| times[i]);
    *times = order.iter().map(|&i| times[i]).collect();
    *trips = order.iter().map(|&i| trips[i]).collect();
}
