//! Round-based earliest-arrival search for a single seed departure.

mod state;

pub use state::{Label, RaptorError, RaptorLabels, Via};

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;

use crate::model::{RouteId, StopId, Time, TransitIndex, TripId};

/// Run the round-based search from the given starting stops at one seed
/// departure time. Round 0 holds the origin walks; every further round adds
/// one boarding.
pub fn run(
    index: &TransitIndex,
    starting: &[(StopId, Time)],
    seed: Time,
    max_rounds: usize,
) -> RaptorLabels {
    let num_stops = index.num_stops();
    let mut labels = RaptorLabels::new(num_stops, max_rounds);
    let mut marked = FixedBitSet::with_capacity(num_stops);

    for &(stop, walk) in starting {
        let arrival = seed + walk;
        if arrival < labels.best[stop] {
            labels.improve(0, stop, Label { arrival, via: Via::Seed });
            marked.insert(stop);
        }
    }

    for round in 1..=max_rounds {
        // routes serving a marked stop, keyed to the earliest marked position
        let mut queue: HashMap<RouteId, usize> = HashMap::new();
        for stop in marked.ones() {
            for &rid in index.routes_for_stop(stop) {
                let pos = index.route_stop_pos[&(rid, stop)];
                queue.entry(rid).and_modify(|p| *p = (*p).min(pos)).or_insert(pos);
            }
        }

        let mut trip_marked = FixedBitSet::with_capacity(num_stops);
        for (&rid, &start_pos) in &queue {
            scan_route(index, &mut labels, &mut trip_marked, round, rid, start_pos);
        }

        // relax footpaths from stops reached by riding; the sources are
        // snapshotted first so walks never chain within a round
        let sources: Vec<(StopId, Time)> = trip_marked
            .ones()
            .filter_map(|stop| labels.rounds[round][stop].map(|l| (stop, l.arrival)))
            .collect();
        let mut foot_marked = FixedBitSet::with_capacity(num_stops);
        for (stop, arrival) in sources {
            for transfer in index.transfers_from(stop) {
                let reached = arrival.saturating_add(transfer.duration);
                if reached < labels.best[transfer.target_stop] {
                    labels.improve(
                        round,
                        transfer.target_stop,
                        Label { arrival: reached, via: Via::Walked { from: stop } },
                    );
                    foot_marked.insert(transfer.target_stop);
                }
            }
        }

        marked = trip_marked;
        marked.union_with(&foot_marked);
        if marked.is_clear() {
            break;
        }
    }

    labels
}

/// Traverse one route from `start_pos`, improving downstream stops with the
/// held trip and re-boarding wherever an earlier catchable trip exists.
/// Positions are recomputed per stop; nothing is carried across a trip
/// switch.
fn scan_route(
    index: &TransitIndex,
    labels: &mut RaptorLabels,
    trip_marked: &mut FixedBitSet,
    round: usize,
    rid: RouteId,
    start_pos: usize,
) {
    let route = &index.routes[rid];
    let mut held: Option<(TripId, StopId)> = None;

    for (pos, &stop) in route.stops.iter().enumerate().skip(start_pos) {
        if let Some((trip, boarded_at)) = held {
            let arrival = index.trips[trip].arrivals[pos];
            if arrival < labels.best[stop] {
                labels.improve(
                    round,
                    stop,
                    Label { arrival, via: Via::Boarded { trip, from: boarded_at } },
                );
                trip_marked.insert(stop);
            }
        }

        // board here if the previous round reached this stop before the held
        // trip departs (or no trip is held yet)
        let Some(prev) = labels.rounds[round - 1][stop] else { continue };
        let can_board = match held {
            None => true,
            Some((trip, _)) => prev.arrival <= index.trips[trip].departures[pos],
        };
        if can_board {
            let departures = &route.departures[pos];
            let rank = departures.partition_point(|&d| d < prev.arrival);
            held = route.trips[pos].get(rank).map(|&trip| (trip, stop));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Via, run};
    use crate::testutil::fixture;

    #[test]
    fn direct_ride_labels_every_downstream_stop_in_round_one() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let b = index.stop_lookup["B"];
        let c = index.stop_lookup["C"];
        let t1 = index.trip_lookup["T1"];

        // seed 07:55 at Alpha
        let labels = run(&index, &[(a, 0)], 28500, 3);
        assert_eq!(labels.best[b], 29400);
        assert_eq!(labels.best[c], 30000);

        let label = labels.rounds[1][c].unwrap();
        assert_eq!(label.arrival, 30000);
        assert_eq!(label.via, Via::Boarded { trip: t1, from: a });
    }

    #[test]
    fn transfer_via_footpath_needs_a_second_round() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let b = index.stop_lookup["B"];
        let b2 = index.stop_lookup["B2"];
        let d = index.stop_lookup["D"];
        let t3 = index.trip_lookup["T3"];

        let labels = run(&index, &[(a, 0)], 28500, 3);
        // walked B -> B2 in round 1, rode T3 in round 2
        assert_eq!(labels.rounds[1][b2].unwrap().via, Via::Walked { from: b });
        assert_eq!(labels.best[d], 30300);
        assert_eq!(labels.rounds[2][d].unwrap().via, Via::Boarded { trip: t3, from: b2 });
    }

    #[test]
    fn late_seed_misses_the_last_connection() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let d = index.stop_lookup["D"];

        // T2 reaches Beta at 08:40, long after T3 left
        let labels = run(&index, &[(a, 0)], 30600, 3);
        assert_eq!(labels.best[d], u32::MAX);
        assert!(labels.rounds.iter().all(|round| round[d].is_none()));
    }

    #[test]
    fn star_label_bounds_every_round_label() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let labels = run(&index, &[(a, 0)], 28500, 3);
        for round in &labels.rounds {
            for (stop, label) in round.iter().enumerate() {
                if let Some(label) = label {
                    assert!(labels.best[stop] <= label.arrival);
                }
            }
        }
    }
}
