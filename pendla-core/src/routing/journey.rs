//! Journey reconstruction and deduplication from RAPTOR labels.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::error;
use serde::Serialize;

use crate::model::{StopId, Time, TransitIndex};
use crate::routing::raptor::{RaptorError, RaptorLabels, Via};

const WALKING: &str = "walking";

/// One walk or ride between two named stops.
#[derive(Debug, Clone, Serialize)]
pub struct Leg {
    pub from_stop_name: String,
    pub from_platform_code: Option<String>,
    pub departure_time: Time,
    pub to_stop_name: String,
    pub to_platform_code: Option<String>,
    pub arrival_time: Time,
    pub route_name: String,
}

/// A complete origin-to-destination journey.
#[derive(Debug, Clone, Serialize)]
pub struct Journey {
    pub path: Vec<Leg>,
    pub n_transfers: usize,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub total_duration: Time,
}

/// Build every journey the label sets admit, then keep the earliest-arriving
/// one per distinct departure time, ordered by departure.
pub(crate) fn collect(
    index: &TransitIndex,
    labels_list: &[RaptorLabels],
    starting: &[(StopId, Time)],
    ending: &[(StopId, Time)],
) -> Result<Vec<Journey>, RaptorError> {
    let start_walk: HashMap<StopId, Time> = starting.iter().copied().collect();

    let mut best_by_departure: HashMap<Time, Journey> = HashMap::new();
    for labels in labels_list {
        for &(end_stop, end_walk) in ending {
            for round in 0..labels.rounds.len() {
                if labels.rounds[round][end_stop].is_none() {
                    continue;
                }
                let Some(journey) = reconstruct(index, labels, &start_walk, end_stop, end_walk, round)?
                else {
                    continue;
                };
                match best_by_departure.entry(journey.departure_time) {
                    Entry::Occupied(mut entry) => {
                        if journey.arrival_time < entry.get().arrival_time {
                            entry.insert(journey);
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(journey);
                    }
                }
            }
        }
    }

    let mut journeys: Vec<Journey> = best_by_departure.into_values().collect();
    journeys.sort_by_key(|j| j.departure_time);
    Ok(journeys)
}

/// Walk the label chain backwards from `end_stop` at `round`. Ride legs step
/// down one round, walking legs stay in theirs. Returns `None` for the
/// degenerate round-0 chain (no boarding at all).
fn reconstruct(
    index: &TransitIndex,
    labels: &RaptorLabels,
    start_walk: &HashMap<StopId, Time>,
    end_stop: StopId,
    end_walk: Time,
    round: usize,
) -> Result<Option<Journey>, RaptorError> {
    let mut legs: Vec<Leg> = Vec::new();
    let mut k = round;
    let mut to = end_stop;

    while k > 0 {
        let Some(label) = labels.rounds[k][to] else {
            error!("label chain broken at stop {to} in round {k}");
            return Err(RaptorError::InvalidJourney);
        };
        match label.via {
            Via::Seed => break,
            Via::Boarded { trip, from } => {
                let departure =
                    index.trip_departure_at(trip, from).ok_or(RaptorError::InvalidJourney)?;
                legs.push(make_leg(
                    index,
                    from,
                    to,
                    departure,
                    label.arrival,
                    index.trips[trip].route_name.clone(),
                ));
                to = from;
                k -= 1;
            }
            Via::Walked { from } => {
                // mid-journey footpaths are timed by their own edge weight;
                // the walking step that lands on the ending stop is timed by
                // the destination walk
                let walk = if to == end_stop {
                    end_walk
                } else {
                    index.walk_seconds(from, to).ok_or(RaptorError::InvalidJourney)?
                };
                legs.push(make_leg(
                    index,
                    from,
                    to,
                    label.arrival.saturating_sub(walk),
                    label.arrival,
                    WALKING.to_string(),
                ));
                to = from;
            }
        }
    }

    if legs.is_empty() {
        return Ok(None);
    }
    legs.reverse();

    // `to` is now the stop the journey boards from
    let Some(&origin_walk) = start_walk.get(&to) else {
        error!("journey starts at stop {to} which is not a starting stop");
        return Err(RaptorError::InvalidJourney);
    };

    let first_departure = legs[0].departure_time;
    let mut path = Vec::with_capacity(legs.len() + 2);
    path.push(Leg {
        from_stop_name: "origin".to_string(),
        from_platform_code: None,
        departure_time: first_departure.saturating_sub(origin_walk),
        to_stop_name: legs[0].from_stop_name.clone(),
        to_platform_code: legs[0].from_platform_code.clone(),
        arrival_time: first_departure,
        route_name: WALKING.to_string(),
    });
    path.extend(legs);

    let (tail_name, tail_code, last_arrival) = {
        let tail = &path[path.len() - 1];
        (tail.to_stop_name.clone(), tail.to_platform_code.clone(), tail.arrival_time)
    };
    path.push(Leg {
        from_stop_name: tail_name,
        from_platform_code: tail_code,
        departure_time: last_arrival,
        to_stop_name: "destination".to_string(),
        to_platform_code: None,
        arrival_time: last_arrival + end_walk,
        route_name: WALKING.to_string(),
    });

    let departure_time = path[0].departure_time;
    let arrival_time = path[path.len() - 1].arrival_time;
    Ok(Some(Journey {
        n_transfers: round.saturating_sub(1),
        departure_time,
        arrival_time,
        total_duration: arrival_time - departure_time,
        path,
    }))
}

fn make_leg(
    index: &TransitIndex,
    from: StopId,
    to: StopId,
    departure_time: Time,
    arrival_time: Time,
    route_name: String,
) -> Leg {
    let from_stop = &index.stops[from];
    let to_stop = &index.stops[to];
    Leg {
        from_stop_name: from_stop.stop_name.clone(),
        from_platform_code: from_stop.platform_code.clone(),
        departure_time,
        to_stop_name: to_stop.stop_name.clone(),
        to_platform_code: to_stop.platform_code.clone(),
        arrival_time,
        route_name,
    }
}

#[cfg(test)]
mod tests {
    use super::collect;
    use crate::routing::raptor;
    use crate::testutil::fixture;

    #[test]
    fn legs_chain_through_named_stops() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let d = index.stop_lookup["D"];

        let labels = raptor::run(&index, &[(a, 0)], 28500, 3);
        let journeys = collect(&index, &[labels], &[(a, 0)], &[(d, 0)]).unwrap();
        assert_eq!(journeys.len(), 1);

        let journey = &journeys[0];
        assert_eq!(journey.n_transfers, 1);
        assert_eq!(journey.departure_time, 28800);
        assert_eq!(journey.arrival_time, 30300);
        assert_eq!(journey.total_duration, 1500);

        // origin walk, ride, footpath, ride, destination walk
        assert_eq!(journey.path.len(), 5);
        assert_eq!(journey.path[0].from_stop_name, "origin");
        assert_eq!(journey.path[2].route_name, "walking");
        assert_eq!(journey.path[2].departure_time, 29400);
        assert_eq!(journey.path[2].arrival_time, 29430);
        assert_eq!(journey.path[4].to_stop_name, "destination");
        for pair in journey.path.windows(2) {
            assert_eq!(pair[0].to_stop_name, pair[1].from_stop_name);
            assert_eq!(pair[0].to_platform_code, pair[1].from_platform_code);
        }

        // the 270 s wait at Beta East before T3 departs belongs to no leg
        let leg_sum: u32 = journey.path.iter().map(|l| l.arrival_time - l.departure_time).sum();
        assert_eq!(journey.total_duration - leg_sum, 270);
    }

    #[test]
    fn walking_into_the_ending_stop_is_timed_by_the_destination_walk() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let b2 = index.stop_lookup["B2"];

        // Beta East is reached by the footpath only; the destination itself
        // is a further 60 s walk from it
        let labels = raptor::run(&index, &[(a, 0)], 28500, 3);
        let journeys = collect(&index, &[labels], &[(a, 0)], &[(b2, 60)]).unwrap();
        assert_eq!(journeys.len(), 1);

        let journey = &journeys[0];
        let walk_leg = &journey.path[journey.path.len() - 2];
        assert_eq!(walk_leg.route_name, "walking");
        assert_eq!(walk_leg.to_stop_name, "Beta East");
        assert_eq!(walk_leg.arrival_time, 29430);
        // departure derives from the 60 s destination walk, not the 30 s
        // footpath weight
        assert_eq!(walk_leg.departure_time, 29370);
        assert_eq!(journey.arrival_time, 29490);
        assert_eq!(journey.n_transfers, 0);
    }

    #[test]
    fn duplicate_departures_keep_the_earliest_arrival() {
        let index = fixture();
        let a = index.stop_lookup["A"];
        let c = index.stop_lookup["C"];

        // two identical label sets produce the same journeys twice
        let labels_a = raptor::run(&index, &[(a, 0)], 28500, 3);
        let labels_b = raptor::run(&index, &[(a, 0)], 28500, 3);
        let journeys = collect(&index, &[labels_a, labels_b], &[(a, 0)], &[(c, 0)]).unwrap();

        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].departure_time, 28800);
        assert_eq!(journeys[0].arrival_time, 30000);
        assert!(journeys.windows(2).all(|w| w[0].departure_time < w[1].departure_time));
    }
}
