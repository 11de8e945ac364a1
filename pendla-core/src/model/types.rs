use geo::Point;

/// Seconds since local midnight of the service day; values past 86400 belong
/// to the early hours of the next calendar day.
pub type Time = u32;

/// Dense index of a stop in [`crate::TransitIndex::stops`].
pub type StopId = usize;

/// Dense index of a trip in [`crate::TransitIndex::trips`].
pub type TripId = usize;

/// Dense index of a route class: trips visiting the same ordered stop
/// sequence share one route.
pub type RouteId = usize;

#[derive(Debug, Clone)]
pub struct Stop {
    /// Feed identifier.
    pub stop_id: String,
    pub stop_name: String,
    pub platform_code: Option<String>,
    pub geometry: Point<f64>,
}

#[derive(Debug, Clone)]
pub struct Trip {
    /// Feed identifier.
    pub trip_id: String,
    pub route: RouteId,
    pub route_name: String,
    /// Arrival seconds per position along the route.
    pub arrivals: Vec<Time>,
    /// Departure seconds per position along the route.
    pub departures: Vec<Time>,
}

/// One class of trips sharing an ordered stop sequence.
#[derive(Debug, Clone)]
pub struct Route {
    /// Stops in visiting order; a stop may repeat.
    pub stops: Vec<StopId>,
    /// Departure times per position, ascending within each position.
    pub departures: Vec<Vec<Time>>,
    /// Trips per position, aligned with `departures`.
    pub trips: Vec<Vec<TripId>>,
}

/// Departures from one stop across all routes, sorted by time.
#[derive(Debug, Clone, Default)]
pub struct StopDepartures {
    pub times: Vec<Time>,
    /// Aligned with `times`.
    pub trips: Vec<TripId>,
}

/// A walkable edge to another stop.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    pub target_stop: StopId,
    pub duration: Time,
}
