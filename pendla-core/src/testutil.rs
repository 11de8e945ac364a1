//! Miniature network shared by the test suites: one line Alpha-Beta-Gamma
//! with two departures, one line Beta East-Delta, and a 30 s footpath
//! between the co-located Beta and Beta East.

use chrono::NaiveDate;

use crate::loading::gtfs::{
    FeedCalendarDate, FeedRoute, FeedStop, FeedStopTime, FeedTables, FeedTransfer, FeedTrip,
};
use crate::model::TransitIndex;
use crate::time::seconds_to_str;
use crate::{EngineConfig, Time, loading::build_timetable};

pub(crate) const ALPHA: (f64, f64) = (55.60, 13.00);
pub(crate) const BETA: (f64, f64) = (55.62, 13.00);
pub(crate) const GAMMA: (f64, f64) = (55.64, 13.00);
pub(crate) const DELTA: (f64, f64) = (55.66, 13.00);

pub(crate) fn service_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
}

/// Scenario config: the walk penalty is neutral so expected times stay
/// whole numbers.
pub(crate) fn config() -> EngineConfig {
    EngineConfig { walk_penalty: 1.0, ..EngineConfig::default() }
}

pub(crate) fn stop(id: &str, name: &str, lat: f64, lon: f64, platform: Option<&str>) -> FeedStop {
    FeedStop {
        stop_id: id.to_string(),
        stop_name: name.to_string(),
        stop_lat: lat,
        stop_lon: lon,
        platform_code: platform.map(str::to_string),
    }
}

pub(crate) fn trip(id: &str, route: &str, service: &str) -> FeedTrip {
    FeedTrip {
        trip_id: id.to_string(),
        route_id: route.to_string(),
        service_id: service.to_string(),
    }
}

pub(crate) fn stop_time(trip: &str, stop: &str, seq: u32, arrival: Time, departure: Time) -> FeedStopTime {
    FeedStopTime {
        trip_id: trip.to_string(),
        stop_id: stop.to_string(),
        stop_sequence: seq,
        arrival_time: arrival,
        departure_time: departure,
    }
}

pub(crate) fn calendar_date(service: &str, date: u32, exception_type: u8) -> FeedCalendarDate {
    FeedCalendarDate { service_id: service.to_string(), date, exception_type }
}

pub(crate) fn fixture_tables() -> FeedTables {
    FeedTables {
        stops: vec![
            stop("A", "Alpha", ALPHA.0, ALPHA.1, Some("1")),
            stop("B", "Beta", BETA.0, BETA.1, Some("2")),
            stop("B2", "Beta East", BETA.0, BETA.1, Some("3")),
            stop("C", "Gamma", GAMMA.0, GAMMA.1, None),
            stop("D", "Delta", DELTA.0, DELTA.1, Some("1")),
        ],
        trips: vec![trip("T1", "R1", "wk"), trip("T2", "R1", "wk"), trip("T3", "R2", "wk")],
        routes: vec![
            FeedRoute {
                route_id: "R1".to_string(),
                route_desc: "Regionbuss".to_string(),
                route_short_name: "130".to_string(),
            },
            FeedRoute {
                route_id: "R2".to_string(),
                route_desc: "Stadsbuss".to_string(),
                route_short_name: "4".to_string(),
            },
        ],
        transfers: vec![
            FeedTransfer {
                from_stop_id: "B".to_string(),
                to_stop_id: "B2".to_string(),
                min_transfer_time: Some(30),
            },
            FeedTransfer {
                from_stop_id: "B2".to_string(),
                to_stop_id: "B".to_string(),
                min_transfer_time: Some(30),
            },
        ],
        stop_times: vec![
            // T1: 08:00 -> 08:10 -> 08:20
            stop_time("T1", "A", 1, 28800, 28800),
            stop_time("T1", "B", 2, 29400, 29400),
            stop_time("T1", "C", 3, 30000, 30000),
            // T2: 08:30 -> 08:40 -> 08:50
            stop_time("T2", "A", 1, 30600, 30600),
            stop_time("T2", "B", 2, 31200, 31200),
            stop_time("T2", "C", 3, 31800, 31800),
            // T3: 08:15 -> 08:25
            stop_time("T3", "B2", 1, 29700, 29700),
            stop_time("T3", "D", 2, 30300, 30300),
        ],
        calendar_dates: vec![calendar_date("wk", 20240506, 1)],
    }
}

pub(crate) fn fixture() -> TransitIndex {
    build_timetable(&fixture_tables(), service_day(), &config()).unwrap()
}

/// The fixture rendered as feed CSV files, with its service active on the
/// real current date so `Engine::start` picks it up.
pub(crate) fn fixture_csv_files() -> Vec<(&'static str, String)> {
    let tables = fixture_tables();
    let today = chrono::Local::now().date_naive();
    let tomorrow = today.succ_opt().unwrap();
    let date_num = |d: NaiveDate| d.format("%Y%m%d").to_string();

    let mut stops = String::from("stop_id,stop_name,stop_lat,stop_lon,platform_code\n");
    for s in &tables.stops {
        stops.push_str(&format!(
            "{},{},{},{},{}\n",
            s.stop_id,
            s.stop_name,
            s.stop_lat,
            s.stop_lon,
            s.platform_code.as_deref().unwrap_or("")
        ));
    }

    let mut trips = String::from("trip_id,route_id,service_id\n");
    for t in &tables.trips {
        trips.push_str(&format!("{},{},{}\n", t.trip_id, t.route_id, t.service_id));
    }

    let mut routes = String::from("route_id,route_desc,route_short_name\n");
    for r in &tables.routes {
        routes.push_str(&format!("{},{},{}\n", r.route_id, r.route_desc, r.route_short_name));
    }

    let mut transfers = String::from("from_stop_id,to_stop_id,min_transfer_time\n");
    for tr in &tables.transfers {
        transfers.push_str(&format!(
            "{},{},{}\n",
            tr.from_stop_id,
            tr.to_stop_id,
            tr.min_transfer_time.map(|t| t.to_string()).unwrap_or_default()
        ));
    }

    let mut stop_times =
        String::from("trip_id,stop_id,stop_sequence,arrival_time,departure_time\n");
    for st in &tables.stop_times {
        stop_times.push_str(&format!(
            "{},{},{},{},{}\n",
            st.trip_id,
            st.stop_id,
            st.stop_sequence,
            seconds_to_str(st.arrival_time),
            seconds_to_str(st.departure_time)
        ));
    }

    let calendar_dates = format!(
        "service_id,date,exception_type\nwk,{},1\nwk,{},1\n",
        date_num(today),
        date_num(tomorrow)
    );

    vec![
        ("stops.txt", stops),
        ("trips.txt", trips),
        ("routes.txt", routes),
        ("transfers.txt", transfers),
        ("stop_times.txt", stop_times),
        ("calendar_dates.txt", calendar_dates),
    ]
}
