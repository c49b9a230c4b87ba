#![allow(dead_code)]

use tripscan_core::prelude::*;

pub const MONDAY: usize = 0;

pub fn hms(hours: Time, minutes: Time, seconds: Time) -> Time {
    hours * 3600 + minutes * 60 + seconds
}

pub fn trip(id: &str, route: &str, times: &[(&str, Time)]) -> TripInput {
    TripInput::new(
        id,
        route,
        times
            .iter()
            .map(|&(stop, time)| StopTimeInput::new(stop, time, time))
            .collect(),
    )
}

fn config(reduce_transfers: bool) -> NetworkConfig {
    NetworkConfig {
        generate_footpaths: false,
        reduce_transfers,
        ..NetworkConfig::default()
    }
}

/// A, B and one trip A 08:00:00 -> B 08:10:00
pub fn two_stop_network() -> TransitNetwork {
    let mut builder = NetworkBuilder::new(config(true));
    builder
        .add_stop(StopInput::new("A", 55.75, 37.60))
        .add_stop(StopInput::new("B", 55.76, 37.61))
        .add_route(RouteInput::new("R"))
        .add_trip(trip(
            "T1",
            "R",
            &[("A", hms(8, 0, 0)), ("B", hms(8, 10, 0))],
        ));
    builder.build().expect("two stop network builds")
}

/// Small city:
///
/// * L1 A -> B -> C every 10 minutes 07:00..=09:00 (5 min per hop)
/// * L2 C -> D -> E every 15 minutes 07:00..=09:00 (6 min per hop)
/// * L3 express A -> E, one trip 08:30 -> 09:10
/// * L4 F -> E, one trip 08:08 -> 08:20, F is a 2 minute walk from B
/// * L5 E -> G, trips 08:30 -> 08:40 and 09:15 -> 09:25
/// * H has no service
pub fn city_network_with(reduce_transfers: bool) -> TransitNetwork {
    let mut builder = NetworkBuilder::new(config(reduce_transfers));
    let stops = [
        ("A", 55.70, 37.50),
        ("B", 55.71, 37.51),
        ("C", 55.72, 37.52),
        ("D", 55.73, 37.53),
        ("E", 55.74, 37.54),
        ("F", 55.711, 37.511),
        ("G", 55.75, 37.55),
        ("H", 55.80, 37.60),
    ];
    for (id, lat, lon) in stops {
        builder.add_stop(StopInput::new(id, lat, lon).with_name(format!("Stop {id}")));
    }
    for route in ["L1", "L2", "L3", "L4", "L5"] {
        builder.add_route(RouteInput::new(route));
    }

    for start in (hms(7, 0, 0)..=hms(9, 0, 0)).step_by(600) {
        builder.add_trip(trip(
            &format!("L1-{start}"),
            "L1",
            &[("A", start), ("B", start + 300), ("C", start + 600)],
        ));
    }
    for start in (hms(7, 0, 0)..=hms(9, 0, 0)).step_by(900) {
        builder.add_trip(trip(
            &format!("L2-{start}"),
            "L2",
            &[("C", start), ("D", start + 360), ("E", start + 720)],
        ));
    }
    builder
        .add_trip(trip(
            "L3-express",
            "L3",
            &[("A", hms(8, 30, 0)), ("E", hms(9, 10, 0))],
        ))
        .add_trip(trip(
            "L4-0808",
            "L4",
            &[("F", hms(8, 8, 0)), ("E", hms(8, 20, 0))],
        ))
        .add_trip(trip(
            "L5-0830",
            "L5",
            &[("E", hms(8, 30, 0)), ("G", hms(8, 40, 0))],
        ))
        .add_trip(trip(
            "L5-0915",
            "L5",
            &[("E", hms(9, 15, 0)), ("G", hms(9, 25, 0))],
        ))
        .add_footpath(FootpathInput::new("B", "F", 120))
        .add_footpath(FootpathInput::new("F", "B", 120));

    builder.build().expect("city network builds")
}

pub fn city_network() -> TransitNetwork {
    city_network_with(true)
}
