mod common;

use std::fs;

use common::{MONDAY, corridor_model, hms};
use tripscan::{OdTrip, OdTripOutcome, ReplayOptions, load_od_trips, replay_od_trips};

fn od_trip(id: &str, origin: &str, destination: &str, weekday: usize, factor: f64) -> OdTrip {
    OdTrip {
        id: id.to_string(),
        origin_stop_id: origin.to_string(),
        destination_stop_id: destination.to_string(),
        departure_time: hms(7, 55, 0),
        weekday,
        expansion_factor: factor,
    }
}

fn survey() -> Vec<OdTrip> {
    vec![
        od_trip("od1", "A", "D", MONDAY, 2.0),
        od_trip("od2", "A", "C", MONDAY, 1.0),
        od_trip("od3", "A", "X", MONDAY, 1.0),
        od_trip("od4", "nowhere", "A", MONDAY, 1.0),
        od_trip("od5", "A", "C", 9, 1.0),
    ]
}

#[test]
fn replay_counts_outcomes() {
    let model = corridor_model();
    let profile = replay_od_trips(&model, &survey(), &ReplayOptions::default()).unwrap();

    assert_eq!(profile.reachable, 2);
    assert_eq!(profile.unreachable, 1);
    assert_eq!(profile.failed, 2);

    let outcomes: Vec<_> = profile.results.iter().map(|r| (r.id.as_str(), r.outcome)).collect();
    assert_eq!(
        outcomes,
        vec![
            ("od1", OdTripOutcome::Reachable),
            ("od2", OdTripOutcome::Reachable),
            ("od3", OdTripOutcome::Unreachable),
            ("od4", OdTripOutcome::Failed),
            ("od5", OdTripOutcome::Failed),
        ]
    );
    assert_eq!(profile.results[0].arrival_time, Some(hms(8, 30, 0)));
    assert_eq!(profile.results[0].transfers, Some(1));
    assert!(profile.results[3].error.is_some());
}

#[test]
fn replay_tallies_weighted_boardings_per_period() {
    let model = corridor_model();
    let profile = replay_od_trips(&model, &survey(), &ReplayOptions::default()).unwrap();

    let usage: Vec<_> = profile
        .route_paths
        .iter()
        .map(|u| (u.period, u.route_id.as_str(), u.boardings, u.weight))
        .collect();
    assert_eq!(usage, vec![(8, "L1", 2, 3.0), (8, "L2", 1, 2.0)]);
    assert_eq!(profile.route_paths[0].period_start, hms(8, 0, 0));

    let trips: Vec<_> = profile
        .trips
        .iter()
        .map(|u| (u.trip_id.as_str(), u.boardings, u.weight))
        .collect();
    assert_eq!(trips, vec![("L1-0800", 2, 3.0), ("L2-0820", 1, 2.0)]);
}

#[test]
fn shorter_periods_split_boardings() {
    let model = corridor_model();
    let options = ReplayOptions {
        period_length: 900,
        ..ReplayOptions::default()
    };
    let profile = replay_od_trips(&model, &survey(), &options).unwrap();

    let periods: Vec<_> = profile
        .route_paths
        .iter()
        .map(|u| (u.period_start, u.route_id.as_str()))
        .collect();
    assert_eq!(
        periods,
        vec![(hms(8, 0, 0), "L1"), (hms(8, 15, 0), "L2")]
    );
}

#[test]
fn zero_period_is_rejected() {
    let model = corridor_model();
    let options = ReplayOptions {
        period_length: 0,
        ..ReplayOptions::default()
    };
    assert!(replay_od_trips(&model, &survey(), &options).is_err());
}

#[test]
fn loads_od_trips_from_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("od_trips.csv");
    fs::write(
        &path,
        "id,origin_stop_id,destination_stop_id,departure_time,weekday,expansion_factor\n\
         od1,A,D,07:55:00,0,2.5\n\
         od2,A,C,28500,0,1\n\
         od3,A,C,07:55,0,1\n\
         bad,A,C,later,0,1\n",
    )
    .unwrap();

    let trips = load_od_trips(&path).unwrap();

    assert_eq!(trips.len(), 3);
    assert_eq!(trips[0].departure_time, hms(7, 55, 0));
    assert_eq!(trips[0].expansion_factor, 2.5);
    assert_eq!(trips[1].departure_time, hms(7, 55, 0));
    assert_eq!(trips[2].departure_time, hms(7, 55, 0));
}

#[test]
fn missing_od_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_od_trips(&dir.path().join("absent.csv")).is_err());
}
