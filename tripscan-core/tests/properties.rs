mod common;

use common::{MONDAY, city_network, city_network_with, hms};
use tripscan_core::prelude::*;

const START_TIMES: [Time; 4] = [
    25_200, // 07:00
    28_500, // 07:55
    30_000, // 08:20
    32_400, // 09:00
];

fn stop_ids(network: &TransitNetwork) -> Vec<String> {
    network.stops.iter().map(|stop| stop.stop_id.clone()).collect()
}

#[test]
fn zero_transfer_budget_never_reports_transfers() {
    let network = city_network();
    let calculator = Calculator::new(&network);

    for origin in stop_ids(&network) {
        for start in START_TIMES {
            let query = Query::new(origin.as_str(), Destination::AllStops, MONDAY, start)
                .with_max_transfers(0);
            let result = calculator.calculate(&query).unwrap();
            for stop in &result.stops {
                assert!(matches!(stop.transfers(), None | Some(0)));
            }
        }
    }
}

#[test]
fn reported_arrival_is_the_pareto_minimum() {
    let network = city_network();
    let calculator = Calculator::new(&network);

    for origin in stop_ids(&network) {
        let query = Query::new(origin.as_str(), Destination::AllStops, MONDAY, hms(7, 50, 0));
        for stop in calculator.calculate(&query).unwrap().stops {
            let Some(reached) = stop.reached else {
                continue;
            };
            let last = reached.pareto.last().copied().unwrap();
            assert_eq!(last.arrival_time, reached.arrival_time);
            assert_eq!(last.transfers, reached.transfers);
            assert!(
                reached
                    .pareto
                    .windows(2)
                    .all(|pair| pair[0].transfers < pair[1].transfers
                        && pair[0].arrival_time > pair[1].arrival_time)
            );
            assert_eq!(reached.travel_time, reached.arrival_time - hms(7, 50, 0));
        }
    }
}

#[test]
fn repeated_queries_are_identical() {
    let network = city_network();
    let calculator = Calculator::new(&network);
    let query = Query::new("A", Destination::AllStops, MONDAY, hms(7, 55, 0)).detailed(true);

    let first = calculator.calculate(&query).unwrap();
    let second = calculator.calculate(&query).unwrap();
    assert_eq!(first.stops, second.stops);
}

#[test]
fn all_stops_matches_single_target_queries() {
    let network = city_network();
    let calculator = Calculator::new(&network);

    for origin in stop_ids(&network) {
        for start in START_TIMES {
            let all = calculator
                .calculate(&Query::new(
                    origin.as_str(),
                    Destination::AllStops,
                    MONDAY,
                    start,
                ))
                .unwrap();
            assert_eq!(all.stops.len(), network.stop_count());

            for stop in &all.stops {
                let single = calculator
                    .calculate(&Query::between(
                        origin.as_str(),
                        stop.stop_id.as_str(),
                        MONDAY,
                        start,
                    ))
                    .unwrap();
                assert_eq!(&single.stops[0], stop);
            }
        }
    }
}

#[test]
fn transfer_reduction_keeps_results() {
    let full = city_network_with(false);
    let reduced = city_network_with(true);
    assert!(reduced.transfer_count(MONDAY) <= full.transfer_count(MONDAY));

    let full_calculator = Calculator::new(&full);
    let reduced_calculator = Calculator::new(&reduced);
    for origin in stop_ids(&full) {
        for start in START_TIMES {
            let query = Query::new(origin.as_str(), Destination::AllStops, MONDAY, start);
            let expected = full_calculator.calculate(&query).unwrap();
            let actual = reduced_calculator.calculate(&query).unwrap();
            for (expected, actual) in expected.stops.iter().zip(&actual.stops) {
                assert_eq!(expected.arrival_time(), actual.arrival_time());
                assert_eq!(expected.transfers(), actual.transfers());
            }
        }
    }
}

#[test]
fn later_start_never_arrives_earlier() {
    let network = city_network();
    let calculator = Calculator::new(&network);

    for target in stop_ids(&network) {
        let mut previous: Option<Time> = None;
        for start in START_TIMES {
            let result = calculator
                .calculate(&Query::between("A", target.as_str(), MONDAY, start))
                .unwrap();
            let arrival = result.stops[0].arrival_time();
            if let (Some(previous), Some(arrival)) = (previous, arrival) {
                assert!(arrival >= previous);
            }
            if arrival.is_some() {
                previous = arrival;
            }
        }
    }
}
