use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use tripscan_core::prelude::*;

const GRID: usize = 12;
const HOP: Time = 120;
const HEADWAY: Time = 300;

fn stop_id(row: usize, col: usize) -> String {
    format!("S{row}_{col}")
}

/// Square grid with one bidirectional line per row and per column
fn grid_network() -> TransitNetwork {
    let config = NetworkConfig {
        generate_footpaths: false,
        ..NetworkConfig::default()
    };
    let mut builder = NetworkBuilder::new(config);

    for row in 0..GRID {
        for col in 0..GRID {
            builder.add_stop(StopInput::new(
                stop_id(row, col),
                55.0 + row as f64 * 0.01,
                37.0 + col as f64 * 0.01,
            ));
        }
    }

    for line in 0..GRID {
        let rows: Vec<String> = (0..GRID).map(|col| stop_id(line, col)).collect();
        let cols: Vec<String> = (0..GRID).map(|row| stop_id(row, line)).collect();
        for (name, stops) in [("H", rows), ("V", cols)] {
            let route_id = format!("{name}{line}");
            builder.add_route(RouteInput::new(route_id.clone()));
            let reversed: Vec<String> = stops.iter().rev().cloned().collect();
            for (direction, stops) in [stops, reversed].iter().enumerate() {
                let mut start = 6 * 3600;
                while start < 10 * 3600 {
                    let stop_times = stops
                        .iter()
                        .enumerate()
                        .map(|(seq, stop)| {
                            let time = start + seq as Time * HOP;
                            StopTimeInput::new(stop.clone(), time, time)
                        })
                        .collect();
                    builder.add_trip(TripInput::new(
                        format!("{route_id}-{direction}-{start}"),
                        route_id.clone(),
                        stop_times,
                    ));
                    start += HEADWAY;
                }
            }
        }
    }

    builder.build().expect("grid network builds")
}

fn criterion_benchmark(c: &mut Criterion) {
    let network = grid_network();
    let calculator = Calculator::new(&network);
    let corner = stop_id(0, 0);
    let far_corner = stop_id(GRID - 1, GRID - 1);

    let mut group = c.benchmark_group("Routing");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("One to one", |b| {
        let query = Query::between(corner.as_str(), far_corner.as_str(), 0, 7 * 3600);
        b.iter(|| black_box(calculator.calculate(&query)));
    });

    group.bench_function("One to all stops", |b| {
        let query = Query::new(corner.as_str(), Destination::AllStops, 0, 7 * 3600);
        b.iter(|| black_box(calculator.calculate(&query)));
    });

    group.bench_function("One to one detailed", |b| {
        let query =
            Query::between(corner.as_str(), far_corner.as_str(), 0, 7 * 3600).detailed(true);
        b.iter(|| black_box(calculator.calculate(&query)));
    });

    group.finish();

    c.bench_function("Build grid network", |b| b.iter(|| black_box(grid_network())));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
