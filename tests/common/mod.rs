use tripscan::TransitModel;
use tripscan_core::prelude::*;

pub const MONDAY: usize = 0;

pub fn hms(hours: Time, minutes: Time, seconds: Time) -> Time {
    hours * 3600 + minutes * 60 + seconds
}

/// Trips from `first` to `last` departure every `headway`, `hop` seconds per stop
fn line_trips(
    builder: &mut NetworkBuilder,
    route: &str,
    stops: &[&str],
    span: (Time, Time),
    headway: Time,
    hop: Time,
) {
    let (mut start, last) = span;
    while start <= last {
        let stop_times = stops
            .iter()
            .enumerate()
            .map(|(seq, stop)| {
                let time = start + seq as Time * hop;
                StopTimeInput::new(*stop, time, time)
            })
            .collect();
        builder.add_trip(TripInput::new(
            format!("{route}-{:02}{:02}", start / 3600, start % 3600 / 60),
            route,
            stop_times,
        ));
        start += headway;
    }
}

/// L1 A -> B -> C every 10 minutes, L2 C -> D every 20 minutes, X unserved
pub fn corridor_model() -> TransitModel {
    let config = NetworkConfig {
        generate_footpaths: false,
        ..NetworkConfig::default()
    };
    let mut builder = NetworkBuilder::new(config);
    for (index, stop) in ["A", "B", "C", "D", "X"].into_iter().enumerate() {
        builder.add_stop(StopInput::new(stop, 55.0, 37.0 + index as f64 * 0.05));
    }
    builder.add_route(RouteInput::new("L1"));
    builder.add_route(RouteInput::new("L2"));
    let service = (hms(7, 0, 0), hms(9, 0, 0));
    line_trips(&mut builder, "L1", &["A", "B", "C"], service, 600, 300);
    line_trips(&mut builder, "L2", &["C", "D"], service, 1200, 600);

    TransitModel::from_network(builder.build().unwrap())
}
