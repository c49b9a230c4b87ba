use std::path::Path;

use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};

use super::{
    parser::{deserialize_gtfs_file, deserialize_optional_gtfs_file, parse_time},
    raw_types::{
        FeedInfo, FeedRoute, FeedService, FeedStop, FeedStopTime, FeedTransfer, FeedTrip,
    },
};
use crate::loading::{
    FootpathInput, NetworkBuilder, NetworkConfig, RouteInput, StopInput, StopTimeInput, TripInput,
};
use crate::{DAYS_PER_WEEK, Error, model::FeedMeta};

struct RawFeed {
    stops: Vec<FeedStop>,
    routes: Vec<FeedRoute>,
    trips: Vec<FeedTrip>,
    stop_times: Vec<FeedStopTime>,
    services: Vec<FeedService>,
    transfers: Vec<FeedTransfer>,
    feed_info: Vec<FeedInfo>,
}

/// Reads the GTFS feeds named in the configuration into a [`NetworkBuilder`].
///
/// Ids shared by several feeds keep their first definition. Trips that
/// cannot be routed (unknown service, stop or route, fewer than two usable
/// stop times, decreasing times) are skipped with a warning.
pub fn network_builder_from_gtfs(config: &NetworkConfig) -> Result<NetworkBuilder, Error> {
    let mut builder = NetworkBuilder::new(config.clone());
    let mut known_stops: HashSet<String> = HashSet::new();
    let mut known_routes: HashSet<String> = HashSet::new();
    let mut known_trips: HashSet<String> = HashSet::new();

    for dir in &config.gtfs_dirs {
        info!("Reading GTFS feed {}", dir.display());
        let feed = load_raw_feed(dir)?;
        debug!(
            "Feed {}: {} stops, {} routes, {} trips, {} stop times",
            dir.display(),
            feed.stops.len(),
            feed.routes.len(),
            feed.trips.len(),
            feed.stop_times.len()
        );

        for meta in feed.feed_info {
            builder.add_feed_meta(FeedMeta {
                publisher_name: meta.feed_publisher_name,
                publisher_url: meta.feed_publisher_url,
                lang: meta.feed_lang,
                version: meta.feed_version,
                start_date: meta.feed_start_date,
                end_date: meta.feed_end_date,
            });
        }

        add_stops(&mut builder, feed.stops, &mut known_stops);
        add_routes(&mut builder, feed.routes, &mut known_routes);
        add_trips(
            &mut builder,
            feed.trips,
            feed.stop_times,
            &feed.services,
            &known_stops,
            &known_routes,
            &mut known_trips,
        );
        add_transfers(&mut builder, feed.transfers, &known_stops);
    }

    Ok(builder)
}

fn load_raw_feed(dir: &Path) -> Result<RawFeed, Error> {
    Ok(RawFeed {
        stops: deserialize_gtfs_file(&dir.join("stops.txt"))?,
        routes: deserialize_gtfs_file(&dir.join("routes.txt"))?,
        trips: deserialize_gtfs_file(&dir.join("trips.txt"))?,
        stop_times: deserialize_gtfs_file(&dir.join("stop_times.txt"))?,
        services: deserialize_gtfs_file(&dir.join("calendar.txt"))?,
        transfers: deserialize_optional_gtfs_file(&dir.join("transfers.txt"))?,
        feed_info: deserialize_optional_gtfs_file(&dir.join("feed_info.txt"))?,
    })
}

fn add_stops(builder: &mut NetworkBuilder, stops: Vec<FeedStop>, known: &mut HashSet<String>) {
    for feed_stop in stops {
        let (Ok(lat), Ok(lon)) = (
            feed_stop.stop_lat.trim().parse::<f64>(),
            feed_stop.stop_lon.trim().parse::<f64>(),
        ) else {
            warn!(
                "Invalid coordinates '{}', '{}' for stop '{}'",
                feed_stop.stop_lat, feed_stop.stop_lon, feed_stop.stop_id
            );
            continue;
        };
        if !known.insert(feed_stop.stop_id.clone()) {
            warn!("Duplicate stop id '{}' ignored", feed_stop.stop_id);
            continue;
        }
        builder.add_stop(
            StopInput::new(feed_stop.stop_id, lat, lon).with_name(feed_stop.stop_name),
        );
    }
}

fn add_routes(builder: &mut NetworkBuilder, routes: Vec<FeedRoute>, known: &mut HashSet<String>) {
    for route in routes {
        if !known.insert(route.route_id.clone()) {
            warn!("Duplicate route id '{}' ignored", route.route_id);
            continue;
        }
        builder.add_route(RouteInput {
            route_id: route.route_id,
            short_name: route.route_short_name,
            long_name: route.route_long_name,
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn add_trips(
    builder: &mut NetworkBuilder,
    trips: Vec<FeedTrip>,
    stop_times: Vec<FeedStopTime>,
    services: &[FeedService],
    known_stops: &HashSet<String>,
    known_routes: &HashSet<String>,
    known_trips: &mut HashSet<String>,
) {
    let service_days: HashMap<&str, [bool; DAYS_PER_WEEK]> = services
        .iter()
        .map(|service| (service.service_id.as_str(), service.weekdays()))
        .collect();

    // Map from trip_id to its stop times
    let mut trip_stop_times: HashMap<String, Vec<(u32, StopTimeInput)>> = HashMap::new();
    let mut unusable_rows = 0usize;
    for stop_time in stop_times {
        match convert_stop_time(&stop_time) {
            Some(converted) => trip_stop_times
                .entry(stop_time.trip_id)
                .or_default()
                .push(converted),
            None => unusable_rows += 1,
        }
    }
    if unusable_rows > 0 {
        warn!("Skipped {unusable_rows} stop times without usable sequence or times");
    }

    let mut skipped = 0usize;
    for trip in trips {
        let Some(&days) = service_days.get(trip.service_id.as_str()) else {
            skipped += 1;
            continue;
        };
        if !known_routes.contains(&trip.route_id) || !known_trips.insert(trip.trip_id.clone()) {
            skipped += 1;
            continue;
        }
        let Some(mut times) = trip_stop_times.remove(&trip.trip_id) else {
            skipped += 1;
            continue;
        };
        times.sort_by_key(|(sequence, _)| *sequence);
        let times: Vec<StopTimeInput> = times.into_iter().map(|(_, time)| time).collect();

        if !is_routable(&times, known_stops) {
            skipped += 1;
            continue;
        }
        builder.add_trip(
            TripInput::new(trip.trip_id, trip.route_id, times).with_service_days(days),
        );
    }
    if skipped > 0 {
        warn!("Skipped {skipped} trips that cannot be routed");
    }
}

/// (`stop_sequence`, stop time); a missing arrival or departure copies the other one
fn convert_stop_time(stop_time: &FeedStopTime) -> Option<(u32, StopTimeInput)> {
    let sequence = stop_time.stop_sequence.trim().parse::<u32>().ok()?;
    let arrival = parse_time(&stop_time.arrival_time);
    let departure = parse_time(&stop_time.departure_time);
    let (arrival, departure) = match (arrival, departure) {
        (Some(arrival), Some(departure)) => (arrival, departure),
        (Some(time), None) | (None, Some(time)) => (time, time),
        (None, None) => return None,
    };
    Some((
        sequence,
        StopTimeInput::new(stop_time.stop_id.clone(), arrival, departure),
    ))
}

fn is_routable(times: &[StopTimeInput], known_stops: &HashSet<String>) -> bool {
    times.len() >= 2
        && times.iter().all(|time| known_stops.contains(&time.stop_id))
        && times.iter().all(|time| time.arrival <= time.departure)
        && times
            .windows(2)
            .all(|pair| pair[0].departure <= pair[1].arrival)
}

/// GTFS transfers with `transfer_type` 2 carry a walking time between stops
fn add_transfers(
    builder: &mut NetworkBuilder,
    transfers: Vec<FeedTransfer>,
    known_stops: &HashSet<String>,
) {
    for transfer in transfers {
        if transfer.transfer_type.trim() != "2" {
            continue;
        }
        let Ok(duration) = transfer.min_transfer_time.trim().parse() else {
            continue;
        };
        if transfer.from_stop_id == transfer.to_stop_id
            || !known_stops.contains(&transfer.from_stop_id)
            || !known_stops.contains(&transfer.to_stop_id)
        {
            continue;
        }
        builder.add_footpath(FootpathInput::new(
            transfer.from_stop_id,
            transfer.to_stop_id,
            duration,
        ));
    }
}
