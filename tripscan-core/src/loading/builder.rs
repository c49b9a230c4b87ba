use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, info};

use super::config::NetworkConfig;
use super::footpaths::generate_footpaths;
use super::gtfs::network_builder_from_gtfs;
use super::transfers::compute_transfers;
use crate::model::{
    FeedMeta, Footpath, Route, RoutePath, Span, Stop, StopRoutePath, Timetable, Trip, TripInfo,
};
use crate::{DAYS_PER_WEEK, Error, RouteIdx, RoutePathIdx, StopIdx, Time, TransitNetwork};

#[derive(Debug, Clone)]
pub struct StopInput {
    pub stop_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl StopInput {
    pub fn new(stop_id: impl Into<String>, lat: f64, lon: f64) -> Self {
        let stop_id = stop_id.into();
        Self {
            name: stop_id.clone(),
            stop_id,
            lat,
            lon,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteInput {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
}

impl RouteInput {
    pub fn new(route_id: impl Into<String>) -> Self {
        Self {
            route_id: route_id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct StopTimeInput {
    pub stop_id: String,
    pub arrival: Time,
    pub departure: Time,
}

impl StopTimeInput {
    pub fn new(stop_id: impl Into<String>, arrival: Time, departure: Time) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrival,
            departure,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TripInput {
    pub trip_id: String,
    pub route_id: String,
    /// Service validity, Monday first
    pub service_days: [bool; DAYS_PER_WEEK],
    pub stop_times: Vec<StopTimeInput>,
}

impl TripInput {
    /// Trip running every day of the week
    pub fn new(
        trip_id: impl Into<String>,
        route_id: impl Into<String>,
        stop_times: Vec<StopTimeInput>,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            route_id: route_id.into(),
            service_days: [true; DAYS_PER_WEEK],
            stop_times,
        }
    }

    #[must_use]
    pub fn with_service_days(mut self, service_days: [bool; DAYS_PER_WEEK]) -> Self {
        self.service_days = service_days;
        self
    }
}

#[derive(Debug, Clone)]
pub struct FootpathInput {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub duration: Time,
}

impl FootpathInput {
    pub fn new(from: impl Into<String>, to: impl Into<String>, duration: Time) -> Self {
        Self {
            from_stop_id: from.into(),
            to_stop_id: to.into(),
            duration,
        }
    }
}

/// Collects schedule records and builds a [`TransitNetwork`].
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    config: NetworkConfig,
    stops: Vec<StopInput>,
    routes: Vec<RouteInput>,
    trips: Vec<TripInput>,
    footpaths: Vec<FootpathInput>,
    feeds_meta: Vec<FeedMeta>,
}

/// Trip with resolved indices and its own times
struct StagedTrip {
    route: RouteIdx,
    stops: Vec<StopIdx>,
    arrivals: Vec<Time>,
    departures: Vec<Time>,
}

impl StagedTrip {
    /// `self` never overtakes `other` at any stop
    fn precedes(&self, other: &StagedTrip) -> bool {
        self.departures
            .iter()
            .zip(&other.departures)
            .all(|(a, b)| a <= b)
            && self.arrivals.iter().zip(&other.arrivals).all(|(a, b)| a <= b)
    }
}

struct RoutePathLayout {
    route_paths: Vec<RoutePath>,
    route_path_stops: Vec<StopIdx>,
    /// Trips of each route-path in schedule order
    lanes: Vec<Vec<usize>>,
    trip_route_path: Vec<RoutePathIdx>,
}

impl NetworkBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn add_stop(&mut self, stop: StopInput) -> &mut Self {
        self.stops.push(stop);
        self
    }

    pub fn add_route(&mut self, route: RouteInput) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn add_trip(&mut self, trip: TripInput) -> &mut Self {
        self.trips.push(trip);
        self
    }

    pub fn add_footpath(&mut self, footpath: FootpathInput) -> &mut Self {
        self.footpaths.push(footpath);
        self
    }

    pub fn add_feed_meta(&mut self, meta: FeedMeta) -> &mut Self {
        self.feeds_meta.push(meta);
        self
    }

    /// Builds the network: route-paths, weekday timetables, footpaths and
    /// trip transfers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for duplicate ids, references to unknown
    /// stops or routes, trips with fewer than two stops and decreasing times.
    pub fn build(self) -> Result<TransitNetwork, Error> {
        let NetworkBuilder {
            config,
            stops: stop_inputs,
            routes: route_inputs,
            trips: trip_inputs,
            footpaths: footpath_inputs,
            feeds_meta,
        } = self;

        info!(
            "Building transit network from {} stops, {} routes and {} trips",
            stop_inputs.len(),
            route_inputs.len(),
            trip_inputs.len()
        );

        let (mut stops, stop_lookup) = index_stops(stop_inputs)?;
        let (routes, route_lookup) = index_routes(route_inputs)?;
        let staged = stage_trips(&trip_inputs, &stop_lookup, &route_lookup)?;

        let layout = form_route_paths(&staged);
        debug!(
            "Formed {} route-paths for {} routes",
            layout.route_paths.len(),
            routes.len()
        );
        let stop_route_paths = index_stop_route_paths(&mut stops, &layout);

        let trip_infos: Vec<TripInfo> = trip_inputs
            .into_iter()
            .zip(&layout.trip_route_path)
            .map(|(input, &route_path)| TripInfo {
                trip_id: input.trip_id,
                route_path,
                service_days: input.service_days,
            })
            .collect();

        let timetables = (0..DAYS_PER_WEEK)
            .map(|weekday| build_timetable(weekday, &layout, &staged, &trip_infos))
            .collect();

        let footpaths = collect_footpaths(&config, &stops, &stop_lookup, footpath_inputs)?;
        let (footpaths_by_source, footpaths_by_target) = index_footpaths(&mut stops, footpaths);

        let mut network = TransitNetwork {
            stops,
            routes,
            route_paths: layout.route_paths,
            route_path_stops: layout.route_path_stops,
            stop_route_paths,
            trip_infos,
            footpaths_by_source,
            footpaths_by_target,
            timetables,
            stop_lookup,
            route_lookup,
            feeds_meta,
        };

        compute_transfers(&mut network, &config);
        info!(
            "Transit network built: {} stops, {} route-paths, {} trips, {} footpaths",
            network.stop_count(),
            network.route_path_count(),
            network.trip_count(),
            network.footpaths_by_source.len()
        );
        Ok(network)
    }
}

fn index_stops(inputs: Vec<StopInput>) -> Result<(Vec<Stop>, HashMap<String, StopIdx>), Error> {
    let mut lookup = HashMap::with_capacity(inputs.len());
    let mut stops = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.lat.is_finite() || !input.lon.is_finite() {
            return Err(Error::InvalidData(format!(
                "Stop '{}' has invalid coordinates",
                input.stop_id
            )));
        }
        if lookup.insert(input.stop_id.clone(), stops.len()).is_some() {
            return Err(Error::InvalidData(format!(
                "Duplicate stop id '{}'",
                input.stop_id
            )));
        }
        stops.push(Stop {
            stop_id: input.stop_id,
            name: input.name,
            geometry: Point::new(input.lon, input.lat),
            route_paths: None,
            footpaths_out: None,
            footpaths_in: None,
        });
    }
    Ok((stops, lookup))
}

fn index_routes(
    inputs: Vec<RouteInput>,
) -> Result<(Vec<Route>, HashMap<String, RouteIdx>), Error> {
    let mut lookup = HashMap::with_capacity(inputs.len());
    let mut routes = Vec::with_capacity(inputs.len());
    for input in inputs {
        if lookup.insert(input.route_id.clone(), routes.len()).is_some() {
            return Err(Error::InvalidData(format!(
                "Duplicate route id '{}'",
                input.route_id
            )));
        }
        routes.push(Route {
            route_id: input.route_id,
            short_name: input.short_name,
            long_name: input.long_name,
        });
    }
    Ok((routes, lookup))
}

fn stage_trips(
    inputs: &[TripInput],
    stop_lookup: &HashMap<String, StopIdx>,
    route_lookup: &HashMap<String, RouteIdx>,
) -> Result<Vec<StagedTrip>, Error> {
    inputs
        .iter()
        .map(|input| {
            let route = *route_lookup.get(&input.route_id).ok_or_else(|| {
                Error::InvalidData(format!(
                    "Trip '{}' references unknown route '{}'",
                    input.trip_id, input.route_id
                ))
            })?;
            if input.stop_times.len() < 2 {
                return Err(Error::InvalidData(format!(
                    "Trip '{}' has fewer than two stop times",
                    input.trip_id
                )));
            }

            let mut staged = StagedTrip {
                route,
                stops: Vec::with_capacity(input.stop_times.len()),
                arrivals: Vec::with_capacity(input.stop_times.len()),
                departures: Vec::with_capacity(input.stop_times.len()),
            };
            let mut previous_departure = 0;
            for stop_time in &input.stop_times {
                let stop = *stop_lookup.get(&stop_time.stop_id).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "Trip '{}' references unknown stop '{}'",
                        input.trip_id, stop_time.stop_id
                    ))
                })?;
                if stop_time.arrival > stop_time.departure
                    || stop_time.arrival < previous_departure
                {
                    return Err(Error::InvalidData(format!(
                        "Trip '{}' has decreasing times at stop '{}'",
                        input.trip_id, stop_time.stop_id
                    )));
                }
                previous_departure = stop_time.departure;
                staged.stops.push(stop);
                staged.arrivals.push(stop_time.arrival);
                staged.departures.push(stop_time.departure);
            }
            Ok(staged)
        })
        .collect()
}

/// Groups trips by (route, stop sequence) and splits every group into
/// non-overtaking lanes. Each lane becomes one route-path.
fn form_route_paths(trips: &[StagedTrip]) -> RoutePathLayout {
    let mut group_index: HashMap<(RouteIdx, &[StopIdx]), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (idx, trip) in trips.iter().enumerate() {
        let group = *group_index
            .entry((trip.route, trip.stops.as_slice()))
            .or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
        groups[group].push(idx);
    }

    let mut layout = RoutePathLayout {
        route_paths: Vec::new(),
        route_path_stops: Vec::new(),
        lanes: Vec::new(),
        trip_route_path: vec![0; trips.len()],
    };

    for mut members in groups {
        members.sort_by_key(|&t| {
            let trip = &trips[t];
            (trip.departures[0], trip.arrivals[trip.arrivals.len() - 1], t)
        });

        let mut lanes: Vec<Vec<usize>> = Vec::new();
        for t in members {
            let lane = lanes.iter_mut().find(|lane| {
                lane.last()
                    .is_some_and(|&previous| trips[previous].precedes(&trips[t]))
            });
            match lane {
                Some(lane) => lane.push(t),
                None => lanes.push(vec![t]),
            }
        }

        for lane in lanes {
            let template = &trips[lane[0]];
            let route_path = layout.route_paths.len();
            layout.route_paths.push(RoutePath {
                route: template.route,
                stops: Span {
                    start: layout.route_path_stops.len(),
                    len: template.stops.len(),
                },
            });
            layout.route_path_stops.extend_from_slice(&template.stops);
            for &t in &lane {
                layout.trip_route_path[t] = route_path;
            }
            layout.lanes.push(lane);
        }
    }
    layout
}

fn index_stop_route_paths(stops: &mut [Stop], layout: &RoutePathLayout) -> Vec<StopRoutePath> {
    let mut by_stop: Vec<Vec<StopRoutePath>> = vec![Vec::new(); stops.len()];
    for (route_path, path) in layout.route_paths.iter().enumerate() {
        for (stop_seq, &stop) in layout.route_path_stops[path.stops.range()].iter().enumerate() {
            by_stop[stop].push(StopRoutePath {
                route_path,
                stop_seq,
            });
        }
    }

    let mut stop_route_paths = Vec::with_capacity(layout.route_path_stops.len());
    for (stop, entries) in stops.iter_mut().zip(by_stop) {
        let start = stop_route_paths.len();
        stop_route_paths.extend(entries);
        stop.route_paths = Span::between(start, stop_route_paths.len());
    }
    stop_route_paths
}

fn build_timetable(
    weekday: usize,
    layout: &RoutePathLayout,
    staged: &[StagedTrip],
    trip_infos: &[TripInfo],
) -> Timetable {
    let mut timetable = Timetable {
        trips_by_route_path: vec![None; layout.route_paths.len()],
        ..Timetable::default()
    };

    for (route_path, lane) in layout.lanes.iter().enumerate() {
        let first_trip = timetable.trips.len();
        for &t in lane {
            if !trip_infos[t].service_days[weekday] {
                continue;
            }
            let times_start = timetable.departures.len();
            timetable.departures.extend_from_slice(&staged[t].departures);
            timetable.arrivals.extend_from_slice(&staged[t].arrivals);
            timetable.trips.push(Trip {
                info: t,
                route_path,
                seq: timetable.trips.len() - first_trip,
                times: Span {
                    start: times_start,
                    len: staged[t].departures.len(),
                },
            });
        }
        timetable.trips_by_route_path[route_path] =
            Span::between(first_trip, timetable.trips.len());
    }

    timetable.transfers_by_event = vec![None; timetable.arrivals.len()];
    timetable
}

fn insert_shortest(shortest: &mut HashMap<(StopIdx, StopIdx), Time>, footpath: Footpath) {
    shortest
        .entry((footpath.source, footpath.target))
        .and_modify(|duration| *duration = (*duration).min(footpath.duration))
        .or_insert(footpath.duration);
}

fn collect_footpaths(
    config: &NetworkConfig,
    stops: &[Stop],
    stop_lookup: &HashMap<String, StopIdx>,
    inputs: Vec<FootpathInput>,
) -> Result<Vec<Footpath>, Error> {
    let mut shortest: HashMap<(StopIdx, StopIdx), Time> = HashMap::new();

    for input in inputs {
        let resolve = |stop_id: &str| {
            stop_lookup.get(stop_id).copied().ok_or_else(|| {
                Error::InvalidData(format!("Footpath references unknown stop '{stop_id}'"))
            })
        };
        let source = resolve(&input.from_stop_id)?;
        let target = resolve(&input.to_stop_id)?;
        insert_shortest(
            &mut shortest,
            Footpath {
                source,
                target,
                duration: input.duration,
            },
        );
    }

    if config.generate_footpaths {
        let locations: Vec<Point<f64>> = stops.iter().map(|stop| stop.geometry).collect();
        let generated =
            generate_footpaths(&locations, config.max_footpath_time, config.walking_speed);
        for footpath in generated {
            insert_shortest(&mut shortest, footpath);
        }
    }

    for stop in 0..stops.len() {
        shortest.insert((stop, stop), 0);
    }

    Ok(shortest
        .into_iter()
        .map(|((source, target), duration)| Footpath {
            source,
            target,
            duration,
        })
        .sorted_unstable_by_key(|footpath| (footpath.source, footpath.target))
        .collect())
}

/// Sorted footpath tables by source and by target with per-stop ranges
fn index_footpaths(stops: &mut [Stop], by_source: Vec<Footpath>) -> (Vec<Footpath>, Vec<Footpath>) {
    let mut by_target = by_source.clone();
    by_target.sort_unstable_by_key(|footpath| (footpath.target, footpath.source));

    let out_spans = spans_by_key(&by_source, stops.len(), |footpath| footpath.source);
    let in_spans = spans_by_key(&by_target, stops.len(), |footpath| footpath.target);
    for ((stop, out_span), in_span) in stops.iter_mut().zip(out_spans).zip(in_spans) {
        stop.footpaths_out = out_span;
        stop.footpaths_in = in_span;
    }
    (by_source, by_target)
}

/// Range table for `items` sorted by `key`
pub(crate) fn spans_by_key<T>(
    items: &[T],
    count: usize,
    key: impl Fn(&T) -> usize,
) -> Vec<Option<Span>> {
    let mut spans = vec![None; count];
    let mut start = 0;
    for (k, group) in &items.iter().chunk_by(|item| key(item)) {
        let len = group.count();
        spans[k] = Some(Span { start, len });
        start += len;
    }
    spans
}

/// Creates a transit network from the GTFS feeds named in the configuration
///
/// # Errors
///
/// Returns an error if there are problems reading or processing data
pub fn create_transit_network(config: &NetworkConfig) -> Result<TransitNetwork, Error> {
    validate_config(config)?;

    info!("Processing public transit data (GTFS)");
    let builder = network_builder_from_gtfs(config)?;
    let network = builder.build()?;

    info!("Transit network created successfully");
    // CSV deserialization allocates a lot of short-lived memory that is not
    // always returned to the system. This call releases free memory from
    // the tail of the heap.
    //
    // # Safety
    //
    // This call is safe to use on linux with glibc implementation
    // which is checked by the cfg attribute in compile time.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::warn!("Memory trimming failed - continuing anyway");
        } else {
            log::debug!("Successfully trimmed unused heap memory");
        }
    }
    Ok(network)
}

fn validate_config(config: &NetworkConfig) -> Result<(), Error> {
    if config.gtfs_dirs.is_empty() {
        return Err(Error::InvalidData(
            "No GTFS directories provided in the configuration".to_string(),
        ));
    }

    for dir in &config.gtfs_dirs {
        if !dir.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("GTFS directory not found: {}", dir.display()),
            )));
        }
    }

    if !config.walking_speed.is_finite() || config.walking_speed <= 0.0 {
        return Err(Error::InvalidData(format!(
            "Walking speed must be positive, got {}",
            config.walking_speed
        )));
    }

    Ok(())
}
