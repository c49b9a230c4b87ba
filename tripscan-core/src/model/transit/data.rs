//! Transit network structure and methods to work with it

use hashbrown::HashMap;

use super::timetable::Timetable;
use super::types::{FeedMeta, Footpath, Route, RoutePath, Stop, StopRoutePath, TripInfo};
use crate::{DAYS_PER_WEEK, RouteIdx, RoutePathIdx, RoutingError, StopIdx, StopRole, Time};

/// Immutable index of a transit schedule.
///
/// Built once by [`crate::NetworkBuilder`], then shared read-only by any
/// number of concurrent queries.
#[derive(Debug, Clone)]
pub struct TransitNetwork {
    /// All stops
    pub stops: Vec<Stop>,
    /// All routes
    pub routes: Vec<Route>,
    /// Route-paths, each a non-overtaking set of trips with one stop sequence
    pub route_paths: Vec<RoutePath>,
    /// Stops for each route-path
    pub route_path_stops: Vec<StopIdx>,
    /// Route-path occurrences for each stop
    pub stop_route_paths: Vec<StopRoutePath>,
    /// Trips independent of the weekday
    pub trip_infos: Vec<TripInfo>,
    /// Footpaths sorted by source stop
    pub footpaths_by_source: Vec<Footpath>,
    /// Footpaths sorted by target stop
    pub footpaths_by_target: Vec<Footpath>,
    /// One timetable per weekday, Monday first
    pub timetables: Vec<Timetable>,
    /// External stop id to dense index
    pub stop_lookup: HashMap<String, StopIdx>,
    /// External route id to dense index
    pub route_lookup: HashMap<String, RouteIdx>,
    /// Metadata for feeds
    pub feeds_meta: Vec<FeedMeta>,
}

impl TransitNetwork {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn route_path_count(&self) -> usize {
        self.route_paths.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trip_infos.len()
    }

    /// Number of transfers precomputed for a weekday
    pub fn transfer_count(&self, weekday: usize) -> usize {
        self.timetables.get(weekday).map_or(0, Timetable::transfer_count)
    }

    pub fn feeds_info(&self) -> &[FeedMeta] {
        &self.feeds_meta
    }

    pub fn stop_index(&self, stop_id: &str) -> Option<StopIdx> {
        self.stop_lookup.get(stop_id).copied()
    }

    /// Dense index of an external stop id, or a query failure naming its role
    pub fn resolve_stop(&self, stop_id: &str, role: StopRole) -> Result<StopIdx, RoutingError> {
        self.stop_index(stop_id)
            .ok_or_else(|| RoutingError::UnknownStop {
                role,
                stop_id: stop_id.to_string(),
            })
    }

    /// Dense index of an external route id
    pub fn resolve_route(&self, route_id: &str) -> Result<RouteIdx, RoutingError> {
        self.route_lookup
            .get(route_id)
            .copied()
            .ok_or_else(|| RoutingError::UnknownRoute(route_id.to_string()))
    }

    /// check if such stop exists
    pub(crate) fn validate_stop(&self, stop: StopIdx) -> Result<(), RoutingError> {
        if stop >= self.stops.len() {
            Err(RoutingError::InvalidStopIndex(stop))
        } else {
            Ok(())
        }
    }

    pub fn stop(&self, stop: StopIdx) -> &Stop {
        &self.stops[stop]
    }

    pub fn timetable(&self, weekday: usize) -> Result<&Timetable, RoutingError> {
        if weekday >= DAYS_PER_WEEK {
            return Err(RoutingError::InvalidWeekday(weekday));
        }
        self.timetables
            .get(weekday)
            .ok_or(RoutingError::InvalidWeekday(weekday))
    }

    /// Stops for specific route-path
    pub fn route_path_stops(&self, route_path: RoutePathIdx) -> &[StopIdx] {
        &self.route_path_stops[self.route_paths[route_path].stops.range()]
    }

    /// Route-path occurrences at the specified stop
    pub fn route_paths_at(&self, stop: StopIdx) -> &[StopRoutePath] {
        match self.stops[stop].route_paths {
            Some(span) => &self.stop_route_paths[span.range()],
            None => &[],
        }
    }

    /// Footpaths leaving the specified stop, the self-footpath included
    pub fn footpaths_from(&self, stop: StopIdx) -> &[Footpath] {
        match self.stops[stop].footpaths_out {
            Some(span) => &self.footpaths_by_source[span.range()],
            None => &[],
        }
    }

    /// Footpaths ending at the specified stop, the self-footpath included
    pub fn footpaths_to(&self, stop: StopIdx) -> &[Footpath] {
        match self.stops[stop].footpaths_in {
            Some(span) => &self.footpaths_by_target[span.range()],
            None => &[],
        }
    }

    /// Walking time between two stops if a footpath exists
    pub fn footpath_duration(&self, from: StopIdx, to: StopIdx) -> Option<Time> {
        self.footpaths_from(from)
            .iter()
            .find(|footpath| footpath.target == to)
            .map(|footpath| footpath.duration)
    }

    /// Get the location of a transit stop
    pub fn stop_location(&self, stop: StopIdx) -> geo::Point<f64> {
        self.stops[stop].geometry
    }

    /// Route of the given route-path
    pub fn route_of(&self, route_path: RoutePathIdx) -> &Route {
        &self.routes[self.route_paths[route_path].route]
    }
}
