use std::ops::Range;

use geo::Point;
use serde::Serialize;

use crate::{DAYS_PER_WEEK, RouteIdx, RoutePathIdx, StopIdx, Time, TripIdx};

/// Contiguous range into one of the flat tables of the network.
///
/// Range tables store `Option<Span>`; `None` means "no entries".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    /// Span covering `start..end`, `None` when empty
    pub(crate) fn between(start: usize, end: usize) -> Option<Span> {
        (end > start).then_some(Span {
            start,
            len: end - start,
        })
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

#[derive(Debug, Clone)]
pub struct Stop {
    /// External (feed) id
    pub stop_id: String,
    pub name: String,
    /// Coordinates, x = lon, y = lat
    pub geometry: Point<f64>,
    /// Range into `TransitNetwork::stop_route_paths`
    pub route_paths: Option<Span>,
    /// Range into `TransitNetwork::footpaths_by_source`
    pub footpaths_out: Option<Span>,
    /// Range into `TransitNetwork::footpaths_by_target`
    pub footpaths_in: Option<Span>,
}

#[derive(Debug, Clone, Default)]
pub struct Route {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
}

/// Fixed ordered stop sequence served by non-overtaking trips of one route
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub route: RouteIdx,
    /// Range into `TransitNetwork::route_path_stops`
    pub stops: Span,
}

impl RoutePath {
    pub fn num_stops(&self) -> usize {
        self.stops.len
    }

    pub fn last_stop_seq(&self) -> usize {
        self.stops.len - 1
    }
}

/// One occurrence of a stop on a route-path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopRoutePath {
    pub route_path: RoutePathIdx,
    pub stop_seq: usize,
}

/// Week-independent description of a scheduled trip
#[derive(Debug, Clone)]
pub struct TripInfo {
    pub trip_id: String,
    pub route_path: RoutePathIdx,
    pub service_days: [bool; DAYS_PER_WEEK],
}

/// A trip running on one weekday
#[derive(Debug, Clone, Copy)]
pub struct Trip {
    /// Index into `TransitNetwork::trip_infos`
    pub info: usize,
    pub route_path: RoutePathIdx,
    /// Position among the trips of its route-path on this weekday
    pub seq: usize,
    /// Range into the departure/arrival time tables of the weekday
    pub times: Span,
}

/// Walking edge between two stops, also from a stop to itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footpath {
    pub source: StopIdx,
    pub target: StopIdx,
    pub duration: Time,
}

/// Precomputed change from an arrival event onto another trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub target_trip: TripIdx,
    pub target_stop_seq: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedMeta {
    pub publisher_name: String,
    pub publisher_url: String,
    pub lang: String,
    pub version: String,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}
