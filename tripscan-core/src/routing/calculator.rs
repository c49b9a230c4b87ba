use std::time::{Duration, Instant};

use log::debug;

use super::query::{Destination, Query};
use super::trip_based::{RouteFilter, SearchParams, StopResult, trip_based};
use crate::{RouteIdx, RoutingError, StopIdx, StopRole, Time, TransitNetwork};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub origin: StopIdx,
    pub origin_id: String,
    pub weekday: usize,
    pub departure_time: Time,
    /// One record per requested destination, in request order
    pub stops: Vec<StopResult>,
    /// Wall time spent in the search
    pub calculation_time: Duration,
}

impl QueryResult {
    pub fn stop(&self, stop_id: &str) -> Option<&StopResult> {
        self.stops.iter().find(|result| result.stop_id == stop_id)
    }

    pub fn reachable_count(&self) -> usize {
        self.stops.iter().filter(|result| result.is_reachable()).count()
    }
}

/// Binds queries to a network and runs them
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    network: &'a TransitNetwork,
}

impl<'a> Calculator<'a> {
    pub fn new(network: &'a TransitNetwork) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &'a TransitNetwork {
        self.network
    }

    /// Runs a query.
    ///
    /// # Errors
    ///
    /// Unknown origin, destination or route ids, an invalid weekday or start
    /// time fail before any search work. Unreachable destinations are not
    /// errors, they are reported with `reached: None`.
    pub fn calculate(&self, query: &Query) -> Result<QueryResult, RoutingError> {
        let origin = self.network.resolve_stop(&query.origin, StopRole::Origin)?;
        let targets = self.resolve_destination(&query.destination)?;
        let route_filter = RouteFilter::new(
            self.network.route_count(),
            &self.resolve_routes(&query.only_route_ids)?,
            &self.resolve_routes(&query.except_route_ids)?,
        );
        let params = SearchParams {
            weekday: query.weekday,
            departure_time: query.departure_time,
            min_waiting_time: query.min_waiting_time,
            max_transfers: query.max_transfers,
            max_travel_time: query.max_travel_time,
            route_filter,
            detailed: query.detailed,
        };

        let started = Instant::now();
        let stops = trip_based(self.network, origin, &targets, &params)?;
        let calculation_time = started.elapsed();

        debug!(
            "Query from '{}' on weekday {} at {}: {} of {} stops reachable in {:?}",
            query.origin,
            query.weekday,
            query.departure_time,
            stops.iter().filter(|stop| stop.is_reachable()).count(),
            stops.len(),
            calculation_time
        );

        Ok(QueryResult {
            origin,
            origin_id: query.origin.clone(),
            weekday: query.weekday,
            departure_time: query.departure_time,
            stops,
            calculation_time,
        })
    }

    fn resolve_routes(&self, route_ids: &[String]) -> Result<Vec<RouteIdx>, RoutingError> {
        route_ids
            .iter()
            .map(|route_id| self.network.resolve_route(route_id))
            .collect()
    }

    fn resolve_destination(&self, destination: &Destination) -> Result<Vec<StopIdx>, RoutingError> {
        match destination {
            Destination::Stop(stop_id) => Ok(vec![
                self.network.resolve_stop(stop_id, StopRole::Destination)?,
            ]),
            Destination::AllStops => Ok((0..self.network.stop_count()).collect()),
            Destination::Stops(stop_ids) => stop_ids
                .iter()
                .map(|stop_id| self.network.resolve_stop(stop_id, StopRole::Destination))
                .collect(),
        }
    }
}
