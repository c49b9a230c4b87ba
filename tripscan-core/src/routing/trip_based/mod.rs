//! Trip-based earliest arrival search (Witt, 2015).
//!
//! A query expands the source once: every route-path reachable on foot
//! from the source is boarded on its earliest catchable trip. Each target
//! is then evaluated by scanning trip segments in order of transfer count
//! and following the precomputed trip transfers, using the earliest stop
//! sequence already reached on every trip to skip dominated work.

mod journey;
mod search;
mod state;

use log::debug;

use crate::routing::itinerary::Journey;
use crate::{MAX_START_TIME, RouteIdx, RoutePathIdx, RoutingError, StopIdx, Time, TransitNetwork};

use search::{evaluate_target, expand_source};

/// Routes a query may ride, by dense route index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    /// `None` allows every route
    allowed: Option<Vec<bool>>,
}

impl RouteFilter {
    /// Allows `only` (every route when empty) minus `except`
    pub fn new(route_count: usize, only: &[RouteIdx], except: &[RouteIdx]) -> Self {
        if only.is_empty() && except.is_empty() {
            return Self::default();
        }
        let mut allowed = vec![only.is_empty(); route_count];
        for &route in only {
            if let Some(flag) = allowed.get_mut(route) {
                *flag = true;
            }
        }
        for &route in except {
            if let Some(flag) = allowed.get_mut(route) {
                *flag = false;
            }
        }
        Self {
            allowed: Some(allowed),
        }
    }

    pub fn allows(&self, route: RouteIdx) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.get(route).copied().unwrap_or(false))
    }

    pub(crate) fn allows_route_path(
        &self,
        network: &TransitNetwork,
        route_path: RoutePathIdx,
    ) -> bool {
        self.allowed.is_none() || self.allows(network.route_paths[route_path].route)
    }
}

/// Search parameters shared by all targets of a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// 0 = Monday .. 6 = Sunday
    pub weekday: usize,
    pub departure_time: Time,
    /// Buffer between reaching a stop from the source and boarding
    pub min_waiting_time: Time,
    /// Inclusive bound on the number of transfers
    pub max_transfers: usize,
    /// Longest accepted travel time, seconds
    pub max_travel_time: Option<Time>,
    pub route_filter: RouteFilter,
    /// Reconstruct the journey legs of the best arrival
    pub detailed: bool,
}

impl SearchParams {
    /// Latest accepted arrival at any target
    pub fn deadline(&self) -> Option<Time> {
        self.max_travel_time
            .map(|limit| self.departure_time.saturating_add(limit))
    }
}

/// Arrival with a given number of transfers that no journey with fewer
/// transfers matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParetoEntry {
    pub transfers: usize,
    pub arrival_time: Time,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReachedStop {
    pub arrival_time: Time,
    pub travel_time: Time,
    /// Fewest transfers achieving `arrival_time`
    pub transfers: usize,
    pub pareto: Vec<ParetoEntry>,
    pub journey: Option<Journey>,
}

/// Outcome for one destination. `reached` is `None` when the stop cannot
/// be reached within the transfer budget.
#[derive(Debug, Clone, PartialEq)]
pub struct StopResult {
    pub stop: StopIdx,
    pub stop_id: String,
    pub reached: Option<ReachedStop>,
}

impl StopResult {
    pub fn is_reachable(&self) -> bool {
        self.reached.is_some()
    }

    pub fn arrival_time(&self) -> Option<Time> {
        self.reached.as_ref().map(|reached| reached.arrival_time)
    }

    pub fn travel_time(&self) -> Option<Time> {
        self.reached.as_ref().map(|reached| reached.travel_time)
    }

    pub fn transfers(&self) -> Option<usize> {
        self.reached.as_ref().map(|reached| reached.transfers)
    }
}

fn validate_inputs(
    network: &TransitNetwork,
    source: StopIdx,
    targets: &[StopIdx],
    params: &SearchParams,
) -> Result<(), RoutingError> {
    network.validate_stop(source)?;
    for &target in targets {
        network.validate_stop(target)?;
    }
    if params.departure_time > MAX_START_TIME {
        return Err(RoutingError::InvalidTime(params.departure_time));
    }
    network.timetable(params.weekday).map(|_| ())
}

/// Earliest arrival from `source` at each of `targets`.
///
/// # Errors
///
/// Returns a [`RoutingError`] for an invalid stop index, weekday or start
/// time. No search work is done in that case.
pub fn trip_based(
    network: &TransitNetwork,
    source: StopIdx,
    targets: &[StopIdx],
    params: &SearchParams,
) -> Result<Vec<StopResult>, RoutingError> {
    validate_inputs(network, source, targets, params)?;
    let timetable = network.timetable(params.weekday)?;

    let expansion = expand_source(network, timetable, source, params);
    debug!(
        "Source {} expanded into {} segments",
        network.stop(source).stop_id,
        expansion.segments.len()
    );

    let results = targets
        .iter()
        .map(|&target| StopResult {
            stop: target,
            stop_id: network.stop(target).stop_id.clone(),
            reached: evaluate_target(network, timetable, &expansion, target, params),
        })
        .collect();
    Ok(results)
}
