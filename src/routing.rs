use serde::Serialize;
use tripscan_core::prelude::*;

use crate::model::TransitModel;

/// Compact outcome of a reachable destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub arrival_time: Time,
    pub travel_time: Time,
    pub transfers: usize,
}

impl From<&ReachedStop> for RouteSummary {
    fn from(reached: &ReachedStop) -> Self {
        Self {
            arrival_time: reached.arrival_time,
            travel_time: reached.travel_time,
            transfers: reached.transfers,
        }
    }
}

fn summarize(result: &StopResult) -> Option<RouteSummary> {
    result.reached.as_ref().map(RouteSummary::from)
}

/// Earliest arrival between two stops, `None` when unreachable.
///
/// # Errors
///
/// Unknown stop ids, an invalid weekday or start time.
pub fn find_route(
    model: &TransitModel,
    origin: &str,
    destination: &str,
    weekday: usize,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Option<RouteSummary>, RoutingError> {
    let query = Query::between(origin, destination, weekday, departure_time)
        .with_max_transfers(max_transfers);
    let result = model.calculator().calculate(&query)?;
    Ok(result.stops.first().and_then(summarize))
}

/// Earliest arrivals from one stop to many, in the order of `destinations`.
///
/// The source is expanded once for all destinations.
///
/// # Errors
///
/// Unknown stop ids, an invalid weekday or start time.
pub fn find_routes_one_to_many<S: AsRef<str>>(
    model: &TransitModel,
    origin: &str,
    destinations: &[S],
    weekday: usize,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Vec<Option<RouteSummary>>, RoutingError> {
    let destination = Destination::Stops(
        destinations
            .iter()
            .map(|stop_id| stop_id.as_ref().to_string())
            .collect(),
    );
    let query =
        Query::new(origin, destination, weekday, departure_time).with_max_transfers(max_transfers);
    let result = model.calculator().calculate(&query)?;
    Ok(result.stops.iter().map(summarize).collect())
}
