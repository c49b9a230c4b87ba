use log::warn;
use rayon::prelude::*;
use tripscan_core::prelude::*;

use crate::model::TransitModel;
use crate::routing::find_routes_one_to_many;

/// Travel times between every pair of `stop_ids`, `matrix[origin][destination]`.
///
/// Rows are computed in parallel, one one-to-many query per origin.
///
/// # Errors
///
/// Unknown stop ids are rejected before any row is computed. A row whose
/// query fails for another reason is logged and left empty.
pub fn travel_time_matrix<S: AsRef<str> + Sync>(
    model: &TransitModel,
    stop_ids: &[S],
    weekday: usize,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Vec<Vec<Option<Time>>>, RoutingError> {
    for stop_id in stop_ids {
        model
            .network()
            .resolve_stop(stop_id.as_ref(), StopRole::Origin)?;
    }

    let matrix = stop_ids
        .par_iter()
        .map(|origin| {
            match find_routes_one_to_many(
                model,
                origin.as_ref(),
                stop_ids,
                weekday,
                departure_time,
                max_transfers,
            ) {
                Ok(row) => row
                    .into_iter()
                    .map(|summary| summary.map(|summary| summary.travel_time))
                    .collect(),
                Err(e) => {
                    warn!("Routing failed for stop '{}': {e}", origin.as_ref());
                    vec![None; stop_ids.len()]
                }
            }
        })
        .collect();

    Ok(matrix)
}
