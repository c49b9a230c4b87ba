use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::Limits;
use crate::dto::{
    ApiError, HealthResponse, OdReplayRequest, OdReplayResponse, RouteParams, RouteResponse,
};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.limits.request_timeout_seconds);
    let concurrency = state.limits.max_concurrent_requests.max(1);
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/route/v1/transit", get(route_transit))
        .route("/od_trips/v1/replay", post(replay_od_trips))
        .route("/health", get(health))
        .layer(ConcurrencyLimitLayer::new(concurrency))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Applies the server limits to a parsed request
fn admit(mut params: RouteParams, limits: &Limits) -> Result<RouteParams, ApiError> {
    if params.all_stops && !limits.allow_all_stops {
        return Err(ApiError::bad_request(
            "All stops queries are disabled on this server",
        ));
    }
    if params.max_transfers > limits.max_transfers_cap {
        debug!(
            "Capping max_transfers {} to {}",
            params.max_transfers, limits.max_transfers_cap
        );
        params.max_transfers = limits.max_transfers_cap;
    }
    Ok(params)
}

async fn route_transit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RouteResponse>, ApiError> {
    let params = RouteParams::parse(&params, &state.defaults)?;
    let query = admit(params, &state.limits)?.into_query();

    let response = tokio::task::spawn_blocking(move || {
        let result = state.model.calculator().calculate(&query)?;
        Ok::<_, ApiError>(RouteResponse::new(&result, state.model.network()))
    })
    .await
    .map_err(ApiError::internal)??;

    Ok(Json(response))
}

async fn replay_od_trips(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OdReplayRequest>, JsonRejection>,
) -> Result<Json<OdReplayResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let mut options = request.options;
    options.max_transfers = options.max_transfers.min(state.limits.max_transfers_cap);

    let response = tokio::task::spawn_blocking(move || {
        let started = Instant::now();
        let profile = tripscan::replay_od_trips(&state.model, &request.trips, &options)?;
        Ok::<_, ApiError>(OdReplayResponse::new(profile, started.elapsed()))
    })
    .await
    .map_err(ApiError::internal)??;

    Ok(Json(response))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.model.network()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(all_stops: bool, max_transfers: usize) -> RouteParams {
        RouteParams {
            origin: "A".to_string(),
            destination: (!all_stops).then(|| "B".to_string()),
            all_stops,
            weekday: 0,
            departure_time: 28_800,
            min_waiting_time: 0,
            max_transfers,
            max_travel_time: None,
            only_route_ids: Vec::new(),
            except_route_ids: Vec::new(),
            detailed: false,
        }
    }

    #[test]
    fn caps_transfer_budget() {
        let limits = Limits {
            max_transfers_cap: 2,
            ..Limits::default()
        };
        assert_eq!(admit(params(false, 5), &limits).unwrap().max_transfers, 2);
        assert_eq!(admit(params(false, 1), &limits).unwrap().max_transfers, 1);
    }

    #[test]
    fn all_stops_can_be_disabled() {
        let limits = Limits {
            allow_all_stops: false,
            ..Limits::default()
        };
        assert!(admit(params(true, 1), &limits).is_err());
        assert!(admit(params(false, 1), &limits).is_ok());
    }
}
