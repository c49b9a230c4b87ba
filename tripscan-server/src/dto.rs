//! Request parsing and response bodies

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tripscan::{DemandProfile, OdTrip, ReplayOptions};
use tripscan_core::loading::gtfs::parse_time;
use tripscan_core::model::FeedMeta;
use tripscan_core::prelude::*;

use crate::config::QueryDefaults;

const ORIGIN_KEYS: &[&str] = &["origin_stop_id", "start_stop_id", "starting_stop_id"];
const DESTINATION_KEYS: &[&str] = &["destination_stop_id", "end_stop_id", "ending_stop_id"];
const ALL_STOPS_KEYS: &[&str] = &["all_stops", "return_all_stops_result", "return_all_stops_results"];
const TIME_KEYS: &[&str] = &["time", "departure", "departure_time", "start_time"];
const MAX_TRANSFERS_KEYS: &[&str] = &["max_transfers", "max_number_of_transfers"];
const DETAILED_KEYS: &[&str] = &["detailed", "detailed_results", "detailed_result"];

/// Failure sent back as `{"status":"failed","error":...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RoutingError> for ApiError {
    fn from(error: RoutingError) -> Self {
        Self::bad_request(error.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        match error {
            Error::InvalidData(_) | Error::Routing(_) => Self::bad_request(error.to_string()),
            _ => Self::internal(error),
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureResponse {
    status: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = FailureResponse {
            status: "failed",
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Parsed `GET /route/v1/transit` parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    pub origin: String,
    pub destination: Option<String>,
    pub all_stops: bool,
    pub weekday: usize,
    pub departure_time: Time,
    pub min_waiting_time: Time,
    pub max_transfers: usize,
    /// Seconds, `None` when unlimited
    pub max_travel_time: Option<Time>,
    pub only_route_ids: Vec<String>,
    pub except_route_ids: Vec<String>,
    pub detailed: bool,
}

fn lookup<'a>(params: &'a HashMap<String, String>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| params.get(*name))
        .map(String::as_str)
}

fn parse_number<T: FromStr>(value: &str, name: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid {name} '{value}'")))
}

fn parse_flag(value: &str) -> Result<bool, ApiError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ApiError::bad_request(format!(
            "Invalid flag '{value}', expected true or false"
        ))),
    }
}

/// Comma separated ids, blanks dropped
fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// `max_travel_time` in seconds or `max_travel_time_minutes`; 0 means unlimited
fn parse_max_travel_time(params: &HashMap<String, String>) -> Result<Option<Time>, ApiError> {
    let seconds = match (
        params.get("max_travel_time"),
        params.get("max_travel_time_minutes"),
    ) {
        (Some(value), _) => parse_number::<Time>(value, "max_travel_time")?,
        (None, Some(value)) => parse_number::<Time>(value, "max_travel_time_minutes")?
            .checked_mul(60)
            .ok_or_else(|| {
                ApiError::bad_request(format!("Invalid max_travel_time_minutes '{value}'"))
            })?,
        (None, None) => 0,
    };
    Ok((seconds > 0).then_some(seconds))
}

/// `HH:MM`, `HH:MM:SS` or plain seconds since midnight
pub fn parse_clock_time(value: &str) -> Option<Time> {
    let value = value.trim();
    match value.matches(':').count() {
        0 => value.parse().ok(),
        1 => parse_time(&format!("{value}:00")),
        _ => parse_time(value),
    }
}

impl RouteParams {
    pub fn parse(
        params: &HashMap<String, String>,
        defaults: &QueryDefaults,
    ) -> Result<Self, ApiError> {
        let origin = lookup(params, ORIGIN_KEYS)
            .ok_or_else(|| ApiError::bad_request("Missing origin_stop_id"))?
            .to_string();
        let all_stops = lookup(params, ALL_STOPS_KEYS)
            .map(parse_flag)
            .transpose()?
            .unwrap_or(false);
        let destination = lookup(params, DESTINATION_KEYS).map(str::to_string);
        if destination.is_none() && !all_stops {
            return Err(ApiError::bad_request(
                "Missing destination_stop_id (or all_stops=true)",
            ));
        }

        let weekday = match (params.get("date"), params.get("weekday")) {
            (Some(date), _) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
                .map(weekday_index)
                .map_err(|_| {
                    ApiError::bad_request(format!("Invalid date '{date}', expected YYYY-MM-DD"))
                })?,
            (None, Some(weekday)) => parse_number(weekday, "weekday")?,
            (None, None) => return Err(ApiError::bad_request("Missing date or weekday")),
        };

        let time = lookup(params, TIME_KEYS)
            .ok_or_else(|| ApiError::bad_request("Missing time"))?;
        let departure_time = parse_clock_time(time)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid time '{time}'")))?;

        let min_waiting_time = params
            .get("min_waiting_time")
            .map(|value| parse_number(value, "min_waiting_time"))
            .transpose()?
            .unwrap_or(defaults.min_waiting_time);
        let max_transfers = lookup(params, MAX_TRANSFERS_KEYS)
            .map(|value| parse_number(value, "max_transfers"))
            .transpose()?
            .unwrap_or(defaults.max_transfers);
        let detailed = lookup(params, DETAILED_KEYS)
            .map(parse_flag)
            .transpose()?
            .unwrap_or(false);
        let max_travel_time = parse_max_travel_time(params)?;
        let only_route_ids = params
            .get("only_route_ids")
            .map(|value| parse_id_list(value))
            .unwrap_or_default();
        let except_route_ids = params
            .get("except_route_ids")
            .map(|value| parse_id_list(value))
            .unwrap_or_default();

        Ok(Self {
            origin,
            destination,
            all_stops,
            weekday,
            departure_time,
            min_waiting_time,
            max_transfers,
            max_travel_time,
            only_route_ids,
            except_route_ids,
            detailed,
        })
    }

    pub fn into_query(self) -> Query {
        let destination = match (self.all_stops, self.destination) {
            (false, Some(stop_id)) => Destination::Stop(stop_id),
            _ => Destination::AllStops,
        };
        let query = Query::new(self.origin, destination, self.weekday, self.departure_time)
            .with_min_waiting_time(self.min_waiting_time)
            .with_max_transfers(self.max_transfers)
            .only_routes(self.only_route_ids)
            .except_routes(self.except_route_ids)
            .detailed(self.detailed);
        Query {
            max_travel_time: self.max_travel_time,
            ..query
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoDto {
    pub number_of_transfers: usize,
    pub arrival_time_seconds: Time,
}

#[derive(Debug, Serialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum LegDto {
    Walk {
        from_stop_id: String,
        to_stop_id: String,
        departure_time_seconds: Time,
        arrival_time_seconds: Time,
        duration_seconds: Time,
    },
    Transit {
        route_id: String,
        trip_id: String,
        from_stop_id: String,
        from_stop_sequence: usize,
        to_stop_id: String,
        to_stop_sequence: usize,
        departure_time_seconds: Time,
        arrival_time_seconds: Time,
    },
}

impl LegDto {
    fn new(leg: &JourneyLeg, network: &TransitNetwork) -> Self {
        let stop_id = |stop: StopIdx| network.stop(stop).stop_id.clone();
        match leg {
            JourneyLeg::Walk {
                from_stop,
                to_stop,
                departure_time,
                arrival_time,
                duration,
            } => Self::Walk {
                from_stop_id: stop_id(*from_stop),
                to_stop_id: stop_id(*to_stop),
                departure_time_seconds: *departure_time,
                arrival_time_seconds: *arrival_time,
                duration_seconds: *duration,
            },
            JourneyLeg::Transit {
                route_id,
                trip_id,
                from_stop,
                from_stop_seq,
                to_stop,
                to_stop_seq,
                departure_time,
                arrival_time,
                ..
            } => Self::Transit {
                route_id: route_id.clone(),
                trip_id: trip_id.clone(),
                from_stop_id: stop_id(*from_stop),
                from_stop_sequence: *from_stop_seq,
                to_stop_id: stop_id(*to_stop),
                to_stop_sequence: *to_stop_seq,
                departure_time_seconds: *departure_time,
                arrival_time_seconds: *arrival_time,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyDto {
    pub departure_time_seconds: Time,
    pub arrival_time_seconds: Time,
    pub number_of_transfers: usize,
    pub walking_time_seconds: Time,
    pub legs: Vec<LegDto>,
    /// Leg geometries as a GeoJSON `FeatureCollection`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<JsonValue>,
}

impl JourneyDto {
    fn new(journey: &Journey, network: &TransitNetwork) -> Self {
        let geojson = journey
            .to_geojson(network)
            .ok()
            .and_then(|collection| serde_json::to_value(collection).ok());
        Self {
            departure_time_seconds: journey.departure_time,
            arrival_time_seconds: journey.arrival_time,
            number_of_transfers: journey.transfers,
            walking_time_seconds: journey.walking_time(),
            legs: journey
                .legs
                .iter()
                .map(|leg| LegDto::new(leg, network))
                .collect(),
            geojson,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopDto {
    pub stop_id: String,
    pub reachable: bool,
    pub arrival_time_seconds: Option<Time>,
    pub travel_time_seconds: Option<Time>,
    pub number_of_transfers: Option<usize>,
    pub pareto: Vec<ParetoDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey: Option<JourneyDto>,
}

impl StopDto {
    fn new(result: &StopResult, network: &TransitNetwork) -> Self {
        let reached = result.reached.as_ref();
        Self {
            stop_id: result.stop_id.clone(),
            reachable: result.is_reachable(),
            arrival_time_seconds: result.arrival_time(),
            travel_time_seconds: result.travel_time(),
            number_of_transfers: result.transfers(),
            pareto: reached
                .map(|reached| {
                    reached
                        .pareto
                        .iter()
                        .map(|entry| ParetoDto {
                            number_of_transfers: entry.transfers,
                            arrival_time_seconds: entry.arrival_time,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            journey: reached
                .and_then(|reached| reached.journey.as_ref())
                .map(|journey| JourneyDto::new(journey, network)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub status: &'static str,
    pub origin: String,
    pub weekday: usize,
    pub departure_time_seconds: Time,
    pub reachable_count: usize,
    pub stops: Vec<StopDto>,
    pub calculated_in_milliseconds: f64,
}

impl RouteResponse {
    pub fn new(result: &QueryResult, network: &TransitNetwork) -> Self {
        Self {
            status: "success",
            origin: result.origin_id.clone(),
            weekday: result.weekday,
            departure_time_seconds: result.departure_time,
            reachable_count: result.reachable_count(),
            stops: result
                .stops
                .iter()
                .map(|stop| StopDto::new(stop, network))
                .collect(),
            calculated_in_milliseconds: millis(result.calculation_time),
        }
    }
}

/// Body of `POST /od_trips/v1/replay`
#[derive(Debug, Deserialize)]
pub struct OdReplayRequest {
    pub trips: Vec<OdTrip>,
    #[serde(default)]
    pub options: ReplayOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OdReplayResponse {
    pub status: &'static str,
    pub profile: DemandProfile,
    pub calculated_in_milliseconds: f64,
}

impl OdReplayResponse {
    pub fn new(profile: DemandProfile, elapsed: Duration) -> Self {
        Self {
            status: "success",
            profile,
            calculated_in_milliseconds: millis(elapsed),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub stops: usize,
    pub routes: usize,
    pub route_paths: usize,
    pub trips: usize,
    pub feeds: Vec<FeedMeta>,
}

impl HealthResponse {
    pub fn new(network: &TransitNetwork) -> Self {
        Self {
            status: "ok",
            stops: network.stop_count(),
            routes: network.route_count(),
            route_paths: network.route_path_count(),
            trips: network.trip_count(),
            feeds: network.feeds_info().to_vec(),
        }
    }
}
