//! Origin-destination batch replay.
//!
//! Each recorded trip is re-planned as a single detailed query and the
//! boardings of the resulting journeys are tallied per time period,
//! weighted by the record's expansion factor.

use std::fs::File;
use std::path::Path;

use hashbrown::HashMap;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use tripscan_core::loading::gtfs::parse_time;
use tripscan_core::prelude::*;

use crate::model::TransitModel;

fn default_expansion_factor() -> f64 {
    1.0
}

/// One surveyed trip
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OdTrip {
    pub id: String,
    pub origin_stop_id: String,
    pub destination_stop_id: String,
    /// Seconds since midnight, or `HH:MM[:SS]` in files
    #[serde(deserialize_with = "deserialize_departure_time")]
    pub departure_time: Time,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: usize,
    #[serde(default = "default_expansion_factor")]
    pub expansion_factor: f64,
}

fn deserialize_departure_time<'de, D>(deserializer: D) -> Result<Time, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTime {
        Seconds(Time),
        Text(String),
    }

    match RawTime::deserialize(deserializer)? {
        RawTime::Seconds(seconds) => Ok(seconds),
        RawTime::Text(text) => {
            let text = text.trim();
            text.parse::<Time>()
                .ok()
                .or_else(|| parse_time(text))
                .or_else(|| parse_time(&format!("{text}:00")))
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{text}'")))
        }
    }
}

/// Reads OD trips from a CSV file with the [`OdTrip`] columns.
///
/// Malformed rows are skipped with a warning.
///
/// # Errors
///
/// The file cannot be opened or its header cannot be read.
pub fn load_od_trips(path: &Path) -> Result<Vec<OdTrip>, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let mut reader = csv::Reader::from_reader(file);
    reader.headers()?;

    let mut trips = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize() {
        match record {
            Ok(trip) => trips.push(trip),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} malformed OD trips in {}", path.display());
    }
    Ok(trips)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Length of a tally period, seconds
    pub period_length: Time,
    pub min_waiting_time: Time,
    pub max_transfers: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            period_length: 3600,
            min_waiting_time: 0,
            max_transfers: Query::DEFAULT_MAX_TRANSFERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OdTripOutcome {
    Reachable,
    Unreachable,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdTripResult {
    pub id: String,
    pub outcome: OdTripOutcome,
    pub arrival_time: Option<Time>,
    pub travel_time: Option<Time>,
    pub transfers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Weighted boardings of one route-path during one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePathUsage {
    pub period: usize,
    pub period_start: Time,
    pub route_path: RoutePathIdx,
    pub route_id: String,
    pub boardings: usize,
    pub weight: f64,
}

/// Weighted boardings of one trip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripUsage {
    pub trip_id: String,
    pub route_id: String,
    pub boardings: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandProfile {
    pub period_length: Time,
    pub reachable: usize,
    pub unreachable: usize,
    pub failed: usize,
    /// Sorted by period, then route id
    pub route_paths: Vec<RoutePathUsage>,
    /// Sorted by trip id
    pub trips: Vec<TripUsage>,
    /// One record per replayed trip, in input order
    pub results: Vec<OdTripResult>,
}

struct Replayed {
    result: OdTripResult,
    journey: Option<Journey>,
    weight: f64,
}

fn replay_one(model: &TransitModel, trip: &OdTrip, options: &ReplayOptions) -> Replayed {
    let query = Query::between(
        trip.origin_stop_id.as_str(),
        trip.destination_stop_id.as_str(),
        trip.weekday,
        trip.departure_time,
    )
    .with_min_waiting_time(options.min_waiting_time)
    .with_max_transfers(options.max_transfers)
    .detailed(true);

    let mut result = OdTripResult {
        id: trip.id.clone(),
        outcome: OdTripOutcome::Failed,
        arrival_time: None,
        travel_time: None,
        transfers: None,
        error: None,
    };
    let mut journey = None;

    match model.calculator().calculate(&query) {
        Ok(query_result) => match query_result
            .stops
            .into_iter()
            .next()
            .and_then(|stop| stop.reached)
        {
            Some(reached) => {
                result.outcome = OdTripOutcome::Reachable;
                result.arrival_time = Some(reached.arrival_time);
                result.travel_time = Some(reached.travel_time);
                result.transfers = Some(reached.transfers);
                journey = reached.journey;
            }
            None => result.outcome = OdTripOutcome::Unreachable,
        },
        Err(e) => {
            debug!("OD trip '{}' failed: {e}", trip.id);
            result.error = Some(e.to_string());
        }
    }

    Replayed {
        result,
        journey,
        weight: trip.expansion_factor,
    }
}

/// Re-plans every OD trip and tallies the boardings of the journeys found.
///
/// Trips are replayed in parallel. Boardings are assigned to the period
/// containing the boarding time.
///
/// # Errors
///
/// A zero `period_length`. Individual trips that cannot be planned are
/// counted as failed, not returned as errors.
pub fn replay_od_trips(
    model: &TransitModel,
    trips: &[OdTrip],
    options: &ReplayOptions,
) -> Result<DemandProfile, Error> {
    if options.period_length == 0 {
        return Err(Error::InvalidData(
            "Replay period length must be positive".to_string(),
        ));
    }

    info!("Replaying {} OD trips", trips.len());
    let replayed: Vec<Replayed> = trips
        .par_iter()
        .map(|trip| replay_one(model, trip, options))
        .collect();

    let network = model.network();
    let mut route_paths: HashMap<(usize, RoutePathIdx), (usize, f64)> = HashMap::new();
    let mut trip_usage: HashMap<&str, (&str, usize, f64)> = HashMap::new();
    let (mut reachable, mut unreachable, mut failed) = (0, 0, 0);

    for entry in &replayed {
        match entry.result.outcome {
            OdTripOutcome::Reachable => reachable += 1,
            OdTripOutcome::Unreachable => unreachable += 1,
            OdTripOutcome::Failed => failed += 1,
        }
        let Some(journey) = &entry.journey else {
            continue;
        };
        for leg in &journey.legs {
            let JourneyLeg::Transit {
                route_id,
                trip_id,
                route_path,
                departure_time,
                ..
            } = leg
            else {
                continue;
            };
            let period = (*departure_time / options.period_length) as usize;
            let usage = route_paths.entry((period, *route_path)).or_default();
            usage.0 += 1;
            usage.1 += entry.weight;

            let usage = trip_usage
                .entry(trip_id.as_str())
                .or_insert((route_id.as_str(), 0, 0.0));
            usage.1 += 1;
            usage.2 += entry.weight;
        }
    }

    let mut route_paths: Vec<RoutePathUsage> = route_paths
        .into_iter()
        .map(|((period, route_path), (boardings, weight))| RoutePathUsage {
            period,
            period_start: period as Time * options.period_length,
            route_path,
            route_id: network.route_of(route_path).route_id.clone(),
            boardings,
            weight,
        })
        .collect();
    route_paths.sort_by(|a, b| {
        (a.period, &a.route_id, a.route_path).cmp(&(b.period, &b.route_id, b.route_path))
    });

    let mut trips: Vec<TripUsage> = trip_usage
        .into_iter()
        .map(|(trip_id, (route_id, boardings, weight))| TripUsage {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
            boardings,
            weight,
        })
        .collect();
    trips.sort_by(|a, b| a.trip_id.cmp(&b.trip_id));

    info!("OD replay done: {reachable} reachable, {unreachable} unreachable, {failed} failed");

    Ok(DemandProfile {
        period_length: options.period_length,
        reachable,
        unreachable,
        failed,
        route_paths,
        trips,
        results: replayed.into_iter().map(|entry| entry.result).collect(),
    })
}
