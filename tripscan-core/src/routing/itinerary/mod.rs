//! Reconstructed journeys and their export

mod to_geojson;

use crate::{RoutePathIdx, StopIdx, Time};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyLeg {
    Walk {
        from_stop: StopIdx,
        to_stop: StopIdx,
        departure_time: Time,
        arrival_time: Time,
        duration: Time,
    },
    Transit {
        route_id: String,
        trip_id: String,
        route_path: RoutePathIdx,
        from_stop: StopIdx,
        from_stop_seq: usize,
        to_stop: StopIdx,
        to_stop_seq: usize,
        departure_time: Time,
        arrival_time: Time,
    },
}

impl JourneyLeg {
    pub fn departure_time(&self) -> Time {
        match self {
            JourneyLeg::Walk { departure_time, .. }
            | JourneyLeg::Transit { departure_time, .. } => *departure_time,
        }
    }

    pub fn arrival_time(&self) -> Time {
        match self {
            JourneyLeg::Walk { arrival_time, .. } | JourneyLeg::Transit { arrival_time, .. } => {
                *arrival_time
            }
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, JourneyLeg::Transit { .. })
    }
}

/// Legs of the earliest-arrival journey, in travel order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    pub legs: Vec<JourneyLeg>,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub transfers: usize,
}

impl Journey {
    pub fn transit_legs(&self) -> impl Iterator<Item = &JourneyLeg> {
        self.legs.iter().filter(|leg| leg.is_transit())
    }

    /// Total time spent walking
    pub fn walking_time(&self) -> Time {
        self.legs
            .iter()
            .map(|leg| match leg {
                JourneyLeg::Walk { duration, .. } => *duration,
                JourneyLeg::Transit { .. } => 0,
            })
            .sum()
    }
}
