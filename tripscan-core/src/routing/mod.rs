//! Journey planning on a [`crate::TransitNetwork`]

pub mod calculator;
pub mod itinerary;
pub mod query;
pub mod trip_based;

pub use calculator::{Calculator, QueryResult};
pub use itinerary::{Journey, JourneyLeg};
pub use query::{Destination, Query, weekday_index};
pub use trip_based::{
    ParetoEntry, ReachedStop, RouteFilter, SearchParams, StopResult, trip_based,
};
