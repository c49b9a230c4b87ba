//! Trip-based public transit routing.
//!
//! The crate builds an immutable, per-weekday index of a transit schedule
//! ([`TransitNetwork`]) and answers earliest-arrival queries on it with the
//! trip-based search of Witt (2015).

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

pub use error::{Error, RoutingError, StopRole};
pub use loading::{NetworkBuilder, NetworkConfig, create_transit_network};
pub use model::{Timetable, TransitNetwork};
pub use routing::{Calculator, Destination, Query, QueryResult, StopResult};

/// Seconds since midnight of the service day
pub type Time = u32;
/// Dense stop index
pub type StopIdx = usize;
/// Dense route index
pub type RouteIdx = usize;
/// Dense route-path index
pub type RoutePathIdx = usize;
/// Index of a trip inside one weekday timetable
pub type TripIdx = usize;

/// Number of weekday timetables, Monday first
pub const DAYS_PER_WEEK: usize = 7;

/// Latest accepted query start time (two service days)
pub const MAX_START_TIME: Time = 86_400 * 2;
