//! Library facade over [`tripscan_core`].
//!
//! Wraps a loaded network in a cheaply cloneable [`TransitModel`] and adds
//! the batch operations built on single queries: one-to-many routing,
//! travel-time matrices and origin-destination replay.

pub mod matrix;
pub mod model;
pub mod od_trips;
pub mod routing;

pub use matrix::travel_time_matrix;
pub use model::TransitModel;
pub use od_trips::{
    DemandProfile, OdTrip, OdTripOutcome, OdTripResult, ReplayOptions, RoutePathUsage, TripUsage,
    load_od_trips, replay_od_trips,
};
pub use routing::{RouteSummary, find_route, find_routes_one_to_many};

pub use tripscan_core::{Error, NetworkConfig, RoutingError, Time};
