// Re-export key components
pub use crate::loading::{
    FootpathInput, NetworkBuilder, NetworkConfig, RouteInput, StopInput, StopTimeInput,
    TripInput, create_transit_network,
};
pub use crate::model::{Footpath, Stop, Timetable, Transfer, TransitNetwork, Trip};
pub use crate::routing::itinerary::{Journey, JourneyLeg};
pub use crate::routing::{
    Calculator, Destination, ParetoEntry, Query, QueryResult, ReachedStop, StopResult,
    weekday_index,
};

pub use crate::{Error, RoutingError, StopRole};

// Core types for transit routing
pub use crate::RoutePathIdx;
pub use crate::StopIdx;
pub use crate::Time;
pub use crate::TripIdx;
