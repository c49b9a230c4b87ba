//! Data model for public transportation routing
//!
//! Contains types and structures for representing a transit network.

pub mod transit;

pub use transit::data::TransitNetwork;
pub use transit::timetable::Timetable;
pub use transit::types::{
    FeedMeta, Footpath, Route, RoutePath, Span, Stop, StopRoutePath, Transfer, Trip, TripInfo,
};
