//! Static transit network: stops, route-paths, weekday timetables

pub mod data;
pub mod timetable;
pub mod types;

pub use data::TransitNetwork;
pub use timetable::Timetable;
pub use types::{Footpath, Span, Stop, Transfer, Trip};
