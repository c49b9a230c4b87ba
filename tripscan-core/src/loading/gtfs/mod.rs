//! Processing raw GTFS data for transit network construction

mod parser;
mod processor;
mod raw_types;

pub use parser::{deserialize_gtfs_file, parse_time};
pub use processor::network_builder_from_gtfs;
pub use raw_types::{
    FeedInfo, FeedRoute, FeedService, FeedStop, FeedStopTime, FeedTransfer, FeedTrip,
};
