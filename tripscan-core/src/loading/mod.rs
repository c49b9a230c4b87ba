//! This module is responsible for loading schedule data (GTFS-style CSV
//! feeds or in-memory records) and building the routing network.

mod builder;
mod config;
mod footpaths;
pub mod gtfs;
mod transfers;

pub use builder::{
    FootpathInput, NetworkBuilder, RouteInput, StopInput, StopTimeInput, TripInput,
    create_transit_network,
};
pub use config::NetworkConfig;
