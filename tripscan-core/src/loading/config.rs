use std::path::PathBuf;

use serde::Deserialize;

use crate::Time;

/// Network construction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// GTFS feed directories, merged into one network
    pub gtfs_dirs: Vec<PathBuf>,
    /// Generate footpaths between stops closer than `max_footpath_time`
    pub generate_footpaths: bool,
    /// Longest generated walk, seconds
    pub max_footpath_time: Time,
    /// Walking speed for generated footpaths, m/s
    pub walking_speed: f64,
    /// Buffer added to every change between trips, seconds
    pub min_transfer_time: Time,
    /// Drop transfers that never improve an arrival
    pub reduce_transfers: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            gtfs_dirs: Vec::new(),
            generate_footpaths: true,
            max_footpath_time: 600,
            walking_speed: 1.3,
            min_transfer_time: 0,
            reduce_transfers: true,
        }
    }
}

impl NetworkConfig {
    pub fn with_gtfs_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            gtfs_dirs: dirs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}
