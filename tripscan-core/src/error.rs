use std::fmt;

use thiserror::Error;

use crate::Time;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

/// Which end of a query a stop id was supplied for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRole {
    Origin,
    Destination,
}

impl fmt::Display for StopRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopRole::Origin => f.write_str("origin"),
            StopRole::Destination => f.write_str("destination"),
        }
    }
}

/// Query-level failures. Returned before any search work is done.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Unknown {role} stop id '{stop_id}'")]
    UnknownStop { role: StopRole, stop_id: String },
    #[error("Unknown route id '{0}'")]
    UnknownRoute(String),
    #[error("Invalid stop index {0}")]
    InvalidStopIndex(usize),
    #[error("Invalid weekday index {0}, expected 0 (Monday) to 6 (Sunday)")]
    InvalidWeekday(usize),
    #[error("Invalid time value {0}")]
    InvalidTime(Time),
}
