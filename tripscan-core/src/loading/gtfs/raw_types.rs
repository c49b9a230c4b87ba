//! Rows of the GTFS files read by the loader. Only the columns the network
//! needs are kept; every field is read as text and validated later.

use serde::Deserialize;

use super::parser::deserialize_gtfs_date;
use crate::DAYS_PER_WEEK;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: String,
    pub stop_lon: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedRoute {
    pub route_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedStopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: String,
    pub arrival_time: String,
    pub departure_time: String,
}

/// `calendar.txt` row
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedService {
    pub service_id: String,
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    pub saturday: String,
    pub sunday: String,
}

impl FeedService {
    /// Service flags, Monday first
    pub fn weekdays(&self) -> [bool; DAYS_PER_WEEK] {
        [
            &self.monday,
            &self.tuesday,
            &self.wednesday,
            &self.thursday,
            &self.friday,
            &self.saturday,
            &self.sunday,
        ]
        .map(|flag| flag.trim() == "1")
    }
}

/// `transfers.txt` row; type 2 rows carry a walking time
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub transfer_type: String,
    pub min_transfer_time: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
#[allow(clippy::struct_field_names)]
pub struct FeedInfo {
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    pub feed_version: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_start_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_end_date: Option<chrono::NaiveDate>,
}
