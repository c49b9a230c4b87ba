use std::fs::File;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::{Error, Time};

/// Reads every row of a GTFS CSV file, skipping rows that fail to deserialize
pub fn deserialize_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in csv::Reader::from_reader(file).deserialize() {
        match record {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows in {}", path.display());
    }
    Ok(rows)
}

/// Same as [`deserialize_gtfs_file`], an absent file yields no rows
pub(super) fn deserialize_optional_gtfs_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    if path.exists() {
        deserialize_gtfs_file(path)
    } else {
        Ok(Vec::new())
    }
}

/// Parse time string in HH:MM:SS format to seconds since midnight.
/// Hours may exceed 23 for trips running past midnight.
pub fn parse_time(time_str: &str) -> Option<Time> {
    let time_str = time_str.trim();
    let bytes = time_str.as_bytes();

    // Fast path for HH:MM:SS format
    if bytes.len() == 8
        && bytes[2] == b':'
        && bytes[5] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 2 || idx == 5 || b.is_ascii_digit())
    {
        let digit = |idx: usize| Time::from(bytes[idx] - b'0');
        let hours = digit(0) * 10 + digit(1);
        let minutes = digit(3) * 10 + digit(4);
        let seconds = digit(6) * 10 + digit(7);
        return (minutes < 60 && seconds < 60).then_some(hours * 3600 + minutes * 60 + seconds);
    }

    // Fallback for H:MM:SS and HHH:MM:SS
    parse_time_fallback(time_str)
}

fn parse_time_fallback(time_str: &str) -> Option<Time> {
    let mut parts = time_str.split(':');
    let hours: Time = parts.next()?.parse().ok()?;
    let minutes: Time = parts.next()?.parse().ok()?;
    let seconds: Time = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(hours * 3600 + minutes * 60 + seconds)
}

pub(super) fn deserialize_gtfs_date<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let date_str = String::deserialize(deserializer)?;
    if date_str.is_empty() {
        Ok(None)
    } else {
        chrono::NaiveDate::parse_from_str(&date_str, "%Y%m%d")
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
