use chrono::{Datelike, NaiveDate};

use crate::Time;

/// Which stops a query reports on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stop(String),
    /// Every stop of the network, sharing one source expansion
    AllStops,
    Stops(Vec<String>),
}

/// Departure-anchored journey planning query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub origin: String,
    pub destination: Destination,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: usize,
    /// Seconds since midnight
    pub departure_time: Time,
    /// Buffer between reaching a boarding stop and the departure, seconds
    pub min_waiting_time: Time,
    pub max_transfers: usize,
    /// Stops reached later than `departure_time + max_travel_time` are
    /// reported as not reached
    pub max_travel_time: Option<Time>,
    /// Route ids the query may ride, every route when empty
    pub only_route_ids: Vec<String>,
    /// Route ids the query never rides
    pub except_route_ids: Vec<String>,
    /// Reconstruct journey legs for reachable stops
    pub detailed: bool,
}

impl Query {
    pub const DEFAULT_MAX_TRANSFERS: usize = 3;

    pub fn new(
        origin: impl Into<String>,
        destination: Destination,
        weekday: usize,
        departure_time: Time,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination,
            weekday,
            departure_time,
            min_waiting_time: 0,
            max_transfers: Self::DEFAULT_MAX_TRANSFERS,
            max_travel_time: None,
            only_route_ids: Vec::new(),
            except_route_ids: Vec::new(),
            detailed: false,
        }
    }

    /// Query between two stops
    pub fn between(
        origin: impl Into<String>,
        destination: impl Into<String>,
        weekday: usize,
        departure_time: Time,
    ) -> Self {
        Self::new(
            origin,
            Destination::Stop(destination.into()),
            weekday,
            departure_time,
        )
    }

    #[must_use]
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.weekday = weekday_index(date);
        self
    }

    #[must_use]
    pub fn with_min_waiting_time(mut self, min_waiting_time: Time) -> Self {
        self.min_waiting_time = min_waiting_time;
        self
    }

    #[must_use]
    pub fn with_max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = max_transfers;
        self
    }

    #[must_use]
    pub fn with_max_travel_time(mut self, max_travel_time: Time) -> Self {
        self.max_travel_time = Some(max_travel_time);
        self
    }

    #[must_use]
    pub fn only_routes<I, S>(mut self, route_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_route_ids = route_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn except_routes<I, S>(mut self, route_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except_route_ids = route_ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }
}

/// Weekday index of a calendar date, Monday = 0
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_maps_to_monday_based_weekday() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(weekday_index(monday), 0);
        assert_eq!(weekday_index(sunday), 6);

        let query = Query::between("A", "B", 3, 0).on_date(sunday);
        assert_eq!(query.weekday, 6);
        assert_eq!(query.max_transfers, Query::DEFAULT_MAX_TRANSFERS);
    }
}
