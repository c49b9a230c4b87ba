//! Timetable of a single weekday

use super::types::{Span, Transfer, Trip};
use crate::{RoutePathIdx, Time, TripIdx};

/// Trips running on one weekday with their flat time tables.
///
/// Trips are ordered by route-path, and within a route-path by schedule,
/// so the trip index of the `k`-th trip of route-path `rp` is
/// `trips_by_route_path[rp].start + k`. Departure and arrival times are
/// addressed by event index (`trip.times.start + stop_seq`).
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub trips: Vec<Trip>,
    pub trips_by_route_path: Vec<Option<Span>>,
    pub departures: Vec<Time>,
    pub arrivals: Vec<Time>,
    pub transfers: Vec<Transfer>,
    /// Range into `transfers` for each arrival event
    pub transfers_by_event: Vec<Option<Span>>,
}

impl Timetable {
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    pub fn trip(&self, trip: TripIdx) -> &Trip {
        &self.trips[trip]
    }

    /// Trip index range of a route-path, empty if it does not run that day
    pub fn trips_of(&self, route_path: RoutePathIdx) -> std::ops::Range<TripIdx> {
        self.trips_by_route_path
            .get(route_path)
            .copied()
            .flatten()
            .map_or(0..0, |span| span.range())
    }

    /// Index of the last trip of the route-path containing `trip`, exclusive
    pub(crate) fn route_path_end(&self, trip: TripIdx) -> TripIdx {
        self.trips_of(self.trips[trip].route_path).end
    }

    #[inline]
    pub fn event_index(&self, trip: TripIdx, stop_seq: usize) -> usize {
        self.trips[trip].times.start + stop_seq
    }

    #[inline]
    pub fn departure(&self, trip: TripIdx, stop_seq: usize) -> Time {
        self.departures[self.event_index(trip, stop_seq)]
    }

    #[inline]
    pub fn arrival(&self, trip: TripIdx, stop_seq: usize) -> Time {
        self.arrivals[self.event_index(trip, stop_seq)]
    }

    /// Transfers leaving the given arrival event
    pub fn transfers_at(&self, event: usize) -> &[Transfer] {
        match self.transfers_by_event.get(event).copied().flatten() {
            Some(span) => &self.transfers[span.range()],
            None => &[],
        }
    }

    /// Earliest trip of `route_path` departing `stop_seq` at or after `earliest_board`.
    ///
    /// Trips of a route-path never overtake each other, so departures at a
    /// fixed stop sequence are sorted and a binary search applies.
    pub fn find_earliest_trip(
        &self,
        route_path: RoutePathIdx,
        stop_seq: usize,
        earliest_board: Time,
    ) -> Option<TripIdx> {
        let trips = self.trips_of(route_path);
        let mut low = trips.start;
        let mut high = trips.end;
        let mut result = None;
        while low < high {
            let mid = low + (high - low) / 2;
            if self.departure(mid, stop_seq) >= earliest_board {
                result = Some(mid);
                high = mid;
            } else {
                low = mid + 1;
            }
        }
        result
    }
}
