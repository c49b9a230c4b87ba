//! Trip-to-trip transfer precomputation.
//!
//! Per weekday: initial transfers from every arrival event to the earliest
//! reachable trip of every route-path nearby, then removal of U-turn
//! transfers and of transfers that never improve an arrival.

use log::{debug, info};
use rayon::prelude::*;

use super::builder::spans_by_key;
use super::config::NetworkConfig;
use crate::model::{Span, StopRoutePath, Timetable, Transfer};
use crate::{StopIdx, Time, TransitNetwork, TripIdx};

/// Transfer leaving a given arrival event
type EventTransfer = (usize, Transfer);

/// Earliest known arrival per stop, reset between trips
struct ArrivalLabels {
    labels: Vec<Time>,
    touched: Vec<StopIdx>,
}

impl ArrivalLabels {
    fn new(stop_count: usize) -> Self {
        Self {
            labels: vec![Time::MAX; stop_count],
            touched: Vec::new(),
        }
    }

    fn reset(&mut self) {
        for stop in self.touched.drain(..) {
            self.labels[stop] = Time::MAX;
        }
    }

    /// Applies an arrival at `stop` and every footpath leaving it.
    /// Returns true if any label improved.
    fn improve(&mut self, network: &TransitNetwork, stop: StopIdx, arrival: Time) -> bool {
        let mut improved = false;
        for footpath in network.footpaths_from(stop) {
            let time = arrival.saturating_add(footpath.duration);
            let label = &mut self.labels[footpath.target];
            if time < *label {
                if *label == Time::MAX {
                    self.touched.push(footpath.target);
                }
                *label = time;
                improved = true;
            }
        }
        improved
    }
}

pub(crate) fn compute_transfers(network: &mut TransitNetwork, config: &NetworkConfig) {
    let computed: Vec<(Vec<Transfer>, Vec<Option<Span>>)> = network
        .timetables
        .iter()
        .enumerate()
        .map(|(weekday, timetable)| {
            let (transfers, by_event) = weekday_transfers(network, timetable, config);
            info!(
                "Weekday {weekday}: {} transfers between {} trips",
                transfers.len(),
                timetable.trip_count()
            );
            (transfers, by_event)
        })
        .collect();

    for (timetable, (transfers, by_event)) in network.timetables.iter_mut().zip(computed) {
        timetable.transfers = transfers;
        timetable.transfers_by_event = by_event;
    }
}

fn weekday_transfers(
    network: &TransitNetwork,
    timetable: &Timetable,
    config: &NetworkConfig,
) -> (Vec<Transfer>, Vec<Option<Span>>) {
    let min_transfer_time = config.min_transfer_time;
    let per_trip: Vec<Vec<EventTransfer>> = (0..timetable.trip_count())
        .into_par_iter()
        .map_init(
            || ArrivalLabels::new(network.stop_count()),
            |labels, trip| {
                let mut transfers =
                    initial_transfers(network, timetable, trip, min_transfer_time);
                let initial = transfers.len();
                remove_u_turn_transfers(
                    network,
                    timetable,
                    trip,
                    &mut transfers,
                    min_transfer_time,
                );
                if config.reduce_transfers {
                    reduce_transfers(network, timetable, trip, &mut transfers, labels);
                }
                if initial > 0 {
                    log::trace!("Trip {trip}: kept {} of {initial} transfers", transfers.len());
                }
                transfers
            },
        )
        .collect();

    // Event indices grow with the trip index, so concatenation stays sorted
    let flat: Vec<EventTransfer> = per_trip.into_iter().flatten().collect();
    let by_event = spans_by_key(&flat, timetable.arrivals.len(), |(event, _)| *event);
    debug!("Indexed {} transfers by arrival event", flat.len());
    (
        flat.into_iter().map(|(_, transfer)| transfer).collect(),
        by_event,
    )
}

/// Transfers from every arrival of `trip` to the earliest catchable trip of
/// each route-path reachable on foot, sorted by event.
pub(crate) fn initial_transfers(
    network: &TransitNetwork,
    timetable: &Timetable,
    trip: TripIdx,
    min_transfer_time: Time,
) -> Vec<EventTransfer> {
    let from = timetable.trip(trip);
    let stops = network.route_path_stops(from.route_path);
    let mut transfers = Vec::new();

    for (stop_seq, &stop) in stops.iter().enumerate().skip(1) {
        let arrival = timetable.arrival(trip, stop_seq);
        let event = timetable.event_index(trip, stop_seq);

        for footpath in network.footpaths_from(stop) {
            let ready = arrival
                .saturating_add(footpath.duration)
                .saturating_add(min_transfer_time);

            for &StopRoutePath {
                route_path,
                stop_seq: target_seq,
            } in network.route_paths_at(footpath.target)
            {
                if target_seq == network.route_paths[route_path].last_stop_seq() {
                    continue;
                }
                let Some(target) = timetable.find_earliest_trip(route_path, target_seq, ready)
                else {
                    continue;
                };
                if target == trip {
                    continue;
                }
                // Later trips of the same route-path are reachable by staying seated
                if route_path == from.route_path
                    && timetable.trip(target).seq >= from.seq
                    && target_seq >= stop_seq
                {
                    continue;
                }
                transfers.push((
                    event,
                    Transfer {
                        target_trip: target,
                        target_stop_seq: target_seq,
                    },
                ));
            }
        }
    }
    transfers
}

/// Drops (t, i) -> (u, j) when u comes back through the stop t just left and
/// the change could have happened there.
pub(crate) fn remove_u_turn_transfers(
    network: &TransitNetwork,
    timetable: &Timetable,
    trip: TripIdx,
    transfers: &mut Vec<EventTransfer>,
    min_transfer_time: Time,
) {
    let from = timetable.trip(trip);
    let stops = network.route_path_stops(from.route_path);

    transfers.retain(|&(event, transfer)| {
        let stop_seq = event - from.times.start;
        let target_stops =
            network.route_path_stops(timetable.trip(transfer.target_trip).route_path);
        let next_seq = transfer.target_stop_seq + 1;
        if stop_seq == 0 || next_seq >= target_stops.len() {
            return true;
        }
        if stops[stop_seq - 1] != target_stops[next_seq] {
            return true;
        }
        timetable
            .arrival(trip, stop_seq - 1)
            .saturating_add(min_transfer_time)
            > timetable.departure(transfer.target_trip, next_seq)
    });
}

/// Keeps only transfers that improve the earliest arrival at some stop over
/// staying on `trip` or changing at a later stop of it.
fn reduce_transfers(
    network: &TransitNetwork,
    timetable: &Timetable,
    trip: TripIdx,
    transfers: &mut Vec<EventTransfer>,
    labels: &mut ArrivalLabels,
) {
    if transfers.is_empty() {
        return;
    }
    labels.reset();

    let from = timetable.trip(trip);
    let stops = network.route_path_stops(from.route_path);
    let mut keep = vec![false; transfers.len()];

    for stop_seq in (1..stops.len()).rev() {
        labels.improve(network, stops[stop_seq], timetable.arrival(trip, stop_seq));

        let event = timetable.event_index(trip, stop_seq);
        let first = transfers.partition_point(|(e, _)| *e < event);
        let last = transfers.partition_point(|(e, _)| *e <= event);

        for (offset, (_, transfer)) in transfers[first..last].iter().enumerate() {
            let target = transfer.target_trip;
            let target_stops = network.route_path_stops(timetable.trip(target).route_path);
            let mut useful = false;
            for (seq, &stop) in target_stops
                .iter()
                .enumerate()
                .skip(transfer.target_stop_seq + 1)
            {
                useful |= labels.improve(network, stop, timetable.arrival(target, seq));
            }
            keep[first + offset] = useful;
        }
    }

    let mut flags = keep.into_iter();
    transfers.retain(|_| flags.next().unwrap_or(false));
}
