use hashbrown::HashMap;

use super::journey::reconstruct_journey;
use super::state::{
    BestArrival, FirstReached, SegmentOrigin, SegmentRef, SourceExpansion, TargetState,
    TripSegment,
};
use super::{ParetoEntry, ReachedStop, RouteFilter, SearchParams};
use crate::model::{StopRoutePath, Timetable};
use crate::{RoutePathIdx, StopIdx, Time, TransitNetwork};

/// Stop of a route-path from which the target can be reached on foot
#[derive(Debug, Clone, Copy)]
struct ReachableRoutePath {
    stop_seq: usize,
    stop: StopIdx,
    walk: Time,
}

/// Boards the earliest trip of every route-path reachable on foot from the
/// source and records the resulting dominance bounds.
pub(crate) fn expand_source(
    network: &TransitNetwork,
    timetable: &Timetable,
    source: StopIdx,
    params: &SearchParams,
) -> SourceExpansion {
    let start_time = params.departure_time;
    let mut first_reached = FirstReached::new(timetable.trip_count());
    let mut segments = Vec::new();

    for footpath in network.footpaths_from(source) {
        let ready = start_time
            .saturating_add(footpath.duration)
            .saturating_add(params.min_waiting_time);

        for &StopRoutePath {
            route_path,
            stop_seq,
        } in network.route_paths_at(footpath.target)
        {
            if stop_seq == network.route_paths[route_path].last_stop_seq()
                || !params.route_filter.allows_route_path(network, route_path)
            {
                continue;
            }
            let Some(trip) = timetable.find_earliest_trip(route_path, stop_seq, ready) else {
                continue;
            };
            // Later trips already carry a bound at least as good
            if !first_reached.improves(trip, stop_seq) {
                continue;
            }
            segments.push(TripSegment {
                route_path,
                trip,
                first_stop_seq: stop_seq,
                horizon: first_reached.get(trip),
                origin: SegmentOrigin::Access {
                    stop: footpath.target,
                    walk: footpath.duration,
                },
            });
            first_reached.record(timetable, trip, stop_seq);
        }
    }

    SourceExpansion {
        source,
        start_time,
        segments,
        first_reached,
    }
}

/// Route-path stops from which a footpath leads into `target`
fn reachable_route_paths(
    network: &TransitNetwork,
    target: StopIdx,
) -> HashMap<RoutePathIdx, Vec<ReachableRoutePath>> {
    let mut reachable: HashMap<RoutePathIdx, Vec<ReachableRoutePath>> = HashMap::new();
    for footpath in network.footpaths_to(target) {
        for occurrence in network.route_paths_at(footpath.source) {
            if occurrence.stop_seq == 0 {
                continue;
            }
            reachable
                .entry(occurrence.route_path)
                .or_default()
                .push(ReachableRoutePath {
                    stop_seq: occurrence.stop_seq,
                    stop: footpath.source,
                    walk: footpath.duration,
                });
        }
    }
    reachable
}

/// Earliest arrival at `target` for every number of transfers up to
/// `max_transfers`, reusing the source expansion.
pub(crate) fn evaluate_target(
    network: &TransitNetwork,
    timetable: &Timetable,
    expansion: &SourceExpansion,
    target: StopIdx,
    params: &SearchParams,
) -> Option<ReachedStop> {
    let reachable = reachable_route_paths(network, target);
    if reachable.is_empty() || expansion.segments.is_empty() {
        return None;
    }

    let max_transfers = params.max_transfers;
    let mut state = TargetState::new(expansion, params.deadline());

    for transfers in 0..=max_transfers {
        let count = if transfers == 0 {
            expansion.segments.len()
        } else {
            state.segments.round_len(transfers)
        };
        if count == 0 {
            break;
        }

        for index in 0..count {
            let handle = if transfers == 0 {
                SegmentRef::Source(index)
            } else {
                SegmentRef::Target { transfers, index }
            };
            let segment = state.segment(expansion, handle);

            if let Some(entries) = reachable.get(&segment.route_path) {
                for entry in entries {
                    if entry.stop_seq <= segment.first_stop_seq {
                        continue;
                    }
                    let arrival = timetable
                        .arrival(segment.trip, entry.stop_seq)
                        .saturating_add(entry.walk);
                    state.update(
                        transfers,
                        arrival,
                        BestArrival {
                            segment: handle,
                            alight_stop_seq: entry.stop_seq,
                            egress_stop: entry.stop,
                            egress_walk: entry.walk,
                        },
                    );
                }
            }

            // Nothing reached from here can beat the best known arrival or meet the deadline
            let next_arrival = timetable.arrival(segment.trip, segment.first_stop_seq + 1);
            if state.prunes(transfers, next_arrival) {
                continue;
            }

            scan_transfers(
                network,
                timetable,
                &mut state,
                &params.route_filter,
                segment,
                handle,
                transfers,
                max_transfers,
            );
        }
    }

    collect_result(network, timetable, expansion, &state, target, params.detailed)
}

/// Follows the transfers of `segment` up to its horizon, enqueuing trips
/// boarded at a stop not reached before.
#[allow(clippy::too_many_arguments)]
fn scan_transfers(
    network: &TransitNetwork,
    timetable: &Timetable,
    state: &mut TargetState,
    route_filter: &RouteFilter,
    segment: TripSegment,
    handle: SegmentRef,
    transfers: usize,
    max_transfers: usize,
) {
    let last = network.route_paths[segment.route_path].last_stop_seq();
    let end = segment.horizon.map_or(last, |horizon| horizon.min(last));

    for stop_seq in segment.first_stop_seq + 1..=end {
        let event = timetable.event_index(segment.trip, stop_seq);
        for transfer in timetable.transfers_at(event) {
            let target_trip = transfer.target_trip;
            let route_path = timetable.trip(target_trip).route_path;
            if !route_filter.allows_route_path(network, route_path)
                || !state.first_reached.improves(target_trip, transfer.target_stop_seq)
            {
                continue;
            }
            if transfers < max_transfers {
                let next = TripSegment {
                    route_path,
                    trip: target_trip,
                    first_stop_seq: transfer.target_stop_seq,
                    horizon: state.first_reached.get(target_trip),
                    origin: SegmentOrigin::Transfer {
                        from: handle,
                        alight_stop_seq: stop_seq,
                    },
                };
                state.segments.push(transfers + 1, next);
            }
            state
                .first_reached
                .record(timetable, target_trip, transfer.target_stop_seq);
        }
    }
}

fn collect_result(
    network: &TransitNetwork,
    timetable: &Timetable,
    expansion: &SourceExpansion,
    state: &TargetState,
    target: StopIdx,
    detailed: bool,
) -> Option<ReachedStop> {
    let arrival_time = state.tau_min.iter().flatten().min().copied()?;
    let transfers = state
        .tau_min
        .iter()
        .position(|tau| *tau == Some(arrival_time))?;

    let mut pareto = Vec::new();
    let mut best_so_far: Option<Time> = None;
    for (count, tau) in state.tau_min.iter().enumerate() {
        if let Some(arrival) = *tau
            && best_so_far.is_none_or(|best| arrival < best)
        {
            pareto.push(ParetoEntry {
                transfers: count,
                arrival_time: arrival,
            });
            best_so_far = Some(arrival);
        }
    }

    let journey = if detailed {
        state.best[transfers].map(|best| {
            reconstruct_journey(network, timetable, expansion, state, best, transfers, target)
        })
    } else {
        None
    };

    Some(ReachedStop {
        arrival_time,
        travel_time: arrival_time.saturating_sub(expansion.start_time),
        transfers,
        pareto,
        journey,
    })
}
