use super::state::{BestArrival, SegmentOrigin, SourceExpansion, TargetState, TripSegment};
use crate::model::Timetable;
use crate::routing::itinerary::{Journey, JourneyLeg};
use crate::{StopIdx, Time, TransitNetwork};

/// Rebuilds the legs of the journey ending with `best` by following the
/// segment back-links to the source.
pub(crate) fn reconstruct_journey(
    network: &TransitNetwork,
    timetable: &Timetable,
    expansion: &SourceExpansion,
    state: &TargetState,
    best: BestArrival,
    transfers: usize,
    target: StopIdx,
) -> Journey {
    // (segment, alighting stop sequence), last ride first
    let mut rides: Vec<(TripSegment, usize)> = Vec::with_capacity(transfers + 1);
    let mut handle = best.segment;
    let mut alight_stop_seq = best.alight_stop_seq;
    loop {
        let segment = state.segment(expansion, handle);
        rides.push((segment, alight_stop_seq));
        match segment.origin {
            SegmentOrigin::Access { .. } => break,
            SegmentOrigin::Transfer {
                from,
                alight_stop_seq: previous_alight,
            } => {
                handle = from;
                alight_stop_seq = previous_alight;
            }
        }
    }
    rides.reverse();

    let mut legs = Vec::with_capacity(rides.len() * 2 + 1);

    if let Some((first, _)) = rides.first()
        && let SegmentOrigin::Access { stop, walk } = first.origin
        && stop != expansion.source
    {
        legs.push(walk_leg(expansion.source, stop, expansion.start_time, walk));
    }

    let mut previous: Option<(StopIdx, Time)> = None;
    for (segment, alight_stop_seq) in &rides {
        let stops = network.route_path_stops(segment.route_path);
        let board_stop = stops[segment.first_stop_seq];
        let alight_stop = stops[*alight_stop_seq];

        if let Some((from_stop, arrival)) = previous
            && from_stop != board_stop
        {
            // Transfers are only generated along footpaths
            let walk = network.footpath_duration(from_stop, board_stop);
            debug_assert!(
                walk.is_some(),
                "transfer from stop {from_stop} to stop {board_stop} has no footpath"
            );
            legs.push(walk_leg(from_stop, board_stop, arrival, walk.unwrap_or_default()));
        }

        let trip = timetable.trip(segment.trip);
        let arrival_time = timetable.arrival(segment.trip, *alight_stop_seq);
        legs.push(JourneyLeg::Transit {
            route_id: network.route_of(segment.route_path).route_id.clone(),
            trip_id: network.trip_infos[trip.info].trip_id.clone(),
            route_path: segment.route_path,
            from_stop: board_stop,
            from_stop_seq: segment.first_stop_seq,
            to_stop: alight_stop,
            to_stop_seq: *alight_stop_seq,
            departure_time: timetable.departure(segment.trip, segment.first_stop_seq),
            arrival_time,
        });
        previous = Some((alight_stop, arrival_time));
    }

    if let Some((alight_stop, arrival)) = previous
        && alight_stop != target
    {
        legs.push(walk_leg(best.egress_stop, target, arrival, best.egress_walk));
    }

    let arrival_time = legs.last().map_or(expansion.start_time, JourneyLeg::arrival_time);
    Journey {
        legs,
        departure_time: expansion.start_time,
        arrival_time,
        transfers,
    }
}

fn walk_leg(
    from_stop: StopIdx,
    to_stop: StopIdx,
    departure_time: Time,
    duration: Time,
) -> JourneyLeg {
    JourneyLeg::Walk {
        from_stop,
        to_stop,
        departure_time,
        arrival_time: departure_time.saturating_add(duration),
        duration,
    }
}
