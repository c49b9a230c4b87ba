use crate::model::Timetable;
use crate::{RoutePathIdx, StopIdx, Time, TripIdx};

/// Stable handle of a trip segment.
///
/// Source segments (no transfer yet) live for the whole query, segments
/// reached through transfers only for the evaluation of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentRef {
    Source(usize),
    Target { transfers: usize, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentOrigin {
    /// Boarded after walking from the query source
    Access { stop: StopIdx, walk: Time },
    /// Boarded by a transfer after leaving `from` at `alight_stop_seq`
    Transfer {
        from: SegmentRef,
        alight_stop_seq: usize,
    },
}

/// Continuation of a trip from a boarding stop sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TripSegment {
    pub route_path: RoutePathIdx,
    pub trip: TripIdx,
    pub first_stop_seq: usize,
    /// Earliest stop sequence already reached on this trip when the segment
    /// was created. Scanning transfers beyond it repeats earlier work.
    pub horizon: Option<usize>,
    pub origin: SegmentOrigin,
}

/// Earliest reached stop sequence per trip of the weekday.
///
/// Values only ever decrease. Recording a sequence for a trip also records
/// it for every later trip of the same route-path.
#[derive(Debug, Clone)]
pub(crate) struct FirstReached {
    stop_seq: Vec<Option<usize>>,
}

impl FirstReached {
    pub(crate) fn new(trip_count: usize) -> Self {
        Self {
            stop_seq: vec![None; trip_count],
        }
    }

    pub(crate) fn get(&self, trip: TripIdx) -> Option<usize> {
        self.stop_seq[trip]
    }

    /// Boarding `trip` at `stop_seq` reaches a stop not reached before
    pub(crate) fn improves(&self, trip: TripIdx, stop_seq: usize) -> bool {
        self.stop_seq[trip].is_none_or(|reached| stop_seq < reached)
    }

    pub(crate) fn record(&mut self, timetable: &Timetable, trip: TripIdx, stop_seq: usize) {
        let end = timetable.route_path_end(trip);
        for reached in &mut self.stop_seq[trip..end] {
            if reached.is_none_or(|current| stop_seq < current) {
                *reached = Some(stop_seq);
            }
        }
    }
}

/// Source side of a query, shared by all targets
#[derive(Debug, Clone)]
pub(crate) struct SourceExpansion {
    pub source: StopIdx,
    pub start_time: Time,
    pub segments: Vec<TripSegment>,
    /// Dominance bounds right after the expansion
    pub first_reached: FirstReached,
}

/// Segments reached with one or more transfers, `rounds[n - 1]` holding `n`
#[derive(Debug)]
pub(crate) struct TargetSegments {
    rounds: Vec<Vec<TripSegment>>,
}

impl TargetSegments {
    pub(crate) fn new() -> Self {
        Self { rounds: Vec::new() }
    }

    /// Rounds are opened on their first segment, so memory follows the
    /// rounds actually reached rather than the transfer budget.
    pub(crate) fn push(&mut self, transfers: usize, segment: TripSegment) -> SegmentRef {
        if self.rounds.len() < transfers {
            self.rounds.resize_with(transfers, Vec::new);
        }
        let round = &mut self.rounds[transfers - 1];
        round.push(segment);
        SegmentRef::Target {
            transfers,
            index: round.len() - 1,
        }
    }

    pub(crate) fn round_len(&self, transfers: usize) -> usize {
        self.rounds.get(transfers - 1).map_or(0, Vec::len)
    }

    pub(crate) fn get(&self, transfers: usize, index: usize) -> TripSegment {
        self.rounds[transfers - 1][index]
    }
}

/// Where the best arrival for a transfer count was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BestArrival {
    pub segment: SegmentRef,
    pub alight_stop_seq: usize,
    pub egress_stop: StopIdx,
    pub egress_walk: Time,
}

/// Per-target search state
#[derive(Debug)]
pub(crate) struct TargetState {
    pub first_reached: FirstReached,
    pub segments: TargetSegments,
    /// Best arrival at the target per transfer count, grown as rounds improve
    pub tau_min: Vec<Option<Time>>,
    pub best: Vec<Option<BestArrival>>,
    /// Latest accepted arrival at the target
    deadline: Option<Time>,
}

impl TargetState {
    pub(crate) fn new(expansion: &SourceExpansion, deadline: Option<Time>) -> Self {
        Self {
            first_reached: expansion.first_reached.clone(),
            segments: TargetSegments::new(),
            tau_min: Vec::new(),
            best: Vec::new(),
            deadline,
        }
    }

    pub(crate) fn segment(&self, expansion: &SourceExpansion, handle: SegmentRef) -> TripSegment {
        match handle {
            SegmentRef::Source(index) => expansion.segments[index],
            SegmentRef::Target { transfers, index } => self.segments.get(transfers, index),
        }
    }

    /// Records an arrival at the target with `transfers` transfers if it
    /// meets the deadline and is strictly better than the one known.
    pub(crate) fn update(&mut self, transfers: usize, arrival: Time, best: BestArrival) -> bool {
        if self.deadline.is_some_and(|deadline| arrival > deadline) {
            return false;
        }
        if self.tau_min.len() <= transfers {
            self.tau_min.resize(transfers + 1, None);
            self.best.resize(transfers + 1, None);
        }
        if self.tau_min[transfers].is_none_or(|current| arrival < current) {
            self.tau_min[transfers] = Some(arrival);
            self.best[transfers] = Some(best);
            true
        } else {
            false
        }
    }

    /// Earliest arrival with at most `transfers` transfers
    pub(crate) fn bound(&self, transfers: usize) -> Option<Time> {
        let end = self.tau_min.len().min(transfers.saturating_add(1));
        self.tau_min[..end].iter().flatten().min().copied()
    }

    /// A ride reaching its next stop at `arrival` cannot lead to an accepted
    /// arrival with at most `transfers` transfers
    pub(crate) fn prunes(&self, transfers: usize, arrival: Time) -> bool {
        self.bound(transfers).is_some_and(|bound| arrival >= bound)
            || self.deadline.is_some_and(|deadline| arrival > deadline)
    }
}
