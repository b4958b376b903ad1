//! Per-round search labels.
//!
//! Every label records how it was reached, so a journey can be rebuilt
//! from any label without consulting other search state. Labels are
//! `Copy`; forwarding one into a later round copies its provenance along
//! with its arrival time.

use crate::domain::{PatternIdx, PatternPos, ScheduleTime, StopIdx};

/// How a label's arrival was achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The query's starting point
    Origin,
    /// Alighted from row `trip_index` of `pattern`
    Transit {
        pattern: PatternIdx,
        trip_index: usize,
        board: PatternPos,
        alight: PatternPos,
    },
    /// Walked from `from` after arriving there by ride in the same round
    Walk { from: StopIdx, walk_secs: u32 },
}

/// Best known arrival at one stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    pub arrival: ScheduleTime,
    /// The round that created this label (number of rides taken)
    pub round: usize,
    /// Walking accumulated along the way
    pub walking_secs: u32,
    pub provenance: Provenance,
}

impl Label {
    pub fn origin(at: ScheduleTime) -> Self {
        Label {
            arrival: at,
            round: 0,
            walking_secs: 0,
            provenance: Provenance::Origin,
        }
    }

    /// Whether `self` should replace `existing` within one round: earlier,
    /// or equally early with less walking.
    pub fn beats(&self, existing: Option<&Label>) -> bool {
        match existing {
            None => true,
            Some(existing) => {
                (self.arrival, self.walking_secs) < (existing.arrival, existing.walking_secs)
            }
        }
    }
}

/// The labels of one round.
#[derive(Debug, Clone)]
pub struct RoundLabels {
    /// Best arrival with at most this many rides, by ride or walk
    best: Vec<Option<Label>>,
    /// Arrivals reached by a ride in this round; walks start from these
    ridden: Vec<Option<Label>>,
}

impl RoundLabels {
    /// Empty labels for `stop_count` stops.
    pub fn new(stop_count: usize) -> Self {
        RoundLabels {
            best: vec![None; stop_count],
            ridden: vec![None; stop_count],
        }
    }

    /// Labels for the round after `previous`: best arrivals carry over,
    /// ride arrivals start empty.
    pub fn following(previous: &RoundLabels) -> Self {
        RoundLabels {
            best: previous.best.clone(),
            ridden: vec![None; previous.ridden.len()],
        }
    }

    pub fn best(&self, stop: StopIdx) -> Option<&Label> {
        self.best.get(stop.index()).and_then(Option::as_ref)
    }

    pub fn ridden(&self, stop: StopIdx) -> Option<&Label> {
        self.ridden.get(stop.index()).and_then(Option::as_ref)
    }

    pub(super) fn set_best(&mut self, stop: StopIdx, label: Label) {
        if let Some(slot) = self.best.get_mut(stop.index()) {
            *slot = Some(label);
        }
    }

    /// Record a ride arrival; it is also the stop's best.
    pub(super) fn set_ridden(&mut self, stop: StopIdx, label: Label) {
        if let Some(slot) = self.ridden.get_mut(stop.index()) {
            *slot = Some(label);
        }
        self.set_best(stop, label);
    }

    /// Record a ride arrival that is beaten by the stop's best, so walks
    /// can still start from it.
    pub(super) fn set_ride_only(&mut self, stop: StopIdx, label: Label) {
        if let Some(slot) = self.ridden.get_mut(stop.index()) {
            *slot = Some(label);
        }
    }
}
