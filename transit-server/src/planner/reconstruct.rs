//! Journey reconstruction from search labels.
//!
//! Starting from the destination label of one round, follow provenance
//! backwards: a ride leads to the boarding stop's label one round
//! earlier, a walk leads to the ride label it started from in the same
//! round. Each step is checked against the schedule, so a broken chain
//! drops that one journey instead of producing an inconsistent one.

use tracing::warn;

use crate::domain::{
    Journey, Leg, PatternIdx, PatternPos, StopIdx, TransitLeg, TransitLegParts, Walk,
};
use crate::schedule::ScheduleStore;

use super::labels::{Label, Provenance};
use super::raptor::RaptorRun;

/// Why a candidate journey could not be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructionAbort {
    #[error("exceeded {limit} backward steps")]
    StepLimitExceeded { limit: usize },

    #[error("no label at {stop} in round {round}")]
    MissingLabel { stop: StopIdx, round: usize },

    #[error("label refers to unknown pattern {0}")]
    UnknownPattern(PatternIdx),

    #[error("label refers to unknown trip row {trip_index} of {pattern}")]
    UnknownTrip {
        pattern: PatternIdx,
        trip_index: usize,
    },

    /// The chain does not line up with the schedule or itself
    #[error("inconsistent leg at {stop}: {reason}")]
    InconsistentLeg { stop: StopIdx, reason: String },
}

fn inconsistent(stop: StopIdx, reason: impl Into<String>) -> ReconstructionAbort {
    ReconstructionAbort::InconsistentLeg {
        stop,
        reason: reason.into(),
    }
}

/// Rebuilds journeys from one search run.
pub struct JourneyReconstructor<'a> {
    store: &'a ScheduleStore,
    step_limit: usize,
}

impl<'a> JourneyReconstructor<'a> {
    pub fn new(store: &'a ScheduleStore, step_limit: usize) -> Self {
        Self { store, step_limit }
    }

    /// One journey per round that reached the destination. Candidates
    /// that fail to rebuild are logged and skipped.
    pub fn candidates(&self, run: &RaptorRun) -> Vec<Journey> {
        run.destination_rounds()
            .into_iter()
            .filter_map(|round| match self.reconstruct(run, round) {
                Ok(journey) => Some(journey),
                Err(e) => {
                    warn!(
                        round,
                        origin = %run.query.origin,
                        destination = %run.query.destination,
                        error = %e,
                        "Dropping journey candidate"
                    );
                    None
                }
            })
            .collect()
    }

    /// Rebuild the journey ending in round `round`'s destination label.
    pub fn reconstruct(&self, run: &RaptorRun, round: usize) -> Result<Journey, ReconstructionAbort> {
        let destination = run.query.destination;
        let mut label = lookup(run, round, destination, false)?;
        let mut stop = destination;
        let mut legs: Vec<Leg> = Vec::new();
        let mut steps = 0;

        loop {
            steps += 1;
            if steps > self.step_limit {
                return Err(ReconstructionAbort::StepLimitExceeded {
                    limit: self.step_limit,
                });
            }

            match label.provenance {
                Provenance::Origin => {
                    if stop != run.query.origin {
                        return Err(inconsistent(stop, "chain ends away from the origin"));
                    }
                    break;
                }
                Provenance::Transit {
                    pattern,
                    trip_index,
                    board,
                    alight,
                } => {
                    let leg = self.transit_leg(&label, stop, pattern, trip_index, board, alight)?;
                    let previous_round = label
                        .round
                        .checked_sub(1)
                        .ok_or_else(|| inconsistent(stop, "ride label in round 0"))?;
                    let previous = lookup(run, previous_round, leg.from(), false)?;
                    if previous.arrival > leg.departure() {
                        return Err(inconsistent(
                            leg.from(),
                            "boarded before arriving at the stop",
                        ));
                    }

                    stop = leg.from();
                    label = previous;
                    legs.push(Leg::Transit(leg));
                }
                Provenance::Walk { from, walk_secs } => {
                    let previous = lookup(run, label.round, from, true)?;
                    let walk = Walk::new(from, stop, previous.arrival, walk_secs);
                    if walk.arrival() != label.arrival {
                        return Err(inconsistent(stop, "walk time does not match label"));
                    }

                    stop = from;
                    label = previous;
                    legs.push(Leg::Walk(walk));
                }
            }
        }

        legs.reverse();
        if legs.is_empty() {
            return Ok(Journey::trivial(run.query.origin, run.query.departure));
        }
        Journey::new(run.query.origin, destination, legs)
            .map_err(|e| inconsistent(destination, e.to_string()))
    }

    fn transit_leg(
        &self,
        label: &Label,
        stop: StopIdx,
        pattern_idx: PatternIdx,
        trip_index: usize,
        board: PatternPos,
        alight: PatternPos,
    ) -> Result<TransitLeg, ReconstructionAbort> {
        let pattern = self
            .store
            .pattern(pattern_idx)
            .ok_or(ReconstructionAbort::UnknownPattern(pattern_idx))?;
        let unknown_trip = || ReconstructionAbort::UnknownTrip {
            pattern: pattern_idx,
            trip_index,
        };
        let meta = pattern.trip(trip_index).ok_or_else(unknown_trip)?;
        let (departure, arrival) = pattern
            .leg_times(trip_index, board, alight)
            .ok_or_else(unknown_trip)?;

        let from = pattern
            .stop_at(board)
            .ok_or_else(|| inconsistent(stop, "boarding position outside pattern"))?;
        if pattern.stop_at(alight) != Some(stop) {
            return Err(inconsistent(stop, "alighting position is another stop"));
        }
        if arrival != label.arrival {
            return Err(inconsistent(stop, "ride arrival does not match label"));
        }

        TransitLeg::new(TransitLegParts {
            pattern: pattern_idx,
            trip_index,
            trip: meta.trip,
            board,
            alight,
            from,
            to: stop,
            departure,
            arrival,
        })
        .map_err(|e| inconsistent(stop, e.to_string()))
    }
}

/// Fetch a label from `round`, either the stop's best or its ride label.
fn lookup(
    run: &RaptorRun,
    round: usize,
    stop: StopIdx,
    ridden: bool,
) -> Result<Label, ReconstructionAbort> {
    let labels = run
        .rounds
        .get(round)
        .ok_or(ReconstructionAbort::MissingLabel { stop, round })?;
    let label = if ridden {
        labels.ridden(stop)
    } else {
        labels.best(stop)
    };
    label
        .copied()
        .ok_or(ReconstructionAbort::MissingLabel { stop, round })
}
