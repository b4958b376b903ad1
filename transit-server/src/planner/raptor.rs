//! Round-based earliest-arrival search.
//!
//! Round `k` holds the best arrivals using exactly `k` rides; round 0 is
//! the origin plus any stops walkable from it. Each round scans every
//! pattern serving a stop improved in the previous round, then relaxes
//! footpaths from the stops it reached by ride.
//!
//! Two bounds prune labels at a stop. A label replaces the stop's best
//! only if it is earlier than every arrival there so far. A ride arrival
//! is still kept as a walk source if it is earlier than every earlier
//! ride arrival there, even when walking got there sooner. Walks never
//! start from a walk.
//!
//! The destination bound comes from rounds with at least one ride. A
//! walk-only journey has as few transfers as a single ride, so it must
//! not hide a slower ride with less walking.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{PatternIdx, PatternPos, ScheduleTime, StopIdx};
use crate::schedule::{ActiveServices, Pattern, ScheduleStore};

use super::labels::{Label, Provenance, RoundLabels};

/// Inputs to one search.
#[derive(Debug, Clone, Copy)]
pub struct RaptorQuery {
    pub origin: StopIdx,
    pub destination: StopIdx,
    pub departure: ScheduleTime,
    pub max_transfers: usize,
}

/// Counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rounds with at least one ride scanned
    pub rounds: usize,
    pub patterns_scanned: usize,
    pub labels_set: usize,
}

/// The labels produced by one search.
#[derive(Debug, Clone)]
pub struct RaptorRun {
    pub query: RaptorQuery,
    /// Index `k` holds the labels of round `k`
    pub rounds: Vec<RoundLabels>,
    pub stats: RunStats,
}

impl RaptorRun {
    /// Rounds whose own label reached the destination, in round order.
    pub fn destination_rounds(&self) -> Vec<usize> {
        self.rounds
            .iter()
            .enumerate()
            .filter(|(k, labels)| {
                labels
                    .best(self.query.destination)
                    .is_some_and(|label| label.round == *k)
            })
            .map(|(k, _)| k)
            .collect()
    }
}

/// A trip boarded during a pattern scan.
#[derive(Debug, Clone, Copy)]
struct Boarded {
    trip_index: usize,
    board: PatternPos,
    walking_secs: u32,
}

/// Search over one schedule generation with a fixed set of active services.
pub struct RaptorEngine<'a> {
    store: &'a ScheduleStore,
    active: &'a ActiveServices,
}

impl<'a> RaptorEngine<'a> {
    pub fn new(store: &'a ScheduleStore, active: &'a ActiveServices) -> Self {
        Self { store, active }
    }

    /// Run the search to completion.
    pub fn run(&self, query: RaptorQuery) -> RaptorRun {
        let mut search = Search::new(self, query);
        search.run();

        debug!(
            rounds = search.stats.rounds,
            patterns = search.stats.patterns_scanned,
            labels = search.stats.labels_set,
            reached = search
                .best_arrival
                .get(query.destination.index())
                .is_some_and(Option::is_some),
            "Raptor search complete"
        );

        RaptorRun {
            query,
            rounds: search.rounds,
            stats: search.stats,
        }
    }
}

/// Per-query mutable state.
struct Search<'e, 'a> {
    engine: &'e RaptorEngine<'a>,
    query: RaptorQuery,
    rounds: Vec<RoundLabels>,
    /// Best arrival at each stop over all rounds so far
    best_arrival: Vec<Option<ScheduleTime>>,
    /// Best arrival at each stop by ride (or as the origin)
    best_ride: Vec<Option<ScheduleTime>>,
    /// Best destination arrival from a round with at least one ride
    target: Option<ScheduleTime>,
    stats: RunStats,
}

impl<'e, 'a> Search<'e, 'a> {
    fn new(engine: &'e RaptorEngine<'a>, query: RaptorQuery) -> Self {
        let stop_count = engine.store.stop_count();
        Self {
            engine,
            query,
            rounds: Vec::with_capacity(query.max_transfers + 2),
            best_arrival: vec![None; stop_count],
            best_ride: vec![None; stop_count],
            target: None,
            stats: RunStats::default(),
        }
    }

    fn run(&mut self) {
        let store = self.engine.store;
        let stop_count = store.stop_count();
        if self.query.origin.index() >= stop_count || self.query.destination.index() >= stop_count {
            return;
        }

        let mut round0 = RoundLabels::new(stop_count);
        round0.set_ridden(self.query.origin, Label::origin(self.query.departure));
        self.best_arrival[self.query.origin.index()] = Some(self.query.departure);
        self.best_ride[self.query.origin.index()] = Some(self.query.departure);
        self.rounds.push(round0);

        let mut marked = vec![self.query.origin];
        marked.extend(self.relax_footpaths(0, &[self.query.origin]));
        marked.sort_unstable();
        marked.dedup();

        for k in 1..=self.query.max_transfers + 1 {
            if marked.is_empty() {
                break;
            }
            let next = RoundLabels::following(&self.rounds[k - 1]);
            self.rounds.push(next);
            self.stats.rounds = k;

            let mut reached = Reached::default();
            for (pattern_idx, start) in self.collect_patterns(&marked) {
                if let Some(pattern) = store.pattern(pattern_idx) {
                    self.stats.patterns_scanned += 1;
                    if pattern.is_fifo() {
                        self.scan_fifo(k, pattern_idx, pattern, start, &mut reached);
                    } else {
                        self.scan_overtaking(k, pattern_idx, pattern, start, &mut reached);
                    }
                }
            }
            reached.ridden.sort_unstable();
            reached.ridden.dedup();

            let walked = self.relax_footpaths(k, &reached.ridden);
            marked = reached.improved;
            marked.extend(walked);
            marked.sort_unstable();
            marked.dedup();
        }
    }

    /// Patterns touching any marked stop, each with its earliest marked
    /// position.
    fn collect_patterns(&self, marked: &[StopIdx]) -> BTreeMap<PatternIdx, PatternPos> {
        let mut queue: BTreeMap<PatternIdx, PatternPos> = BTreeMap::new();
        for &stop in marked {
            for visit in self.engine.store.patterns_at(stop) {
                queue
                    .entry(visit.pattern)
                    .and_modify(|pos| *pos = (*pos).min(visit.position))
                    .or_insert(visit.position);
            }
        }
        queue
    }

    /// Whether `label` clears the destination bound. A label at the
    /// destination itself only has to beat the best ride-era arrival
    /// there; round 0 competes with walk-only arrivals alone.
    fn within_target(&self, k: usize, stop: StopIdx, label: &Label) -> bool {
        let destination = self.query.destination;
        if stop != destination {
            return self.target.is_none_or(|target| label.arrival < target);
        }
        let bound = if k == 0 {
            self.best_arrival[destination.index()]
        } else {
            self.target
        };
        improves(bound, self.rounds[k].best(destination), k, label)
    }

    fn record_ride(&mut self, k: usize, stop: StopIdx, label: Label, reached: &mut Reached) {
        if !self.within_target(k, stop, &label) {
            return;
        }

        let destination = stop == self.query.destination;
        let as_best = destination
            || improves(
                self.best_arrival[stop.index()],
                self.rounds[k].best(stop),
                k,
                &label,
            );
        if as_best {
            self.rounds[k].set_ridden(stop, label);
            self.lower_best_arrival(stop, label.arrival);
            reached.improved.push(stop);
        } else if improves(
            self.best_ride[stop.index()],
            self.rounds[k].ridden(stop),
            k,
            &label,
        ) {
            self.rounds[k].set_ride_only(stop, label);
        } else {
            return;
        }

        lower(&mut self.best_ride[stop.index()], label.arrival);
        if destination {
            lower(&mut self.target, label.arrival);
        }
        self.stats.labels_set += 1;
        reached.ridden.push(stop);
    }

    fn lower_best_arrival(&mut self, stop: StopIdx, arrival: ScheduleTime) {
        lower(&mut self.best_arrival[stop.index()], arrival);
    }

    /// Label to board from at `stop`: the best arrival with one ride fewer.
    /// Nothing boards at the destination.
    fn boarding_label(&self, k: usize, stop: StopIdx) -> Option<Label> {
        if stop == self.query.destination {
            return None;
        }
        self.rounds[k - 1].best(stop).copied()
    }

    fn ride_label(
        k: usize,
        pattern: PatternIdx,
        boarded: Boarded,
        alight: PatternPos,
        arrival: ScheduleTime,
    ) -> Label {
        Label {
            arrival,
            round: k,
            walking_secs: boarded.walking_secs,
            provenance: Provenance::Transit {
                pattern,
                trip_index: boarded.trip_index,
                board: boarded.board,
                alight,
            },
        }
    }

    fn is_active(&self, pattern: &Pattern, trip_index: usize) -> bool {
        pattern
            .trip(trip_index)
            .is_some_and(|meta| self.engine.active.contains(meta.service))
    }

    /// Scan a pattern whose trips never overtake: the earliest boardable
    /// trip is the best one at every later stop.
    fn scan_fifo(
        &mut self,
        k: usize,
        pattern_idx: PatternIdx,
        pattern: &Pattern,
        start: PatternPos,
        reached: &mut Reached,
    ) {
        let mut current: Option<Boarded> = None;

        for p in start.0..pattern.len() {
            let pos = PatternPos(p);
            let stop = pattern.stops()[p];

            if let Some(boarded) = current {
                let arrival = pattern.arrival(boarded.trip_index, pos);
                let label = Self::ride_label(k, pattern_idx, boarded, pos, arrival);
                self.record_ride(k, stop, label, reached);
            }

            let Some(from) = self.boarding_label(k, stop) else {
                continue;
            };
            let first = pattern.first_departing_at_or_after(pos, from.arrival);
            let limit = current.map_or(pattern.trip_count(), |c| c.trip_index);
            if let Some(trip_index) = (first..limit).find(|&t| self.is_active(pattern, t)) {
                current = Some(Boarded {
                    trip_index,
                    board: pos,
                    walking_secs: from.walking_secs,
                });
            }
        }
    }

    /// Scan a pattern with overtaking. Keeps every boarded trip that is
    /// not beaten at all later stops by another boarded trip.
    fn scan_overtaking(
        &mut self,
        k: usize,
        pattern_idx: PatternIdx,
        pattern: &Pattern,
        start: PatternPos,
        reached: &mut Reached,
    ) {
        let mut candidates: Vec<Boarded> = Vec::new();

        for p in start.0..pattern.len() {
            let pos = PatternPos(p);
            let stop = pattern.stops()[p];

            let best = candidates
                .iter()
                .map(|c| (pattern.arrival(c.trip_index, pos), *c))
                .min_by_key(|(arrival, c)| (*arrival, c.walking_secs, c.trip_index));
            if let Some((arrival, boarded)) = best {
                let label = Self::ride_label(k, pattern_idx, boarded, pos, arrival);
                self.record_ride(k, stop, label, reached);
            }

            let Some(from) = self.boarding_label(k, stop) else {
                continue;
            };
            for trip_index in 0..pattern.trip_count() {
                if pattern.departure(trip_index, pos) < from.arrival
                    || !self.is_active(pattern, trip_index)
                {
                    continue;
                }
                let entrant = Boarded {
                    trip_index,
                    board: pos,
                    walking_secs: from.walking_secs,
                };
                if candidates.iter().any(|c| covers(pattern, c, &entrant, pos)) {
                    continue;
                }
                candidates.retain(|c| !covers(pattern, &entrant, c, pos));
                candidates.push(entrant);
            }
        }
    }

    /// Relax footpaths from `sources`, which must hold ride labels in
    /// round `k` (or the origin in round 0). Returns the stops whose best
    /// improved.
    fn relax_footpaths(&mut self, k: usize, sources: &[StopIdx]) -> Vec<StopIdx> {
        let store = self.engine.store;
        let mut improved = Vec::new();

        for &from in sources {
            let Some(source) = self.rounds[k].ridden(from).copied() else {
                continue;
            };
            for path in store.footpaths_from(from) {
                let label = Label {
                    arrival: source.arrival.saturating_add(path.walk_secs),
                    round: k,
                    walking_secs: source.walking_secs.saturating_add(path.walk_secs),
                    provenance: Provenance::Walk {
                        from,
                        walk_secs: path.walk_secs,
                    },
                };
                let destination = path.to == self.query.destination;
                let accepted = self.within_target(k, path.to, &label)
                    && (destination
                        || improves(
                            self.best_arrival[path.to.index()],
                            self.rounds[k].best(path.to),
                            k,
                            &label,
                        ));
                if !accepted {
                    continue;
                }
                self.rounds[k].set_best(path.to, label);
                self.lower_best_arrival(path.to, label.arrival);
                if destination && k > 0 {
                    lower(&mut self.target, label.arrival);
                }
                self.stats.labels_set += 1;
                improved.push(path.to);
            }
        }

        improved
    }
}

/// Stops touched by the rides of one round.
#[derive(Debug, Default)]
struct Reached {
    /// Stops holding a new ride label; walks start here
    ridden: Vec<StopIdx>,
    /// Stops whose best improved; scanned next round
    improved: Vec<StopIdx>,
}

/// Whether `label` beats `bound`, or ties it against this round's own
/// `existing` label with less walking.
fn improves(
    bound: Option<ScheduleTime>,
    existing: Option<&Label>,
    k: usize,
    label: &Label,
) -> bool {
    match bound {
        None => true,
        Some(bound) if label.arrival < bound => true,
        Some(bound) => {
            label.arrival == bound
                && existing
                    .is_some_and(|existing| existing.round == k && label.beats(Some(existing)))
        }
    }
}

fn lower(slot: &mut Option<ScheduleTime>, arrival: ScheduleTime) {
    if slot.is_none_or(|current| arrival < current) {
        *slot = Some(arrival);
    }
}

/// Whether riding `a` from its boarding point is at least as good as
/// riding `b` at every position after `pos`.
fn covers(pattern: &Pattern, a: &Boarded, b: &Boarded, pos: PatternPos) -> bool {
    if a.trip_index == b.trip_index {
        return a.walking_secs <= b.walking_secs;
    }
    a.walking_secs <= b.walking_secs
        && (pos.0 + 1..pattern.len()).all(|q| {
            let q = PatternPos(q);
            pattern.arrival(a.trip_index, q) <= pattern.arrival(b.trip_index, q)
        })
}
