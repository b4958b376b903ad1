//! The query entry point.
//!
//! `PlannerService::plan` answers one journey query against one schedule
//! generation. Expected conditions such as unknown stops, no service on
//! the date or an unreachable destination give an empty result with a
//! reason, never an error.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Journey, ScheduleTime};
use crate::schedule::ScheduleStore;

use super::config::SearchConfig;
use super::rank::select;
use super::raptor::{RaptorEngine, RaptorQuery};
use super::reconstruct::JourneyReconstructor;

/// A journey query using the feed's stop ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub departure: ScheduleTime,
    /// Falls back to the configured default when `None`
    pub max_transfers: Option<usize>,
    /// Falls back to the configured default when `None`
    pub max_alternatives: Option<usize>,
}

impl PlanRequest {
    /// Create a request using default limits.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        date: NaiveDate,
        departure: ScheduleTime,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
            departure,
            max_transfers: None,
            max_alternatives: None,
        }
    }

    pub fn with_max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = Some(max_transfers);
        self
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = Some(max_alternatives);
        self
    }
}

/// Why a plan came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Origin or destination is not a known stop
    UnknownStop,
    /// No service runs on the requested date
    NoServiceToday,
    /// Services run, but none reach the destination within the limits
    Unreachable,
}

impl EmptyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EmptyReason::UnknownStop => "unknown_stop",
            EmptyReason::NoServiceToday => "no_service_today",
            EmptyReason::Unreachable => "unreachable",
        }
    }
}

/// Result of one query.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Pareto-optimal journeys, best first
    pub journeys: Vec<Journey>,
    /// Set exactly when `journeys` is empty
    pub empty_reason: Option<EmptyReason>,
    /// Generation the query ran against
    pub generation: u64,
}

impl PlanOutcome {
    fn empty(reason: EmptyReason, generation: u64) -> Self {
        Self {
            journeys: Vec::new(),
            empty_reason: Some(reason),
            generation,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }
}

/// Plans journeys against a schedule store.
#[derive(Debug, Clone, Default)]
pub struct PlannerService {
    config: SearchConfig,
}

impl PlannerService {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Plan journeys for `request` against `store`.
    ///
    /// Runs to completion on the calling thread.
    pub fn plan(&self, store: &ScheduleStore, request: &PlanRequest) -> PlanOutcome {
        let generation = store.generation();
        let (Some(origin), Some(destination)) = (
            store.stop_by_id(&request.origin),
            store.stop_by_id(&request.destination),
        ) else {
            debug!(
                origin = %request.origin,
                destination = %request.destination,
                "Unknown stop in plan request"
            );
            return PlanOutcome::empty(EmptyReason::UnknownStop, generation);
        };

        if origin == destination {
            return PlanOutcome {
                journeys: vec![Journey::trivial(origin, request.departure)],
                empty_reason: None,
                generation,
            };
        }

        let max_transfers = self.config.clamp_transfers(request.max_transfers);
        let max_alternatives = self.config.clamp_alternatives(request.max_alternatives);

        let active = store.active_services(request.date);
        let run = RaptorEngine::new(store, &active).run(RaptorQuery {
            origin,
            destination,
            departure: request.departure,
            max_transfers,
        });

        let step_limit = self.config.reconstruction_step_cap(max_transfers);
        let candidates = JourneyReconstructor::new(store, step_limit).candidates(&run);
        let candidate_count = candidates.len();
        let journeys = select(candidates, max_alternatives);

        debug!(
            %origin,
            %destination,
            date = %request.date,
            departure = %request.departure,
            max_transfers,
            candidates = candidate_count,
            journeys = journeys.len(),
            "Plan complete"
        );

        if journeys.is_empty() {
            let reason = if active.is_empty() {
                EmptyReason::NoServiceToday
            } else {
                EmptyReason::Unreachable
            };
            return PlanOutcome::empty(reason, generation);
        }

        PlanOutcome {
            journeys,
            empty_reason: None,
            generation,
        }
    }
}
