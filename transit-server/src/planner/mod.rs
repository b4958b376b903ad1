//! Journey planner using round-based search.
//!
//! This module answers: "I am at this stop at this time - how can I reach
//! my destination?"
//!
//! Each search round extends the previous round's arrivals by one more
//! ride, followed by at most one walk. The journeys reaching the
//! destination in each round are rebuilt from their labels, then
//! filtered down to the Pareto-optimal set on arrival, transfers and
//! walking.

mod config;
mod labels;
mod rank;
mod raptor;
mod reconstruct;
mod service;


pub use config::SearchConfig;
pub use labels::{Label, Provenance, RoundLabels};
pub use rank::{deduplicate, rank_journeys, remove_dominated, select};
pub use raptor::{RaptorEngine, RaptorQuery, RaptorRun, RunStats};
pub use reconstruct::{JourneyReconstructor, ReconstructionAbort};
pub use service::{EmptyReason, PlanOutcome, PlanRequest, PlannerService};
