//! Domain error types.
//!
//! These errors represent validation failures when assembling journeys
//! from raw identifiers. They are distinct from build and API errors.

use super::{ScheduleTime, StopIdx};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., alight before board)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Consecutive legs don't meet at the same stop
    #[error("legs do not connect: {0} then {1}")]
    LegsNotConnected(StopIdx, StopIdx),

    /// A leg departs before the previous one arrives
    #[error("leg departs at {departure} before previous arrival at {arrival}")]
    DepartsBeforeArrival {
        arrival: ScheduleTime,
        departure: ScheduleTime,
    },

    /// The legs do not start at the journey origin or end at its destination
    #[error("legs do not span the journey endpoints")]
    EndpointMismatch,
}
