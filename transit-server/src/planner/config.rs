//! Search configuration for the journey planner.

/// Configuration parameters for journey search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Transfers allowed when the caller does not say.
    pub max_transfers: usize,

    /// Journeys returned when the caller does not say.
    pub max_alternatives: usize,

    /// Hard cap on caller-supplied transfers.
    /// Each extra transfer costs one more search round.
    pub transfer_limit: usize,

    /// Hard cap on caller-supplied alternatives.
    pub alternatives_limit: usize,

    /// Backward steps allowed per round when rebuilding a journey.
    pub reconstruction_step_factor: usize,
}

/// Extra reconstruction steps on top of the per-round allowance.
const RECONSTRUCTION_SLACK: usize = 8;

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_transfers: usize,
        max_alternatives: usize,
        transfer_limit: usize,
        alternatives_limit: usize,
        reconstruction_step_factor: usize,
    ) -> Self {
        Self {
            max_transfers,
            max_alternatives,
            transfer_limit,
            alternatives_limit,
            reconstruction_step_factor,
        }
    }

    /// Resolve a caller's transfer limit against the default and cap.
    pub fn clamp_transfers(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.max_transfers)
            .min(self.transfer_limit)
    }

    /// Resolve a caller's alternatives count; always at least one.
    pub fn clamp_alternatives(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.max_alternatives)
            .clamp(1, self.alternatives_limit.max(1))
    }

    /// Maximum backward steps when rebuilding a journey found with up to
    /// `max_transfers` transfers.
    pub fn reconstruction_step_cap(&self, max_transfers: usize) -> usize {
        self.reconstruction_step_factor * (max_transfers + 1) + RECONSTRUCTION_SLACK
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 4,
            max_alternatives: 5,
            transfer_limit: 8,
            alternatives_limit: 20,
            reconstruction_step_factor: 4,
        }
    }
}
