//! Schedule loading and construction errors.

/// Errors loading a feed from disk.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The feed file could not be read
    #[error("failed to read feed: {0}")]
    Io(#[from] std::io::Error),

    /// The feed file does not match the feed format
    #[error("failed to parse feed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Malformed or inconsistent feed content.
///
/// Fatal to the load attempt that produced it; a store that is already
/// serving is never touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("trip {trip_id} has no stop times")]
    EmptyTrip { trip_id: String },

    /// A stop time is earlier than the previous one
    #[error("trip {trip_id} goes back in time at position {position}")]
    NonMonotonicStopTimes { trip_id: String, position: usize },

    #[error("trip {trip_id} arrives after it departs at position {position}")]
    ArrivalAfterDeparture { trip_id: String, position: usize },

    #[error("trip {trip_id} calls at unknown stop {stop_id}")]
    UnknownStop { trip_id: String, stop_id: String },

    #[error("trip {trip_id} references unknown service {service_id}")]
    UnknownService { trip_id: String, service_id: String },

    #[error("stop {stop_id} is defined more than once")]
    DuplicateStop { stop_id: String },

    #[error("trip {trip_id} is defined more than once")]
    DuplicateTrip { trip_id: String },

    #[error("stop {stop_id} has unknown parent station {parent_id}")]
    UnknownParentStation { stop_id: String, parent_id: String },

    #[error("footpath references unknown stop {stop_id}")]
    UnknownFootpathStop { stop_id: String },

    /// Calendar validity range ends before it starts
    #[error("service {service_id} has an end date before its start date")]
    InvalidCalendarRange { service_id: String },

    /// More entities of one kind than surrogate ids can address
    #[error("too many {kind} in feed")]
    TooLarge { kind: &'static str },
}

/// Errors replacing the served schedule generation.
#[derive(Debug, thiserror::Error)]
pub enum ReloadError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Build(#[from] BuildError),
}
