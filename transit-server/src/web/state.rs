//! Application state for the web layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::planner::{PlannerService, SearchConfig};
use crate::schedule::ScheduleHandle;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// The schedule generation currently served
    pub schedule: ScheduleHandle,

    /// Journey planner with its configured limits
    pub planner: Arc<PlannerService>,

    /// Feed file read again on reload
    pub feed_path: Arc<PathBuf>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(schedule: ScheduleHandle, config: SearchConfig, feed_path: PathBuf) -> Self {
        Self {
            schedule,
            planner: Arc::new(PlannerService::new(config)),
            feed_path: Arc::new(feed_path),
        }
    }
}
