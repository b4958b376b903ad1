//! The currently served schedule generation.
//!
//! Queries clone the current `Arc<ScheduleStore>` and run against it to
//! completion. A reload builds a complete new store first and only then
//! swaps the pointer, so in-flight queries keep the generation they
//! started with and a failed build leaves the served one untouched.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{error, info};

use super::{BuildError, ReloadError, ScheduleFeed, ScheduleStore};

/// Shared, swappable reference to the current schedule.
#[derive(Clone)]
pub struct ScheduleHandle {
    current: Arc<RwLock<Arc<ScheduleStore>>>,
    next_generation: Arc<AtomicU64>,
}

impl ScheduleHandle {
    /// Serve `store` as the current generation.
    pub fn new(store: ScheduleStore) -> Self {
        let next = store.generation() + 1;
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
            next_generation: Arc::new(AtomicU64::new(next)),
        }
    }

    /// Build generation 1 from a feed.
    pub fn from_feed(feed: &ScheduleFeed) -> Result<Self, BuildError> {
        Ok(Self::new(ScheduleStore::build(feed, 1)?))
    }

    /// Build generation 1 from a feed file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReloadError> {
        let feed = ScheduleFeed::from_json_file(path)?;
        Ok(Self::from_feed(&feed)?)
    }

    /// The generation serving new queries.
    pub fn current(&self) -> Arc<ScheduleStore> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn generation(&self) -> u64 {
        self.current().generation()
    }

    /// Build a new generation from `feed` and swap it in.
    ///
    /// Returns the new generation number. On error nothing is swapped.
    pub fn replace_with(&self, feed: &ScheduleFeed) -> Result<u64, BuildError> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let store = Arc::new(ScheduleStore::build(feed, generation)?);

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guard.generation();
        *guard = store;
        drop(guard);

        info!(previous, generation, "Swapped schedule generation");
        Ok(generation)
    }

    /// Load a feed file and swap in the resulting generation.
    ///
    /// Blocks for the whole build; async callers should run it on the
    /// blocking pool.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<u64, ReloadError> {
        let path = path.as_ref();
        let result = ScheduleFeed::from_json_file(path)
            .map_err(ReloadError::from)
            .and_then(|feed| self.replace_with(&feed).map_err(ReloadError::from));

        if let Err(e) = &result {
            error!(
                path = %path.display(),
                error = %e,
                serving = self.generation(),
                "Schedule reload failed, keeping current generation"
            );
        }
        result
    }
}

impl std::fmt::Debug for ScheduleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleHandle")
            .field("generation", &self.generation())
            .finish()
    }
}
