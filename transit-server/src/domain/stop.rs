//! Stop metadata.

use super::StopIdx;

/// A boarding point in the network.
///
/// Stops are immutable once a schedule generation is built. The external
/// `code` is unique within a generation; `idx` is its surrogate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Surrogate id, also the stop's index in the store.
    pub idx: StopIdx,
    /// External identifier as supplied by the feed.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Parent station, if this stop is a platform or entrance of one.
    pub parent: Option<StopIdx>,
}

impl Stop {
    /// Returns true if this stop belongs to a parent station.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}
