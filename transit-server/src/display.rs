//! Display metadata lookup.
//!
//! Journeys carry only surrogate ids. Turning them into the strings a
//! rider sees (route names, colours, headsigns and stop names) happens
//! here, outside the search.

use crate::domain::{StopIdx, TransitLeg};
use crate::schedule::ScheduleStore;

/// Human-readable details of one ride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegMetadata {
    pub trip_id: String,
    pub route_id: String,
    /// Short name if the feed has one, otherwise the long name
    pub route_name: Option<String>,
    /// Hex colour without the leading `#`
    pub color: Option<String>,
    pub headsign: Option<String>,
}

/// A stop's external id and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopLabel<'a> {
    pub stop_id: &'a str,
    pub name: &'a str,
}

/// Resolves journey identifiers to display strings.
pub trait MetadataResolver {
    /// Metadata for a ride, or `None` if its trip is unknown.
    fn leg_metadata(&self, leg: &TransitLeg) -> Option<LegMetadata>;

    /// External id and name of a stop.
    fn stop_label(&self, stop: StopIdx) -> Option<StopLabel<'_>>;

    /// The stop's parent station, if it has one.
    fn parent_station(&self, stop: StopIdx) -> Option<StopLabel<'_>>;

    /// Stops grouped under `parent`.
    fn child_stops(&self, parent: StopIdx) -> Vec<StopLabel<'_>>;
}

impl MetadataResolver for ScheduleStore {
    fn leg_metadata(&self, leg: &TransitLeg) -> Option<LegMetadata> {
        let trip = leg.trip();
        let trip_id = self.trip_id(trip)?;
        let route = self.trip_route(trip).and_then(|r| self.route(r));

        Some(LegMetadata {
            trip_id: trip_id.to_string(),
            route_id: route.map(|r| r.route_id.clone()).unwrap_or_default(),
            route_name: route.and_then(|r| r.short_name.clone().or_else(|| r.long_name.clone())),
            color: route.and_then(|r| r.color.clone()),
            headsign: self.trip_headsign(trip).map(str::to_string),
        })
    }

    fn stop_label(&self, stop: StopIdx) -> Option<StopLabel<'_>> {
        self.stop(stop).map(|s| StopLabel {
            stop_id: &s.code,
            name: &s.name,
        })
    }

    fn parent_station(&self, stop: StopIdx) -> Option<StopLabel<'_>> {
        let parent = self.stop(stop)?.parent?;
        self.stop_label(parent)
    }

    fn child_stops(&self, parent: StopIdx) -> Vec<StopLabel<'_>> {
        self.children_of(parent)
            .iter()
            .filter_map(|&child| self.stop_label(child))
            .collect()
    }
}
