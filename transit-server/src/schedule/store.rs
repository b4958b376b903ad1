//! The read-only schedule store.
//!
//! One `ScheduleStore` is one generation of the schedule: stops, patterns,
//! footpaths and calendars, plus a side table of original string ids and
//! display metadata. Nothing here mutates after construction except the
//! per-date memo of active services, which is internally synchronised.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use moka::sync::Cache;

use crate::domain::{PatternIdx, PatternPos, RouteIdx, ServiceIdx, Stop, StopIdx, TripIdx};

use super::calendar::{ActiveServices, CalendarResolver};
use super::pattern::Pattern;

/// Dates memoised per generation.
pub(super) const ACTIVE_SERVICES_CACHE_CAPACITY: u64 = 64;

/// Compressed adjacency lists indexed by a dense id.
#[derive(Debug, Clone)]
pub(super) struct Adjacency<T> {
    offsets: Vec<usize>,
    items: Vec<T>,
}

impl<T> Adjacency<T> {
    /// Group `(key, item)` pairs by key. Items keep their input order
    /// within each key.
    pub(super) fn from_pairs(key_count: usize, pairs: Vec<(usize, T)>) -> Self {
        let mut offsets = vec![0; key_count + 1];
        for (key, _) in &pairs {
            offsets[key + 1] += 1;
        }
        for i in 0..key_count {
            offsets[i + 1] += offsets[i];
        }

        let mut slots: Vec<Option<T>> = pairs.iter().map(|_| None).collect();
        let mut cursor = offsets.clone();
        for (key, item) in pairs {
            slots[cursor[key]] = Some(item);
            cursor[key] += 1;
        }

        Adjacency {
            offsets,
            items: slots.into_iter().flatten().collect(),
        }
    }

    pub(super) fn get(&self, key: usize) -> &[T] {
        match (self.offsets.get(key), self.offsets.get(key + 1)) {
            (Some(&start), Some(&end)) => &self.items[start..end],
            _ => &[],
        }
    }

    pub(super) fn len(&self) -> usize {
        self.items.len()
    }
}

/// A pattern serving a stop, and where in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternVisit {
    pub pattern: PatternIdx,
    pub position: PatternPos,
}

/// Outgoing walking connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footpath {
    pub to: StopIdx,
    pub walk_secs: u32,
}

/// Display metadata of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteInfo {
    pub route_id: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub color: Option<String>,
}

/// Original identifiers and display strings, keyed by surrogate id.
#[derive(Debug, Clone, Default)]
pub(super) struct SideTable {
    pub trip_ids: Vec<String>,
    pub trip_headsigns: Vec<Option<String>>,
    pub trip_routes: Vec<RouteIdx>,
    pub routes: Vec<RouteInfo>,
    pub service_ids: Vec<String>,
}

/// Counts describing one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub stops: usize,
    pub patterns: usize,
    pub fifo_patterns: usize,
    pub trips: usize,
    pub footpaths: usize,
    pub services: usize,
}

/// An immutable snapshot of the schedule.
pub struct ScheduleStore {
    pub(super) generation: u64,
    pub(super) built_at: DateTime<Utc>,
    pub(super) stops: Vec<Stop>,
    pub(super) stop_lookup: HashMap<String, StopIdx>,
    pub(super) children: Adjacency<StopIdx>,
    pub(super) patterns: Vec<Pattern>,
    pub(super) pattern_index: Adjacency<PatternVisit>,
    pub(super) footpaths: Adjacency<Footpath>,
    pub(super) calendar: CalendarResolver,
    pub(super) active_cache: Cache<NaiveDate, Arc<ActiveServices>>,
    pub(super) side: SideTable,
}

impl std::fmt::Debug for ScheduleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduleStore")
            .field("generation", &self.generation)
            .field("built_at", &self.built_at)
            .field("stats", &self.stats())
            .finish()
    }
}

impl ScheduleStore {
    /// Generation number assigned at build.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            stops: self.stops.len(),
            patterns: self.patterns.len(),
            fifo_patterns: self.patterns.iter().filter(|p| p.is_fifo()).count(),
            trips: self.side.trip_ids.len(),
            footpaths: self.footpaths.len(),
            services: self.calendar.service_count(),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, stop: StopIdx) -> Option<&Stop> {
        self.stops.get(stop.index())
    }

    /// Resolve an original stop id.
    pub fn stop_by_id(&self, stop_id: &str) -> Option<StopIdx> {
        self.stop_lookup.get(stop_id).copied()
    }

    /// Stops whose parent station is `parent`.
    pub fn children_of(&self, parent: StopIdx) -> &[StopIdx] {
        self.children.get(parent.index())
    }

    /// Patterns serving `stop`, with the position of each visit.
    ///
    /// A loop pattern that calls twice at one stop appears twice.
    pub fn patterns_at(&self, stop: StopIdx) -> &[PatternVisit] {
        self.pattern_index.get(stop.index())
    }

    pub fn pattern(&self, pattern: PatternIdx) -> Option<&Pattern> {
        self.patterns.get(pattern.index())
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Directed footpaths leaving `stop`.
    pub fn footpaths_from(&self, stop: StopIdx) -> &[Footpath] {
        self.footpaths.get(stop.index())
    }

    /// Services running on `date`, memoised for this generation.
    pub fn active_services(&self, date: NaiveDate) -> Arc<ActiveServices> {
        self.active_cache
            .get_with(date, || Arc::new(self.calendar.active_on(date)))
    }

    pub fn calendar(&self) -> &CalendarResolver {
        &self.calendar
    }

    pub fn trip_id(&self, trip: TripIdx) -> Option<&str> {
        self.side.trip_ids.get(trip.index()).map(String::as_str)
    }

    pub fn trip_headsign(&self, trip: TripIdx) -> Option<&str> {
        self.side
            .trip_headsigns
            .get(trip.index())
            .and_then(|h| h.as_deref())
    }

    pub fn trip_route(&self, trip: TripIdx) -> Option<RouteIdx> {
        self.side.trip_routes.get(trip.index()).copied()
    }

    pub fn route(&self, route: RouteIdx) -> Option<&RouteInfo> {
        self.side.routes.get(route.index())
    }

    pub fn service_id(&self, service: ServiceIdx) -> Option<&str> {
        self.side.service_ids.get(service.index()).map(String::as_str)
    }
}
