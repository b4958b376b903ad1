//! Schedule feed: the input contract supplied by the importer.
//!
//! The importer produces one `ScheduleFeed` per load. Where the data came
//! from does not matter to the store; this module only defines the shape
//! and a JSON file loader.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ScheduleTime;

use super::FeedError;

/// Stop metadata row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStop {
    pub stop_id: String,
    pub name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub parent_station: Option<String>,
}

/// Optional display metadata for a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRoute {
    pub route_id: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// One stop visit of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRow {
    pub stop_id: String,
    /// Seconds since service-day midnight
    pub arrival: ScheduleTime,
    /// Seconds since service-day midnight
    pub departure: ScheduleTime,
}

impl StopTimeRow {
    /// Create a row.
    pub fn new(stop_id: impl Into<String>, arrival: ScheduleTime, departure: ScheduleTime) -> Self {
        Self {
            stop_id: stop_id.into(),
            arrival,
            departure,
        }
    }
}

/// A scheduled trip with its ordered stop times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    #[serde(default)]
    pub headsign: Option<String>,
    pub stop_times: Vec<StopTimeRow>,
}

/// Weekday rule of a service with its validity range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCalendar {
    pub service_id: String,
    #[serde(default)]
    pub monday: bool,
    #[serde(default)]
    pub tuesday: bool,
    #[serde(default)]
    pub wednesday: bool,
    #[serde(default)]
    pub thursday: bool,
    #[serde(default)]
    pub friday: bool,
    #[serde(default)]
    pub saturday: bool,
    #[serde(default)]
    pub sunday: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Whether an exception adds or removes a service on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionKind {
    Added,
    Removed,
}

/// A single-date calendar exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCalendarException {
    pub service_id: String,
    pub date: NaiveDate,
    pub kind: ExceptionKind,
}

/// A directed walking connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFootpath {
    pub from_stop: String,
    pub to_stop: String,
    pub walk_seconds: u32,
}

/// Everything the store needs for one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFeed {
    pub stops: Vec<FeedStop>,
    #[serde(default)]
    pub routes: Vec<FeedRoute>,
    #[serde(default)]
    pub calendars: Vec<FeedCalendar>,
    #[serde(default)]
    pub exceptions: Vec<FeedCalendarException>,
    pub trips: Vec<FeedTrip>,
    #[serde(default)]
    pub footpaths: Vec<FeedFootpath>,
}

impl ScheduleFeed {
    /// Start building a feed in code.
    pub fn builder() -> ScheduleFeedBuilder {
        ScheduleFeedBuilder::default()
    }

    /// Load a feed from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse a feed from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of stop-time rows.
    pub fn stop_time_count(&self) -> usize {
        self.trips.iter().map(|t| t.stop_times.len()).sum()
    }
}

/// Builder for assembling a feed in code.
///
/// Provides a fluent API; mostly useful for importers that already hold
/// parsed records, and for tests.
#[derive(Debug, Default)]
pub struct ScheduleFeedBuilder {
    inner: ScheduleFeed,
}

impl ScheduleFeedBuilder {
    /// Add a stop without coordinates.
    pub fn stop(mut self, stop_id: &str, name: &str) -> Self {
        self.inner.stops.push(FeedStop {
            stop_id: stop_id.to_string(),
            name: name.to_string(),
            lat: 0.0,
            lon: 0.0,
            parent_station: None,
        });
        self
    }

    /// Add a stop belonging to a parent station.
    pub fn child_stop(mut self, stop_id: &str, name: &str, parent: &str) -> Self {
        self.inner.stops.push(FeedStop {
            stop_id: stop_id.to_string(),
            name: name.to_string(),
            lat: 0.0,
            lon: 0.0,
            parent_station: Some(parent.to_string()),
        });
        self
    }

    /// Add route display metadata.
    pub fn route(mut self, route_id: &str, short_name: &str, color: Option<&str>) -> Self {
        self.inner.routes.push(FeedRoute {
            route_id: route_id.to_string(),
            short_name: Some(short_name.to_string()),
            long_name: None,
            color: color.map(str::to_string),
        });
        self
    }

    /// Add a service running every day of the week within a range.
    pub fn daily_service(self, service_id: &str, start: NaiveDate, end: NaiveDate) -> Self {
        self.service(service_id, [true; 7], start, end)
    }

    /// Add a service with an explicit Monday-first weekday rule.
    pub fn service(
        mut self,
        service_id: &str,
        days: [bool; 7],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = days;
        self.inner.calendars.push(FeedCalendar {
            service_id: service_id.to_string(),
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
            start_date: start,
            end_date: end,
        });
        self
    }

    /// Add a calendar exception.
    pub fn exception(mut self, service_id: &str, date: NaiveDate, kind: ExceptionKind) -> Self {
        self.inner.exceptions.push(FeedCalendarException {
            service_id: service_id.to_string(),
            date,
            kind,
        });
        self
    }

    /// Add a trip.
    pub fn trip(
        mut self,
        trip_id: &str,
        route_id: &str,
        service_id: &str,
        stop_times: Vec<StopTimeRow>,
    ) -> Self {
        self.inner.trips.push(FeedTrip {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
            service_id: service_id.to_string(),
            headsign: None,
            stop_times,
        });
        self
    }

    /// Add a directed footpath.
    pub fn footpath(mut self, from: &str, to: &str, walk_seconds: u32) -> Self {
        self.inner.footpaths.push(FeedFootpath {
            from_stop: from.to_string(),
            to_stop: to.to_string(),
            walk_seconds,
        });
        self
    }

    /// Finish the feed.
    pub fn build(self) -> ScheduleFeed {
        self.inner
    }
}
