//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::display::{MetadataResolver, StopLabel};
use crate::domain::{Journey, Leg, StopIdx, TransitLeg, Walk};
use crate::schedule::ScheduleStore;

/// Query string for journey planning.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyQuery {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Service date as YYYY-MM-DD (defaults to today)
    pub date: Option<String>,

    /// Departure time as HH:MM[:SS] (defaults to now)
    pub time: Option<String>,

    /// Maximum vehicle changes
    pub max_transfers: Option<usize>,

    /// Maximum journeys returned
    pub max_alternatives: Option<usize>,
}

/// A journey option.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Journey legs in travel order
    pub legs: Vec<LegResult>,

    /// Departure time from origin
    pub departure_time: String,

    /// Arrival time at destination
    pub arrival_time: String,

    /// Total duration in minutes
    pub duration_mins: u32,

    /// Number of changes
    pub changes: usize,

    /// Total walking in seconds
    pub walking_secs: u32,
}

/// A leg of a journey.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LegResult {
    Transit(TransitResult),
    Walk(WalkResult),
}

/// A ride in a journey.
#[derive(Debug, Serialize)]
pub struct TransitResult {
    /// Feed trip id
    pub trip_id: String,

    /// Feed route id
    pub route_id: String,

    /// Route short or long name
    pub route_name: Option<String>,

    /// Route colour
    pub color: Option<String>,

    /// Trip headsign
    pub headsign: Option<String>,

    /// Boarding stop
    pub from: StopInfo,

    /// Alighting stop
    pub to: StopInfo,

    /// Stops passed without alighting
    pub intermediate_stops: usize,
}

/// A walking leg.
#[derive(Debug, Serialize)]
pub struct WalkResult {
    /// Where the walk starts
    pub from: StopInfo,

    /// Where the walk ends
    pub to: StopInfo,

    /// Duration in seconds
    pub duration_secs: u32,
}

/// Stop information for display.
#[derive(Debug, Serialize)]
pub struct StopInfo {
    /// Feed stop id
    pub stop_id: String,

    /// Stop name
    pub name: String,

    /// Time at this stop
    pub time: String,

    /// Station this stop belongs to
    pub parent: Option<StopRef>,
}

/// A stop's id and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopRef {
    pub stop_id: String,
    pub name: String,
}

/// A stop with its station grouping.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_id: String,
    pub name: String,

    /// Parent station, for a platform or entrance
    pub parent: Option<StopRef>,

    /// Stops grouped under this one, for a station
    pub children: Vec<StopRef>,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
pub struct PlanJourneyResponse {
    /// Found journey options, best first
    pub journeys: Vec<JourneyResult>,

    /// Why no journeys were found, when none were
    pub empty_reason: Option<&'static str>,

    /// Schedule generation that answered the query
    pub generation: u64,
}

/// Served schedule generation.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub generation: u64,

    /// RFC 3339 build timestamp
    pub built_at: String,

    pub stops: usize,
    pub patterns: usize,
    pub fifo_patterns: usize,
    pub trips: usize,
    pub footpaths: usize,
    pub services: usize,
}

/// Result of a successful reload.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    /// Generation now serving
    pub generation: u64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StatusResponse {
    pub fn from_store(store: &ScheduleStore) -> Self {
        let stats = store.stats();
        Self {
            generation: store.generation(),
            built_at: store.built_at().to_rfc3339(),
            stops: stats.stops,
            patterns: stats.patterns,
            fifo_patterns: stats.fifo_patterns,
            trips: stats.trips,
            footpaths: stats.footpaths,
            services: stats.services,
        }
    }
}

impl JourneyResult {
    /// Create from a domain Journey.
    pub fn from_journey(journey: &Journey, resolver: &impl MetadataResolver) -> Self {
        let legs = journey
            .legs()
            .iter()
            .map(|leg| match leg {
                Leg::Transit(ride) => LegResult::Transit(TransitResult::from_leg(ride, resolver)),
                Leg::Walk(walk) => LegResult::Walk(WalkResult::from_walk(walk, resolver)),
            })
            .collect();

        Self {
            legs,
            departure_time: journey.departure().to_string(),
            arrival_time: journey.arrival().to_string(),
            duration_mins: journey.duration_secs() / 60,
            changes: journey.transfer_count(),
            walking_secs: journey.walking_secs(),
        }
    }
}

impl TransitResult {
    /// Create from a domain TransitLeg.
    pub fn from_leg(leg: &TransitLeg, resolver: &impl MetadataResolver) -> Self {
        let meta = resolver.leg_metadata(leg);

        Self {
            trip_id: meta.as_ref().map(|m| m.trip_id.clone()).unwrap_or_default(),
            route_id: meta.as_ref().map(|m| m.route_id.clone()).unwrap_or_default(),
            route_name: meta.as_ref().and_then(|m| m.route_name.clone()),
            color: meta.as_ref().and_then(|m| m.color.clone()),
            headsign: meta.and_then(|m| m.headsign),
            from: StopInfo::new(leg.from(), &leg.departure(), resolver),
            to: StopInfo::new(leg.to(), &leg.arrival(), resolver),
            intermediate_stops: leg.intermediate_stop_count(),
        }
    }
}

impl WalkResult {
    /// Create from a domain Walk.
    pub fn from_walk(walk: &Walk, resolver: &impl MetadataResolver) -> Self {
        Self {
            from: StopInfo::new(walk.from, &walk.departure, resolver),
            to: StopInfo::new(walk.to, &walk.arrival(), resolver),
            duration_secs: walk.duration_secs,
        }
    }
}

impl StopInfo {
    fn new(stop: StopIdx, time: &impl ToString, resolver: &impl MetadataResolver) -> Self {
        let (stop_id, name) = resolver
            .stop_label(stop)
            .map(|label| (label.stop_id.to_string(), label.name.to_string()))
            .unwrap_or_else(|| (stop.to_string(), String::new()));

        Self {
            stop_id,
            name,
            time: time.to_string(),
            parent: resolver.parent_station(stop).map(StopRef::from),
        }
    }
}

impl From<StopLabel<'_>> for StopRef {
    fn from(label: StopLabel<'_>) -> Self {
        Self {
            stop_id: label.stop_id.to_string(),
            name: label.name.to_string(),
        }
    }
}

impl StopResult {
    /// Look up a stop, or `None` if the resolver does not know it.
    pub fn resolve(stop: StopIdx, resolver: &impl MetadataResolver) -> Option<Self> {
        let label = resolver.stop_label(stop)?;

        Some(Self {
            stop_id: label.stop_id.to_string(),
            name: label.name.to_string(),
            parent: resolver.parent_station(stop).map(StopRef::from),
            children: resolver
                .child_stops(stop)
                .into_iter()
                .map(StopRef::from)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScheduleTime;
    use crate::planner::{PlanRequest, PlannerService};
    use crate::schedule::{ScheduleFeed, StopTimeRow};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn t(s: &str) -> ScheduleTime {
        ScheduleTime::parse(s).unwrap()
    }

    fn row(stop: &str, time: &str) -> StopTimeRow {
        StopTimeRow::new(stop, t(time), t(time))
    }

    fn make_test_store() -> ScheduleStore {
        let feed = ScheduleFeed::builder()
            .stop("PAD", "London Paddington")
            .child_stop("PAD-1", "London Paddington platform 1", "PAD")
            .stop("RDG", "Reading")
            .stop("SWI", "Swindon")
            .stop("BRI", "Bristol Temple Meads")
            .stop("BRS", "Bristol bus station")
            .route("GW", "Great Western", Some("0A493E"))
            .daily_service("D", day(), day())
            .trip(
                "GW1",
                "GW",
                "D",
                vec![
                    row("PAD", "10:00"),
                    row("RDG", "10:25"),
                    row("SWI", "10:52"),
                    row("BRI", "11:30"),
                ],
            )
            .footpath("BRI", "BRS", 300)
            .build();
        ScheduleStore::build(&feed, 7).unwrap()
    }

    fn plan(store: &ScheduleStore, to: &str) -> Journey {
        let outcome = PlannerService::default()
            .plan(store, &PlanRequest::new("PAD", to, day(), t("09:50")));
        outcome.journeys.into_iter().next().unwrap()
    }

    #[test]
    fn journey_result_from_journey() {
        let store = make_test_store();
        let journey = plan(&store, "BRI");
        let result = JourneyResult::from_journey(&journey, &store);

        assert_eq!(result.departure_time, "10:00:00");
        assert_eq!(result.arrival_time, "11:30:00");
        assert_eq!(result.duration_mins, 90);
        assert_eq!(result.changes, 0);
        assert_eq!(result.walking_secs, 0);
        assert_eq!(result.legs.len(), 1);

        match &result.legs[0] {
            LegResult::Transit(ride) => {
                assert_eq!(ride.trip_id, "GW1");
                assert_eq!(ride.route_name.as_deref(), Some("Great Western"));
                assert_eq!(ride.color.as_deref(), Some("0A493E"));
                assert_eq!(ride.from.stop_id, "PAD");
                assert_eq!(ride.from.name, "London Paddington");
                assert_eq!(ride.to.stop_id, "BRI");
                assert_eq!(ride.intermediate_stops, 2);
            }
            LegResult::Walk(_) => panic!("Expected Transit leg"),
        }
    }

    #[test]
    fn walk_result_has_names_and_times() {
        let store = make_test_store();
        let journey = plan(&store, "BRS");
        let result = JourneyResult::from_journey(&journey, &store);

        assert_eq!(result.walking_secs, 300);
        let LegResult::Walk(walk) = &result.legs[1] else {
            panic!("Expected Walk leg");
        };
        assert_eq!(walk.from.name, "Bristol Temple Meads");
        assert_eq!(walk.to.name, "Bristol bus station");
        assert_eq!(walk.from.time, "11:30:00");
        assert_eq!(walk.to.time, "11:35:00");
        assert_eq!(walk.duration_secs, 300);
    }

    #[test]
    fn legs_serialize_with_type_tag() {
        let store = make_test_store();
        let journey = plan(&store, "BRS");
        let json = serde_json::to_value(JourneyResult::from_journey(&journey, &store)).unwrap();

        assert_eq!(json["legs"][0]["type"], "transit");
        assert_eq!(json["legs"][1]["type"], "walk");
        assert_eq!(json["changes"], 0);
    }

    #[test]
    fn stop_info_carries_parent_station() {
        let store = make_test_store();
        let platform = store.stop_by_id("PAD-1").unwrap();

        let info = StopInfo::new(platform, &"10:00:00", &store);
        assert_eq!(info.name, "London Paddington platform 1");
        assert_eq!(
            info.parent,
            Some(StopRef {
                stop_id: "PAD".to_string(),
                name: "London Paddington".to_string(),
            })
        );

        let journey = plan(&store, "BRI");
        let result = JourneyResult::from_journey(&journey, &store);
        let LegResult::Transit(ride) = &result.legs[0] else {
            panic!("Expected Transit leg");
        };
        assert_eq!(ride.from.parent, None);
    }

    #[test]
    fn stop_result_lists_children() {
        let store = make_test_store();

        let station = StopResult::resolve(store.stop_by_id("PAD").unwrap(), &store).unwrap();
        assert_eq!(station.parent, None);
        assert_eq!(station.children.len(), 1);
        assert_eq!(station.children[0].stop_id, "PAD-1");

        let platform = StopResult::resolve(store.stop_by_id("PAD-1").unwrap(), &store).unwrap();
        assert_eq!(platform.parent.map(|p| p.stop_id).as_deref(), Some("PAD"));
        assert!(platform.children.is_empty());

        assert!(StopResult::resolve(StopIdx(99), &store).is_none());
    }

    #[test]
    fn status_from_store() {
        let store = make_test_store();
        let status = StatusResponse::from_store(&store);

        assert_eq!(status.generation, 7);
        assert_eq!(status.stops, 6);
        assert_eq!(status.patterns, 1);
        assert_eq!(status.trips, 1);
        assert_eq!(status.footpaths, 1);
    }
}
