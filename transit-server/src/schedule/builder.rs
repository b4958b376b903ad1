//! Construction of a `ScheduleStore` from a feed.
//!
//! Runs once per load, never on the request path. Every reference in the
//! feed is resolved to a surrogate id here; a feed that fails validation
//! produces a `BuildError` and no store.

use std::collections::btree_map::Entry as BTreeEntry;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use moka::sync::Cache;
use tracing::info;

use crate::domain::{
    PatternIdx, PatternPos, RouteIdx, ScheduleTime, ServiceIdx, Stop, StopIdx, TripIdx,
};

use super::calendar::{CalendarResolver, ServiceCalendar, WeekdayMask};
use super::feed::{ExceptionKind, FeedTrip, ScheduleFeed};
use super::pattern::{Pattern, PatternTrip, TripMeta};
use super::store::{
    ACTIVE_SERVICES_CACHE_CAPACITY, Adjacency, Footpath, PatternVisit, RouteInfo, ScheduleStore,
    SideTable,
};
use super::BuildError;

fn check_capacity(len: usize, kind: &'static str) -> Result<(), BuildError> {
    u32::try_from(len)
        .map(|_| ())
        .map_err(|_| BuildError::TooLarge { kind })
}

impl ScheduleStore {
    /// Build a store from a feed, tagging it with `generation`.
    ///
    /// # Errors
    ///
    /// Returns a `BuildError` describing the first problem found.
    pub fn build(feed: &ScheduleFeed, generation: u64) -> Result<Self, BuildError> {
        let (stops, stop_lookup) = build_stops(feed)?;
        let (calendar, service_ids, service_lookup) = build_calendar(feed)?;
        let (mut routes, mut route_lookup) = build_routes(feed);

        check_capacity(feed.trips.len(), "trips")?;
        let mut side = SideTable {
            service_ids,
            ..Default::default()
        };
        let mut seen_trips: HashMap<&str, TripIdx> = HashMap::new();
        let mut groups: HashMap<(RouteIdx, Vec<StopIdx>), usize> = HashMap::new();
        let mut grouped: Vec<(RouteIdx, Vec<StopIdx>, Vec<PatternTrip>)> = Vec::new();

        for (i, trip) in feed.trips.iter().enumerate() {
            let trip_idx = TripIdx::from_index(i);
            if seen_trips.insert(trip.trip_id.as_str(), trip_idx).is_some() {
                return Err(BuildError::DuplicateTrip {
                    trip_id: trip.trip_id.clone(),
                });
            }

            let service = *service_lookup.get(trip.service_id.as_str()).ok_or_else(|| {
                BuildError::UnknownService {
                    trip_id: trip.trip_id.clone(),
                    service_id: trip.service_id.clone(),
                }
            })?;

            let route = match route_lookup.entry(trip.route_id.clone()) {
                Entry::Occupied(e) => *e.get(),
                Entry::Vacant(e) => {
                    let idx = RouteIdx::from_index(routes.len());
                    routes.push(RouteInfo {
                        route_id: trip.route_id.clone(),
                        ..Default::default()
                    });
                    *e.insert(idx)
                }
            };

            let (sequence, pattern_trip) = resolve_trip(
                trip,
                &stop_lookup,
                TripMeta {
                    trip: trip_idx,
                    service,
                },
            )?;

            side.trip_ids.push(trip.trip_id.clone());
            side.trip_headsigns.push(trip.headsign.clone());
            side.trip_routes.push(route);

            match groups.entry((route, sequence)) {
                Entry::Occupied(e) => grouped[*e.get()].2.push(pattern_trip),
                Entry::Vacant(e) => {
                    let (route, sequence) = e.key().clone();
                    e.insert(grouped.len());
                    grouped.push((route, sequence, vec![pattern_trip]));
                }
            }
        }
        side.routes = routes;
        check_capacity(side.routes.len(), "routes")?;

        let patterns: Vec<Pattern> = grouped
            .into_iter()
            .map(|(route, sequence, trips)| Pattern::from_trips(route, sequence, trips))
            .collect();

        let mut visits = Vec::new();
        for (p, pattern) in patterns.iter().enumerate() {
            for (pos, stop) in pattern.stops().iter().enumerate() {
                visits.push((
                    stop.index(),
                    PatternVisit {
                        pattern: PatternIdx::from_index(p),
                        position: PatternPos(pos),
                    },
                ));
            }
        }
        let pattern_index = Adjacency::from_pairs(stops.len(), visits);

        let footpaths = build_footpaths(feed, &stop_lookup, stops.len())?;

        let children = Adjacency::from_pairs(
            stops.len(),
            stops
                .iter()
                .filter_map(|s| s.parent.map(|p| (p.index(), s.idx)))
                .collect(),
        );

        let store = ScheduleStore {
            generation,
            built_at: Utc::now(),
            stops,
            stop_lookup,
            children,
            patterns,
            pattern_index,
            footpaths,
            calendar,
            active_cache: Cache::new(ACTIVE_SERVICES_CACHE_CAPACITY),
            side,
        };

        let stats = store.stats();
        info!(
            generation,
            stops = stats.stops,
            patterns = stats.patterns,
            fifo_patterns = stats.fifo_patterns,
            trips = stats.trips,
            footpaths = stats.footpaths,
            services = stats.services,
            "Built schedule store"
        );

        Ok(store)
    }
}

fn build_stops(feed: &ScheduleFeed) -> Result<(Vec<Stop>, HashMap<String, StopIdx>), BuildError> {
    check_capacity(feed.stops.len(), "stops")?;

    let mut lookup = HashMap::with_capacity(feed.stops.len());
    for (i, stop) in feed.stops.iter().enumerate() {
        if lookup
            .insert(stop.stop_id.clone(), StopIdx::from_index(i))
            .is_some()
        {
            return Err(BuildError::DuplicateStop {
                stop_id: stop.stop_id.clone(),
            });
        }
    }

    let stops = feed
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            let parent = match &stop.parent_station {
                None => None,
                Some(parent_id) => Some(*lookup.get(parent_id).ok_or_else(|| {
                    BuildError::UnknownParentStation {
                        stop_id: stop.stop_id.clone(),
                        parent_id: parent_id.clone(),
                    }
                })?),
            };
            Ok(Stop {
                idx: StopIdx::from_index(i),
                code: stop.stop_id.clone(),
                name: stop.name.clone(),
                lat: stop.lat,
                lon: stop.lon,
                parent,
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok((stops, lookup))
}

type CalendarParts<'a> = (CalendarResolver, Vec<String>, HashMap<&'a str, ServiceIdx>);

/// Services are numbered in order of first appearance, calendars first.
/// A service that only appears in exceptions runs on its added dates only.
fn build_calendar(feed: &ScheduleFeed) -> Result<CalendarParts<'_>, BuildError> {
    let mut lookup: HashMap<&str, ServiceIdx> = HashMap::new();
    let mut ids: Vec<String> = Vec::new();
    let mut calendars: Vec<ServiceCalendar> = Vec::new();

    for cal in &feed.calendars {
        if cal.end_date < cal.start_date {
            return Err(BuildError::InvalidCalendarRange {
                service_id: cal.service_id.clone(),
            });
        }
        let idx = *lookup.entry(cal.service_id.as_str()).or_insert_with(|| {
            ids.push(cal.service_id.clone());
            calendars.push(ServiceCalendar::default());
            ServiceIdx::from_index(calendars.len() - 1)
        });
        let entry = &mut calendars[idx.index()];
        entry.weekdays = WeekdayMask::from_days([
            cal.monday,
            cal.tuesday,
            cal.wednesday,
            cal.thursday,
            cal.friday,
            cal.saturday,
            cal.sunday,
        ]);
        entry.range = Some((cal.start_date, cal.end_date));
    }

    for exception in &feed.exceptions {
        let idx = *lookup
            .entry(exception.service_id.as_str())
            .or_insert_with(|| {
                ids.push(exception.service_id.clone());
                calendars.push(ServiceCalendar::default());
                ServiceIdx::from_index(calendars.len() - 1)
            });
        let entry = &mut calendars[idx.index()];
        match exception.kind {
            ExceptionKind::Added => entry.added.insert(exception.date),
            ExceptionKind::Removed => entry.removed.insert(exception.date),
        };
    }

    check_capacity(calendars.len(), "services")?;
    Ok((CalendarResolver::new(calendars), ids, lookup))
}

fn build_routes(feed: &ScheduleFeed) -> (Vec<RouteInfo>, HashMap<String, RouteIdx>) {
    let mut routes = Vec::with_capacity(feed.routes.len());
    let mut lookup = HashMap::with_capacity(feed.routes.len());
    for route in &feed.routes {
        if let Entry::Vacant(e) = lookup.entry(route.route_id.clone()) {
            e.insert(RouteIdx::from_index(routes.len()));
            routes.push(RouteInfo {
                route_id: route.route_id.clone(),
                short_name: route.short_name.clone(),
                long_name: route.long_name.clone(),
                color: route.color.clone(),
            });
        }
    }
    (routes, lookup)
}

/// Validate one trip's stop times and resolve its stops.
fn resolve_trip(
    trip: &FeedTrip,
    stop_lookup: &HashMap<String, StopIdx>,
    meta: TripMeta,
) -> Result<(Vec<StopIdx>, PatternTrip), BuildError> {
    if trip.stop_times.is_empty() {
        return Err(BuildError::EmptyTrip {
            trip_id: trip.trip_id.clone(),
        });
    }

    let mut sequence = Vec::with_capacity(trip.stop_times.len());
    let mut arrivals = Vec::with_capacity(trip.stop_times.len());
    let mut departures = Vec::with_capacity(trip.stop_times.len());
    let mut previous: Option<ScheduleTime> = None;

    for (position, row) in trip.stop_times.iter().enumerate() {
        let stop = *stop_lookup
            .get(&row.stop_id)
            .ok_or_else(|| BuildError::UnknownStop {
                trip_id: trip.trip_id.clone(),
                stop_id: row.stop_id.clone(),
            })?;

        if row.arrival > row.departure {
            return Err(BuildError::ArrivalAfterDeparture {
                trip_id: trip.trip_id.clone(),
                position,
            });
        }
        if previous.is_some_and(|prev| row.arrival < prev) {
            return Err(BuildError::NonMonotonicStopTimes {
                trip_id: trip.trip_id.clone(),
                position,
            });
        }
        previous = Some(row.departure);

        sequence.push(stop);
        arrivals.push(row.arrival);
        departures.push(row.departure);
    }

    Ok((
        sequence,
        PatternTrip {
            meta,
            arrivals,
            departures,
        },
    ))
}

/// Resolve footpaths, dropping self-loops and keeping the shortest of
/// duplicate entries. Output is ordered by (from, to).
fn build_footpaths(
    feed: &ScheduleFeed,
    stop_lookup: &HashMap<String, StopIdx>,
    stop_count: usize,
) -> Result<Adjacency<Footpath>, BuildError> {
    let resolve = |id: &String| {
        stop_lookup
            .get(id)
            .copied()
            .ok_or_else(|| BuildError::UnknownFootpathStop {
                stop_id: id.clone(),
            })
    };

    let mut shortest: BTreeMap<(StopIdx, StopIdx), u32> = BTreeMap::new();
    for path in &feed.footpaths {
        let from = resolve(&path.from_stop)?;
        let to = resolve(&path.to_stop)?;
        if from == to {
            continue;
        }
        match shortest.entry((from, to)) {
            BTreeEntry::Vacant(e) => {
                e.insert(path.walk_seconds);
            }
            BTreeEntry::Occupied(mut e) => {
                if path.walk_seconds < *e.get() {
                    e.insert(path.walk_seconds);
                }
            }
        }
    }

    Ok(Adjacency::from_pairs(
        stop_count,
        shortest
            .into_iter()
            .map(|((from, to), walk_secs)| (from.index(), Footpath { to, walk_secs }))
            .collect(),
    ))
}
