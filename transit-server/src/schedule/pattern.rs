//! Trip patterns: trips of one route sharing an identical stop sequence.
//!
//! Times are stored as flat trip-major matrices with one row per trip and
//! one column per position in the stop sequence. Trips are ordered by
//! departure at the first stop, ties broken by trip id.

use crate::domain::{PatternPos, RouteIdx, ScheduleTime, ServiceIdx, StopIdx, TripIdx};

/// Identity of one trip row within a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripMeta {
    pub trip: TripIdx,
    pub service: ServiceIdx,
}

/// Stop times of one trip, used while assembling a pattern.
#[derive(Debug, Clone)]
pub(crate) struct PatternTrip {
    pub meta: TripMeta,
    pub arrivals: Vec<ScheduleTime>,
    pub departures: Vec<ScheduleTime>,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    route: RouteIdx,
    stops: Vec<StopIdx>,
    trips: Vec<TripMeta>,
    departures: Vec<ScheduleTime>,
    /// `None` when every arrival equals its departure.
    arrivals: Option<Vec<ScheduleTime>>,
    fifo: bool,
}

impl Pattern {
    /// Assemble a pattern from its trips.
    ///
    /// Every trip must have exactly `stops.len()` arrivals and departures;
    /// the builder guarantees this before calling.
    pub(crate) fn from_trips(route: RouteIdx, stops: Vec<StopIdx>, mut trips: Vec<PatternTrip>) -> Self {
        trips.sort_by(|a, b| {
            a.departures[0]
                .cmp(&b.departures[0])
                .then(a.meta.trip.cmp(&b.meta.trip))
        });

        let width = stops.len();
        let mut departures = Vec::with_capacity(width * trips.len());
        let mut arrivals = Vec::with_capacity(width * trips.len());
        for trip in &trips {
            departures.extend_from_slice(&trip.departures);
            arrivals.extend_from_slice(&trip.arrivals);
        }

        let arrivals = if arrivals == departures {
            None
        } else {
            Some(arrivals)
        };

        let mut pattern = Pattern {
            route,
            stops,
            trips: trips.iter().map(|t| t.meta).collect(),
            departures,
            arrivals,
            fifo: false,
        };
        pattern.fifo = pattern.check_fifo();
        pattern
    }

    /// True when no trip overtakes its predecessor at any position.
    fn check_fifo(&self) -> bool {
        (1..self.trips.len()).all(|t| {
            (0..self.stops.len()).all(|p| {
                let pos = PatternPos(p);
                self.departure(t - 1, pos) <= self.departure(t, pos)
                    && self.arrival(t - 1, pos) <= self.arrival(t, pos)
            })
        })
    }

    pub fn route(&self) -> RouteIdx {
        self.route
    }

    /// The ordered stop sequence.
    pub fn stops(&self) -> &[StopIdx] {
        &self.stops
    }

    pub fn stop_at(&self, pos: PatternPos) -> Option<StopIdx> {
        self.stops.get(pos.0).copied()
    }

    /// Number of positions in the stop sequence.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn trips(&self) -> &[TripMeta] {
        &self.trips
    }

    pub fn trip(&self, trip_index: usize) -> Option<&TripMeta> {
        self.trips.get(trip_index)
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    /// Whether trips keep their order at every position.
    pub fn is_fifo(&self) -> bool {
        self.fifo
    }

    /// Whether the arrival matrix shares storage with the departure matrix.
    pub fn arrivals_aliased(&self) -> bool {
        self.arrivals.is_none()
    }

    /// Departure of row `trip_index` at `pos`. Both must be in range.
    pub fn departure(&self, trip_index: usize, pos: PatternPos) -> ScheduleTime {
        self.departures[trip_index * self.stops.len() + pos.0]
    }

    /// Arrival of row `trip_index` at `pos`. Both must be in range.
    pub fn arrival(&self, trip_index: usize, pos: PatternPos) -> ScheduleTime {
        let matrix = self.arrivals.as_ref().unwrap_or(&self.departures);
        matrix[trip_index * self.stops.len() + pos.0]
    }

    /// Departure at `board` and arrival at `alight` of one trip, if the
    /// indices are in range.
    pub fn leg_times(
        &self,
        trip_index: usize,
        board: PatternPos,
        alight: PatternPos,
    ) -> Option<(ScheduleTime, ScheduleTime)> {
        if trip_index >= self.trips.len() || board.0 >= self.len() || alight.0 >= self.len() {
            return None;
        }
        Some((
            self.departure(trip_index, board),
            self.arrival(trip_index, alight),
        ))
    }

    /// First row departing `pos` at or after `at`.
    ///
    /// Only meaningful on FIFO patterns, where every column is sorted.
    pub fn first_departing_at_or_after(&self, pos: PatternPos, at: ScheduleTime) -> usize {
        let (mut lo, mut hi) = (0, self.trips.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.departure(mid, pos) < at {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ScheduleTime {
        ScheduleTime::parse(s).unwrap()
    }

    fn trip(id: u32, times: &[(&str, &str)]) -> PatternTrip {
        PatternTrip {
            meta: TripMeta {
                trip: TripIdx(id),
                service: ServiceIdx(0),
            },
            arrivals: times.iter().map(|(a, _)| t(a)).collect(),
            departures: times.iter().map(|(_, d)| t(d)).collect(),
        }
    }

    fn stops(n: u32) -> Vec<StopIdx> {
        (0..n).map(StopIdx).collect()
    }

    #[test]
    fn trips_sorted_by_first_departure() {
        let pattern = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![
                trip(0, &[("09:00", "09:00"), ("09:20", "09:20")]),
                trip(1, &[("08:00", "08:00"), ("08:20", "08:20")]),
            ],
        );

        assert_eq!(pattern.trip(0).unwrap().trip, TripIdx(1));
        assert_eq!(pattern.departure(0, PatternPos(0)), t("08:00"));
        assert_eq!(pattern.arrival(1, PatternPos(1)), t("09:20"));
    }

    #[test]
    fn equal_first_departures_tie_break_on_trip_id() {
        let pattern = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![
                trip(7, &[("08:00", "08:00"), ("08:30", "08:30")]),
                trip(3, &[("08:00", "08:00"), ("08:20", "08:20")]),
            ],
        );
        assert_eq!(pattern.trip(0).unwrap().trip, TripIdx(3));
    }

    #[test]
    fn arrivals_alias_departures_when_identical() {
        let metro = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![trip(0, &[("08:00", "08:00"), ("08:05", "08:05")])],
        );
        assert!(metro.arrivals_aliased());
        assert_eq!(metro.arrival(0, PatternPos(1)), t("08:05"));

        let dwelling = Pattern::from_trips(
            RouteIdx(0),
            stops(3),
            vec![trip(
                0,
                &[("08:00", "08:00"), ("08:05", "08:07"), ("08:15", "08:15")],
            )],
        );
        assert!(!dwelling.arrivals_aliased());
        assert_eq!(dwelling.arrival(0, PatternPos(1)), t("08:05"));
        assert_eq!(dwelling.departure(0, PatternPos(1)), t("08:07"));
    }

    #[test]
    fn detects_overtaking() {
        let pattern = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![
                trip(0, &[("07:50", "07:50"), ("08:30", "08:30")]),
                trip(1, &[("08:00", "08:00"), ("08:20", "08:20")]),
            ],
        );
        assert!(!pattern.is_fifo());

        let ordered = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![
                trip(0, &[("07:50", "07:50"), ("08:10", "08:10")]),
                trip(1, &[("08:00", "08:00"), ("08:20", "08:20")]),
            ],
        );
        assert!(ordered.is_fifo());
    }

    #[test]
    fn first_departing_search() {
        let pattern = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![
                trip(0, &[("08:00", "08:00"), ("08:10", "08:10")]),
                trip(1, &[("08:30", "08:30"), ("08:40", "08:40")]),
                trip(2, &[("09:00", "09:00"), ("09:10", "09:10")]),
            ],
        );

        assert_eq!(pattern.first_departing_at_or_after(PatternPos(0), t("07:00")), 0);
        assert_eq!(pattern.first_departing_at_or_after(PatternPos(0), t("08:30")), 1);
        assert_eq!(pattern.first_departing_at_or_after(PatternPos(1), t("08:41")), 2);
        assert_eq!(pattern.first_departing_at_or_after(PatternPos(1), t("10:00")), 3);
    }

    #[test]
    fn leg_times_bounds() {
        let pattern = Pattern::from_trips(
            RouteIdx(0),
            stops(2),
            vec![trip(0, &[("08:00", "08:00"), ("08:10", "08:10")])],
        );
        assert_eq!(
            pattern.leg_times(0, PatternPos(0), PatternPos(1)),
            Some((t("08:00"), t("08:10")))
        );
        assert_eq!(pattern.leg_times(1, PatternPos(0), PatternPos(1)), None);
        assert_eq!(pattern.leg_times(0, PatternPos(0), PatternPos(2)), None);
    }
}
