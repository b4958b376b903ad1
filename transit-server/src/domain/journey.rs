//! Journey types.
//!
//! A `Journey` is a complete itinerary from origin to destination made of
//! ordered rides and walks. Journeys are compared on three criteria:
//! arrival time, number of transfers and total walking time.

use std::cmp::Ordering;

use super::{DomainError, Leg, ScheduleTime, StopIdx};

/// The criteria a journey is ranked and filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Criteria {
    /// Arrival time at the destination
    pub arrival: ScheduleTime,
    /// Number of vehicle changes
    pub transfers: usize,
    /// Total seconds spent walking
    pub walking_secs: u32,
}

impl Criteria {
    /// Returns true if `self` is at least as good on every criterion and
    /// strictly better on at least one.
    pub fn dominates(&self, other: &Criteria) -> bool {
        self.arrival <= other.arrival
            && self.transfers <= other.transfers
            && self.walking_secs <= other.walking_secs
            && (self.arrival < other.arrival
                || self.transfers < other.transfers
                || self.walking_secs < other.walking_secs)
    }
}

impl Ord for Criteria {
    fn cmp(&self, other: &Self) -> Ordering {
        self.arrival
            .cmp(&other.arrival)
            .then(self.transfers.cmp(&other.transfers))
            .then(self.walking_secs.cmp(&other.walking_secs))
    }
}

impl PartialOrd for Criteria {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Identity of one leg, used as the final tie-break between journeys.
pub type LegKey = (u8, u32, u32, u32, u32);

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - The first leg starts at `origin`, the last ends at `destination`
/// - Consecutive legs connect (one's end stop is the next one's start stop)
/// - Each leg departs no earlier than the previous one arrives
/// - A journey with no legs has `origin == destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    origin: StopIdx,
    destination: StopIdx,
    departure: ScheduleTime,
    arrival: ScheduleTime,
    legs: Vec<Leg>,
}

impl Journey {
    /// A journey that goes nowhere: origin and destination coincide.
    pub fn trivial(stop: StopIdx, at: ScheduleTime) -> Self {
        Journey {
            origin: stop,
            destination: stop,
            departure: at,
            arrival: at,
            legs: Vec::new(),
        }
    }

    /// Constructs a journey from ordered legs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if legs are empty while `origin != destination`, if the
    /// legs do not start and end at the given stops, if consecutive legs do
    /// not meet, or if a leg departs before its predecessor arrives.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::{Journey, Leg, ScheduleTime, StopIdx, Walk};
    ///
    /// let at = ScheduleTime::parse("08:00").unwrap();
    /// let walk = Walk::new(StopIdx(0), StopIdx(1), at, 300);
    /// let journey = Journey::new(StopIdx(0), StopIdx(1), vec![Leg::Walk(walk)]).unwrap();
    ///
    /// assert_eq!(journey.transfer_count(), 0);
    /// assert_eq!(journey.walking_secs(), 300);
    /// assert_eq!(journey.arrival().to_string(), "08:05:00");
    /// ```
    pub fn new(origin: StopIdx, destination: StopIdx, legs: Vec<Leg>) -> Result<Self, DomainError> {
        let (first, last) = match (legs.first(), legs.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DomainError::EndpointMismatch),
        };

        if first.from() != origin || last.to() != destination {
            return Err(DomainError::EndpointMismatch);
        }

        for window in legs.windows(2) {
            let (prev, next) = (&window[0], &window[1]);
            if prev.to() != next.from() {
                return Err(DomainError::LegsNotConnected(prev.to(), next.from()));
            }
            if next.departure() < prev.arrival() {
                return Err(DomainError::DepartsBeforeArrival {
                    arrival: prev.arrival(),
                    departure: next.departure(),
                });
            }
        }

        let departure = first.departure();
        let arrival = last.arrival();

        Ok(Journey {
            origin,
            destination,
            departure,
            arrival,
            legs,
        })
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Returns the origin stop.
    pub fn origin(&self) -> StopIdx {
        self.origin
    }

    /// Returns the destination stop.
    pub fn destination(&self) -> StopIdx {
        self.destination
    }

    /// Returns when the first leg starts.
    pub fn departure(&self) -> ScheduleTime {
        self.departure
    }

    /// Returns when the last leg ends.
    pub fn arrival(&self) -> ScheduleTime {
        self.arrival
    }

    /// Returns the number of rides.
    pub fn ride_count(&self) -> usize {
        self.legs.iter().filter(|l| l.is_transit()).count()
    }

    /// Returns the number of transfers (rides - 1, or 0 for direct or walk-only).
    pub fn transfer_count(&self) -> usize {
        self.ride_count().saturating_sub(1)
    }

    /// Returns the total walking time in seconds.
    pub fn walking_secs(&self) -> u32 {
        self.legs
            .iter()
            .filter_map(Leg::as_walk)
            .map(|w| w.duration_secs)
            .sum()
    }

    /// Returns the total journey duration in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.arrival.secs_since(self.departure)
    }

    /// Returns the ranking criteria.
    pub fn criteria(&self) -> Criteria {
        Criteria {
            arrival: self.arrival,
            transfers: self.transfer_count(),
            walking_secs: self.walking_secs(),
        }
    }

    /// Returns the leg identities, for deterministic tie-breaking.
    pub fn stable_key(&self) -> Vec<LegKey> {
        self.legs
            .iter()
            .map(|leg| match leg {
                Leg::Transit(ride) => (
                    0,
                    ride.pattern().0,
                    ride.trip().0,
                    ride.board().0 as u32,
                    ride.alight().0 as u32,
                ),
                Leg::Walk(walk) => (1, walk.from.0, walk.to.0, walk.duration_secs, 0),
            })
            .collect()
    }

    /// Returns true if this journey has no legs.
    pub fn is_trivial(&self) -> bool {
        self.legs.is_empty()
    }
}
