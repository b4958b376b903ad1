//! Journey legs.
//!
//! A leg is either a ride on one trip of a pattern or a walk along a
//! footpath. Legs carry identifiers only; names, colours and headsigns are
//! resolved by the display layer.

use super::{DomainError, PatternIdx, PatternPos, ScheduleTime, StopIdx, TripIdx};

/// A ride on one trip from a boarding position to an alighting position.
///
/// # Invariants
///
/// - `alight > board` (must travel forward along the pattern)
/// - `arrival >= departure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitLeg {
    pattern: PatternIdx,
    trip_index: usize,
    trip: TripIdx,
    board: PatternPos,
    alight: PatternPos,
    from: StopIdx,
    to: StopIdx,
    departure: ScheduleTime,
    arrival: ScheduleTime,
}

/// Raw parts of a transit leg, checked by [`TransitLeg::new`].
#[derive(Debug, Clone, Copy)]
pub struct TransitLegParts {
    pub pattern: PatternIdx,
    pub trip_index: usize,
    pub trip: TripIdx,
    pub board: PatternPos,
    pub alight: PatternPos,
    pub from: StopIdx,
    pub to: StopIdx,
    pub departure: ScheduleTime,
    pub arrival: ScheduleTime,
}

impl TransitLeg {
    /// Construct a leg, validating index order and times.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `alight <= board` or the trip arrives before it departs.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::{
    ///     PatternIdx, PatternPos, ScheduleTime, StopIdx, TransitLeg, TransitLegParts, TripIdx,
    /// };
    ///
    /// let parts = TransitLegParts {
    ///     pattern: PatternIdx(0),
    ///     trip_index: 0,
    ///     trip: TripIdx(4),
    ///     board: PatternPos(0),
    ///     alight: PatternPos(2),
    ///     from: StopIdx(1),
    ///     to: StopIdx(3),
    ///     departure: ScheduleTime::parse("08:00").unwrap(),
    ///     arrival: ScheduleTime::parse("08:20").unwrap(),
    /// };
    ///
    /// let leg = TransitLeg::new(parts).unwrap();
    /// assert_eq!(leg.duration_secs(), 20 * 60);
    ///
    /// let backwards = TransitLegParts { alight: PatternPos(0), ..parts };
    /// assert!(TransitLeg::new(backwards).is_err());
    /// ```
    pub fn new(parts: TransitLegParts) -> Result<Self, DomainError> {
        if parts.alight <= parts.board {
            return Err(DomainError::InvalidLeg(
                "alight index must be after board index",
            ));
        }
        if parts.arrival < parts.departure {
            return Err(DomainError::InvalidLeg("arrival before departure"));
        }

        Ok(TransitLeg {
            pattern: parts.pattern,
            trip_index: parts.trip_index,
            trip: parts.trip,
            board: parts.board,
            alight: parts.alight,
            from: parts.from,
            to: parts.to,
            departure: parts.departure,
            arrival: parts.arrival,
        })
    }

    /// Returns the pattern ridden.
    pub fn pattern(&self) -> PatternIdx {
        self.pattern
    }

    /// Returns the trip's row within its pattern.
    pub fn trip_index(&self) -> usize {
        self.trip_index
    }

    /// Returns the store-wide trip id.
    pub fn trip(&self) -> TripIdx {
        self.trip
    }

    /// Returns the boarding position in the pattern.
    pub fn board(&self) -> PatternPos {
        self.board
    }

    /// Returns the alighting position in the pattern.
    pub fn alight(&self) -> PatternPos {
        self.alight
    }

    /// Returns the boarding stop.
    pub fn from(&self) -> StopIdx {
        self.from
    }

    /// Returns the alighting stop.
    pub fn to(&self) -> StopIdx {
        self.to
    }

    /// Returns the departure time at the boarding stop.
    pub fn departure(&self) -> ScheduleTime {
        self.departure
    }

    /// Returns the arrival time at the alighting stop.
    pub fn arrival(&self) -> ScheduleTime {
        self.arrival
    }

    /// Returns the time spent on board.
    pub fn duration_secs(&self) -> u32 {
        self.arrival.secs_since(self.departure)
    }

    /// Returns the number of intermediate stops (excluding board and alight).
    pub fn intermediate_stop_count(&self) -> usize {
        self.alight.0 - self.board.0 - 1
    }
}

/// A walk along a footpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// Stop walked from
    pub from: StopIdx,
    /// Stop walked to
    pub to: StopIdx,
    /// When the walk starts
    pub departure: ScheduleTime,
    /// Walking time in seconds
    pub duration_secs: u32,
}

impl Walk {
    /// Creates a new walk.
    pub fn new(from: StopIdx, to: StopIdx, departure: ScheduleTime, duration_secs: u32) -> Self {
        Self {
            from,
            to,
            departure,
            duration_secs,
        }
    }

    /// Returns when the walk ends.
    pub fn arrival(&self) -> ScheduleTime {
        self.departure + self.duration_secs
    }
}

/// One leg of a journey: a ride or a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leg {
    /// A ride on a scheduled trip
    Transit(TransitLeg),
    /// A walk between stops
    Walk(Walk),
}

impl Leg {
    /// Returns the stop this leg starts at.
    pub fn from(&self) -> StopIdx {
        match self {
            Leg::Transit(leg) => leg.from(),
            Leg::Walk(walk) => walk.from,
        }
    }

    /// Returns the stop this leg ends at.
    pub fn to(&self) -> StopIdx {
        match self {
            Leg::Transit(leg) => leg.to(),
            Leg::Walk(walk) => walk.to,
        }
    }

    /// Returns when this leg starts.
    pub fn departure(&self) -> ScheduleTime {
        match self {
            Leg::Transit(leg) => leg.departure(),
            Leg::Walk(walk) => walk.departure,
        }
    }

    /// Returns when this leg ends.
    pub fn arrival(&self) -> ScheduleTime {
        match self {
            Leg::Transit(leg) => leg.arrival(),
            Leg::Walk(walk) => walk.arrival(),
        }
    }

    /// Returns true if this is a ride.
    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit(_))
    }

    /// Returns the ride if this is a transit leg.
    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            Leg::Transit(leg) => Some(leg),
            Leg::Walk(_) => None,
        }
    }

    /// Returns the walk if this is a walking leg.
    pub fn as_walk(&self) -> Option<&Walk> {
        match self {
            Leg::Transit(_) => None,
            Leg::Walk(walk) => Some(walk),
        }
    }
}
