//! Integer surrogate identifiers.
//!
//! Every stop, pattern, route, service and trip gets a dense integer id at
//! build time. The ids double as array indices into the schedule store;
//! the original string identifiers live only in the store's side table.

use std::fmt;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the id as an array index.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Builds an id from an array index.
            ///
            /// Stores never hold more than `u32::MAX` entries of one kind;
            /// the builder checks this before assigning ids.
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

surrogate_id!(
    /// Surrogate id of a stop.
    StopIdx,
    "S"
);

surrogate_id!(
    /// Surrogate id of a pattern (trips of one route sharing a stop sequence).
    PatternIdx,
    "P"
);

surrogate_id!(
    /// Surrogate id of a route.
    RouteIdx,
    "R"
);

surrogate_id!(
    /// Surrogate id of a service calendar entry.
    ServiceIdx,
    "C"
);

surrogate_id!(
    /// Surrogate id of a trip, unique across the whole store.
    TripIdx,
    "T"
);

/// Position of a stop within a pattern's stop sequence.
///
/// A pattern may visit the same stop twice (loop lines), so legs refer to
/// positions rather than stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternPos(pub usize);

impl PatternPos {
    /// Returns the following position.
    pub fn next(self) -> Self {
        PatternPos(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        let stop = StopIdx::from_index(42);
        assert_eq!(stop.index(), 42);
        assert_eq!(stop, StopIdx(42));
    }

    #[test]
    fn display_uses_prefix() {
        assert_eq!(StopIdx(3).to_string(), "S3");
        assert_eq!(PatternIdx(7).to_string(), "P7");
        assert_eq!(format!("{:?}", TripIdx(1)), "T1");
    }

    #[test]
    fn pattern_pos_next() {
        assert_eq!(PatternPos(0).next(), PatternPos(1));
    }
}
