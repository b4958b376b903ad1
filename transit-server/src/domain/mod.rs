//! Domain types for the transit journey planner.
//!
//! This module contains the core value types shared by the schedule store
//! and the search engine. Types that carry invariants enforce them at
//! construction time, so code that receives them can trust their validity.

mod error;
mod ids;
mod journey;
mod leg;
mod stop;
mod time;

pub use error::DomainError;
pub use ids::{PatternIdx, PatternPos, RouteIdx, ServiceIdx, StopIdx, TripIdx};
pub use journey::{Criteria, Journey, LegKey};
pub use leg::{Leg, TransitLeg, TransitLegParts, Walk};
pub use stop::Stop;
pub use time::{ScheduleTime, TimeError};
