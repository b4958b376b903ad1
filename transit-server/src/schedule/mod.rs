//! In-memory schedule store.
//!
//! A feed is validated and compiled once into an immutable
//! [`ScheduleStore`]: stops, trip patterns with time matrices, directed
//! footpaths and service calendars, all addressed by integer ids. The
//! [`ScheduleHandle`] serves the current generation and swaps in new ones.

mod builder;
mod calendar;
mod error;
mod feed;
mod generation;
mod pattern;
mod store;

pub use calendar::{ActiveServices, CalendarResolver, ServiceCalendar, WeekdayMask};
pub use error::{BuildError, FeedError, ReloadError};
pub use feed::{
    ExceptionKind, FeedCalendar, FeedCalendarException, FeedFootpath, FeedRoute, FeedStop,
    FeedTrip, ScheduleFeed, ScheduleFeedBuilder, StopTimeRow,
};
pub use generation::ScheduleHandle;
pub use pattern::{Pattern, TripMeta};
pub use store::{Footpath, PatternVisit, RouteInfo, ScheduleStore, StoreStats};
