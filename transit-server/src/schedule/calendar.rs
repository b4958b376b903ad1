//! Service calendars: which services run on a given date.
//!
//! A service runs on a date when its weekday rule covers the date and the
//! date is within its validity range, or when an exception adds the date.
//! A removal exception always wins.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::ServiceIdx;

/// Compact representation of which weekdays a service runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeekdayMask(u8);

impl WeekdayMask {
    /// A mask with no days set.
    pub const NONE: WeekdayMask = WeekdayMask(0);

    /// Build a mask from Monday-first flags.
    pub fn from_days(days: [bool; 7]) -> Self {
        let bits = days
            .iter()
            .enumerate()
            .filter(|(_, on)| **on)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        WeekdayMask(bits)
    }

    pub fn set(&mut self, weekday: Weekday) {
        self.0 |= 1 << weekday.num_days_from_monday();
    }

    pub fn contains(self, weekday: Weekday) -> bool {
        self.0 & (1 << weekday.num_days_from_monday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Weekday rule, validity range and exceptions of one service.
#[derive(Clone, Debug, Default)]
pub struct ServiceCalendar {
    pub weekdays: WeekdayMask,
    /// Inclusive validity range of the weekday rule. `None` for services
    /// defined only through exceptions.
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub added: HashSet<NaiveDate>,
    pub removed: HashSet<NaiveDate>,
}

impl ServiceCalendar {
    /// Check if the service runs on a given date.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if self.removed.contains(&date) {
            return false;
        }
        if self.added.contains(&date) {
            return true;
        }

        match self.range {
            Some((start, end)) if start <= date && date <= end => {
                self.weekdays.contains(date.weekday())
            }
            _ => false,
        }
    }
}

/// The set of services active on one date, as a bitset over `ServiceIdx`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveServices {
    words: Vec<u64>,
    count: usize,
}

impl ActiveServices {
    /// An empty set sized for `service_count` services.
    pub fn empty(service_count: usize) -> Self {
        Self {
            words: vec![0; service_count.div_ceil(64)],
            count: 0,
        }
    }

    fn insert(&mut self, service: ServiceIdx) {
        let (word, bit) = (service.index() / 64, service.index() % 64);
        if let Some(w) = self.words.get_mut(word) {
            if *w & (1 << bit) == 0 {
                *w |= 1 << bit;
                self.count += 1;
            }
        }
    }

    pub fn contains(&self, service: ServiceIdx) -> bool {
        let (word, bit) = (service.index() / 64, service.index() % 64);
        self.words.get(word).is_some_and(|w| w & (1 << bit) != 0)
    }

    /// Number of active services.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Resolves dates to active service sets.
#[derive(Clone, Debug, Default)]
pub struct CalendarResolver {
    services: Vec<ServiceCalendar>,
}

impl CalendarResolver {
    /// Create a resolver. The position of each calendar is its `ServiceIdx`.
    pub fn new(services: Vec<ServiceCalendar>) -> Self {
        Self { services }
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn calendar(&self, service: ServiceIdx) -> Option<&ServiceCalendar> {
        self.services.get(service.index())
    }

    /// Compute the services running on `date`.
    pub fn active_on(&self, date: NaiveDate) -> ActiveServices {
        let mut active = ActiveServices::empty(self.services.len());
        for (i, calendar) in self.services.iter().enumerate() {
            if calendar.runs_on(date) {
                active.insert(ServiceIdx::from_index(i));
            }
        }
        active
    }
}
