//! Date-range overlap checks and conflict resolution for moving a project or
//! phase within a lane of other ranges.

use crate::error::CalendarError;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive range of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchDirection {
    Forward,
    Backward,
    /// Whichever direction needs the smaller shift; ties go backward.
    Auto,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if end < start {
            return Err(CalendarError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        overlaps(self, other)
    }

    pub fn shifted(&self, days: i64) -> Option<Self> {
        let delta = Duration::try_days(days)?;
        Some(Self {
            start: self.start.checked_add_signed(delta)?,
            end: self.end.checked_add_signed(delta)?,
        })
    }

    /// Same length, starting on `start`.
    fn starting_on(&self, start: NaiveDate) -> Option<Self> {
        self.shifted((start - self.start).num_days())
    }

    /// Same length, ending on `end`.
    fn ending_on(&self, end: NaiveDate) -> Option<Self> {
        self.shifted((end - self.end).num_days())
    }
}

/// `[a.start, a.end]` and `[b.start, b.end]` share at least one day.
pub fn overlaps(a: &DateRange, b: &DateRange) -> bool {
    a.start <= b.end && a.end >= b.start
}

fn search_forward(existing: &[DateRange], requested: DateRange) -> Option<DateRange> {
    let mut candidate = requested;
    loop {
        let blocking_end = existing
            .iter()
            .filter(|range| range.overlaps(&candidate))
            .map(DateRange::end)
            .max();
        match blocking_end {
            None => return Some(candidate),
            Some(end) => candidate = candidate.starting_on(end.succ_opt()?)?,
        }
    }
}

fn search_backward(existing: &[DateRange], requested: DateRange) -> Option<DateRange> {
    let mut candidate = requested;
    loop {
        let blocking_start = existing
            .iter()
            .filter(|range| range.overlaps(&candidate))
            .map(DateRange::start)
            .min();
        match blocking_start {
            None => return Some(candidate),
            Some(start) => candidate = candidate.ending_on(start.pred_opt()?)?,
        }
    }
}

/// Nearest placement of `requested` (same length) that overlaps none of
/// `existing`. Returns `requested` itself when it is already free, and `None`
/// only when the search runs off the representable date range.
pub fn find_nearest_available_slot(
    existing: &[DateRange],
    requested: DateRange,
    direction: SearchDirection,
) -> Option<DateRange> {
    let placement = match direction {
        SearchDirection::Forward => search_forward(existing, requested),
        SearchDirection::Backward => search_backward(existing, requested),
        SearchDirection::Auto => {
            let forward = search_forward(existing, requested);
            let backward = search_backward(existing, requested);
            let distance = |range: &DateRange| (range.start - requested.start).num_days().abs();
            match (forward, backward) {
                (Some(f), Some(b)) => {
                    if distance(&b) <= distance(&f) {
                        Some(b)
                    } else {
                        Some(f)
                    }
                }
                (f, b) => b.or(f),
            }
        }
    };
    if let Some(range) = placement {
        if range != requested {
            tracing::debug!(
                requested_start = %requested.start,
                placed_start = %range.start,
                ?direction,
                "moved range to nearest free slot"
            );
        }
    }
    placement
}
