use crate::error::CalendarError;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// A contiguous block of availability inside a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkSlot", into = "RawWorkSlot")]
pub struct WorkSlot {
    start_time: NaiveTime,
    end_time: NaiveTime,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWorkSlot {
    start_time: String,
    end_time: String,
}

impl TryFrom<RawWorkSlot> for WorkSlot {
    type Error = CalendarError;

    fn try_from(raw: RawWorkSlot) -> Result<Self, Self::Error> {
        WorkSlot::parse(&raw.start_time, &raw.end_time)
    }
}

impl From<WorkSlot> for RawWorkSlot {
    fn from(slot: WorkSlot) -> Self {
        Self {
            start_time: slot.start_time.format("%H:%M").to_string(),
            end_time: slot.end_time.format("%H:%M").to_string(),
        }
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, CalendarError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| CalendarError::InvalidTime(raw.to_string()))
}

impl WorkSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Result<Self, CalendarError> {
        // Slots never cross midnight.
        if start_time >= end_time {
            return Err(CalendarError::EmptySlot {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Builds a slot from `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, CalendarError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_minutes() as f64 / 60.0
    }

    /// Touching slots (one ends when the next starts) do not overlap.
    pub fn overlaps(&self, other: &WorkSlot) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// Work slots for each day of the week, keyed Sunday through Saturday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklySchedule {
    sunday: Vec<WorkSlot>,
    monday: Vec<WorkSlot>,
    tuesday: Vec<WorkSlot>,
    wednesday: Vec<WorkSlot>,
    thursday: Vec<WorkSlot>,
    friday: Vec<WorkSlot>,
    saturday: Vec<WorkSlot>,
}

impl WeeklySchedule {
    pub const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// An empty schedule: no day has any capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Monday to Friday, 09:00 to 17:00.
    pub fn standard() -> Self {
        let nine_to_five = WorkSlot {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        };
        let mut schedule = Self::new();
        for day in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            schedule.slots_mut(day).push(nine_to_five);
        }
        schedule
    }

    pub fn slots(&self, weekday: Weekday) -> &[WorkSlot] {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    fn slots_mut(&mut self, weekday: Weekday) -> &mut Vec<WorkSlot> {
        match weekday {
            Weekday::Sun => &mut self.sunday,
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
        }
    }

    fn check_free(
        slots: &[WorkSlot],
        weekday: Weekday,
        candidate: &WorkSlot,
        skip: Option<usize>,
    ) -> Result<(), CalendarError> {
        let clash = slots
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != skip)
            .any(|(_, existing)| existing.overlaps(candidate));
        if clash {
            return Err(CalendarError::OverlappingSlot {
                weekday,
                start: candidate.start_time,
                end: candidate.end_time,
            });
        }
        Ok(())
    }

    /// Adds a slot, keeping the day ordered by start time.
    pub fn add_slot(&mut self, weekday: Weekday, slot: WorkSlot) -> Result<(), CalendarError> {
        Self::check_free(self.slots(weekday), weekday, &slot, None)?;
        let slots = self.slots_mut(weekday);
        slots.push(slot);
        slots.sort_by_key(|s| s.start_time);
        Ok(())
    }

    /// Replaces the slot at `index`, returning the previous value.
    pub fn update_slot(
        &mut self,
        weekday: Weekday,
        index: usize,
        slot: WorkSlot,
    ) -> Result<WorkSlot, CalendarError> {
        if index >= self.slots(weekday).len() {
            return Err(CalendarError::SlotNotFound { weekday, index });
        }
        Self::check_free(self.slots(weekday), weekday, &slot, Some(index))?;
        let slots = self.slots_mut(weekday);
        let previous = std::mem::replace(&mut slots[index], slot);
        slots.sort_by_key(|s| s.start_time);
        Ok(previous)
    }

    pub fn remove_slot(&mut self, weekday: Weekday, index: usize) -> Result<WorkSlot, CalendarError> {
        let slots = self.slots_mut(weekday);
        if index >= slots.len() {
            return Err(CalendarError::SlotNotFound { weekday, index });
        }
        Ok(slots.remove(index))
    }

    pub fn hours_on(&self, weekday: Weekday) -> f64 {
        self.slots(weekday).iter().map(WorkSlot::duration_hours).sum()
    }

    pub fn weekly_hours(&self) -> f64 {
        Self::ALL_WEEKDAYS.iter().map(|day| self.hours_on(*day)).sum()
    }

    pub fn working_weekdays(&self) -> Vec<Weekday> {
        Self::ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|day| self.hours_on(*day) > 0.0)
            .collect()
    }

    /// Checks the pairwise non-overlap invariant for every day. Schedules
    /// built through `add_slot`/`update_slot` always pass; deserialized ones
    /// are checked here.
    pub fn validate(&self) -> Result<(), CalendarError> {
        for weekday in Self::ALL_WEEKDAYS {
            let slots = self.slots(weekday);
            for (idx, slot) in slots.iter().enumerate() {
                Self::check_free(&slots[idx + 1..], weekday, slot, None)?;
            }
        }
        Ok(())
    }
}
