use crate::error::{CalendarError, ConfigError};
use crate::work_schedule::WeeklySchedule;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A named, inclusive range of days on which no work is scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawHoliday")]
pub struct Holiday {
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHoliday {
    title: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<RawHoliday> for Holiday {
    type Error = CalendarError;

    fn try_from(raw: RawHoliday) -> Result<Self, Self::Error> {
        let mut holiday = Holiday::new(raw.title, raw.start_date, raw.end_date)?;
        holiday.notes = raw.notes;
        Ok(holiday)
    }
}

impl Holiday {
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, CalendarError> {
        if end_date < start_date {
            return Err(CalendarError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            title: title.into(),
            start_date,
            end_date,
            notes: None,
        })
    }

    pub fn single_day(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            start_date: date,
            end_date: date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Holidays override every work slot: capacity on a holiday is zero.
pub fn is_working_day(date: NaiveDate, schedule: &WeeklySchedule, holidays: &[Holiday]) -> bool {
    daily_capacity_hours(date, schedule, holidays) > 0.0
}

pub fn daily_capacity_hours(date: NaiveDate, schedule: &WeeklySchedule, holidays: &[Holiday]) -> f64 {
    if holidays.iter().any(|holiday| holiday.contains(date)) {
        return 0.0;
    }
    schedule.hours_on(date.weekday())
}

/// Working days in `[start, end]`, ascending.
pub fn enumerate_working_days<'a>(
    start: NaiveDate,
    end: NaiveDate,
    schedule: &'a WeeklySchedule,
    holidays: &'a [Holiday],
) -> WorkingDays<'a> {
    WorkingDays {
        schedule,
        holidays,
        current: Some(start),
        end,
    }
}

pub fn count_working_days(
    start: NaiveDate,
    end: NaiveDate,
    schedule: &WeeklySchedule,
    holidays: &[Holiday],
) -> u32 {
    enumerate_working_days(start, end, schedule, holidays).count() as u32
}

#[derive(Debug, Clone)]
pub struct WorkingDays<'a> {
    schedule: &'a WeeklySchedule,
    holidays: &'a [Holiday],
    current: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for WorkingDays<'_> {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(date) = self.current {
            if date > self.end {
                self.current = None;
                break;
            }
            self.current = date.succ_opt();
            if is_working_day(date, self.schedule, self.holidays) {
                return Some(date);
            }
        }
        None
    }
}

/// A weekly work-hour schedule combined with the holidays that override it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkCalendar {
    schedule: WeeklySchedule,
    holidays: Vec<Holiday>,
}

/// Serializable calendar settings, validated once when turned into a
/// [`WorkCalendar`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCalendarConfig {
    schedule: WeeklySchedule,
    holidays: Vec<Holiday>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self::standard()
    }
}

impl WorkCalendar {
    pub fn new(schedule: WeeklySchedule, holidays: Vec<Holiday>) -> Result<Self, CalendarError> {
        let config = WorkCalendarConfig::new(schedule, holidays);
        Self::from_config(&config)
    }

    /// Standard Monday to Friday schedule without holidays.
    pub fn standard() -> Self {
        Self {
            schedule: WeeklySchedule::standard(),
            holidays: Vec::new(),
        }
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        config.schedule.validate()?;
        if config.schedule.weekly_hours() <= 0.0 {
            return Err(CalendarError::InvalidConfig(
                "weekly schedule has no working hours".to_string(),
            ));
        }
        Ok(Self {
            schedule: config.schedule.clone(),
            holidays: config.holidays.clone(),
        })
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    /// Mutable access for slot edits; `WeeklySchedule` re-validates each edit.
    pub fn schedule_mut(&mut self) -> &mut WeeklySchedule {
        &mut self.schedule
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn add_holiday(&mut self, holiday: Holiday) {
        self.holidays.push(holiday);
        self.holidays.sort_by_key(|h| h.start_date);
    }

    /// Removes every holiday with the given title, returning how many went.
    pub fn remove_holiday(&mut self, title: &str) -> usize {
        let before = self.holidays.len();
        self.holidays.retain(|h| h.title != title);
        before - self.holidays.len()
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|holiday| holiday.contains(date))
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        is_working_day(date, &self.schedule, &self.holidays)
    }

    pub fn daily_capacity_hours(&self, date: NaiveDate) -> f64 {
        daily_capacity_hours(date, &self.schedule, &self.holidays)
    }

    pub fn working_days(&self, start: NaiveDate, end: NaiveDate) -> WorkingDays<'_> {
        enumerate_working_days(start, end, &self.schedule, &self.holidays)
    }

    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        count_working_days(start, end, &self.schedule, &self.holidays)
    }

    pub fn capacity_hours_in_range(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        self.working_days(start, end)
            .map(|day| self.daily_capacity_hours(day))
            .sum()
    }

    /// First working day strictly after `from`, or `None` when the schedule
    /// has no capacity at all.
    pub fn next_working_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        if self.schedule.weekly_hours() <= 0.0 {
            return None;
        }
        let last_holiday = self
            .holidays
            .iter()
            .map(Holiday::end_date)
            .max()
            .unwrap_or(from)
            .max(from);
        // Past the last holiday a full week always contains a working day.
        let limit = last_holiday + Duration::days(7);
        let mut current = from.succ_opt()?;
        while current <= limit {
            if self.is_working_day(current) {
                return Some(current);
            }
            current = current.succ_opt()?;
        }
        None
    }
}

impl WorkCalendarConfig {
    pub fn new(schedule: WeeklySchedule, holidays: Vec<Holiday>) -> Self {
        let mut holidays = holidays;
        holidays.sort_by_key(|h| h.start_date);
        holidays.dedup();
        Self { schedule, holidays }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WorkCalendarConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        WorkCalendarConfig::new(calendar.schedule.clone(), calendar.holidays.clone())
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((next - first).num_days() as u32)
}

/// The `n`th (1-based) occurrence of `weekday` in a month.
pub(crate) fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut count = 0;

    while date.month() == month {
        if date.weekday() == weekday {
            count += 1;
            if count == n {
                return Some(date);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

/// The `n`th occurrence of `weekday` counting back from the end of a month
/// (`n = 1` is the last one).
pub(crate) fn nth_last_weekday(
    year: i32,
    month: u32,
    weekday: Weekday,
    n: u32,
) -> Option<NaiveDate> {
    let last_day = days_in_month(year, month)?;
    let mut date = NaiveDate::from_ymd_opt(year, month, last_day)?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    let date = date - Duration::weeks(i64::from(n.saturating_sub(1)));
    (date.month() == month).then_some(date)
}
