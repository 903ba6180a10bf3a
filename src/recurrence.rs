//! Expansion of recurrence rules into concrete occurrence dates.
//!
//! A rule is expanded lazily from an anchor date. Expansion stops at the
//! rule's own end condition or at the caller's window end, whichever comes
//! first, so `EndCondition::Never` is always bounded by the window.

use crate::calendar::{days_in_month, nth_last_weekday, nth_weekday};
use crate::error::ValidationReport;
use crate::work_schedule::WeeklySchedule;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyPattern {
    /// Same day of month, clamped to the last day of short months.
    ByDate,
    /// Nth weekday of the month; ordinals 5 and 6 are second-to-last and last.
    ByWeekdayOrdinal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum EndCondition {
    #[default]
    Never,
    OnDate(NaiveDate),
    AfterCount(u32),
}

/// A repeating pattern. Weekday fields use 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub recurrence_type: RecurrenceType,
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_pattern: Option<MonthlyPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_date: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_week_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_day_of_week: Option<u8>,
    #[serde(default)]
    pub end_condition: EndCondition,
}

fn weekday_from_index(index: u8) -> Option<Weekday> {
    WeeklySchedule::ALL_WEEKDAYS.get(usize::from(index)).copied()
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

fn ordinal_name(week_of_month: u8) -> &'static str {
    match week_of_month {
        1 => "first",
        2 => "second",
        3 => "third",
        4 => "fourth",
        5 => "second-to-last",
        _ => "last",
    }
}

impl RecurrenceRule {
    fn base(recurrence_type: RecurrenceType, interval: u32) -> Self {
        Self {
            recurrence_type,
            interval,
            weekly_day_of_week: None,
            monthly_pattern: None,
            monthly_date: None,
            monthly_week_of_month: None,
            monthly_day_of_week: None,
            end_condition: EndCondition::Never,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::base(RecurrenceType::Daily, interval)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::base(RecurrenceType::Weekly, interval)
    }

    pub fn monthly_by_date(interval: u32, day_of_month: u32) -> Self {
        Self {
            monthly_pattern: Some(MonthlyPattern::ByDate),
            monthly_date: Some(day_of_month),
            ..Self::base(RecurrenceType::Monthly, interval)
        }
    }

    pub fn monthly_by_weekday(interval: u32, week_of_month: u8, day_of_week: u8) -> Self {
        Self {
            monthly_pattern: Some(MonthlyPattern::ByWeekdayOrdinal),
            monthly_week_of_month: Some(week_of_month),
            monthly_day_of_week: Some(day_of_week),
            ..Self::base(RecurrenceType::Monthly, interval)
        }
    }

    pub fn yearly(interval: u32) -> Self {
        Self::base(RecurrenceType::Yearly, interval)
    }

    pub fn on_weekday(mut self, day_of_week: u8) -> Self {
        self.weekly_day_of_week = Some(day_of_week);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.end_condition = EndCondition::OnDate(date);
        self
    }

    pub fn count(mut self, occurrences: u32) -> Self {
        self.end_condition = EndCondition::AfterCount(occurrences);
        self
    }

    /// Collects every structural problem with the rule for a series that
    /// starts on `anchor`.
    pub fn validate(&self, anchor: NaiveDate) -> ValidationReport {
        let mut report = ValidationReport::new();

        if self.interval < 1 {
            report.error("Recurrence interval must be at least 1");
        }

        if let Some(day) = self.weekly_day_of_week {
            if day > 6 {
                report.error(format!(
                    "Weekly day of week must be between 0 and 6 (got {day})"
                ));
            }
        }

        if self.recurrence_type == RecurrenceType::Monthly {
            match self.monthly_pattern {
                None => match self.monthly_date {
                    Some(day) if !(1..=31).contains(&day) => report.error(format!(
                        "Monthly day of month must be between 1 and 31 (got {day})"
                    )),
                    _ => {}
                },
                Some(MonthlyPattern::ByDate) => match self.monthly_date {
                    None => report.error("Monthly by-date recurrence requires a day of month"),
                    Some(day) if !(1..=31).contains(&day) => report.error(format!(
                        "Monthly day of month must be between 1 and 31 (got {day})"
                    )),
                    Some(_) => {}
                },
                Some(MonthlyPattern::ByWeekdayOrdinal) => {
                    match self.monthly_week_of_month {
                        None => report
                            .error("Monthly by-weekday recurrence requires a week of month"),
                        Some(week) if !(1..=6).contains(&week) => report.error(format!(
                            "Monthly week of month must be between 1 and 6 (got {week})"
                        )),
                        Some(_) => {}
                    }
                    match self.monthly_day_of_week {
                        None => report
                            .error("Monthly by-weekday recurrence requires a day of week"),
                        Some(day) if day > 6 => report.error(format!(
                            "Monthly day of week must be between 0 and 6 (got {day})"
                        )),
                        Some(_) => {}
                    }
                }
            }
        }

        match self.end_condition {
            EndCondition::Never => {}
            EndCondition::OnDate(end) => {
                if end <= anchor {
                    report.error(format!(
                        "Recurrence end date {end} must be after the start date {anchor}"
                    ));
                }
            }
            EndCondition::AfterCount(count) => {
                if count < 1 {
                    report.error("Recurrence occurrence count must be at least 1");
                }
            }
        }

        report
    }

    /// Short human-readable label, e.g. "Every 2 weeks on Monday".
    pub fn describe(&self, anchor: NaiveDate) -> String {
        let interval = self.interval.max(1);
        let every = |unit: &str| {
            if interval == 1 {
                format!("Every {unit}")
            } else {
                format!("Every {interval} {unit}s")
            }
        };
        let mut text = match self.recurrence_type {
            RecurrenceType::Daily => every("day"),
            RecurrenceType::Weekly => {
                let weekday = self
                    .weekly_day_of_week
                    .and_then(weekday_from_index)
                    .unwrap_or_else(|| anchor.weekday());
                format!("{} on {}", every("week"), weekday_name(weekday))
            }
            RecurrenceType::Monthly => match self.cadence(anchor) {
                Some(Cadence::MonthlyByWeekday { week, weekday }) => format!(
                    "{} on the {} {}",
                    every("month"),
                    ordinal_name(week),
                    weekday_name(weekday)
                ),
                _ => format!(
                    "{} on day {}",
                    every("month"),
                    self.monthly_date.unwrap_or_else(|| anchor.day())
                ),
            },
            RecurrenceType::Yearly => format!("{} on {}", every("year"), anchor.format("%B %-d")),
        };
        match self.end_condition {
            EndCondition::Never => {}
            EndCondition::OnDate(end) => text.push_str(&format!(" until {end}")),
            EndCondition::AfterCount(count) => text.push_str(&format!(", {count} times")),
        }
        text
    }

    fn cadence(&self, anchor: NaiveDate) -> Option<Cadence> {
        let cadence = match self.recurrence_type {
            RecurrenceType::Daily => Cadence::Daily,
            RecurrenceType::Weekly => {
                let target = match self.weekly_day_of_week {
                    Some(index) => weekday_from_index(index)?,
                    None => anchor.weekday(),
                };
                let offset = (target.num_days_from_sunday() + 7
                    - anchor.weekday().num_days_from_sunday())
                    % 7;
                Cadence::Weekly {
                    first: anchor.checked_add_days(Days::new(u64::from(offset)))?,
                }
            }
            RecurrenceType::Monthly => match self.monthly_pattern {
                None => Cadence::MonthlyByDate {
                    day: self.monthly_date.unwrap_or_else(|| anchor.day()),
                },
                Some(MonthlyPattern::ByDate) => Cadence::MonthlyByDate {
                    day: self.monthly_date?,
                },
                Some(MonthlyPattern::ByWeekdayOrdinal) => Cadence::MonthlyByWeekday {
                    week: self.monthly_week_of_month?,
                    weekday: weekday_from_index(self.monthly_day_of_week?)?,
                },
            },
            RecurrenceType::Yearly => Cadence::Yearly,
        };
        Some(cadence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Daily,
    Weekly { first: NaiveDate },
    MonthlyByDate { day: u32 },
    MonthlyByWeekday { week: u8, weekday: Weekday },
    Yearly,
}

/// Lazy, finite sequence of occurrence dates. Clone it (or call
/// [`Occurrences::restarted`]) to iterate again from the anchor.
#[derive(Debug, Clone)]
pub struct Occurrences {
    cadence: Cadence,
    interval: u32,
    anchor: NaiveDate,
    window_end: NaiveDate,
    end_condition: EndCondition,
    index: u64,
    emitted: u32,
    finished: bool,
}

/// Expands `rule` starting at `anchor`, bounded by `window_end`.
///
/// Invalid rules are reported as data rather than expanded.
pub fn expand(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    window_end: NaiveDate,
) -> Result<Occurrences, ValidationReport> {
    let report = rule.validate(anchor);
    if !report.is_valid() {
        return Err(report);
    }
    let cadence = rule
        .cadence(anchor)
        .ok_or_else(|| ValidationReport::with_error("Recurrence rule is incomplete"))?;
    tracing::debug!(
        rule = ?rule.recurrence_type,
        interval = rule.interval,
        %anchor,
        %window_end,
        "expanding recurrence"
    );
    Ok(Occurrences {
        cadence,
        interval: rule.interval,
        anchor,
        window_end,
        end_condition: rule.end_condition,
        index: 0,
        emitted: 0,
        finished: false,
    })
}

impl Occurrences {
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn window_end(&self) -> NaiveDate {
        self.window_end
    }

    /// A fresh copy of this sequence positioned at the anchor.
    pub fn restarted(&self) -> Self {
        Self {
            index: 0,
            emitted: 0,
            finished: false,
            ..self.clone()
        }
    }

    fn month_offset(&self, k: u64) -> Option<(i32, u32)> {
        let base = i64::from(self.anchor.year()) * 12 + i64::from(self.anchor.month0());
        let months = base.checked_add(i64::try_from(k.checked_mul(u64::from(self.interval))?).ok()?)?;
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
        Some((year, month))
    }

    fn candidate(&self, k: u64) -> Option<NaiveDate> {
        let step = k.checked_mul(u64::from(self.interval))?;
        match self.cadence {
            Cadence::Daily => self.anchor.checked_add_days(Days::new(step)),
            Cadence::Weekly { first } => first.checked_add_days(Days::new(step.checked_mul(7)?)),
            Cadence::MonthlyByDate { day } => {
                let (year, month) = self.month_offset(k)?;
                let day = day.min(days_in_month(year, month)?);
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Cadence::MonthlyByWeekday { week, weekday } => {
                let (year, month) = self.month_offset(k)?;
                match week {
                    1..=4 => nth_weekday(year, month, weekday, u32::from(week)),
                    5 => nth_last_weekday(year, month, weekday, 2),
                    _ => nth_last_weekday(year, month, weekday, 1),
                }
            }
            Cadence::Yearly => {
                let year = self
                    .anchor
                    .year()
                    .checked_add(i32::try_from(step).ok()?)?;
                let month = self.anchor.month();
                // Feb 29 anchors land on Feb 28 in common years.
                let day = self.anchor.day().min(days_in_month(year, month)?);
                NaiveDate::from_ymd_opt(year, month, day)
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let EndCondition::AfterCount(limit) = self.end_condition {
                if self.emitted >= limit {
                    self.finished = true;
                    break;
                }
            }

            let Some(date) = self.candidate(self.index) else {
                self.finished = true;
                break;
            };
            self.index += 1;

            // The first monthly/yearly period can fall before the anchor.
            if date < self.anchor {
                continue;
            }
            if date > self.window_end {
                self.finished = true;
                break;
            }
            if let EndCondition::OnDate(end) = self.end_condition {
                if date > end {
                    self.finished = true;
                    break;
                }
            }

            self.emitted += 1;
            return Some(date);
        }
        None
    }
}
