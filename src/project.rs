use crate::envelope::DateAdjustment;
use crate::recurrence::RecurrenceRule;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub start_date: NaiveDate,
    /// Absent for continuous (open-ended) projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub continuous: bool,
    /// Total hour budget.
    pub estimated_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i32>,
}

impl Project {
    pub fn new(
        id: i32,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        estimated_hours: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_date,
            end_date: Some(end_date),
            continuous: false,
            estimated_hours,
            client_id: None,
            group_id: None,
        }
    }

    pub fn continuous(
        id: i32,
        name: impl Into<String>,
        start_date: NaiveDate,
        estimated_hours: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_date,
            end_date: None,
            continuous: true,
            estimated_hours,
            client_id: None,
            group_id: None,
        }
    }

    /// Last day the budget is spread over. Continuous projects run
    /// `horizon_days` past the later of their start and `today`.
    pub fn effective_end(&self, today: NaiveDate, horizon_days: u32) -> NaiveDate {
        if self.continuous {
            let from = self.start_date.max(today);
            return from
                .checked_add_days(Days::new(u64::from(horizon_days)))
                .unwrap_or(NaiveDate::MAX);
        }
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate, horizon_days: u32) -> bool {
        self.start_date <= date && date <= self.effective_end(today, horizon_days)
    }

    pub fn apply_adjustment(&mut self, adjustment: &DateAdjustment) {
        self.start_date = adjustment.start_date;
        if !self.continuous {
            if let Some(end) = adjustment.end_date {
                self.end_date = Some(end);
            }
        }
    }
}

/// A milestone (single due date) or phase (start and end date) of a project.
///
/// A phase carrying a `recurrence` is a recurring template; instances derived
/// from it carry the template's id in `template_id` and are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Due date for milestones, last day for phases.
    pub end_date: NaiveDate,
    pub time_allocation_hours: f64,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
}

impl Phase {
    pub fn milestone(
        id: i32,
        project_id: i32,
        name: impl Into<String>,
        due_date: NaiveDate,
        time_allocation_hours: f64,
    ) -> Self {
        Self {
            id,
            project_id,
            name: name.into(),
            start_date: None,
            end_date: due_date,
            time_allocation_hours,
            order: 0,
            recurrence: None,
            template_id: None,
            occurrence: None,
        }
    }

    pub fn phase(
        id: i32,
        project_id: i32,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        time_allocation_hours: f64,
    ) -> Self {
        Self {
            start_date: Some(start_date),
            ..Self::milestone(id, project_id, name, end_date, time_allocation_hours)
        }
    }

    /// A recurring template whose first occurrence is anchored on `first_due`.
    /// `time_allocation_hours` is the load of each occurrence.
    pub fn recurring(
        id: i32,
        project_id: i32,
        name: impl Into<String>,
        first_due: NaiveDate,
        time_allocation_hours: f64,
        rule: RecurrenceRule,
    ) -> Self {
        Self {
            recurrence: Some(rule),
            ..Self::milestone(id, project_id, name, first_due, time_allocation_hours)
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn is_template(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_instance(&self) -> bool {
        self.template_id.is_some()
    }

    pub fn due_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn span_start(&self) -> NaiveDate {
        self.start_date.unwrap_or(self.end_date)
    }

    /// Derived occurrence of this template due on `due_date`.
    pub(crate) fn instance(&self, occurrence: u32, due_date: NaiveDate) -> Phase {
        Phase {
            id: self.id,
            project_id: self.project_id,
            name: format!("{} {}", self.name, occurrence + 1),
            start_date: None,
            end_date: due_date,
            time_allocation_hours: self.time_allocation_hours,
            order: self.order,
            recurrence: None,
            template_id: Some(self.id),
            occurrence: Some(occurrence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventCategory {
    Event,
    Habit,
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i32,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    pub color: String,
}

impl CalendarEvent {
    pub fn new(
        id: i32,
        title: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start_time,
            end_time,
            category: EventCategory::Event,
            project_id: None,
            color: "#3b82f6".to_string(),
        }
    }

    /// Tasks are instantaneous: start and end coincide.
    pub fn task(id: i32, title: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            category: EventCategory::Task,
            ..Self::new(id, title, at, at)
        }
    }

    pub fn habit(
        id: i32,
        title: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            category: EventCategory::Habit,
            ..Self::new(id, title, start_time, end_time)
        }
    }

    pub fn for_project(mut self, project_id: i32) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end_time - self.start_time).num_minutes().max(0) as f64 / 60.0
    }

    /// Hours of this event that fall on `date`.
    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = match date.succ_opt() {
            Some(next) => next.and_time(NaiveTime::MIN),
            None => return 0.0,
        };
        let start = self.start_time.max(day_start);
        let end = self.end_time.min(day_end);
        if end <= start {
            return 0.0;
        }
        (end - start).num_minutes() as f64 / 60.0
    }
}
