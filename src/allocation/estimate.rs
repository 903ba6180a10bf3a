use super::{AllocationKind, AllocationMap, DailyAllocation, distribute};
use crate::calendar::WorkCalendar;
use crate::project::{CalendarEvent, EventCategory, Phase, Project};
use chrono::NaiveDate;

/// Hours that project-linked events put on `date`.
pub fn planned_hours(project_id: i32, date: NaiveDate, events: &[CalendarEvent]) -> f64 {
    events
        .iter()
        .filter(|event| event.category == EventCategory::Event)
        .filter(|event| event.project_id == Some(project_id))
        .map(|event| event.hours_on(date))
        .sum()
}

/// Builds per-day allocations for projects against one calendar and one set
/// of calendar events.
pub struct DailyAllocator<'a> {
    calendar: &'a WorkCalendar,
    events: &'a [CalendarEvent],
    today: NaiveDate,
    horizon_days: u32,
}

impl<'a> DailyAllocator<'a> {
    pub fn new(
        calendar: &'a WorkCalendar,
        events: &'a [CalendarEvent],
        today: NaiveDate,
        horizon_days: u32,
    ) -> Self {
        Self {
            calendar,
            events,
            today,
            horizon_days,
        }
    }

    /// Budget divided by the working days in the project's effective span.
    pub fn auto_estimate_hours(&self, project: &Project) -> f64 {
        let end = project.effective_end(self.today, self.horizon_days);
        let working_days = self.calendar.count_working_days(project.start_date, end);
        if working_days == 0 {
            return 0.0;
        }
        project.estimated_hours / f64::from(working_days)
    }

    /// Allocation for one day of a project without milestones.
    pub fn estimate_day(&self, project: &Project, date: NaiveDate) -> DailyAllocation {
        let per_day = self.auto_estimate_hours(project);
        self.estimate_with(project, date, per_day)
    }

    fn estimate_with(&self, project: &Project, date: NaiveDate, per_day: f64) -> DailyAllocation {
        if !self.calendar.is_working_day(date) {
            return DailyAllocation::none(false);
        }

        let planned = planned_hours(project.id, date, self.events);
        if planned > 0.0 {
            return DailyAllocation {
                kind: AllocationKind::Planned,
                hours: planned,
                is_working_day: true,
                milestones: Vec::new(),
            };
        }

        if project.contains(date, self.today, self.horizon_days) && per_day > 0.0 {
            return DailyAllocation {
                kind: AllocationKind::AutoEstimate,
                hours: per_day,
                is_working_day: true,
                milestones: Vec::new(),
            };
        }

        DailyAllocation::none(true)
    }

    /// Allocation for every day in `[from, to]`.
    ///
    /// Projects with milestones spread milestone hours over calendar days;
    /// projects without fall back to the auto-estimate. In both modes hours
    /// from project events on a working day take precedence.
    pub fn allocate(
        &self,
        project: &Project,
        milestones: &[Phase],
        from: NaiveDate,
        to: NaiveDate,
    ) -> AllocationMap {
        let mut map = AllocationMap::new();
        if to < from {
            return map;
        }
        let days = from.iter_days().take_while(|day| *day <= to);

        let concrete: Vec<&Phase> = milestones.iter().filter(|m| !m.is_template()).collect();
        if concrete.is_empty() {
            let per_day = self.auto_estimate_hours(project);
            for day in days {
                map.insert(day, self.estimate_with(project, day, per_day));
            }
            tracing::debug!(project = project.id, per_day, "auto-estimated allocation");
            return map;
        }

        let shares = distribute(project, milestones);
        for day in days {
            let is_working_day = self.calendar.is_working_day(day);
            let share = shares.get(&day);
            let milestone_refs = share.map(|s| s.milestones.clone()).unwrap_or_default();
            let planned = if is_working_day {
                planned_hours(project.id, day, self.events)
            } else {
                0.0
            };

            let (kind, hours) = match share {
                _ if planned > 0.0 => (AllocationKind::Planned, planned),
                Some(share) if share.hours > 0.0 => (AllocationKind::Milestone, share.hours),
                _ => (AllocationKind::None, 0.0),
            };
            map.insert(
                day,
                DailyAllocation {
                    kind,
                    hours,
                    is_working_day,
                    milestones: milestone_refs,
                },
            );
        }
        map
    }
}
