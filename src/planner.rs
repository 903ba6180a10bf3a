use crate::allocation::{AllocationMap, DailyAllocator};
use crate::cache::ComputationCache;
use crate::calendar::WorkCalendar;
use crate::config::PlannerConfig;
use crate::error::ValidationReport;
use crate::overlap::{DateRange, SearchDirection, find_nearest_available_slot};
use crate::plan::ProjectPlan;
use crate::project::{CalendarEvent, Phase, Project};
use crate::recurrence::{self, RecurrenceRule};
use chrono::NaiveDate;
use std::sync::Arc;

/// Entry point bundling configuration, the work calendar and an optional
/// shared allocation cache.
#[derive(Clone)]
pub struct Planner {
    config: PlannerConfig,
    calendar: WorkCalendar,
    cache: Option<Arc<ComputationCache<AllocationMap>>>,
}

impl Planner {
    pub fn new(config: PlannerConfig, calendar: WorkCalendar) -> Self {
        Self {
            config,
            calendar,
            cache: None,
        }
    }

    /// Builds a planner with a private cache sized by `config.cache`.
    pub fn with_configured_cache(config: PlannerConfig, calendar: WorkCalendar) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(ComputationCache::new(&config.cache)));
        Self {
            config,
            calendar,
            cache,
        }
    }

    /// Shares `cache` with other planners.
    pub fn with_cache(mut self, cache: Arc<ComputationCache<AllocationMap>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn cache(&self) -> Option<&Arc<ComputationCache<AllocationMap>>> {
        self.cache.as_ref()
    }

    /// Per-day allocation of a project over `[from, to]`.
    pub fn project_allocations(
        &self,
        project: &Project,
        milestones: &[Phase],
        events: &[CalendarEvent],
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
    ) -> AllocationMap {
        let horizon = self.config.continuous_horizon_days;
        let relevant: Vec<CalendarEvent> = events
            .iter()
            .filter(|event| event.project_id == Some(project.id))
            .cloned()
            .collect();
        let compute = || {
            DailyAllocator::new(&self.calendar, &relevant, today, horizon)
                .allocate(project, milestones, from, to)
        };
        match &self.cache {
            Some(cache) => {
                let inputs = (
                    project,
                    milestones,
                    &relevant,
                    &self.calendar,
                    from,
                    to,
                    today,
                    horizon,
                );
                cache.get_or_compute(&inputs, compute)
            }
            None => compute(),
        }
    }

    pub fn daily_allocations(
        &self,
        plan: &ProjectPlan,
        events: &[CalendarEvent],
        from: NaiveDate,
        to: NaiveDate,
        today: NaiveDate,
    ) -> AllocationMap {
        let milestones = plan.milestones(today);
        self.project_allocations(plan.project(), &milestones, events, from, to, today)
    }

    pub fn expand_recurrence(
        &self,
        rule: &RecurrenceRule,
        anchor: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ValidationReport> {
        Ok(recurrence::expand(rule, anchor, window_end)?.collect())
    }

    pub fn budget_report(&self, plan: &ProjectPlan, today: NaiveDate) -> ValidationReport {
        plan.budget_report(today)
    }

    pub fn find_slot(
        &self,
        existing: &[DateRange],
        requested: DateRange,
        direction: SearchDirection,
    ) -> Option<DateRange> {
        find_nearest_available_slot(existing, requested, direction)
    }
}
