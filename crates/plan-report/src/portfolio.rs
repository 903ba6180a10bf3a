use chrono::NaiveDate;
use plan_calendar::allocation::total_hours;
use plan_calendar::{AllocationMap, CalendarEvent, Planner, ProjectPlan};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-project figures for a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_id: i32,
    pub name: String,
    pub estimated_hours: f64,
    /// Hours the project receives inside the window.
    pub allocated_hours: f64,
    /// Hours committed to milestones, whole project.
    pub milestone_hours: f64,
    pub utilization_percentage: f64,
    pub is_over_budget: bool,
    pub working_days: u32,
}

/// Combined allocation of every project on one day against that day's
/// capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLoad {
    pub date: NaiveDate,
    pub allocated_hours: f64,
    pub capacity_hours: f64,
}

impl DailyLoad {
    pub fn is_overloaded(&self) -> bool {
        self.allocated_hours > self.capacity_hours
    }
}

fn allocations(
    planner: &Planner,
    plans: &[ProjectPlan],
    events: &[CalendarEvent],
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Vec<AllocationMap> {
    plans
        .par_iter()
        .map(|plan| planner.daily_allocations(plan, events, from, to, today))
        .collect()
}

/// Summaries for `plans` over `[from, to]`, in input order.
pub fn portfolio_summaries(
    planner: &Planner,
    plans: &[ProjectPlan],
    events: &[CalendarEvent],
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Vec<ProjectSummary> {
    let maps = allocations(planner, plans, events, from, to, today);
    let working_days = planner.calendar().count_working_days(from, to);

    let summaries: Vec<ProjectSummary> = plans
        .par_iter()
        .zip(maps.par_iter())
        .map(|(plan, map)| {
            let budget = plan.analyze_budget(today);
            let project = plan.project();
            ProjectSummary {
                project_id: project.id,
                name: project.name.clone(),
                estimated_hours: project.estimated_hours,
                allocated_hours: total_hours(map),
                milestone_hours: budget.total_allocated,
                utilization_percentage: budget.utilization_percentage,
                is_over_budget: budget.is_over_budget,
                working_days,
            }
        })
        .collect();

    tracing::debug!(
        projects = summaries.len(),
        over_budget = summaries.iter().filter(|s| s.is_over_budget).count(),
        "computed portfolio summaries"
    );
    summaries
}

/// Day-by-day load across all `plans`, one entry per day of `[from, to]`.
pub fn daily_load(
    planner: &Planner,
    plans: &[ProjectPlan],
    events: &[CalendarEvent],
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Vec<DailyLoad> {
    if to < from {
        return Vec::new();
    }
    let mut totals: BTreeMap<NaiveDate, f64> =
        from.iter_days().take_while(|day| *day <= to).map(|day| (day, 0.0)).collect();

    for map in allocations(planner, plans, events, from, to, today) {
        for (day, allocation) in map {
            *totals.entry(day).or_insert(0.0) += allocation.hours;
        }
    }

    let calendar = planner.calendar();
    totals
        .into_iter()
        .map(|(date, allocated_hours)| DailyLoad {
            date,
            allocated_hours,
            capacity_hours: calendar.daily_capacity_hours(date),
        })
        .collect()
}
