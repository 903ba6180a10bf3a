use super::MilestoneRef;
use crate::project::{Phase, Project};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hours a day receives from milestone distribution, plus the milestones due
/// on that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneShare {
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneRef>,
}

/// Spreads each milestone's hours evenly over the calendar days leading up to
/// its due date.
///
/// Milestones are taken in due-date order (ties broken by `order`). The first
/// one covers the project start through its due date; each later one covers
/// the day after the previous due date through its own. A milestone sharing
/// its due date with an earlier one gets a one-day span. Phases with an
/// explicit start date cover their own range instead. Templates are skipped;
/// pass expanded instances.
pub fn distribute(project: &Project, milestones: &[Phase]) -> BTreeMap<NaiveDate, MilestoneShare> {
    let mut sorted: Vec<&Phase> = milestones.iter().filter(|m| !m.is_template()).collect();
    sorted.sort_by(|a, b| {
        a.due_date()
            .cmp(&b.due_date())
            .then_with(|| a.order.cmp(&b.order))
    });

    let mut shares: BTreeMap<NaiveDate, MilestoneShare> = BTreeMap::new();
    let mut previous_due: Option<NaiveDate> = None;

    for milestone in sorted {
        let due = milestone.due_date();
        let span_start = match (milestone.start_date, previous_due) {
            (Some(start), _) => start,
            (None, None) => project.start_date,
            (None, Some(previous)) => previous.succ_opt().unwrap_or(previous),
        }
        .min(due);

        let days = ((due - span_start).num_days() + 1).max(1);
        let hours_per_day = milestone.time_allocation_hours / days as f64;
        for day in span_start.iter_days().take(days as usize) {
            shares.entry(day).or_default().hours += hours_per_day;
        }

        shares.entry(due).or_default().milestones.push(MilestoneRef {
            phase_id: milestone.id,
            occurrence: milestone.occurrence,
            name: milestone.name.clone(),
        });
        previous_due = Some(previous_due.map_or(due, |previous| previous.max(due)));
    }

    tracing::debug!(
        project = project.id,
        days = shares.len(),
        "distributed milestone hours"
    );
    shares
}
