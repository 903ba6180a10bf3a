//! Spreading project budgets over calendar days.

pub mod budget;
pub mod distribution;
pub mod estimate;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use budget::{BudgetAnalysis, analyze_budget, validate_budget};
pub use distribution::{MilestoneShare, distribute};
pub use estimate::{DailyAllocator, planned_hours};

/// Where the hours of a day come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationKind {
    None,
    Planned,
    AutoEstimate,
    Milestone,
}

/// Back-reference from a day to a milestone due on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneRef {
    pub phase_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<u32>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAllocation {
    pub kind: AllocationKind,
    pub hours: f64,
    pub is_working_day: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneRef>,
}

impl DailyAllocation {
    pub fn none(is_working_day: bool) -> Self {
        Self {
            kind: AllocationKind::None,
            hours: 0.0,
            is_working_day,
            milestones: Vec::new(),
        }
    }
}

pub type AllocationMap = BTreeMap<NaiveDate, DailyAllocation>;

/// Sum of the hours in a map.
pub fn total_hours(map: &AllocationMap) -> f64 {
    map.values().map(|day| day.hours).sum()
}
