use crate::error::{ValidationReport, format_hours};
use crate::project::{Phase, Project};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalysis {
    pub estimated_hours: f64,
    pub total_allocated: f64,
    /// Unallocated budget, zero when over budget.
    pub remaining: f64,
    /// Hours beyond the budget, zero when within it.
    pub overage: f64,
    pub utilization_percentage: f64,
    pub is_over_budget: bool,
}

/// Sums phase allocations (templates excluded) against the project budget.
pub fn analyze_budget(project: &Project, phases: &[Phase]) -> BudgetAnalysis {
    let total_allocated: f64 = phases
        .iter()
        .filter(|phase| !phase.is_template())
        .map(|phase| phase.time_allocation_hours)
        .sum();
    let budget = project.estimated_hours;

    let utilization_percentage = if budget > 0.0 {
        total_allocated / budget * 100.0
    } else if total_allocated > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    BudgetAnalysis {
        estimated_hours: budget,
        total_allocated,
        remaining: (budget - total_allocated).max(0.0),
        overage: (total_allocated - budget).max(0.0),
        utilization_percentage,
        is_over_budget: total_allocated > budget,
    }
}

/// Errors when allocations exceed the budget, warns once utilization passes
/// `warning_percent`.
pub fn validate_budget(project: &Project, phases: &[Phase], warning_percent: f64) -> ValidationReport {
    let analysis = analyze_budget(project, phases);
    let mut report = ValidationReport::new();

    if analysis.is_over_budget {
        tracing::warn!(
            project = project.id,
            allocated = analysis.total_allocated,
            budget = analysis.estimated_hours,
            "milestone allocations exceed budget"
        );
        report.error(format!(
            "Milestone allocations ({}h) exceed project budget ({}h) by {}h",
            format_hours(analysis.total_allocated),
            format_hours(analysis.estimated_hours),
            format_hours(analysis.overage)
        ));
    } else if analysis.utilization_percentage > warning_percent {
        report.warning(format!(
            "Milestone allocations ({}h) use {:.0}% of project budget ({}h)",
            format_hours(analysis.total_allocated),
            analysis.utilization_percentage,
            format_hours(analysis.estimated_hours)
        ));
    }

    report
}
