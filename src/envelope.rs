//! Keeping a project's date span consistent with its phases.
//!
//! Phases may widen a project's span through an explicit adjustment; they are
//! never clipped to fit. Phases outside the span are reported instead.

use crate::error::ValidationReport;
use crate::project::{Phase, Project};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Proposed project span. `end_date` is `None` for continuous projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateAdjustment {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Proposes a wider project span when any phase starts before or ends after
/// the project's recorded span. Returns `None` when the phases already fit.
pub fn synchronize_project_with_phases(project: &Project, phases: &[Phase]) -> Option<DateAdjustment> {
    let concrete = || phases.iter().filter(|p| !p.is_template());
    let earliest = concrete().map(Phase::span_start).min()?;
    let latest = concrete().map(Phase::due_date).max()?;

    let start_date = project.start_date.min(earliest);
    let end_date = if project.continuous {
        None
    } else {
        Some(project.end_date.map_or(latest, |end| end.max(latest)))
    };

    let widened = start_date < project.start_date || end_date != project.end_date;
    if !widened {
        return None;
    }
    tracing::debug!(
        project = project.id,
        %start_date,
        ?end_date,
        "phases extend beyond project span"
    );
    Some(DateAdjustment {
        start_date,
        end_date,
    })
}

/// Reports every phase that starts before the project or ends after it.
/// Continuous projects only check the lower bound.
pub fn validate_phases_within_project(project: &Project, phases: &[Phase]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for phase in phases.iter().filter(|p| !p.is_template()) {
        if phase.span_start() < project.start_date {
            report.error(format!(
                "'{}' starts on {} before the project start {}",
                phase.name,
                phase.span_start(),
                project.start_date
            ));
        }
        if project.continuous {
            continue;
        }
        if let Some(end) = project.end_date {
            if phase.due_date() > end {
                report.error(format!(
                    "'{}' ends on {} after the project end {end}",
                    phase.name,
                    phase.due_date()
                ));
            }
        }
    }
    report
}
