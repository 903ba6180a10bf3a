use crate::error::ValidationReport;
use crate::project::{CalendarEvent, EventCategory, Phase, Project};
use chrono::NaiveDate;
use std::collections::HashSet;

const EPSILON: f64 = 1e-6;

fn check_hours(report: &mut ValidationReport, label: &str, hours: f64) {
    if !hours.is_finite() || hours < -EPSILON {
        report.error(format!(
            "{label} must be a non-negative number of hours (got {hours})"
        ));
    }
}

pub fn validate_project(project: &Project) -> ValidationReport {
    let mut report = ValidationReport::new();

    if project.name.trim().is_empty() {
        report.error("Project name is required");
    }
    check_hours(&mut report, "Project estimated hours", project.estimated_hours);

    match (project.continuous, project.end_date) {
        (false, None) => report.error("Project end date is required unless the project is continuous"),
        (false, Some(end)) if end < project.start_date => report.error(format!(
            "Project end date {end} is before its start date {}",
            project.start_date
        )),
        _ => {}
    }

    report
}

/// Checks a single phase against its own invariants and its project's span.
/// Continuous projects only bound phases from below.
pub fn validate_phase(phase: &Phase, project: &Project) -> ValidationReport {
    let mut report = ValidationReport::new();
    let label = if phase.name.trim().is_empty() {
        format!("Phase {}", phase.id)
    } else {
        format!("Phase '{}'", phase.name)
    };

    if phase.project_id != project.id {
        report.error(format!(
            "{label} belongs to project {} not {}",
            phase.project_id, project.id
        ));
    }
    if phase.name.trim().is_empty() {
        report.error(format!("{label} requires a name"));
    }
    check_hours(
        &mut report,
        &format!("{label} time allocation"),
        phase.time_allocation_hours,
    );

    if let Some(start) = phase.start_date {
        if start > phase.end_date {
            report.error(format!(
                "{label} end date {} is before its start date {start}",
                phase.end_date
            ));
        }
    }

    if phase.span_start() < project.start_date {
        report.error(format!(
            "{label} starts on {} before the project start {}",
            phase.span_start(),
            project.start_date
        ));
    }
    if !project.continuous {
        if let Some(project_end) = project.end_date {
            if phase.end_date > project_end {
                report.error(format!(
                    "{label} ends on {} after the project end {project_end}",
                    phase.end_date
                ));
            }
        }
    }

    if let Some(rule) = &phase.recurrence {
        report.merge(rule.validate(phase.end_date));
    }

    report
}

/// Validates every phase of a project together with the collection rules:
/// unique ids, at most one recurring template, and no ad hoc phases next to
/// a template.
pub fn validate_phase_collection(project: &Project, phases: &[Phase]) -> ValidationReport {
    let mut report = ValidationReport::new();
    let mut seen_ids = HashSet::with_capacity(phases.len());

    for phase in phases.iter().filter(|p| !p.is_instance()) {
        if !seen_ids.insert(phase.id) {
            report.error(format!("Duplicate phase id {}", phase.id));
        }
        report.merge(validate_phase(phase, project));
    }

    let templates = phases.iter().filter(|p| p.is_template()).count();
    let ad_hoc = phases
        .iter()
        .filter(|p| !p.is_template() && !p.is_instance())
        .count();
    if templates > 1 {
        report.error(format!(
            "A project may have only one recurring milestone (found {templates})"
        ));
    }
    if templates > 0 && ad_hoc > 0 {
        report.error(
            "A project cannot mix a recurring milestone with individual milestones or phases",
        );
    }

    report
}

fn is_hex_color(color: &str) -> bool {
    let Some(digits) = color.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn validate_event(event: &CalendarEvent) -> ValidationReport {
    let mut report = ValidationReport::new();

    if event.title.trim().is_empty() {
        report.error("Event title is required");
    }

    match event.category {
        EventCategory::Task => {
            if event.end_time != event.start_time {
                report.error("Tasks must have the same start and end time");
            }
        }
        EventCategory::Event | EventCategory::Habit => {
            if event.end_time <= event.start_time {
                report.error(format!(
                    "Event end time {} must be after its start time {}",
                    event.end_time, event.start_time
                ));
            }
        }
    }

    if event.project_id.is_some() && event.category != EventCategory::Event {
        report.error("Only events can be linked to a project");
    }

    if !is_hex_color(&event.color) {
        report.error(format!(
            "Event color '{}' must be a hex color like #1a2b3c",
            event.color
        ));
    }

    report
}

/// Form-level check for a holiday before it is constructed.
pub fn validate_holiday(title: &str, start_date: NaiveDate, end_date: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::new();
    if title.trim().is_empty() {
        report.error("Holiday title is required");
    }
    if end_date < start_date {
        report.error(format!(
            "Holiday end date {end_date} is before its start date {start_date}"
        ));
    }
    report
}
