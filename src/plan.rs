use crate::allocation::{BudgetAnalysis, analyze_budget, validate_budget};
use crate::config::PlannerConfig;
use crate::envelope::{DateAdjustment, synchronize_project_with_phases, validate_phases_within_project};
use crate::error::ValidationReport;
use crate::overlap::DateRange;
use crate::project::{Phase, Project};
use crate::recurrence;
use crate::validation::{validate_phase, validate_phase_collection, validate_project};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a project's milestones are defined. Individual phases and a recurring
/// milestone are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanMode {
    Empty,
    Phases,
    Recurring,
}

/// Expands a recurring template into its occurrences within the project's
/// span (or the continuous horizon).
pub fn expand_template(
    template: &Phase,
    project: &Project,
    today: NaiveDate,
    horizon_days: u32,
) -> Result<Vec<Phase>, ValidationReport> {
    let Some(rule) = &template.recurrence else {
        return Err(ValidationReport::with_error(format!(
            "Phase '{}' is not a recurring milestone",
            template.name
        )));
    };
    let window_end = project.effective_end(today, horizon_days);
    let occurrences = recurrence::expand(rule, template.due_date(), window_end)?;
    Ok(occurrences
        .enumerate()
        .map(|(idx, due)| template.instance(idx as u32, due))
        .collect())
}

/// A project together with its stored phases: individual milestones/phases or
/// a single recurring template. Every edit is validated before it is applied.
#[derive(Debug, Clone)]
pub struct ProjectPlan {
    project: Project,
    phases: Vec<Phase>,
    config: PlannerConfig,
}

impl ProjectPlan {
    pub fn new(project: Project, config: PlannerConfig) -> Result<Self, ValidationReport> {
        validate_project(&project).into_result()?;
        Ok(Self {
            project,
            phases: Vec::new(),
            config,
        })
    }

    /// Rebuilds a plan from stored records, checking them as a whole.
    pub fn with_phases(
        project: Project,
        phases: Vec<Phase>,
        config: PlannerConfig,
    ) -> Result<Self, ValidationReport> {
        let mut report = validate_project(&project);
        report.merge(validate_phase_collection(&project, &phases));
        report.into_result()?;
        let mut plan = Self {
            project,
            phases,
            config,
        };
        plan.sort_phases();
        Ok(plan)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Stored phases, including a recurring template but never its instances.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn mode(&self) -> PlanMode {
        if self.recurring_template().is_some() {
            PlanMode::Recurring
        } else if self.phases.is_empty() {
            PlanMode::Empty
        } else {
            PlanMode::Phases
        }
    }

    pub fn recurring_template(&self) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.is_template())
    }

    pub fn phase(&self, id: i32) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id == id)
    }

    fn sort_phases(&mut self) {
        self.phases.sort_by(|a, b| {
            a.due_date()
                .cmp(&b.due_date())
                .then_with(|| a.order.cmp(&b.order))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    /// Replaces the project record. The new span must still hold every phase
    /// and the new budget must still cover the allocations.
    pub fn set_project(
        &mut self,
        project: Project,
        today: NaiveDate,
    ) -> Result<ValidationReport, ValidationReport> {
        let mut report = validate_project(&project);
        if project.id != self.project.id {
            report.error(format!(
                "Cannot replace project {} with project {}",
                self.project.id, project.id
            ));
        }
        report.merge(validate_phases_within_project(&project, &self.phases));
        if let Some(template) = self.recurring_template() {
            // Occurrences start at the anchor, so the anchor must stay in span.
            report.merge(validate_phase(template, &project));
        }
        let milestones = self.milestones_for(&project, &self.phases, today)?;
        report.merge(validate_budget(
            &project,
            &milestones,
            self.config.budget_warning_percent,
        ));
        let report = report.into_result()?;
        self.project = project;
        Ok(report)
    }

    pub fn set_estimated_hours(
        &mut self,
        estimated_hours: f64,
        today: NaiveDate,
    ) -> Result<ValidationReport, ValidationReport> {
        let mut project = self.project.clone();
        project.estimated_hours = estimated_hours;
        self.set_project(project, today)
    }

    /// Inserts or replaces an individual milestone or phase.
    pub fn upsert_phase(
        &mut self,
        phase: Phase,
        today: NaiveDate,
    ) -> Result<ValidationReport, ValidationReport> {
        if phase.is_template() {
            return Err(ValidationReport::with_error(
                "Recurring milestones are set with set_recurring_template",
            ));
        }
        if phase.is_instance() {
            return Err(ValidationReport::with_error(
                "Occurrences of a recurring milestone cannot be edited individually",
            ));
        }
        if let Some(template) = self.recurring_template() {
            tracing::warn!(
                project = self.project.id,
                template = template.id,
                "rejected phase while a recurring milestone is active"
            );
            return Err(ValidationReport::with_error(format!(
                "Project has recurring milestone '{}'; delete it before adding individual phases",
                template.name
            )));
        }

        let mut report = validate_phase(&phase, &self.project);
        let mut candidate: Vec<Phase> = self
            .phases
            .iter()
            .filter(|existing| existing.id != phase.id)
            .cloned()
            .collect();
        candidate.push(phase);
        let milestones = self.milestones_for(&self.project, &candidate, today)?;
        report.merge(validate_budget(
            &self.project,
            &milestones,
            self.config.budget_warning_percent,
        ));
        let report = report.into_result()?;

        self.phases = candidate;
        self.sort_phases();
        Ok(report)
    }

    /// Makes `template` the project's recurring milestone.
    ///
    /// Individual phases are cleared first and returned to the caller; an
    /// existing template may only be replaced by one with the same id.
    pub fn set_recurring_template(
        &mut self,
        template: Phase,
        today: NaiveDate,
    ) -> Result<Vec<Phase>, ValidationReport> {
        if !template.is_template() {
            return Err(ValidationReport::with_error(format!(
                "Phase '{}' has no recurrence rule",
                template.name
            )));
        }
        if let Some(existing) = self.recurring_template() {
            if existing.id != template.id {
                return Err(ValidationReport::with_error(format!(
                    "Project already has recurring milestone '{}'",
                    existing.name
                )));
            }
        }

        let mut report = validate_phase(&template, &self.project);
        if report.is_valid() {
            let instances = expand_template(
                &template,
                &self.project,
                today,
                self.config.continuous_horizon_days,
            )?;
            report.merge(validate_budget(
                &self.project,
                &instances,
                self.config.budget_warning_percent,
            ));
        }
        report.into_result()?;

        let cleared: Vec<Phase> = self.phases.drain(..).filter(|p| !p.is_template()).collect();
        if !cleared.is_empty() {
            tracing::debug!(
                project = self.project.id,
                cleared = cleared.len(),
                "cleared phases for recurring milestone"
            );
        }
        self.phases.push(template);
        Ok(cleared)
    }

    /// Removes a stored phase. Deleting a recurring template removes all of
    /// its occurrences with it since they are only ever derived.
    pub fn delete_phase(&mut self, id: i32) -> Option<Phase> {
        let idx = self.phases.iter().position(|phase| phase.id == id)?;
        let removed = self.phases.remove(idx);
        if removed.is_template() {
            tracing::debug!(
                project = self.project.id,
                template = removed.id,
                "deleted recurring milestone and its occurrences"
            );
        }
        Some(removed)
    }

    /// Occurrences of the recurring template, regenerated on every call.
    pub fn recurring_instances(&self, today: NaiveDate) -> Vec<Phase> {
        let Some(template) = self.recurring_template() else {
            return Vec::new();
        };
        match expand_template(
            template,
            &self.project,
            today,
            self.config.continuous_horizon_days,
        ) {
            Ok(instances) => instances,
            Err(report) => {
                tracing::warn!(template = template.id, %report, "recurring milestone not expanded");
                Vec::new()
            }
        }
    }

    fn milestones_for(
        &self,
        project: &Project,
        phases: &[Phase],
        today: NaiveDate,
    ) -> Result<Vec<Phase>, ValidationReport> {
        match phases.iter().find(|phase| phase.is_template()) {
            Some(template) => {
                expand_template(template, project, today, self.config.continuous_horizon_days)
            }
            None => Ok(phases.to_vec()),
        }
    }

    /// Concrete milestones: individual phases, or the template's occurrences.
    pub fn milestones(&self, today: NaiveDate) -> Vec<Phase> {
        match self.mode() {
            PlanMode::Recurring => self.recurring_instances(today),
            PlanMode::Phases | PlanMode::Empty => self.phases.clone(),
        }
    }

    pub fn analyze_budget(&self, today: NaiveDate) -> BudgetAnalysis {
        analyze_budget(&self.project, &self.milestones(today))
    }

    pub fn budget_report(&self, today: NaiveDate) -> ValidationReport {
        validate_budget(
            &self.project,
            &self.milestones(today),
            self.config.budget_warning_percent,
        )
    }

    /// Full consistency check of the stored plan.
    pub fn validate(&self, today: NaiveDate) -> ValidationReport {
        let mut report = validate_project(&self.project);
        report.merge(validate_phase_collection(&self.project, &self.phases));
        report.merge(self.budget_report(today));
        report
    }

    pub fn synchronize_dates(&self) -> Option<DateAdjustment> {
        synchronize_project_with_phases(&self.project, &self.phases)
    }

    pub fn apply_date_adjustment(&mut self, adjustment: &DateAdjustment) {
        self.project.apply_adjustment(adjustment);
    }

    /// Date span of the project; continuous projects use the horizon.
    pub fn project_range(&self, today: NaiveDate) -> DateRange {
        let end = self
            .project
            .effective_end(today, self.config.continuous_horizon_days)
            .max(self.project.start_date);
        DateRange::new(self.project.start_date, end)
            .unwrap_or_else(|_| DateRange::single(self.project.start_date))
    }

    /// Date spans of the stored individual phases, excluding `except`.
    pub fn phase_ranges(&self, except: Option<i32>) -> Vec<DateRange> {
        self.phases
            .iter()
            .filter(|phase| !phase.is_template() && Some(phase.id) != except)
            .filter_map(|phase| DateRange::new(phase.span_start(), phase.due_date()).ok())
            .collect()
    }
}
