pub mod allocation;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod envelope;
pub mod error;
pub mod overlap;
pub mod plan;
pub mod planner;
pub mod project;
pub mod recurrence;
pub mod validation;
pub mod work_schedule;

pub use allocation::{
    AllocationKind, AllocationMap, BudgetAnalysis, DailyAllocation, DailyAllocator, MilestoneRef,
    MilestoneShare, analyze_budget, distribute, planned_hours, validate_budget,
};
pub use cache::{CacheStats, ComputationCache};
pub use calendar::{
    Holiday, WorkCalendar, WorkCalendarConfig, count_working_days, daily_capacity_hours,
    enumerate_working_days, is_working_day,
};
pub use config::{CacheConfig, PlannerConfig};
pub use envelope::{DateAdjustment, synchronize_project_with_phases, validate_phases_within_project};
pub use error::{CalendarError, ConfigError, ValidationReport};
pub use overlap::{DateRange, SearchDirection, find_nearest_available_slot, overlaps};
pub use plan::{PlanMode, ProjectPlan, expand_template};
pub use planner::Planner;
pub use project::{CalendarEvent, EventCategory, Phase, Project};
pub use recurrence::{EndCondition, MonthlyPattern, Occurrences, RecurrenceRule, RecurrenceType, expand};
pub use work_schedule::{WeeklySchedule, WorkSlot};
