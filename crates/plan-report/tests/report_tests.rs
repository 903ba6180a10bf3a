use chrono::{NaiveDate, NaiveDateTime};
use plan_calendar::{
    CalendarEvent, Holiday, Phase, Planner, PlannerConfig, Project, ProjectPlan, RecurrenceRule,
    WeeklySchedule, WorkCalendar,
};
use plan_report::{
    allocation_frame, daily_load, load_frame, portfolio_frame, portfolio_summaries,
};
use polars::prelude::*;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap()
}

fn planner() -> Planner {
    let calendar = WorkCalendar::new(
        WeeklySchedule::standard(),
        vec![Holiday::single_day("New Year", d(2025, 1, 1))],
    )
    .unwrap();
    Planner::with_configured_cache(PlannerConfig::default(), calendar)
}

fn plans() -> Vec<ProjectPlan> {
    let config = PlannerConfig::default();

    let retainer = Project::new(1, "Retainer", d(2025, 1, 1), d(2025, 1, 31), 110.0);
    let retainer = ProjectPlan::new(retainer, config.clone()).unwrap();

    let launch = Project::new(2, "Launch", d(2025, 1, 1), d(2025, 1, 10), 100.0);
    let mut launch = ProjectPlan::new(launch, config.clone()).unwrap();
    launch
        .upsert_phase(Phase::milestone(1, 2, "Release", d(2025, 1, 10), 100.0), d(2025, 1, 1))
        .unwrap();

    let sync = Project::new(3, "Sync", d(2025, 1, 1), d(2025, 1, 31), 5.0);
    let mut sync = ProjectPlan::new(sync, config).unwrap();
    sync.set_recurring_template(
        Phase::recurring(5, 3, "Weekly", d(2025, 1, 3), 1.0, RecurrenceRule::weekly(1)),
        d(2025, 1, 1),
    )
    .unwrap();

    vec![retainer, launch, sync]
}

#[test]
fn allocation_frame_has_one_row_per_day() -> PolarsResult<()> {
    let planner = planner();
    let plans = plans();
    let map = planner.daily_allocations(&plans[1], &[], d(2025, 1, 1), d(2025, 1, 12), d(2025, 1, 1));

    let df = allocation_frame(&map)?;
    assert_eq!(df.height(), 12);
    assert_eq!(
        df.get_column_names_str(),
        vec!["date", "kind", "hours", "is_working_day", "milestone_count"]
    );

    let kinds = df.column("kind")?.str()?;
    assert_eq!(kinds.get(0), Some("milestone"));
    assert_eq!(kinds.get(10), Some("none"));

    let milestones = df.column("milestone_count")?.u32()?;
    assert_eq!(milestones.get(9), Some(1));

    let hours = df.column("hours")?.f64()?;
    assert!((hours.sum().unwrap_or(0.0) - 100.0).abs() < 1e-9);
    assert_eq!(df.column("date")?.dtype(), &DataType::Date);
    Ok(())
}

#[test]
fn portfolio_summaries_keep_input_order() -> PolarsResult<()> {
    let planner = planner();
    let plans = plans();
    let events = vec![
        CalendarEvent::new(1, "Workshop", at(d(2025, 1, 2), 9), at(d(2025, 1, 2), 12)).for_project(1),
    ];

    let summaries =
        portfolio_summaries(&planner, &plans, &events, d(2025, 1, 1), d(2025, 1, 31), d(2025, 1, 1));
    let ids: Vec<_> = summaries.iter().map(|s| s.project_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // 22 working days in January 2025 after New Year; the workshop day is planned
    assert_eq!(summaries[0].working_days, 22);
    assert!((summaries[0].allocated_hours - (110.0 - 5.0 + 3.0)).abs() < 1e-9);
    assert_eq!(summaries[1].milestone_hours, 100.0);
    assert!(!summaries[1].is_over_budget);
    assert_eq!(summaries[2].milestone_hours, 5.0);
    assert_eq!(summaries[2].utilization_percentage, 100.0);
    assert!(!summaries[2].is_over_budget);

    let df = portfolio_frame(&summaries)?;
    assert_eq!(df.height(), 3);
    let names = df.column("name")?.str()?;
    assert_eq!(names.get(2), Some("Sync"));
    Ok(())
}

#[test]
fn daily_load_compares_against_capacity() -> PolarsResult<()> {
    let planner = planner();
    let plans = plans();

    let load = daily_load(&planner, &plans, &[], d(2025, 1, 1), d(2025, 1, 7), d(2025, 1, 1));
    assert_eq!(load.len(), 7);

    // Milestone shares still land on the holiday; the retainer estimate does not
    let sync_share = 1.0 / 3.0;
    assert_eq!(load[0].capacity_hours, 0.0);
    assert!((load[0].allocated_hours - (10.0 + sync_share)).abs() < 1e-9);
    assert!(load[0].is_overloaded());

    // Thursday: 5h retainer estimate, 10h launch share, a third of the first sync
    assert_eq!(load[1].capacity_hours, 8.0);
    assert!((load[1].allocated_hours - (15.0 + sync_share)).abs() < 1e-9);

    let df = load_frame(&load)?;
    assert_eq!(df.height(), 7);
    let overloaded = df.column("overloaded")?.bool()?;
    assert_eq!(overloaded.get(1), Some(true));

    assert!(daily_load(&planner, &plans, &[], d(2025, 1, 7), d(2025, 1, 1), d(2025, 1, 1)).is_empty());
    Ok(())
}
