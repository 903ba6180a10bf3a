use crate::portfolio::{DailyLoad, ProjectSummary};
use chrono::NaiveDate;
use plan_calendar::{AllocationKind, AllocationMap};
use polars::prelude::PlSmallStr;
use polars::prelude::*;

fn date_to_i32(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date_column(name: &'static str, dates: Vec<i32>) -> PolarsResult<Column> {
    Ok(Series::new(PlSmallStr::from_static(name), dates)
        .cast(&DataType::Date)?
        .into_column())
}

pub fn kind_label(kind: AllocationKind) -> &'static str {
    match kind {
        AllocationKind::None => "none",
        AllocationKind::Planned => "planned",
        AllocationKind::AutoEstimate => "auto-estimate",
        AllocationKind::Milestone => "milestone",
    }
}

/// One row per day: `date`, `kind`, `hours`, `is_working_day`,
/// `milestone_count`.
pub fn allocation_frame(map: &AllocationMap) -> PolarsResult<DataFrame> {
    let mut dates = Vec::with_capacity(map.len());
    let mut kinds = Vec::with_capacity(map.len());
    let mut hours = Vec::with_capacity(map.len());
    let mut working = Vec::with_capacity(map.len());
    let mut milestones = Vec::with_capacity(map.len());

    for (date, day) in map {
        dates.push(date_to_i32(*date));
        kinds.push(kind_label(day.kind));
        hours.push(day.hours);
        working.push(day.is_working_day);
        milestones.push(day.milestones.len() as u32);
    }

    DataFrame::new(vec![
        date_column("date", dates)?,
        Series::new(PlSmallStr::from_static("kind"), kinds).into_column(),
        Series::new(PlSmallStr::from_static("hours"), hours).into_column(),
        Series::new(PlSmallStr::from_static("is_working_day"), working).into_column(),
        Series::new(PlSmallStr::from_static("milestone_count"), milestones).into_column(),
    ])
}

pub fn portfolio_frame(summaries: &[ProjectSummary]) -> PolarsResult<DataFrame> {
    let ids: Vec<i32> = summaries.iter().map(|s| s.project_id).collect();
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    let estimated: Vec<f64> = summaries.iter().map(|s| s.estimated_hours).collect();
    let allocated: Vec<f64> = summaries.iter().map(|s| s.allocated_hours).collect();
    let milestone: Vec<f64> = summaries.iter().map(|s| s.milestone_hours).collect();
    let utilization: Vec<f64> = summaries.iter().map(|s| s.utilization_percentage).collect();
    let over: Vec<bool> = summaries.iter().map(|s| s.is_over_budget).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("project_id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("estimated_hours"), estimated).into_column(),
        Series::new(PlSmallStr::from_static("allocated_hours"), allocated).into_column(),
        Series::new(PlSmallStr::from_static("milestone_hours"), milestone).into_column(),
        Series::new(PlSmallStr::from_static("utilization_percentage"), utilization).into_column(),
        Series::new(PlSmallStr::from_static("is_over_budget"), over).into_column(),
    ])
}

/// `date`, `allocated_hours`, `capacity_hours`, `overloaded`.
pub fn load_frame(load: &[DailyLoad]) -> PolarsResult<DataFrame> {
    let dates: Vec<i32> = load.iter().map(|l| date_to_i32(l.date)).collect();
    let allocated: Vec<f64> = load.iter().map(|l| l.allocated_hours).collect();
    let capacity: Vec<f64> = load.iter().map(|l| l.capacity_hours).collect();
    let overloaded: Vec<bool> = load.iter().map(DailyLoad::is_overloaded).collect();

    DataFrame::new(vec![
        date_column("date", dates)?,
        Series::new(PlSmallStr::from_static("allocated_hours"), allocated).into_column(),
        Series::new(PlSmallStr::from_static("capacity_hours"), capacity).into_column(),
        Series::new(PlSmallStr::from_static("overloaded"), overloaded).into_column(),
    ])
}
