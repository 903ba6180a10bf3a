use chrono::{NaiveDate, Weekday};
use plan_calendar::{
    ConfigError, Holiday, PlannerConfig, WeeklySchedule, WorkCalendar, WorkCalendarConfig,
};
use std::fs;
use tempfile::TempDir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn defaults() {
    let config = PlannerConfig::default();
    assert_eq!(config.continuous_horizon_days, 365);
    assert_eq!(config.budget_warning_percent, 90.0);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.capacity, 256);
    assert_eq!(config.cache.ttl_seconds, 300);
}

#[test]
fn partial_json_keeps_defaults() {
    let config =
        PlannerConfig::from_json_str(r#"{"continuousHorizonDays": 90, "cache": {"ttlSeconds": 5}}"#)
            .unwrap();
    assert_eq!(config.continuous_horizon_days, 90);
    assert_eq!(config.budget_warning_percent, 90.0);
    assert_eq!(config.cache.ttl_seconds, 5);
    assert_eq!(config.cache.capacity, 256);
}

#[test]
fn invalid_values_are_rejected() {
    let err = PlannerConfig::from_json_str(r#"{"continuousHorizonDays": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = PlannerConfig::from_json_str(r#"{"budgetWarningPercent": 150}"#).unwrap_err();
    assert!(err.to_string().contains("between 0 and 100"));

    let err = PlannerConfig::from_json_str(r#"{"cache": {"capacity": 0}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    // A disabled cache does not need a capacity
    assert!(PlannerConfig::from_json_str(r#"{"cache": {"enabled": false, "capacity": 0}}"#).is_ok());

    let err = PlannerConfig::from_json_str("{not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("planner.json");
    fs::write(&path, r#"{"budgetWarningPercent": 75}"#).unwrap();

    let config = PlannerConfig::load(&path).unwrap();
    assert_eq!(config.budget_warning_percent, 75.0);

    let missing = dir.path().join("missing.json");
    match PlannerConfig::load(&missing) {
        Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn calendar_config_loads_and_builds_calendar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calendar.json");
    fs::write(
        &path,
        r#"{
            "schedule": {
                "monday": [{"startTime": "08:00", "endTime": "12:00"}],
                "wednesday": [{"startTime": "13:30", "endTime": "17:00"}]
            },
            "holidays": [
                {"title": "Spring break", "startDate": "2025-03-10", "endDate": "2025-03-14"}
            ]
        }"#,
    )
    .unwrap();

    let config = WorkCalendarConfig::load(&path).unwrap();
    assert_eq!(config.holidays().len(), 1);
    let calendar = WorkCalendar::from_config(&config).unwrap();

    assert_eq!(calendar.schedule().hours_on(Weekday::Mon), 4.0);
    assert_eq!(calendar.schedule().hours_on(Weekday::Wed), 3.5);
    assert!(!calendar.is_working_day(d(2025, 3, 10)));
    assert!(calendar.is_working_day(d(2025, 3, 17)));
    assert!(!calendar.is_working_day(d(2025, 3, 18)));
}

#[test]
fn calendar_without_hours_is_rejected() {
    let config = WorkCalendarConfig::new(
        WeeklySchedule::new(),
        vec![Holiday::single_day("Solstice", d(2025, 6, 21))],
    );
    assert!(WorkCalendar::from_config(&config).is_err());
}
