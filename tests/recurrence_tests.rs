use chrono::NaiveDate;
use plan_calendar::{EndCondition, MonthlyPattern, RecurrenceRule, RecurrenceType, expand};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dates(rule: &RecurrenceRule, anchor: NaiveDate, window_end: NaiveDate) -> Vec<NaiveDate> {
    expand(rule, anchor, window_end)
        .expect("valid rule")
        .collect()
}

#[test]
fn weekly_every_two_weeks_with_count() {
    let rule = RecurrenceRule::weekly(2).count(3);
    assert_eq!(
        dates(&rule, d(2024, 1, 1), d(2024, 12, 31)),
        vec![d(2024, 1, 1), d(2024, 1, 15), d(2024, 1, 29)]
    );
}

#[test]
fn weekly_defaults_to_anchor_weekday() {
    // 2024-01-03 is a Wednesday
    let rule = RecurrenceRule::weekly(1).count(3);
    assert_eq!(
        dates(&rule, d(2024, 1, 3), d(2024, 12, 31)),
        vec![d(2024, 1, 3), d(2024, 1, 10), d(2024, 1, 17)]
    );
}

#[test]
fn weekly_explicit_weekday_starts_on_next_match() {
    // Anchor Monday, rule on Friday (5)
    let rule = RecurrenceRule::weekly(1).on_weekday(5).count(2);
    assert_eq!(
        dates(&rule, d(2024, 1, 1), d(2024, 12, 31)),
        vec![d(2024, 1, 5), d(2024, 1, 12)]
    );
}

#[test]
fn daily_until_includes_matching_end_date() {
    let rule = RecurrenceRule::daily(3).until(d(2024, 1, 10));
    assert_eq!(
        dates(&rule, d(2024, 1, 1), d(2024, 12, 31)),
        vec![d(2024, 1, 1), d(2024, 1, 4), d(2024, 1, 7), d(2024, 1, 10)]
    );
}

#[test]
fn never_ending_rule_stops_at_window() {
    let rule = RecurrenceRule::daily(1);
    let got = dates(&rule, d(2024, 1, 1), d(2024, 1, 5));
    assert_eq!(got.len(), 5);
    assert_eq!(got.last().copied(), Some(d(2024, 1, 5)));
}

#[test]
fn window_cuts_before_count_is_reached() {
    let rule = RecurrenceRule::weekly(1).count(10);
    let got = dates(&rule, d(2024, 1, 1), d(2024, 1, 20));
    assert_eq!(got, vec![d(2024, 1, 1), d(2024, 1, 8), d(2024, 1, 15)]);
}

#[test]
fn monthly_by_date_clamps_to_short_months() {
    let rule = RecurrenceRule::monthly_by_date(1, 31);
    assert_eq!(
        dates(&rule, d(2024, 1, 31), d(2024, 4, 30)),
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30)]
    );
    assert_eq!(
        dates(&rule, d(2023, 1, 31), d(2023, 4, 30)),
        vec![d(2023, 1, 31), d(2023, 2, 28), d(2023, 3, 31), d(2023, 4, 30)]
    );
}

#[test]
fn monthly_by_date_skips_day_before_anchor() {
    let rule = RecurrenceRule::monthly_by_date(1, 5);
    assert_eq!(
        dates(&rule, d(2024, 1, 20), d(2024, 3, 31)),
        vec![d(2024, 2, 5), d(2024, 3, 5)]
    );
}

#[test]
fn monthly_without_pattern_uses_anchor_day() {
    let rule = RecurrenceRule {
        recurrence_type: RecurrenceType::Monthly,
        interval: 2,
        weekly_day_of_week: None,
        monthly_pattern: None,
        monthly_date: None,
        monthly_week_of_month: None,
        monthly_day_of_week: None,
        end_condition: EndCondition::AfterCount(3),
    };
    assert_eq!(
        dates(&rule, d(2024, 1, 15), d(2025, 12, 31)),
        vec![d(2024, 1, 15), d(2024, 3, 15), d(2024, 5, 15)]
    );
}

#[test]
fn monthly_without_pattern_prefers_day_of_month() {
    let rule = RecurrenceRule {
        monthly_pattern: None,
        ..RecurrenceRule::monthly_by_date(1, 20).count(2)
    };
    let anchor = d(2024, 1, 15);
    assert_eq!(
        dates(&rule, anchor, d(2024, 12, 31)),
        vec![d(2024, 1, 20), d(2024, 2, 20)]
    );
    assert_eq!(rule.describe(anchor), "Every month on day 20, 2 times");

    let out_of_range = RecurrenceRule { monthly_date: Some(32), ..rule };
    assert!(!out_of_range.validate(anchor).is_valid());
}

#[test]
fn monthly_weekday_ordinals() {
    let window_end = d(2024, 3, 31);

    let first_monday = RecurrenceRule::monthly_by_weekday(1, 1, 1);
    assert_eq!(
        dates(&first_monday, d(2024, 1, 1), window_end),
        vec![d(2024, 1, 1), d(2024, 2, 5), d(2024, 3, 4)]
    );

    let second_to_last_friday = RecurrenceRule::monthly_by_weekday(1, 5, 5);
    assert_eq!(
        dates(&second_to_last_friday, d(2024, 1, 1), window_end),
        vec![d(2024, 1, 19), d(2024, 2, 16), d(2024, 3, 22)]
    );

    let last_friday = RecurrenceRule::monthly_by_weekday(1, 6, 5);
    assert_eq!(
        dates(&last_friday, d(2024, 1, 1), window_end),
        vec![d(2024, 1, 26), d(2024, 2, 23), d(2024, 3, 29)]
    );
}

#[test]
fn yearly_leap_day_clamps_in_common_years() {
    let rule = RecurrenceRule::yearly(1).count(5);
    assert_eq!(
        dates(&rule, d(2024, 2, 29), d(2030, 12, 31)),
        vec![
            d(2024, 2, 29),
            d(2025, 2, 28),
            d(2026, 2, 28),
            d(2027, 2, 28),
            d(2028, 2, 29),
        ]
    );
}

#[test]
fn occurrences_can_be_restarted() {
    let rule = RecurrenceRule::weekly(1).count(4);
    let mut occurrences = expand(&rule, d(2024, 1, 1), d(2024, 12, 31)).unwrap();
    let fresh = occurrences.clone();
    let first: Vec<_> = occurrences.by_ref().collect();
    assert_eq!(occurrences.next(), None);
    let again: Vec<_> = occurrences.restarted().collect();
    let cloned: Vec<_> = fresh.collect();
    assert_eq!(first, again);
    assert_eq!(first, cloned);
}

#[test]
fn validation_collects_every_problem() {
    let mut rule = RecurrenceRule::monthly_by_weekday(0, 1, 1).count(0);
    rule.monthly_week_of_month = None;
    rule.monthly_day_of_week = Some(9);

    let report = rule.validate(d(2024, 1, 1));
    assert!(!report.is_valid());
    assert_eq!(report.errors().len(), 4, "{:?}", report.errors());
    assert!(expand(&rule, d(2024, 1, 1), d(2024, 12, 31)).is_err());
}

#[test]
fn end_date_must_follow_anchor() {
    let rule = RecurrenceRule::daily(1).until(d(2024, 1, 1));
    let report = rule.validate(d(2024, 1, 1));
    assert!(!report.is_valid());
    assert!(report.errors()[0].contains("must be after the start date"));
}

#[test]
fn by_date_pattern_requires_day_of_month() {
    let mut rule = RecurrenceRule::monthly_by_date(1, 40);
    let report = rule.validate(d(2024, 1, 1));
    assert_eq!(report.errors().len(), 1);

    rule.monthly_date = None;
    let report = rule.validate(d(2024, 1, 1));
    assert!(report.errors()[0].contains("requires a day of month"));
}

#[test]
fn rule_round_trips_through_json() {
    let rule = RecurrenceRule::monthly_by_weekday(1, 6, 5).until(d(2024, 12, 31));
    let json = serde_json::to_value(&rule).unwrap();
    assert_eq!(json["type"], "monthly");
    assert_eq!(json["monthlyPattern"], "byWeekdayOrdinal");
    assert_eq!(json["endCondition"]["kind"], "onDate");

    let back: RecurrenceRule = serde_json::from_value(json).unwrap();
    assert_eq!(back, rule);
    assert_eq!(back.monthly_pattern, Some(MonthlyPattern::ByWeekdayOrdinal));
}

#[test]
fn describe_reads_naturally() {
    assert_eq!(
        RecurrenceRule::weekly(2).describe(d(2024, 1, 1)),
        "Every 2 weeks on Monday"
    );
    assert_eq!(
        RecurrenceRule::monthly_by_weekday(1, 6, 5).describe(d(2024, 1, 1)),
        "Every month on the last Friday"
    );
    assert_eq!(
        RecurrenceRule::daily(1).count(3).describe(d(2024, 1, 1)),
        "Every day, 3 times"
    );
}
