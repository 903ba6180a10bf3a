//! Property tests for the pure calendar functions.

use chrono::{Days, NaiveDate};
use plan_calendar::{
    DateRange, Holiday, Phase, Project, RecurrenceRule, SearchDirection, WeeklySchedule,
    daily_capacity_hours, distribute, expand, find_nearest_available_slot, is_working_day,
    overlaps,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: u64) -> NaiveDate {
    base().checked_add_days(Days::new(offset)).unwrap()
}

fn rule_strategy() -> impl Strategy<Value = RecurrenceRule> {
    prop_oneof![
        (1u32..5).prop_map(RecurrenceRule::daily),
        (1u32..5, 0u8..7).prop_map(|(i, dow)| RecurrenceRule::weekly(i).on_weekday(dow)),
        (1u32..4, 1u32..32).prop_map(|(i, dom)| RecurrenceRule::monthly_by_date(i, dom)),
        (1u32..4, 1u8..7, 0u8..7)
            .prop_map(|(i, week, dow)| RecurrenceRule::monthly_by_weekday(i, week, dow)),
        (1u32..3).prop_map(RecurrenceRule::yearly),
    ]
}

fn range_strategy() -> impl Strategy<Value = DateRange> {
    (0u64..120, 0u64..10).prop_map(|(start, len)| DateRange::new(day(start), day(start + len)).unwrap())
}

proptest! {
    #[test]
    fn occurrences_are_increasing_and_bounded(
        rule in rule_strategy(),
        anchor in 0u64..400,
        window in 0u64..900,
    ) {
        let anchor = day(anchor);
        let window_end = anchor.checked_add_days(Days::new(window)).unwrap();
        let dates: Vec<_> = expand(&rule, anchor, window_end).unwrap().collect();

        for pair in dates.windows(2) {
            prop_assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        for date in &dates {
            prop_assert!(*date >= anchor && *date <= window_end);
        }
    }

    #[test]
    fn count_limit_is_respected(rule in rule_strategy(), count in 1u32..10) {
        let anchor = day(0);
        let window_end = day(20_000);
        let dates: Vec<_> = expand(&rule.count(count), anchor, window_end).unwrap().collect();
        prop_assert_eq!(dates.len(), count as usize);
    }

    #[test]
    fn distribution_conserves_milestone_hours(
        dues in prop::collection::vec((0u64..60, 0.0f64..50.0), 1..6),
    ) {
        let project = Project::new(1, "Budget", day(0), day(60), 1000.0);
        let milestones: Vec<Phase> = dues
            .iter()
            .enumerate()
            .map(|(idx, (offset, hours))| {
                Phase::milestone(idx as i32 + 1, 1, format!("M{idx}"), day(*offset), *hours)
            })
            .collect();

        let shares = distribute(&project, &milestones);
        let allocated: f64 = shares.values().map(|share| share.hours).sum();
        let expected: f64 = dues.iter().map(|(_, hours)| hours).sum();
        prop_assert!((allocated - expected).abs() < 1e-6);

        let refs: usize = shares.values().map(|share| share.milestones.len()).sum();
        prop_assert_eq!(refs, milestones.len());
    }

    #[test]
    fn holidays_always_win(start in 0u64..60, len in 0u64..7, probe in 0u64..7) {
        let schedule = WeeklySchedule::standard();
        let holiday = Holiday::new("Closure", day(start), day(start + len)).unwrap();
        let date = day(start + probe.min(len));

        prop_assert!(!is_working_day(date, &schedule, std::slice::from_ref(&holiday)));
        prop_assert_eq!(daily_capacity_hours(date, &schedule, &[holiday]), 0.0);
    }

    #[test]
    fn overlap_is_symmetric(a in range_strategy(), b in range_strategy()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    #[test]
    fn found_slot_is_free(
        existing in prop::collection::vec(range_strategy(), 0..8),
        requested in range_strategy(),
        direction in prop_oneof![
            Just(SearchDirection::Forward),
            Just(SearchDirection::Backward),
            Just(SearchDirection::Auto),
        ],
    ) {
        let placed = find_nearest_available_slot(&existing, requested, direction).unwrap();
        prop_assert_eq!(placed.len_days(), requested.len_days());
        for range in &existing {
            prop_assert!(!placed.overlaps(range));
        }
        if existing.iter().all(|range| !range.overlaps(&requested)) {
            prop_assert_eq!(placed, requested);
        }
    }
}
