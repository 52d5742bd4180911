//! Integration tests for the working-day calendar and assignment generator
//!
//! These tests verify the complete planning workflow of:
//! - Working-day arithmetic against the bundled Hong Kong holidays
//! - Schedule generation, ordering and group cycling
//! - Schedule persistence

mod common;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use common::{create_candidate, create_candidates, ymd};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use visitplan::calendar::{CalendarYearTable, WorkingDayCalendar};
use visitplan::models::CandidateStatus;
use visitplan::scheduler::{
    AssignmentGenerator, CandidateFilter, GenerationParams, Schedule, SchedulerError,
};

fn hk_generator() -> AssignmentGenerator {
    AssignmentGenerator::new(WorkingDayCalendar::hong_kong())
}

// ============================================================================
// Calendar Tests
// ============================================================================

#[test]
fn test_hong_kong_table_covers_bundled_years() {
    let table = CalendarYearTable::hong_kong();
    assert!(table.covers_year(2025));
    assert!(table.covers_year(2026));
    assert!(table.is_holiday(ymd(2025, 12, 25)));
    assert!(!table.is_holiday(ymd(2025, 12, 24)));
}

#[test]
fn test_next_working_day_over_lunar_new_year() {
    let calendar = WorkingDayCalendar::hong_kong();

    // Wed 29 Jan .. Fri 31 Jan 2025 are holidays, then a weekend
    assert_eq!(calendar.next_working_day(ymd(2025, 1, 29)), ymd(2025, 2, 3));
    assert_eq!(calendar.following_working_day(ymd(2025, 1, 28)), ymd(2025, 2, 3));
}

#[test]
fn test_holiday_in_uncovered_year_is_ignored() {
    let calendar = WorkingDayCalendar::hong_kong();

    // 1 Jan 2031 is a Wednesday and the table has no 2031 entry
    assert!(calendar.is_working_day(ymd(2031, 1, 1)));
}

proptest! {
    #[test]
    fn prop_next_working_day_is_minimal(offset in 0i64..730) {
        let calendar = WorkingDayCalendar::hong_kong();
        let date = ymd(2025, 1, 1) + Duration::days(offset);
        let next = calendar.next_working_day(date);

        prop_assert!(next >= date);
        prop_assert!(calendar.is_working_day(next));
        prop_assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));

        let mut day = date;
        while day < next {
            prop_assert!(!calendar.is_working_day(day));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn prop_working_day_is_its_own_next(offset in 0i64..730) {
        let calendar = WorkingDayCalendar::hong_kong();
        let date = ymd(2025, 1, 1) + Duration::days(offset);

        if calendar.is_working_day(date) {
            prop_assert_eq!(calendar.next_working_day(date), date);
        }
        prop_assert!(calendar.following_working_day(date) > date);
    }
}

// ============================================================================
// Generator Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_every_candidate_assigned_once(
        pool_size in 0usize..60,
        shops in 1u32..12,
        groups in 1u32..6,
        offset in 0i64..700,
    ) {
        let start = ymd(2025, 1, 1) + Duration::days(offset);
        let pool = create_candidates(pool_size);
        let params = GenerationParams::new(start, shops, groups);

        let schedule = hk_generator()
            .generate(&pool, &CandidateFilter::new(), &params)
            .unwrap();

        prop_assert_eq!(schedule.len(), pool_size);

        let ids: HashSet<&str> = schedule.iter().map(|a| a.candidate_id()).collect();
        prop_assert_eq!(ids.len(), pool_size);

        let calendar = WorkingDayCalendar::hong_kong();
        let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for assignment in schedule.iter() {
            prop_assert!(calendar.is_working_day(assignment.date));
            prop_assert!(assignment.date >= start);
            prop_assert!(assignment.group >= 1 && assignment.group <= groups);
            *per_date.entry(assignment.date).or_default() += 1;
        }

        prop_assert!(per_date.values().all(|&n| n <= shops as usize));
        prop_assert_eq!(per_date.len(), pool_size.div_ceil(shops as usize));
    }

    #[test]
    fn prop_output_sorted_by_date_then_group(pool_size in 1usize..40, shops in 1u32..8, groups in 1u32..4) {
        let params = GenerationParams::new(ymd(2025, 3, 1), shops, groups);
        let schedule = hk_generator()
            .generate(&create_candidates(pool_size), &CandidateFilter::new(), &params)
            .unwrap();

        let keys: Vec<_> = schedule.iter().map(|a| (a.date, a.group)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}

#[test]
fn test_round_robin_groups_on_one_day() {
    let params = GenerationParams::new(ymd(2025, 3, 3), 9, 3);
    let schedule = hk_generator()
        .generate(&create_candidates(9), &CandidateFilter::new(), &params)
        .unwrap();

    let day = schedule.for_date(ymd(2025, 3, 3));
    assert_eq!(day.len(), 9);

    let mut groups: Vec<u32> = day.iter().map(|a| a.group).collect();
    groups.sort_unstable();
    assert_eq!(groups, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);

    // group by position: candidates 0, 3, 6 land in group 1
    let group_one: HashSet<&str> = day
        .iter()
        .filter(|a| a.group == 1)
        .map(|a| a.candidate_id())
        .collect();
    assert_eq!(group_one, HashSet::from(["S-000", "S-003", "S-006"]));
}

#[test]
fn test_ten_candidates_from_saturday() {
    // Sat 1 Mar 2025, no holidays in the following week
    let params = GenerationParams::new(ymd(2025, 3, 1), 4, 2);
    let schedule = hk_generator()
        .generate(&create_candidates(10), &CandidateFilter::new(), &params)
        .unwrap();

    let days: Vec<(NaiveDate, Vec<u32>)> = schedule
        .summary()
        .per_date
        .keys()
        .map(|&date| {
            let groups = schedule.for_date(date).iter().map(|a| a.group).collect();
            (date, groups)
        })
        .collect();

    assert_eq!(
        days,
        vec![
            (ymd(2025, 3, 3), vec![1, 1, 2, 2]),
            (ymd(2025, 3, 4), vec![1, 1, 2, 2]),
            (ymd(2025, 3, 5), vec![1, 2]),
        ]
    );
}

#[test]
fn test_schedule_skips_holiday_block() {
    // Fri 4 Apr 2025 and Fri 18 .. Mon 21 Apr 2025 are holidays
    let params = GenerationParams::new(ymd(2025, 4, 17), 1, 1);
    let schedule = hk_generator()
        .generate(&create_candidates(3), &CandidateFilter::new(), &params)
        .unwrap();

    let dates: Vec<NaiveDate> = schedule.iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![ymd(2025, 4, 17), ymd(2025, 4, 22), ymd(2025, 4, 23)]);
}

#[test]
fn test_filters_and_status_applied() {
    let pool = vec![
        create_candidate(0),
        create_candidate(1).with_location("KLN", "Mong Kok"),
        create_candidate(2).with_restricted_transit(true),
        create_candidate(3).with_status(CandidateStatus::Planned),
        create_candidate(4).with_status(CandidateStatus::Closed),
    ];

    let filter = CandidateFilter::new()
        .with_regions(["HK"])
        .include_restricted(false);
    let params = GenerationParams::new(ymd(2025, 3, 3), 5, 1);
    let schedule = hk_generator().generate(&pool, &filter, &params).unwrap();

    let ids: Vec<&str> = schedule.iter().map(|a| a.candidate_id()).collect();
    assert_eq!(ids, vec!["S-000"]);
}

#[test]
fn test_empty_pool_yields_empty_schedule() {
    let params = GenerationParams::new(ymd(2025, 3, 3), 9, 3);
    let schedule = hk_generator()
        .generate(&[], &CandidateFilter::new(), &params)
        .unwrap();

    assert!(schedule.is_empty());
    assert_eq!(schedule.summary().working_days, 0);
}

#[test]
fn test_invalid_parameters_rejected() {
    let pool = create_candidates(3);

    let err = hk_generator()
        .generate(&pool, &CandidateFilter::new(), &GenerationParams::new(ymd(2025, 3, 3), 0, 3))
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidParameter { ref name, .. } if name == "shops_per_day"));

    let err = hk_generator()
        .generate(&pool, &CandidateFilter::new(), &GenerationParams::new(ymd(2025, 3, 3), 3, 0))
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidParameter { ref name, .. } if name == "groups_per_day"));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_schedule_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schedule.json");

    let params = GenerationParams::new(ymd(2025, 3, 1), 4, 2);
    let schedule = hk_generator()
        .generate(&create_candidates(6), &CandidateFilter::new(), &params)
        .unwrap();

    schedule.save_to_file(&path).await.unwrap();
    let loaded = Schedule::load_from_file(&path).await.unwrap();

    assert_eq!(loaded.len(), 6);
    assert_eq!(loaded.summary(), schedule.summary());

    let planned = loaded.iter().next().unwrap().to_planned_candidate();
    assert_eq!(planned.status, CandidateStatus::Planned);
    assert_eq!(planned.scheduled_date, Some(ymd(2025, 3, 3)));
}
