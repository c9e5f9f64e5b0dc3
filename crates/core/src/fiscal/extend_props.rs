//! Property-based tests for fiscal year extension.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use super::extend::extend_to_cover;
use super::year::FiscalYear;

fn start_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// After extension some year contains the target, and no two years overlap.
    #[test]
    fn prop_extension_covers_without_overlap(
        start in start_date(),
        days_back in 0u64..5_000,
    ) {
        let end = start.checked_add_days(Days::new(364)).unwrap();
        let oldest = FiscalYear::new(start, end).unwrap();
        let target = start.checked_sub_days(Days::new(days_back)).unwrap();

        let created = extend_to_cover(&oldest, target).unwrap();
        let mut all = created.clone();
        all.push(oldest.clone());

        prop_assert!(all.iter().any(|year| year.contains(target)));
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    /// Each created year ends the day before the next one starts.
    #[test]
    fn prop_created_years_are_contiguous(
        start in start_date(),
        days_back in 1u64..5_000,
    ) {
        let end = start.checked_add_days(Days::new(364)).unwrap();
        let oldest = FiscalYear::new(start, end).unwrap();
        let target = start.checked_sub_days(Days::new(days_back)).unwrap();

        let created = extend_to_cover(&oldest, target).unwrap();
        prop_assert!(!created.is_empty());

        let mut newer = &oldest;
        for year in &created {
            prop_assert_eq!(year.end_date.succ_opt().unwrap(), newer.start_date);
            newer = year;
        }
    }
}
