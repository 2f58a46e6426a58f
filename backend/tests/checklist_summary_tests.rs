//! Checklist tally tests for the Store Inspection Platform
//!
//! Verifies that pass/fail tallies always sum to the item count and that the
//! pass rate is passed/total rounded to the nearest whole percent.

use chrono::Utc;
use proptest::prelude::*;
use shared::{pass_rate, ChecklistSummary, InspectionItem, ItemStatus, NewInspectionItem};
use uuid::Uuid;

fn answers(statuses: &[(bool, bool)]) -> Vec<NewInspectionItem> {
    statuses
        .iter()
        .map(|(passed, fixed)| NewInspectionItem {
            description: "Price tags are visible and accurate".to_string(),
            status: if *passed { ItemStatus::Pass } else { ItemStatus::Fail },
            fail_reason: None,
            is_fixed: Some(*fixed),
            timestamp: None,
        })
        .collect()
}

/// Reference rounding: nearest integer, halves up
fn reference_rate(passed: i32, total: i32) -> i32 {
    (f64::from(passed) * 100.0 / f64::from(total) + 0.5).floor() as i32
}

// ============================================================================
// Tallies sum to total
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn tallies_sum_to_total(statuses in prop::collection::vec((any::<bool>(), any::<bool>()), 0..60)) {
        let items = answers(&statuses);
        let summary = ChecklistSummary::from_items(&items);

        prop_assert_eq!(summary.total_items as usize, items.len());
        prop_assert_eq!(summary.passed_items + summary.failed_items, summary.total_items);
        prop_assert!(summary.fixed_items <= summary.failed_items);
    }

    #[test]
    fn pass_rate_is_bounded(passed in 0i32..500, extra in 0i32..500) {
        let total = passed + extra;
        let rate = pass_rate(passed, total);
        prop_assert!((0..=100).contains(&rate));
    }

    #[test]
    fn pass_rate_matches_reference_rounding(passed in 0i32..1000, extra in 0i32..1000) {
        let total = passed + extra;
        prop_assume!(total > 0);
        prop_assert_eq!(pass_rate(passed, total), reference_rate(passed, total));
    }

    #[test]
    fn pass_rate_grows_with_passes(passed in 0i32..200, extra in 1i32..200) {
        let total = passed + extra;
        prop_assert!(pass_rate(passed + 1, total) >= pass_rate(passed, total));
    }
}

// ============================================================================
// Known values
// ============================================================================

mod known_rates {
    use super::*;

    #[test]
    fn all_passed_is_one_hundred() {
        let items = answers(&[(true, false); 15]);
        assert_eq!(ChecklistSummary::from_items(&items).pass_rate, 100);
    }

    #[test]
    fn none_passed_is_zero() {
        let items = answers(&[(false, false); 15]);
        assert_eq!(ChecklistSummary::from_items(&items).pass_rate, 0);
    }

    #[test]
    fn fourteen_of_fifteen() {
        // 93.33...
        assert_eq!(pass_rate(14, 15), 93);
    }

    #[test]
    fn half_percent_rounds_up() {
        // 1/200 = 0.5%
        assert_eq!(pass_rate(1, 200), 1);
        // 199/200 = 99.5%
        assert_eq!(pass_rate(199, 200), 100);
    }

    #[test]
    fn stored_items_tally_the_same_as_submitted() {
        let now = Utc::now();
        let stored: Vec<InspectionItem> = answers(&[(true, false), (false, true), (false, false)])
            .into_iter()
            .map(|a| InspectionItem {
                id: Uuid::new_v4(),
                description: a.description,
                status: a.status,
                fail_reason: a.fail_reason,
                is_fixed: a.is_fixed,
                timestamp: now,
            })
            .collect();
        let summary = ChecklistSummary::from_items(&stored);
        assert_eq!(summary.passed_items, 1);
        assert_eq!(summary.failed_items, 2);
        assert_eq!(summary.fixed_items, 1);
        assert_eq!(summary.pass_rate, 33);
    }
}
