//! Inspection form validation tests
//!
//! An empty inspector name or a missing store must block submission.

use proptest::prelude::*;
use shared::{
    validate_email, validate_inspector_name, validate_store_name, validate_submission, ItemStatus,
    NewInspection, NewInspectionItem,
};
use uuid::Uuid;

fn item(status: ItemStatus) -> NewInspectionItem {
    NewInspectionItem {
        description: "Cold storage is at the correct temperature".to_string(),
        status,
        fail_reason: None,
        is_fixed: None,
        timestamp: None,
    }
}

fn submission(name: &str, store: Option<Uuid>) -> NewInspection {
    NewInspection {
        store_id: store,
        inspector_name: name.to_string(),
        items: vec![item(ItemStatus::Pass), item(ItemStatus::Fail)],
        device_info: "iPhone".to_string(),
        timestamp: None,
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Names made only of whitespace
fn blank_name_strategy() -> impl Strategy<Value = String> {
    "[ \t\n]{0,10}"
}

/// Plausible inspector names
fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z .'-]{0,40}"
}

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,8}\\.(com|org|net|co\\.uk)"
}

proptest! {
    #[test]
    fn blank_names_block_submission(name in blank_name_strategy()) {
        let err = validate_submission(&submission(&name, Some(Uuid::new_v4()))).unwrap_err();
        prop_assert_eq!(err.field, "inspectorName");
    }

    #[test]
    fn missing_store_blocks_submission(name in name_strategy()) {
        let err = validate_submission(&submission(&name, None)).unwrap_err();
        prop_assert_eq!(err.field, "storeId");
    }

    #[test]
    fn named_inspector_with_store_is_accepted(name in name_strategy()) {
        prop_assert!(validate_inspector_name(&name).is_ok());
        prop_assert!(validate_submission(&submission(&name, Some(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn generated_emails_are_valid(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }
}

mod form_rules {
    use super::*;

    #[test]
    fn nil_store_counts_as_unselected() {
        let err = validate_submission(&submission("Robin", Some(Uuid::nil()))).unwrap_err();
        assert_eq!(err.field, "storeId");
        assert_eq!(err.message, "Please select a store");
    }

    #[test]
    fn passed_item_cannot_be_fixed() {
        let mut s = submission("Robin", Some(Uuid::new_v4()));
        s.items[0].is_fixed = Some(true);
        assert_eq!(validate_submission(&s).unwrap_err().field, "isFixed");
    }

    #[test]
    fn failed_item_may_be_fixed_with_reason() {
        let mut s = submission("Robin", Some(Uuid::new_v4()));
        s.items[1].is_fixed = Some(true);
        s.items[1].fail_reason = Some("Thermometer read 9C, adjusted".to_string());
        assert!(validate_submission(&s).is_ok());
    }

    #[test]
    fn store_name_whitespace_only_is_rejected() {
        assert!(validate_store_name("   ").is_err());
        assert!(validate_store_name(" Eastgate ").is_ok());
    }
}
