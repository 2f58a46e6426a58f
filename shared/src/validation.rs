//! Validation utilities for the Store Inspection Platform
//!
//! These are the checks the inspection form runs before submission; the
//! backend runs the same checks again on receipt.

use uuid::Uuid;

use crate::models::{ItemStatus, NewInspection, NewInspectionItem};

/// Longest accepted inspector or store name
pub const MAX_NAME_LEN: usize = 100;

/// Longest accepted checklist question
pub const MAX_DESCRIPTION_LEN: usize = 300;

/// Longest accepted failure explanation
pub const MAX_FAIL_REASON_LEN: usize = 500;

/// Most items accepted in one inspection
pub const MAX_ITEMS: usize = 200;

/// A failed check together with the form field it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

// ============================================================================
// Inspection Form Validations
// ============================================================================

/// Validate the inspector name is present
pub fn validate_inspector_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Please enter your name");
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err("Inspector name must be at most 100 characters");
    }
    Ok(())
}

/// Validate a store was picked
pub fn validate_store_selected(store_id: Option<Uuid>) -> Result<(), &'static str> {
    match store_id {
        Some(id) if !id.is_nil() => Ok(()),
        _ => Err("Please select a store"),
    }
}

/// Validate the checklist has answers
pub fn validate_item_count(count: usize) -> Result<(), &'static str> {
    if count == 0 {
        return Err("An inspection must contain at least one item");
    }
    if count > MAX_ITEMS {
        return Err("An inspection may contain at most 200 items");
    }
    Ok(())
}

/// Validate a checklist question text
pub fn validate_item_description(description: &str) -> Result<(), &'static str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err("Checklist item description cannot be empty");
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        return Err("Checklist item description must be at most 300 characters");
    }
    Ok(())
}

/// Validate the optional failure explanation
pub fn validate_fail_reason(reason: Option<&str>) -> Result<(), &'static str> {
    match reason {
        Some(r) if r.chars().count() > MAX_FAIL_REASON_LEN => {
            Err("Failure reason must be at most 500 characters")
        }
        _ => Ok(()),
    }
}

/// Only failed items can be marked as fixed on site
pub fn validate_fixed_flag(status: ItemStatus, is_fixed: Option<bool>) -> Result<(), &'static str> {
    if status == ItemStatus::Pass && is_fixed == Some(true) {
        return Err("Only failed items can be marked as fixed");
    }
    Ok(())
}

/// A stored item's fix state can only be toggled when it failed
pub fn validate_fix_toggle(status: ItemStatus) -> Result<(), &'static str> {
    match status {
        ItemStatus::Fail => Ok(()),
        ItemStatus::Pass => Err("Only failed items can be marked as fixed"),
    }
}

/// Validate one answered item
pub fn validate_item(item: &NewInspectionItem) -> Result<(), FieldError> {
    validate_item_description(&item.description).map_err(|m| FieldError::new("description", m))?;
    validate_fail_reason(item.fail_reason.as_deref()).map_err(|m| FieldError::new("failReason", m))?;
    validate_fixed_flag(item.status, item.is_fixed).map_err(|m| FieldError::new("isFixed", m))?;
    Ok(())
}

/// Run every form check against a submission, stopping at the first failure
pub fn validate_submission(submission: &NewInspection) -> Result<(), FieldError> {
    validate_inspector_name(&submission.inspector_name)
        .map_err(|m| FieldError::new("inspectorName", m))?;
    validate_store_selected(submission.store_id).map_err(|m| FieldError::new("storeId", m))?;
    validate_item_count(submission.items.len()).map_err(|m| FieldError::new("items", m))?;
    submission.items.iter().try_for_each(validate_item)
}

// ============================================================================
// Store Validations
// ============================================================================

/// Validate a store name
pub fn validate_store_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Store name cannot be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err("Store name must be at most 100 characters");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Sign-in form check, email first
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), FieldError> {
    validate_email(email.trim()).map_err(|m| FieldError::new("email", m))?;
    validate_password(password).map_err(|m| FieldError::new("password", m))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(status: ItemStatus) -> NewInspectionItem {
        NewInspectionItem {
            description: "Shelves are fully stocked and faced".to_string(),
            status,
            fail_reason: None,
            is_fixed: None,
            timestamp: None,
        }
    }

    fn submission() -> NewInspection {
        NewInspection {
            store_id: Some(Uuid::new_v4()),
            inspector_name: "Alex".to_string(),
            items: vec![answer(ItemStatus::Pass), answer(ItemStatus::Fail)],
            device_info: String::new(),
            timestamp: None,
        }
    }

    // ========================================================================
    // Inspection Form Tests
    // ========================================================================

    #[test]
    fn test_valid_submission() {
        assert!(validate_submission(&submission()).is_ok());
    }

    #[test]
    fn test_empty_inspector_name_blocks_submission() {
        let mut s = submission();
        s.inspector_name = "   ".to_string();
        let err = validate_submission(&s).unwrap_err();
        assert_eq!(err.field, "inspectorName");
    }

    #[test]
    fn test_missing_store_blocks_submission() {
        let mut s = submission();
        s.store_id = None;
        assert_eq!(validate_submission(&s).unwrap_err().field, "storeId");

        s.store_id = Some(Uuid::nil());
        assert_eq!(validate_submission(&s).unwrap_err().field, "storeId");
    }

    #[test]
    fn test_empty_checklist_blocks_submission() {
        let mut s = submission();
        s.items.clear();
        assert_eq!(validate_submission(&s).unwrap_err().field, "items");
    }

    #[test]
    fn test_name_is_checked_before_store() {
        let mut s = submission();
        s.inspector_name.clear();
        s.store_id = None;
        assert_eq!(validate_submission(&s).unwrap_err().field, "inspectorName");
    }

    #[test]
    fn test_blank_item_description() {
        let mut s = submission();
        s.items[1].description = "".to_string();
        assert_eq!(validate_submission(&s).unwrap_err().field, "description");
    }

    #[test]
    fn test_fail_reason_length() {
        assert!(validate_fail_reason(None).is_ok());
        assert!(validate_fail_reason(Some("Spill near aisle 4")).is_ok());
        assert!(validate_fail_reason(Some(&"x".repeat(501))).is_err());
    }

    #[test]
    fn test_fixed_flag_only_on_failures() {
        assert!(validate_fixed_flag(ItemStatus::Fail, Some(true)).is_ok());
        assert!(validate_fixed_flag(ItemStatus::Pass, Some(false)).is_ok());
        assert!(validate_fixed_flag(ItemStatus::Pass, None).is_ok());
        assert!(validate_fixed_flag(ItemStatus::Pass, Some(true)).is_err());
    }

    #[test]
    fn test_fix_toggle_rejected_on_passed_item() {
        assert!(validate_fix_toggle(ItemStatus::Fail).is_ok());
        assert_eq!(
            validate_fix_toggle(ItemStatus::Pass),
            Err("Only failed items can be marked as fixed")
        );
    }

    #[test]
    fn test_item_count_bounds() {
        assert!(validate_item_count(1).is_ok());
        assert!(validate_item_count(MAX_ITEMS).is_ok());
        assert!(validate_item_count(0).is_err());
        assert!(validate_item_count(MAX_ITEMS + 1).is_err());
    }

    // ========================================================================
    // Store and Account Tests
    // ========================================================================

    #[test]
    fn test_validate_store_name() {
        assert!(validate_store_name("Main Street #12").is_ok());
        assert!(validate_store_name("").is_err());
        assert!(validate_store_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("inspector.one@retail.co.uk").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_sign_in_form() {
        assert!(validate_sign_in(" admin@example.com ", "password123").is_ok());
        assert_eq!(validate_sign_in("admin", "password123").unwrap_err().field, "email");
        assert_eq!(validate_sign_in("admin@example.com", "short").unwrap_err().field, "password");
        // Email is reported before password
        assert_eq!(validate_sign_in("", "").unwrap_err().field, "email");
    }
}
