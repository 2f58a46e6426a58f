//! WebAssembly module for the Store Inspection Platform
//!
//! Provides client-side computation for:
//! - Checklist tallies and pass rates
//! - Inspection form validation before submission
//! - Dashboard statistics over already-fetched inspections

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::stats::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("store inspection module loaded"));
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Current time as an ISO-8601 string, used to stamp each answer
#[wasm_bindgen]
pub fn answer_timestamp() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

/// Whole-percent pass rate (halves round up, empty checklist is 0)
#[wasm_bindgen]
pub fn calculate_pass_rate(passed: i32, total: i32) -> i32 {
    pass_rate(passed, total)
}

/// Dashboard band for a pass rate
#[wasm_bindgen]
pub fn classify_pass_rate_band(rate: i32) -> String {
    format!("{}", classify_pass_rate(rate))
}

/// Tally a checklist in progress
#[wasm_bindgen]
pub fn summarize_checklist(items_json: &str) -> Result<String, JsValue> {
    let items: Vec<NewInspectionItem> = serde_json::from_str(items_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid items JSON: {}", e)))?;

    to_json(&ChecklistSummary::from_items(&items))
}

#[derive(Serialize)]
struct FormCheck {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl From<Result<(), FieldError>> for FormCheck {
    fn from(result: Result<(), FieldError>) -> Self {
        match result {
            Ok(()) => FormCheck { valid: true, field: None, message: None },
            Err(err) => FormCheck { valid: false, field: Some(err.field), message: Some(err.message) },
        }
    }
}

/// Check an inspection form before it is submitted
///
/// Returns `{"valid": true}` or `{"valid": false, "field": ..., "message": ...}`.
#[wasm_bindgen]
pub fn validate_inspection_form(submission_json: &str) -> Result<String, JsValue> {
    let submission: NewInspection = serde_json::from_str(submission_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid inspection JSON: {}", e)))?;

    to_json(&FormCheck::from(validate_submission(&submission)))
}

/// Check the sign-in form before contacting the server
#[wasm_bindgen]
pub fn validate_sign_in_form(email: &str, password: &str) -> Result<String, JsValue> {
    to_json(&FormCheck::from(validate_sign_in(email, password)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    summary: InspectionStats,
    common_failures: Vec<FailureCount>,
    trend: Vec<TrendPoint>,
    stores: Vec<StoreStats>,
}

/// Aggregate fetched inspections for the admin dashboard
///
/// `bucket` is one of `day`, `week`, `month`; anything else falls back to `day`.
/// `filter_json` may be empty, or `{"storeId", "since", "until"}` with any
/// field omitted.
#[wasm_bindgen]
pub fn dashboard_stats(
    inspections_json: &str,
    filter_json: &str,
    bucket: &str,
    top: u32,
) -> Result<String, JsValue> {
    let inspections: Vec<Inspection> = serde_json::from_str(inspections_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid inspections JSON: {}", e)))?;
    let filter: InspectionFilter = if filter_json.trim().is_empty() {
        InspectionFilter::default()
    } else {
        serde_json::from_str(filter_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid filter JSON: {}", e)))?
    };
    let bucket: TimeBucket = bucket.parse().unwrap_or_default();
    let selected = filter.apply(&inspections);

    to_json(&Dashboard {
        summary: summarize(selected.iter().copied()),
        common_failures: common_failures(selected.iter().copied(), top as usize),
        trend: trend(selected.iter().copied(), bucket),
        stores: store_breakdown(selected.iter().copied()),
    })
}

/// Standard checklist questions as a JSON array
#[wasm_bindgen]
pub fn default_checklist_json() -> String {
    serde_json::to_string(DEFAULT_CHECKLIST).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_pass_rate() {
        assert_eq!(calculate_pass_rate(2, 3), 67);
        assert_eq!(calculate_pass_rate(0, 0), 0);
    }

    #[test]
    fn test_classify_band() {
        assert_eq!(classify_pass_rate_band(95), "Excellent");
        assert_eq!(classify_pass_rate_band(60), "Needs Attention");
        assert_eq!(classify_pass_rate_band(10), "Critical");
    }

    #[test]
    fn test_summarize_checklist() {
        let json = r#"[
            {"description": "Floors are clean and dry", "status": "pass"},
            {"description": "Fire exits are clear", "status": "fail", "failReason": "Boxes", "isFixed": true}
        ]"#;
        let out: serde_json::Value = serde_json::from_str(&summarize_checklist(json).unwrap()).unwrap();
        assert_eq!(out["totalItems"], 2);
        assert_eq!(out["failedItems"], 1);
        assert_eq!(out["fixedItems"], 1);
        assert_eq!(out["passRate"], 50);
    }

    #[test]
    fn test_validate_form_reports_missing_store() {
        let json = r#"{"inspectorName": "Kim", "items": [{"description": "Lights", "status": "pass"}]}"#;
        let out: serde_json::Value = serde_json::from_str(&validate_inspection_form(json).unwrap()).unwrap();
        assert_eq!(out["valid"], false);
        assert_eq!(out["field"], "storeId");
    }

    #[test]
    fn test_dashboard_stats_empty() {
        let out: serde_json::Value = serde_json::from_str(&dashboard_stats("[]", "", "week", 5).unwrap()).unwrap();
        assert_eq!(out["summary"]["totalInspections"], 0);
        assert!(out["trend"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_stats_filtered_by_store() {
        let json = r#"[
            {"id": "7d8f3a52-1111-4c7e-9d51-0a1b2c3d4e5f", "storeId": "0b9e6a4e-2222-4a41-8f0e-1c2d3e4f5a6b",
             "storeName": "Harbor", "inspectorName": "Robin", "items": [], "totalItems": 0, "passedItems": 0,
             "failedItems": 0, "passRate": 0, "timestamp": "2024-03-01T10:00:00Z"},
            {"id": "7d8f3a52-3333-4c7e-9d51-0a1b2c3d4e5f", "storeId": "5c4d3e2f-4444-4b1a-9c8d-7e6f5a4b3c2d",
             "storeName": "Uptown", "inspectorName": "Robin", "items": [], "totalItems": 0, "passedItems": 0,
             "failedItems": 0, "passRate": 0, "timestamp": "2024-03-02T10:00:00Z"}
        ]"#;
        let filter = r#"{"storeId": "0b9e6a4e-2222-4a41-8f0e-1c2d3e4f5a6b"}"#;
        let out: serde_json::Value = serde_json::from_str(&dashboard_stats(json, filter, "day", 5).unwrap()).unwrap();
        assert_eq!(out["summary"]["totalInspections"], 1);
        assert_eq!(out["stores"][0]["storeName"], "Harbor");
    }

    #[test]
    fn test_validate_sign_in_form() {
        let ok: serde_json::Value =
            serde_json::from_str(&validate_sign_in_form("inspector@example.com", "password123").unwrap()).unwrap();
        assert_eq!(ok, serde_json::json!({"valid": true}));

        let bad: serde_json::Value =
            serde_json::from_str(&validate_sign_in_form("inspector@example.com", "short").unwrap()).unwrap();
        assert_eq!(bad["valid"], false);
        assert_eq!(bad["field"], "password");
        assert_eq!(bad["message"], "Password must be at least 8 characters");
    }

    #[test]
    fn test_default_checklist_json() {
        let questions: Vec<String> = serde_json::from_str(&default_checklist_json()).unwrap();
        assert_eq!(questions.len(), DEFAULT_CHECKLIST.len());
    }
}
