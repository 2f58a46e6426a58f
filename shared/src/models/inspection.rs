//! Inspection records and checklist tallies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ParseError;

/// Outcome of a single checklist question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pass,
    Fail,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pass => "pass",
            ItemStatus::Fail => "fail",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ItemStatus::Pass),
            "fail" => Ok(ItemStatus::Fail),
            other => Err(ParseError::ItemStatus(other.to_string())),
        }
    }
}

/// One answered checklist question within an inspection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectionItem {
    pub id: Uuid,
    pub description: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    /// Set when a failed item was corrected during the visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fixed: Option<bool>,
    pub timestamp: DateTime<Utc>,
}

/// A completed checklist run by one inspector at one store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub id: Uuid,
    pub store_id: Uuid,
    pub store_name: String,
    pub inspector_name: String,
    pub items: Vec<InspectionItem>,
    pub total_items: i32,
    pub passed_items: i32,
    pub failed_items: i32,
    /// Whole percent, see [`pass_rate`]
    pub pass_rate: i32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub device_info: String,
}

impl Inspection {
    /// Recompute the tallies from the items
    pub fn summary(&self) -> ChecklistSummary {
        ChecklistSummary::from_items(&self.items)
    }

    /// Whether the stored tallies agree with the items
    pub fn is_consistent(&self) -> bool {
        let summary = self.summary();
        summary.total_items == self.total_items
            && summary.passed_items == self.passed_items
            && summary.failed_items == self.failed_items
            && summary.pass_rate == self.pass_rate
    }

    /// Failed items, in checklist order
    pub fn failures(&self) -> impl Iterator<Item = &InspectionItem> {
        self.items.iter().filter(|item| item.status == ItemStatus::Fail)
    }
}

/// A checklist answer as submitted by an inspector's device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewInspectionItem {
    pub description: String,
    pub status: ItemStatus,
    #[serde(default)]
    pub fail_reason: Option<String>,
    #[serde(default)]
    pub is_fixed: Option<bool>,
    /// Defaults to the submission time when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A completed checklist as submitted by an inspector's device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewInspection {
    /// Optional on the wire so an unselected store is a validation error
    #[serde(default)]
    pub store_id: Option<Uuid>,
    #[serde(default)]
    pub inspector_name: String,
    #[serde(default)]
    pub items: Vec<NewInspectionItem>,
    #[serde(default)]
    pub device_info: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Anything that can be tallied as a checklist answer
pub trait ChecklistEntry {
    fn status(&self) -> ItemStatus;
    fn is_fixed(&self) -> bool;
}

impl ChecklistEntry for InspectionItem {
    fn status(&self) -> ItemStatus {
        self.status
    }

    fn is_fixed(&self) -> bool {
        self.is_fixed.unwrap_or(false)
    }
}

impl ChecklistEntry for NewInspectionItem {
    fn status(&self) -> ItemStatus {
        self.status
    }

    fn is_fixed(&self) -> bool {
        self.is_fixed.unwrap_or(false)
    }
}

/// Pass/fail tallies for one checklist
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSummary {
    pub total_items: i32,
    pub passed_items: i32,
    pub failed_items: i32,
    /// Failed items that were fixed on site
    pub fixed_items: i32,
    pub pass_rate: i32,
}

impl ChecklistSummary {
    /// Tally a list of answers; `passed_items + failed_items == total_items`
    pub fn from_items<T: ChecklistEntry>(items: &[T]) -> Self {
        let mut summary = ChecklistSummary::default();
        for item in items {
            summary.total_items += 1;
            match item.status() {
                ItemStatus::Pass => summary.passed_items += 1,
                ItemStatus::Fail => {
                    summary.failed_items += 1;
                    if item.is_fixed() {
                        summary.fixed_items += 1;
                    }
                }
            }
        }
        summary.pass_rate = pass_rate(summary.passed_items, summary.total_items);
        summary
    }
}

/// Percentage of passed items, rounded to the nearest whole percent
///
/// Halves round up (2 of 3 passed is 67, 1 of 8 passed is 13). An empty
/// checklist has a pass rate of 0. Out-of-range `passed` values are clamped.
pub fn pass_rate(passed: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let passed = i64::from(passed.clamp(0, total));
    let total = i64::from(total);
    ((passed * 200 + total) / (total * 2)) as i32
}

/// Dashboard colour band for a pass rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassRateBand {
    /// 90% and above
    Excellent,
    /// 75-89%
    Good,
    /// 50-74%
    NeedsAttention,
    /// Below 50%
    Critical,
}

impl std::fmt::Display for PassRateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassRateBand::Excellent => write!(f, "Excellent"),
            PassRateBand::Good => write!(f, "Good"),
            PassRateBand::NeedsAttention => write!(f, "Needs Attention"),
            PassRateBand::Critical => write!(f, "Critical"),
        }
    }
}

/// Classify a whole-percent pass rate
pub fn classify_pass_rate(rate: i32) -> PassRateBand {
    if rate >= 90 {
        PassRateBand::Excellent
    } else if rate >= 75 {
        PassRateBand::Good
    } else if rate >= 50 {
        PassRateBand::NeedsAttention
    } else {
        PassRateBand::Critical
    }
}
