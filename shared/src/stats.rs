//! Dashboard statistics over inspections already loaded into memory
//!
//! Every function here accepts an empty slice and returns zero or empty
//! results rather than failing.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Inspection, ItemStatus};
use crate::types::{TimeBucket, TimeRange};

/// Headline numbers for a set of inspections
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InspectionStats {
    pub total_inspections: i64,
    pub total_items: i64,
    pub passed_items: i64,
    pub failed_items: i64,
    pub fixed_items: i64,
    /// Item-weighted, whole percent
    pub overall_pass_rate: i64,
    /// Mean of per-inspection pass rates, one decimal place
    pub average_pass_rate: Decimal,
}

/// How often one checklist question failed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailureCount {
    pub description: String,
    pub count: i64,
    pub fixed: i64,
}

/// One point of a trend chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub inspections: i64,
    pub failed_items: i64,
    pub average_pass_rate: Decimal,
}

/// Per-store roll-up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub store_id: Uuid,
    pub store_name: String,
    pub inspections: i64,
    pub average_pass_rate: Decimal,
    pub last_inspected_at: DateTime<Utc>,
}

/// In-memory narrowing of an inspection list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionFilter {
    pub store_id: Option<Uuid>,
    #[serde(flatten)]
    pub range: TimeRange,
}

impl InspectionFilter {
    pub fn matches(&self, inspection: &Inspection) -> bool {
        self.store_id.map_or(true, |id| inspection.store_id == id)
            && self.range.contains(inspection.timestamp)
    }

    pub fn apply<'a>(&self, inspections: &'a [Inspection]) -> Vec<&'a Inspection> {
        inspections.iter().filter(|i| self.matches(i)).collect()
    }
}

/// Mean of whole-percent rates, rounded half away from zero to one decimal
pub fn average_rate<I: IntoIterator<Item = i32>>(rates: I) -> Decimal {
    let (sum, count) = rates
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), rate| (sum + i64::from(rate), count + 1));
    if count == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(sum) / Decimal::from(count))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Headline totals across all inspections
pub fn summarize<'a, I>(inspections: I) -> InspectionStats
where
    I: IntoIterator<Item = &'a Inspection>,
{
    let mut stats = InspectionStats::default();
    let mut rates = Vec::new();

    for inspection in inspections {
        let summary = inspection.summary();
        stats.total_inspections += 1;
        stats.total_items += i64::from(summary.total_items);
        stats.passed_items += i64::from(summary.passed_items);
        stats.failed_items += i64::from(summary.failed_items);
        stats.fixed_items += i64::from(summary.fixed_items);
        rates.push(summary.pass_rate);
    }

    if stats.total_items > 0 {
        stats.overall_pass_rate =
            (stats.passed_items * 200 + stats.total_items) / (stats.total_items * 2);
    }
    stats.average_pass_rate = average_rate(rates);
    stats
}

/// Most frequently failed questions, most common first
pub fn common_failures<'a, I>(inspections: I, limit: usize) -> Vec<FailureCount>
where
    I: IntoIterator<Item = &'a Inspection>,
{
    let mut counts: HashMap<&str, FailureCount> = HashMap::new();

    for inspection in inspections {
        for item in inspection.failures() {
            let key = item.description.trim();
            let entry = counts.entry(key).or_insert_with(|| FailureCount {
                description: key.to_string(),
                count: 0,
                fixed: 0,
            });
            entry.count += 1;
            if item.is_fixed == Some(true) {
                entry.fixed += 1;
            }
        }
    }

    let mut failures: Vec<FailureCount> = counts.into_values().collect();
    failures.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.description.cmp(&b.description)));
    failures.truncate(limit);
    failures
}

/// Label of the period `at` falls in
pub fn period_label(at: DateTime<Utc>, bucket: TimeBucket) -> String {
    match bucket {
        TimeBucket::Day => at.format("%Y-%m-%d").to_string(),
        TimeBucket::Week => {
            let week = at.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        TimeBucket::Month => at.format("%Y-%m").to_string(),
    }
}

/// Inspections grouped into time buckets, oldest first
pub fn trend<'a, I>(inspections: I, bucket: TimeBucket) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Inspection>,
{
    // Labels sort chronologically for every bucket kind
    let mut periods: BTreeMap<String, (i64, Vec<i32>)> = BTreeMap::new();

    for inspection in inspections {
        let summary = inspection.summary();
        let (failed, rates) = periods
            .entry(period_label(inspection.timestamp, bucket))
            .or_default();
        *failed += i64::from(summary.failed_items);
        rates.push(summary.pass_rate);
    }

    periods
        .into_iter()
        .map(|(period, (failed_items, rates))| TrendPoint {
            period,
            inspections: rates.len() as i64,
            failed_items,
            average_pass_rate: average_rate(rates),
        })
        .collect()
}

/// Per-store averages, worst store first
pub fn store_breakdown<'a, I>(inspections: I) -> Vec<StoreStats>
where
    I: IntoIterator<Item = &'a Inspection>,
{
    struct Acc<'b> {
        name: &'b str,
        last: DateTime<Utc>,
        rates: Vec<i32>,
    }

    let mut stores: HashMap<Uuid, Acc<'a>> = HashMap::new();

    for inspection in inspections {
        let rate = inspection.summary().pass_rate;
        let acc = stores.entry(inspection.store_id).or_insert_with(|| Acc {
            name: &inspection.store_name,
            last: inspection.timestamp,
            rates: Vec::new(),
        });
        // Most recent inspection carries the current store name
        if inspection.timestamp >= acc.last {
            acc.last = inspection.timestamp;
            acc.name = &inspection.store_name;
        }
        acc.rates.push(rate);
    }

    let mut breakdown: Vec<StoreStats> = stores
        .into_iter()
        .map(|(store_id, acc)| StoreStats {
            store_id,
            store_name: acc.name.to_string(),
            inspections: acc.rates.len() as i64,
            average_pass_rate: average_rate(acc.rates),
            last_inspected_at: acc.last,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        a.average_pass_rate
            .cmp(&b.average_pass_rate)
            .then_with(|| a.store_name.cmp(&b.store_name))
    });
    breakdown
}
