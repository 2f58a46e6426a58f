//! Reporting service for the admin dashboard and data export
//!
//! Inspections are loaded once and aggregated in memory with the same
//! functions the browser client uses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    common_failures, store_breakdown, summarize, trend, FailureCount, Inspection,
    InspectionStats, ItemStatus, StoreStats, TimeBucket, TrendPoint,
};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::inspection::{InspectionQuery, InspectionService};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    inspections: InspectionService,
}

/// Everything the dashboard renders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub summary: InspectionStats,
    pub common_failures: Vec<FailureCount>,
    pub trend: Vec<TrendPoint>,
    pub stores: Vec<StoreStats>,
}

/// One CSV line per inspection
#[derive(Debug, Serialize)]
pub struct InspectionExportRow {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub store_name: String,
    pub inspector_name: String,
    pub total_items: i32,
    pub passed_items: i32,
    pub failed_items: i32,
    pub pass_rate: i32,
    pub failed_questions: String,
    pub device_info: String,
}

impl From<&Inspection> for InspectionExportRow {
    fn from(inspection: &Inspection) -> Self {
        let failed_questions = inspection
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Fail)
            .map(|item| match item.fail_reason.as_deref() {
                Some(reason) => format!("{} ({})", item.description, reason),
                None => item.description.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            id: inspection.id.to_string(),
            timestamp: inspection.timestamp,
            store_name: inspection.store_name.clone(),
            inspector_name: inspection.inspector_name.clone(),
            total_items: inspection.total_items,
            passed_items: inspection.passed_items,
            failed_items: inspection.failed_items,
            pass_rate: inspection.pass_rate,
            failed_questions,
            device_info: inspection.device_info.clone(),
        }
    }
}

/// Aggregate a loaded set of inspections
pub fn build_dashboard(inspections: &[Inspection], bucket: TimeBucket, top: usize) -> Dashboard {
    Dashboard {
        summary: summarize(inspections),
        common_failures: common_failures(inspections, top),
        trend: trend(inspections, bucket),
        stores: store_breakdown(inspections),
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self {
            inspections: InspectionService::new(db),
        }
    }

    /// Dashboard over every inspection matching the query
    pub async fn get_dashboard(
        &self,
        query: &InspectionQuery,
        bucket: TimeBucket,
        top: usize,
    ) -> AppResult<Dashboard> {
        let inspections = self.inspections.list_inspections(query).await?;
        tracing::debug!(inspections = inspections.len(), ?bucket, "building dashboard");
        Ok(build_dashboard(&inspections, bucket, top))
    }

    /// Flat export rows
    pub async fn get_export_rows(&self, query: &InspectionQuery) -> AppResult<Vec<InspectionExportRow>> {
        let inspections = self.inspections.list_inspections(query).await?;
        Ok(inspections.iter().map(InspectionExportRow::from).collect())
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
