//! Reporting handlers for the admin dashboard and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::TimeBucket;

use crate::error::AppResult;
use crate::handlers::inspection::InspectionParams;
use crate::middleware::CurrentUser;
use crate::services::reporting::{Dashboard, ReportingService};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub bucket: Option<TimeBucket>,
    pub top: Option<usize>,
}

/// Export body type; anything else is rejected by the query extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<ExportFormat>,
}

/// Get dashboard statistics (admin only)
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<DashboardQuery>,
    Query(filter): Query<InspectionParams>,
) -> AppResult<Json<Dashboard>> {
    user.require_admin()?;
    let service = ReportingService::new(state.db.clone());

    let top = query.top.unwrap_or(state.config.reporting.default_top_failures);
    let bucket = query.bucket.unwrap_or_default();
    let dashboard = service
        .get_dashboard(&filter.into_unlimited_query(), bucket, top)
        .await?;

    Ok(Json(dashboard))
}

/// Export inspections as JSON or CSV (admin only)
pub async fn export_inspections(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ExportQuery>,
    Query(filter): Query<InspectionParams>,
) -> AppResult<Response> {
    user.require_admin()?;
    let service = ReportingService::new(state.db.clone());

    let data = service
        .get_export_rows(&filter.into_unlimited_query())
        .await?;

    match query.format.unwrap_or_default() {
        ExportFormat::Csv => {
            let csv = ReportingService::export_to_csv(&data)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"inspections.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        ExportFormat::Json => Ok(Json(data).into_response()),
    }
}
