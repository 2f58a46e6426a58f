//! Inspection HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{default_checklist, Inspection, NewInspection, SortOrder, TimeRange};
use uuid::Uuid;

use crate::config::ReportingConfig;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::inspection::{InspectionQuery, InspectionService};
use crate::AppState;

/// Query string accepted by inspection listings and reports
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionParams {
    pub store_id: Option<Uuid>,
    pub inspector: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub order: Option<SortOrder>,
    pub limit: Option<i64>,
}

impl InspectionParams {
    /// Listing query, capped by the configured limits
    pub fn into_query(self, reporting: &ReportingConfig) -> InspectionQuery {
        let limit = Some(reporting.clamp_limit(self.limit));
        InspectionQuery {
            limit,
            ..self.into_unlimited_query()
        }
    }

    /// Query over every match, used for aggregation
    pub fn into_unlimited_query(self) -> InspectionQuery {
        InspectionQuery {
            store_id: self.store_id,
            inspector: self.inspector,
            range: TimeRange {
                since: self.since,
                until: self.until,
            },
            order: self.order.unwrap_or_default(),
            limit: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFixedRequest {
    pub is_fixed: bool,
}

/// List inspections, newest first by default
pub async fn list_inspections(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(params): Query<InspectionParams>,
) -> AppResult<Json<Vec<Inspection>>> {
    let service = InspectionService::new(state.db.clone());
    let query = params.into_query(&state.config.reporting);
    Ok(Json(service.list_inspections(&query).await?))
}

/// Get a specific inspection
pub async fn get_inspection(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(inspection_id): Path<Uuid>,
) -> AppResult<Json<Inspection>> {
    let service = InspectionService::new(state.db.clone());
    Ok(Json(service.get_inspection(inspection_id).await?))
}

/// Submit a completed checklist
pub async fn create_inspection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<NewInspection>,
) -> AppResult<(StatusCode, Json<Inspection>)> {
    let service = InspectionService::new(state.db.clone());
    let inspection = service.create_inspection(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(inspection)))
}

/// Mark a failed item as fixed on site
pub async fn set_item_fixed(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path((inspection_id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SetFixedRequest>,
) -> AppResult<Json<Inspection>> {
    let service = InspectionService::new(state.db.clone());
    let inspection = service
        .set_item_fixed(inspection_id, item_id, body.is_fixed)
        .await?;
    Ok(Json(inspection))
}

/// Delete an inspection (admin only)
pub async fn delete_inspection(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(inspection_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = InspectionService::new(state.db.clone());
    service.delete_inspection(inspection_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Standard checklist questions for a new inspection
pub async fn get_checklist() -> Json<Vec<String>> {
    Json(default_checklist())
}
