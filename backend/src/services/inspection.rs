//! Inspection service: checklist submissions and their items

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{
    validate_fix_toggle, validate_submission, ChecklistSummary, Inspection, InspectionItem,
    ItemStatus, NewInspection, NewInspectionItem, SortOrder, TimeRange,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Inspection service
#[derive(Clone)]
pub struct InspectionService {
    db: PgPool,
}

/// Filter, sort and limit for inspection listings
#[derive(Debug, Clone, Default)]
pub struct InspectionQuery {
    pub store_id: Option<Uuid>,
    /// Case-insensitive substring of the inspector name
    pub inspector: Option<String>,
    pub range: TimeRange,
    pub order: SortOrder,
    /// `None` returns every match
    pub limit: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct InspectionRow {
    id: Uuid,
    store_id: Uuid,
    store_name: String,
    inspector_name: String,
    total_items: i32,
    passed_items: i32,
    failed_items: i32,
    pass_rate: i32,
    inspected_at: DateTime<Utc>,
    device_info: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    inspection_id: Uuid,
    description: String,
    status: String,
    fail_reason: Option<String>,
    is_fixed: Option<bool>,
    answered_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_item(self) -> AppResult<InspectionItem> {
        let status = self
            .status
            .parse::<ItemStatus>()
            .map_err(|e| AppError::Internal(format!("Corrupt inspection item: {}", e)))?;
        Ok(InspectionItem {
            id: self.id,
            description: self.description,
            status,
            fail_reason: self.fail_reason,
            is_fixed: self.is_fixed,
            timestamp: self.answered_at,
        })
    }
}

impl InspectionRow {
    fn into_inspection(self, items: Vec<InspectionItem>) -> Inspection {
        Inspection {
            id: self.id,
            store_id: self.store_id,
            store_name: self.store_name,
            inspector_name: self.inspector_name,
            items,
            total_items: self.total_items,
            passed_items: self.passed_items,
            failed_items: self.failed_items,
            pass_rate: self.pass_rate,
            timestamp: self.inspected_at,
            device_info: self.device_info,
        }
    }
}

/// An answer as written to `inspection_items`
#[derive(Debug, PartialEq)]
struct ItemRecord<'a> {
    description: &'a str,
    status: ItemStatus,
    fail_reason: Option<&'a str>,
    is_fixed: Option<bool>,
    answered_at: DateTime<Utc>,
}

/// Trim text and keep failure detail only on failed items
fn normalize_item(item: &NewInspectionItem, inspected_at: DateTime<Utc>) -> ItemRecord<'_> {
    let (fail_reason, is_fixed) = match item.status {
        ItemStatus::Fail => (
            item.fail_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty()),
            Some(item.is_fixed.unwrap_or(false)),
        ),
        ItemStatus::Pass => (None, None),
    };
    ItemRecord {
        description: item.description.trim(),
        status: item.status,
        fail_reason,
        is_fixed,
        answered_at: item.timestamp.unwrap_or(inspected_at),
    }
}

/// Parse a stored status and refuse fix toggles on passed items
fn check_fix_target(status: &str) -> AppResult<ItemStatus> {
    let status = status
        .parse::<ItemStatus>()
        .map_err(|e| AppError::Internal(format!("Corrupt inspection item: {}", e)))?;
    validate_fix_toggle(status).map_err(|m| AppError::Validation {
        field: "isFixed".to_string(),
        message: m.to_string(),
    })?;
    Ok(status)
}

const INSPECTION_COLUMNS: &str = "id, store_id, store_name, inspector_name, total_items, \
     passed_items, failed_items, pass_rate, inspected_at, device_info";

/// Append the WHERE clause for a listing
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &InspectionQuery) {
    builder.push(" WHERE TRUE");
    if let Some(store_id) = query.store_id {
        builder.push(" AND store_id = ").push_bind(store_id);
    }
    if let Some(inspector) = query.inspector.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        builder
            .push(" AND inspector_name ILIKE ")
            .push_bind(format!("%{}%", inspector.replace('%', "\\%").replace('_', "\\_")));
    }
    if let Some(since) = query.range.since {
        builder.push(" AND inspected_at >= ").push_bind(since);
    }
    if let Some(until) = query.range.until {
        builder.push(" AND inspected_at <= ").push_bind(until);
    }
}

impl InspectionService {
    /// Create a new InspectionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List inspections with their items
    pub async fn list_inspections(&self, query: &InspectionQuery) -> AppResult<Vec<Inspection>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM inspections",
            INSPECTION_COLUMNS
        ));
        push_filters(&mut builder, query);
        builder.push(format!(" ORDER BY inspected_at {}, id", query.order.as_sql()));
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let rows = builder
            .build_query_as::<InspectionRow>()
            .fetch_all(&self.db)
            .await?;

        self.attach_items(rows).await
    }

    /// Get one inspection with its items
    pub async fn get_inspection(&self, inspection_id: Uuid) -> AppResult<Inspection> {
        let row = sqlx::query_as::<_, InspectionRow>(&format!(
            "SELECT {} FROM inspections WHERE id = $1",
            INSPECTION_COLUMNS
        ))
        .bind(inspection_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inspection".to_string()))?;

        self.attach_items(vec![row])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound("Inspection".to_string()))
    }

    /// Store a submitted checklist; tallies are computed here, never trusted from the client
    pub async fn create_inspection(
        &self,
        submitted_by: Uuid,
        input: NewInspection,
    ) -> AppResult<Inspection> {
        validate_submission(&input)?;

        let store_id = input.store_id.ok_or_else(|| AppError::Validation {
            field: "storeId".to_string(),
            message: "Please select a store".to_string(),
        })?;

        let store_name = sqlx::query_scalar::<_, String>("SELECT name FROM stores WHERE id = $1")
            .bind(store_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::Validation {
                field: "storeId".to_string(),
                message: "The selected store no longer exists".to_string(),
            })?;

        let summary = ChecklistSummary::from_items(&input.items);
        let inspected_at = input.timestamp.unwrap_or_else(Utc::now);

        // Start transaction
        let mut tx = self.db.begin().await?;

        let inspection_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO inspections (store_id, store_name, inspector_name, submitted_by,
                                     total_items, passed_items, failed_items, pass_rate,
                                     inspected_at, device_info)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(store_id)
        .bind(&store_name)
        .bind(input.inspector_name.trim())
        .bind(submitted_by)
        .bind(summary.total_items)
        .bind(summary.passed_items)
        .bind(summary.failed_items)
        .bind(summary.pass_rate)
        .bind(inspected_at)
        .bind(&input.device_info)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in input.items.iter().enumerate() {
            let record = normalize_item(item, inspected_at);

            sqlx::query(
                r#"
                INSERT INTO inspection_items (inspection_id, position, description, status,
                                              fail_reason, is_fixed, answered_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(inspection_id)
            .bind(position as i32)
            .bind(record.description)
            .bind(record.status.as_str())
            .bind(record.fail_reason)
            .bind(record.is_fixed)
            .bind(record.answered_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            inspection_id = %inspection_id,
            store_id = %store_id,
            total = summary.total_items,
            failed = summary.failed_items,
            pass_rate = summary.pass_rate,
            "inspection recorded"
        );

        self.get_inspection(inspection_id).await
    }

    /// Mark a failed item as fixed on site (or undo it)
    pub async fn set_item_fixed(
        &self,
        inspection_id: Uuid,
        item_id: Uuid,
        is_fixed: bool,
    ) -> AppResult<Inspection> {
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM inspection_items WHERE id = $1 AND inspection_id = $2",
        )
        .bind(item_id)
        .bind(inspection_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inspection item".to_string()))?;

        check_fix_target(&status)?;

        sqlx::query("UPDATE inspection_items SET is_fixed = $1 WHERE id = $2 AND status = 'fail'")
            .bind(is_fixed)
            .bind(item_id)
            .execute(&self.db)
            .await?;

        tracing::info!(inspection_id = %inspection_id, item_id = %item_id, is_fixed, "item fix state updated");

        self.get_inspection(inspection_id).await
    }

    /// Delete an inspection and its items
    pub async fn delete_inspection(&self, inspection_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inspections WHERE id = $1")
            .bind(inspection_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inspection".to_string()));
        }

        tracing::info!(inspection_id = %inspection_id, "inspection deleted");
        Ok(())
    }

    /// Load the items of every row in one query, preserving row order
    async fn attach_items(&self, rows: Vec<InspectionRow>) -> AppResult<Vec<Inspection>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, inspection_id, description, status, fail_reason, is_fixed, answered_at
            FROM inspection_items
            WHERE inspection_id = ANY($1)
            ORDER BY inspection_id, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut items: HashMap<Uuid, Vec<InspectionItem>> = HashMap::new();
        for row in item_rows {
            let inspection_id = row.inspection_id;
            items.entry(inspection_id).or_default().push(row.into_item()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let row_items = items.remove(&row.id).unwrap_or_default();
                let inspection = row.into_inspection(row_items);
                if !inspection.is_consistent() {
                    tracing::warn!(inspection_id = %inspection.id, "stored tallies disagree with items");
                }
                inspection
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn answer(status: ItemStatus) -> NewInspectionItem {
        NewInspectionItem {
            description: "  Cold storage is at the correct temperature ".to_string(),
            status,
            fail_reason: Some("  Thermometer read 9C  ".to_string()),
            is_fixed: None,
            timestamp: None,
        }
    }

    fn visit() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_normalize_failed_item_keeps_trimmed_reason() {
        let item = answer(ItemStatus::Fail);
        let record = normalize_item(&item, visit());
        assert_eq!(record.description, "Cold storage is at the correct temperature");
        assert_eq!(record.fail_reason, Some("Thermometer read 9C"));
        assert_eq!(record.is_fixed, Some(false));
        assert_eq!(record.answered_at, visit());
    }

    #[test]
    fn test_normalize_failed_item_drops_blank_reason_and_keeps_fix() {
        let mut item = answer(ItemStatus::Fail);
        item.fail_reason = Some("   ".to_string());
        item.is_fixed = Some(true);
        let record = normalize_item(&item, visit());
        assert_eq!(record.fail_reason, None);
        assert_eq!(record.is_fixed, Some(true));
    }

    #[test]
    fn test_normalize_passed_item_clears_failure_detail() {
        let mut item = answer(ItemStatus::Pass);
        item.is_fixed = Some(false);
        let record = normalize_item(&item, visit());
        assert_eq!(record.fail_reason, None);
        assert_eq!(record.is_fixed, None);
    }

    #[test]
    fn test_normalize_keeps_answer_timestamp() {
        let answered = Utc.with_ymd_and_hms(2024, 5, 2, 9, 12, 0).unwrap();
        let mut item = answer(ItemStatus::Pass);
        item.timestamp = Some(answered);
        assert_eq!(normalize_item(&item, visit()).answered_at, answered);
    }

    #[test]
    fn test_fix_toggle_only_on_failed_items() {
        assert_eq!(check_fix_target("fail").unwrap(), ItemStatus::Fail);
        assert!(matches!(
            check_fix_target("pass"),
            Err(AppError::Validation { ref field, .. }) if field == "isFixed"
        ));
        assert!(matches!(check_fix_target("maybe"), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_listing_sql_includes_only_given_filters() {
        let query = InspectionQuery {
            store_id: Some(Uuid::new_v4()),
            inspector: Some("  ".to_string()),
            limit: Some(10),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM inspections");
        push_filters(&mut builder, &query);
        let sql = builder.sql();
        assert!(sql.contains("store_id = $1"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("inspected_at"));
    }

    #[test]
    fn test_listing_sql_with_range_and_inspector() {
        let query = InspectionQuery {
            inspector: Some("lee".to_string()),
            range: TimeRange {
                since: Some(Utc::now()),
                until: Some(Utc::now()),
            },
            limit: Some(10),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM inspections");
        push_filters(&mut builder, &query);
        let sql = builder.sql();
        assert!(sql.contains("inspector_name ILIKE $1"));
        assert!(sql.contains("inspected_at >= $2"));
        assert!(sql.contains("inspected_at <= $3"));
    }
}
