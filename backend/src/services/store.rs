//! Store management service

use serde::Deserialize;
use shared::{validate_store_name, Store};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{conflict_on_unique, AppError, AppResult};

/// Store service for managing inspected locations
#[derive(Clone)]
pub struct StoreService {
    db: PgPool,
}

/// Store row from database
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: Uuid,
    name: String,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            name: row.name,
        }
    }
}

/// Input for creating a store
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreInput {
    #[validate(length(max = 100, message = "Store name must be at most 100 characters"))]
    pub name: String,
}

impl StoreService {
    /// Create a new StoreService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All stores, alphabetically
    pub async fn list_stores(&self) -> AppResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, StoreRow>("SELECT id, name FROM stores ORDER BY name ASC")
            .fetch_all(&self.db)
            .await?;

        Ok(stores.into_iter().map(Store::from).collect())
    }

    /// Get a store by ID
    pub async fn get_store(&self, store_id: Uuid) -> AppResult<Store> {
        sqlx::query_as::<_, StoreRow>("SELECT id, name FROM stores WHERE id = $1")
            .bind(store_id)
            .fetch_optional(&self.db)
            .await?
            .map(Store::from)
            .ok_or_else(|| AppError::NotFound("Store".to_string()))
    }

    /// Create a new store
    pub async fn create_store(&self, input: CreateStoreInput) -> AppResult<Store> {
        input.validate()?;
        validate_store_name(&input.name).map_err(|m| AppError::Validation {
            field: "name".to_string(),
            message: m.to_string(),
        })?;
        let name = input.name.trim();

        // Check for duplicate name
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stores WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "store".to_string(),
                message: "A store with this name already exists".to_string(),
            });
        }

        let store = sqlx::query_as::<_, StoreRow>(
            "INSERT INTO stores (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| conflict_on_unique(e, "store", "A store with this name already exists"))?;

        tracing::info!(store_id = %store.id, name = %store.name, "store created");
        Ok(store.into())
    }

    /// Delete a store that no inspection refers to
    pub async fn delete_store(&self, store_id: Uuid) -> AppResult<()> {
        let inspections = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM inspections WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.db)
        .await?;

        if inspections > 0 {
            return Err(AppError::Conflict {
                resource: "store".to_string(),
                message: format!(
                    "Store has {} inspection(s) and cannot be deleted",
                    inspections
                ),
            });
        }

        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(store_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Store".to_string()));
        }

        tracing::info!(store_id = %store_id, "store deleted");
        Ok(())
    }
}
