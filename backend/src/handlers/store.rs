//! Store management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::Store;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::store::{CreateStoreInput, StoreService};
use crate::AppState;

/// List all stores
pub async fn list_stores(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<Json<Vec<Store>>> {
    let service = StoreService::new(state.db.clone());
    Ok(Json(service.list_stores().await?))
}

/// Get a specific store
pub async fn get_store(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    let service = StoreService::new(state.db.clone());
    Ok(Json(service.get_store(store_id).await?))
}

/// Create a new store (admin only)
pub async fn create_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateStoreInput>,
) -> AppResult<(StatusCode, Json<Store>)> {
    user.require_admin()?;
    let service = StoreService::new(state.db.clone());
    let store = service.create_store(input).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// Delete a store (admin only)
pub async fn delete_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    let service = StoreService::new(state.db.clone());
    service.delete_store(store_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
