//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::User;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{CreateUserInput, Session};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutResponse {
    pub revoked_sessions: u64,
}

/// Sign-in endpoint handler
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> AppResult<Json<Session>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service.sign_in(&body.email, &body.password).await?;
    Ok(Json(session))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<Session>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service.refresh(&body.refresh_token).await?;
    Ok(Json(session))
}

/// Sign-out endpoint handler
pub async fn sign_out(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<SignOutResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let revoked_sessions = auth_service.sign_out(user.user_id).await?;
    Ok(Json(SignOutResponse { revoked_sessions }))
}

/// Current session's account
pub async fn session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let account = auth_service.current_user(user.user_id).await?;
    Ok(Json(account))
}

/// Create an account (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    user.require_admin()?;
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let created = auth_service.create_user(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List accounts (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    user.require_admin()?;
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    Ok(Json(auth_service.list_users().await?))
}
