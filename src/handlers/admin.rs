use crate::auth::guards::{require_admin, require_authenticated};
use crate::core::error::ApiError;
use crate::core::state::AppState;
use crate::handlers::record_activity;
use crate::models::activity::ActivityLogView;
use crate::models::api::{
    BlockLogsResponse, GlobalActivityResponse, LicenseUpdateRequest, SuccessResponse,
    UsersResponse,
};
use crate::stores::activity_store::ActivityLedger;
use crate::stores::user_store::CredentialStore;
use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const BLOCK_LOG_LIMIT: usize = 100;
const GLOBAL_ACTIVITY_LIMIT: usize = 20;

/// GET /admin/users
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    require_admin(&session)?;

    let users = state.users.all_users()?;

    Ok((
        StatusCode::OK,
        Json(UsersResponse {
            success: true,
            users,
        }),
    )
        .into_response())
}

/// POST /admin/user/{id}/license
pub async fn update_license_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
    Json(request): Json<LicenseUpdateRequest>,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    require_admin(&session)?;

    state
        .users
        .find_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;

    state.users.set_license(user_id, request.status, request.expiry)?;

    info!(
        admin_id = session.user_id,
        user_id = user_id,
        status = request.status.as_str(),
        "license updated"
    );

    record_activity(
        &state,
        session.user_id,
        "update_license",
        &format!(
            "Updated license for user ID {} to {}",
            user_id,
            request.status.as_str()
        ),
        Some(&addr.ip().to_string()),
    );

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "License updated successfully".to_string(),
        }),
    )
        .into_response())
}

/// GET /admin/user/{id}/logs
pub async fn user_logs_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    require_admin(&session)?;

    state
        .users
        .find_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;

    let logs = state.blocks.list_for_user(user_id, BLOCK_LOG_LIMIT);

    Ok((
        StatusCode::OK,
        Json(BlockLogsResponse {
            success: true,
            logs,
        }),
    )
        .into_response())
}

/// GET /admin/activity
pub async fn global_activity_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    require_admin(&session)?;

    let entries = state.activity.list_all(GLOBAL_ACTIVITY_LIMIT)?;

    // Join actor identity onto each entry; deleted accounts show as None
    let mut logs = Vec::with_capacity(entries.len());
    for entry in entries {
        let actor = state.users.find_by_id(entry.user_id)?;
        let (email, full_name) = match actor {
            Some(user) => (Some(user.email), Some(user.full_name)),
            None => (None, None),
        };
        logs.push(ActivityLogView::new(entry, email, full_name));
    }

    Ok((
        StatusCode::OK,
        Json(GlobalActivityResponse {
            success: true,
            logs,
        }),
    )
        .into_response())
}
