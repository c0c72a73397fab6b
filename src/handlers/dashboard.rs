use crate::auth::guards::require_authenticated;
use crate::core::error::{ApiError, GateError};
use crate::core::state::AppState;
use crate::models::api::{
    ActivityListResponse, BlockLogsResponse, DashboardResponse, ProfileResponse,
};
use crate::models::block::{DashboardStats, DeliveryBlockLog};
use crate::stores::activity_store::ActivityLedger;
use crate::stores::user_store::CredentialStore;
use crate::utils::time::{current_timestamp, same_utc_day};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

const BLOCK_LOG_LIMIT: usize = 100;
const ACTIVITY_LIMIT: usize = 50;

fn compute_stats(logs: &[DeliveryBlockLog], now: i64) -> DashboardStats {
    let accepted: Vec<&DeliveryBlockLog> =
        logs.iter().filter(|log| log.result == "accepted").collect();

    let accepted_today = accepted
        .iter()
        .filter(|log| same_utc_day(log.timestamp, now))
        .count();

    let total_accepted = accepted.len();
    let total_payout: f64 = accepted.iter().map(|log| log.payout).sum();
    let avg_payout = if total_accepted > 0 {
        total_payout / total_accepted as f64
    } else {
        0.0
    };

    DashboardStats {
        accepted_today,
        total_accepted,
        total_payout,
        avg_payout,
    }
}

/// GET /dashboard
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    // Fresh row: license status on the session may be stale
    let user = state
        .users
        .find_by_id(session.user_id)?
        .ok_or(GateError::Unauthenticated)?;

    let recent_logs = state.blocks.list_for_user(user.id, BLOCK_LOG_LIMIT);
    let stats = compute_stats(&recent_logs, current_timestamp());

    Ok((
        StatusCode::OK,
        Json(DashboardResponse {
            success: true,
            user: ProfileResponse::from(&user),
            stats,
            recent_logs,
        }),
    )
        .into_response())
}

/// GET /dashboard/logs
pub async fn logs_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    let logs = state.blocks.list_for_user(session.user_id, BLOCK_LOG_LIMIT);

    Ok((
        StatusCode::OK,
        Json(BlockLogsResponse {
            success: true,
            logs,
        }),
    )
        .into_response())
}

/// GET /dashboard/activity
pub async fn activity_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    let logs = state.activity.list_for_user(session.user_id, ACTIVITY_LIMIT)?;

    Ok((
        StatusCode::OK,
        Json(ActivityListResponse {
            success: true,
            logs,
        }),
    )
        .into_response())
}
