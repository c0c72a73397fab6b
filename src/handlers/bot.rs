// Endpoints the external bot process talks to, plus the start/stop
// relay used from the dashboard.

use crate::auth::guards::{require_authenticated, require_licensed_user};
use crate::auth::license::{self, LicenseDecision};
use crate::bot::client::BotStartConfig;
use crate::core::error::{ApiError, GateError};
use crate::core::state::AppState;
use crate::handlers::record_activity;
use crate::models::api::{
    BotConfigResponse, BotLogRequest, BotStatusResponse, LicenseStatusResponse, SuccessResponse,
};
use crate::models::block::NewDeliveryBlockLog;
use crate::models::session::Session;
use crate::models::user::Role;
use crate::stores::activity_store::ActivityLedger;
use crate::stores::user_store::CredentialStore;
use crate::utils::time::current_timestamp;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

fn ensure_self_or_admin(session: &Session, target_id: u32) -> Result<(), GateError> {
    if session.user_id == target_id || session.role == Role::Admin {
        Ok(())
    } else {
        Err(GateError::Forbidden)
    }
}

/// GET /api/bot/license-status/{user_id}
///
/// Unauthenticated poll used by the bot between runs. Read-only: an
/// overdue expiry is reported as inactive here but only persisted when a
/// gated operation observes it.
pub async fn license_status_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
) -> Result<Response, ApiError> {
    let Some(user) = state.users.find_by_id(user_id)? else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "active": false,
                "message": "User not found",
            })),
        )
            .into_response());
    };

    let decision = license::evaluate(user.license_status, user.license_expiry, current_timestamp());
    let active = decision == LicenseDecision::Entitled;

    Ok((
        StatusCode::OK,
        Json(LicenseStatusResponse {
            active,
            status: user.license_status,
            expiry: user.license_expiry,
            message: if active {
                "License active".to_string()
            } else {
                "License inactive or expired".to_string()
            },
        }),
    )
        .into_response())
}

/// GET /api/bot/config/{user_id}
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    ensure_self_or_admin(&session, user_id)?;

    let user = state
        .users
        .find_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;

    Ok((
        StatusCode::OK,
        Json(BotConfigResponse {
            user_id: user.id,
            auto_accept: user.auto_accept,
            min_block_value: user.min_block_value,
            bot_token: user.bot_token,
            email_notifications: user.email_notifications,
            telegram_notifications: user.telegram_notifications,
        }),
    )
        .into_response())
}

/// POST /api/bot/log
///
/// Ingest from the bot process. A payload with a block_id is stored as a
/// delivery block outcome; every payload lands in the activity ledger.
/// Unlike the best-effort audit writes elsewhere, the ledger append is
/// the primary operation here and its failure fails the request.
pub async fn log_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BotLogRequest>,
) -> Result<Response, ApiError> {
    state
        .users
        .find_by_id(request.user_id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", request.user_id)))?;

    let timestamp = request.timestamp.unwrap_or_else(current_timestamp);

    if let Some(block_id) = &request.block_id {
        state.blocks.record(NewDeliveryBlockLog {
            user_id: request.user_id,
            block_id: block_id.clone(),
            pickup_location: request.pickup_location.clone(),
            delivery_location: request.delivery_location.clone(),
            payout: request.payout.unwrap_or(0.0),
            result: request
                .result
                .clone()
                .unwrap_or_else(|| "detected".to_string()),
            timestamp,
        });
    }

    state.activity.record(
        request.user_id,
        &request.action,
        request.details.as_deref(),
        None,
    )?;

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Log recorded".to_string(),
        }),
    )
        .into_response())
}

/// POST /api/bot/start/{user_id}
///
/// The only path that starts a bot, and the only bot relay behind the
/// license gate. The gate runs against the target account so an admin
/// cannot start a bot for an unlicensed user.
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    ensure_self_or_admin(&session, user_id)?;
    require_licensed_user(&state, user_id)?;

    let user = state
        .users
        .find_by_id(user_id)?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", user_id)))?;

    state
        .bot
        .start(
            user_id,
            BotStartConfig {
                auto_accept: user.auto_accept,
                min_block_value: user.min_block_value,
                bot_token: user.bot_token,
            },
        )
        .await
        .map_err(|e| ApiError::BotUnavailable(e.to_string()))?;

    info!(user_id = user_id, by = session.user_id, "bot started");
    record_activity(&state, user_id, "bot_started", "Bot started", None);

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Bot started".to_string(),
        }),
    )
        .into_response())
}

/// POST /api/bot/stop/{user_id}
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    ensure_self_or_admin(&session, user_id)?;

    state
        .bot
        .stop(user_id)
        .await
        .map_err(|e| ApiError::BotUnavailable(e.to_string()))?;

    info!(user_id = user_id, by = session.user_id, "bot stopped");
    record_activity(&state, user_id, "bot_stopped", "Bot stopped", None);

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Bot stopped".to_string(),
        }),
    )
        .into_response())
}

/// GET /api/bot/status/{user_id}
///
/// An unreachable bot service reads as "not running" rather than an
/// error, so the dashboard stays usable while the bot is down.
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u32>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;
    ensure_self_or_admin(&session, user_id)?;

    let status = match state.bot.status(user_id).await {
        Ok(status) => status,
        Err(e) => {
            warn!(user_id = user_id, error = %e, "bot status unavailable, reporting not running");
            BotStatusResponse {
                user_id,
                is_running: false,
                session_active: false,
                last_check: None,
            }
        }
    };

    Ok((StatusCode::OK, Json(status)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::models::user::{LicenseStatus, NewUser};
    use crate::stores::user_store::CredentialStore;
    use crate::utils::time::days_to_secs;
    use axum::http::{header, HeaderValue};

    fn test_state() -> Arc<AppState> {
        let state = AppState::new(Config::for_tests()).unwrap();
        state
            .users
            .insert(NewUser {
                email: "alice@example.com".to_string(),
                password_hash: bcrypt::hash("password1", 4).unwrap(),
                full_name: "Alice".to_string(),
                role: Role::User,
                license_status: LicenseStatus::Active,
                license_expiry: None,
            })
            .unwrap();
        state
            .users
            .insert(NewUser {
                email: "bob@example.com".to_string(),
                password_hash: bcrypt::hash("password2", 4).unwrap(),
                full_name: "Bob".to_string(),
                role: Role::User,
                license_status: LicenseStatus::Inactive,
                license_expiry: None,
            })
            .unwrap();
        Arc::new(state)
    }

    fn login(state: &AppState, email: &str, password: &str) -> HeaderMap {
        let (token, _) = state.auth.authenticate(email, password, None).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_license_status_unknown_user_is_404() {
        let state = test_state();
        let response = license_status_handler(State(state), Path(9999))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_license_status_poll_does_not_persist_expiry() {
        use http_body_util::BodyExt;

        let state = test_state();
        state
            .users
            .set_license(1, LicenseStatus::Active, Some(current_timestamp() - days_to_secs(1)))
            .unwrap();

        let response = license_status_handler(State(state.clone()), Path(1))
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["active"], false);

        // The poll reported inactive but wrote nothing
        let user = state.users.find_by_id(1).unwrap().unwrap();
        assert_eq!(user.license_status, LicenseStatus::Active);
    }

    #[tokio::test]
    async fn test_license_status_active() {
        use http_body_util::BodyExt;

        let state = test_state();
        let response = license_status_handler(State(state), Path(1)).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["active"], true);
        assert_eq!(body["status"], "active");
    }

    #[tokio::test]
    async fn test_config_rejects_other_users() {
        let state = test_state();
        let headers = login(&state, "alice@example.com", "password1");

        let err = config_handler(State(state), Path(2), headers)
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_config_returns_bot_settings() {
        use http_body_util::BodyExt;

        let state = test_state();
        state
            .users
            .set_bot_settings(1, "tok-abc", true, 15.0)
            .unwrap();
        let headers = login(&state, "alice@example.com", "password1");

        let response = config_handler(State(state), Path(1), headers)
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["bot_token"], "tok-abc");
        assert_eq!(body["min_block_value"], 15.0);
    }

    #[tokio::test]
    async fn test_log_ingest_with_block_applies_defaults() {
        let state = test_state();

        log_handler(
            State(state.clone()),
            Json(BotLogRequest {
                user_id: 1,
                action: "block_detected".to_string(),
                details: Some("Found block blk-7".to_string()),
                block_id: Some("blk-7".to_string()),
                pickup_location: None,
                delivery_location: None,
                payout: None,
                result: None,
                timestamp: None,
            }),
        )
        .await
        .unwrap();

        let blocks = state.blocks.list_for_user(1, 10);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_id, "blk-7");
        assert_eq!(blocks[0].result, "detected");
        assert_eq!(blocks[0].payout, 0.0);

        let activity = state.activity.list_for_user(1, 10).unwrap();
        assert_eq!(activity[0].action, "block_detected");
    }

    #[tokio::test]
    async fn test_log_ingest_without_block_is_activity_only() {
        let state = test_state();

        log_handler(
            State(state.clone()),
            Json(BotLogRequest {
                user_id: 1,
                action: "session_refresh".to_string(),
                details: None,
                block_id: None,
                pickup_location: None,
                delivery_location: None,
                payout: None,
                result: None,
                timestamp: None,
            }),
        )
        .await
        .unwrap();

        assert!(state.blocks.is_empty());
        assert_eq!(state.activity.list_for_user(1, 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_ingest_unknown_user_is_404() {
        let state = test_state();

        let err = log_handler(
            State(state),
            Json(BotLogRequest {
                user_id: 9999,
                action: "login".to_string(),
                details: None,
                block_id: None,
                pickup_location: None,
                delivery_location: None,
                payout: None,
                result: None,
                timestamp: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_denied_for_unlicensed_target() {
        use http_body_util::BodyExt;

        let state = test_state();
        let headers = login(&state, "bob@example.com", "password2");

        let err = start_handler(State(state), Path(2), headers)
            .await
            .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "license_expired");
    }

    #[tokio::test]
    async fn test_start_denied_for_other_user() {
        let state = test_state();
        let headers = login(&state, "alice@example.com", "password1");

        let err = start_handler(State(state), Path(2), headers)
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_stop_requires_session() {
        let state = test_state();
        let err = stop_handler(State(state), Path(1), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
