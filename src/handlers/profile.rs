use crate::auth::guards::require_authenticated;
use crate::auth::password::{hash_password, verify_password};
use crate::core::error::{ApiError, GateError};
use crate::core::state::AppState;
use crate::handlers::record_activity;
use crate::models::api::{
    BotSettingsRequest, ChangePasswordRequest, NotificationsRequest, ProfileResponse,
    SuccessResponse, UpdateProfileRequest,
};
use crate::stores::user_store::CredentialStore;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

fn success(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /profile
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    let user = state
        .users
        .find_by_id(session.user_id)?
        .ok_or(GateError::Unauthenticated)?;

    Ok((StatusCode::OK, Json(ProfileResponse::from(&user))).into_response())
}

/// POST /profile/update
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    let full_name = request.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::InvalidParameter("full_name must not be empty".to_string()));
    }

    state.users.set_full_name(session.user_id, full_name)?;

    record_activity(
        &state,
        session.user_id,
        "profile_update",
        "Updated profile information",
        None,
    );

    Ok(success("Profile updated successfully"))
}

/// POST /profile/bot-settings
pub async fn bot_settings_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BotSettingsRequest>,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    if request.min_block_value < 0.0 {
        return Err(ApiError::InvalidParameter(
            "min_block_value must not be negative".to_string(),
        ));
    }

    state.users.set_bot_settings(
        session.user_id,
        &request.bot_token,
        request.auto_accept,
        request.min_block_value,
    )?;

    record_activity(
        &state,
        session.user_id,
        "bot_settings_update",
        "Updated bot settings",
        None,
    );

    Ok(success("Bot settings updated successfully"))
}

/// POST /profile/notifications
pub async fn notifications_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<NotificationsRequest>,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    state.users.set_notifications(
        session.user_id,
        request.email_notifications,
        request.telegram_notifications,
    )?;

    record_activity(
        &state,
        session.user_id,
        "notification_update",
        "Updated notification preferences",
        None,
    );

    Ok(success("Notification preferences updated"))
}

/// POST /profile/change-password
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    let session = require_authenticated(&state, &headers)?;

    if request.new_password != request.confirm_password {
        return Err(ApiError::InvalidParameter("Passwords do not match".to_string()));
    }

    if request.new_password.is_empty() {
        return Err(ApiError::InvalidParameter("Password must not be empty".to_string()));
    }

    let user = state
        .users
        .find_by_id(session.user_id)?
        .ok_or(GateError::Unauthenticated)?;

    if !verify_password(&request.current_password, &user.password_hash) {
        return Err(ApiError::InvalidParameter(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(&request.new_password)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    state.users.set_password_hash(session.user_id, &new_hash)?;

    record_activity(
        &state,
        session.user_id,
        "password_change",
        "Changed account password",
        None,
    );

    Ok(success("Password updated successfully"))
}
