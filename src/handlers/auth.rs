use crate::auth::guards::bearer_token;
use crate::core::error::AuthError;
use crate::core::state::AppState;
use crate::models::api::{LoginRequest, LoginResponse, SuccessResponse};
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

/// POST /auth/login
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    // Malformed input gets the same generic rejection as a bad password
    if request.email.is_empty() || !request.email.contains('@') || request.password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let origin = addr.ip().to_string();
    let (token, session) = state
        .auth
        .authenticate(&request.email, &request.password, Some(&origin))?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            token,
            user: session,
        }),
    )
        .into_response())
}

/// POST /auth/logout
///
/// Always succeeds: a missing or stale token has nothing to terminate.
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = bearer_token(&headers) {
        let origin = addr.ip().to_string();
        state.auth.terminate(token, Some(&origin));
    }

    (
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}
