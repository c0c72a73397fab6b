// Access gate: composable guards applied in front of privileged
// operations. Stacking order in handlers is authentication, then role,
// then license.

use crate::auth::license::{self, LicenseError};
use crate::core::error::GateError;
use crate::core::state::AppState;
use crate::models::session::Session;
use crate::models::user::Role;
use crate::utils::time::current_timestamp;
use axum::http::{header, HeaderMap};

/// Extract the bearer token from the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller's session or fail with `Unauthenticated`.
pub fn require_authenticated(state: &AppState, headers: &HeaderMap) -> Result<Session, GateError> {
    let token = bearer_token(headers).ok_or(GateError::Unauthenticated)?;
    state.auth.resolve(token).ok_or(GateError::Unauthenticated)
}

/// Fails with `Forbidden` unless the session's role is admin. Callers
/// stack this after `require_authenticated`.
pub fn require_admin(session: &Session) -> Result<(), GateError> {
    if session.role == Role::Admin {
        Ok(())
    } else {
        Err(GateError::Forbidden)
    }
}

/// License check for the session's own account.
pub fn require_licensed(state: &AppState, session: &Session) -> Result<(), GateError> {
    require_licensed_user(state, session.user_id)
}

/// License check against the current persisted row, never the session's
/// cached status. Storage failure during the evaluation (including the
/// expiry-transition write) fails closed.
pub fn require_licensed_user(state: &AppState, user_id: u32) -> Result<(), GateError> {
    match license::is_entitled(state.users.as_ref(), user_id, current_timestamp()) {
        Ok(true) => Ok(()),
        Ok(false) => Err(GateError::LicenseInactive),
        Err(LicenseError::UserNotFound) => Err(GateError::Unauthenticated),
        Err(LicenseError::Storage(e)) => Err(GateError::Internal(e.to_string())),
    }
}
