pub mod auth;
pub mod dashboard;
pub mod profile;
pub mod admin;
pub mod bot;
pub mod health;
pub mod fallback;

use crate::core::state::AppState;
use crate::stores::activity_store::ActivityLedger;
use tracing::warn;

/// Best-effort audit append. The guarded operation has already
/// committed; a failed write is reported and swallowed.
pub(crate) fn record_activity(
    state: &AppState,
    user_id: u32,
    action: &str,
    details: &str,
    origin: Option<&str>,
) {
    if let Err(e) = state
        .activity
        .record(user_id, action, Some(details), origin)
    {
        warn!(user_id = user_id, action = action, error = %e, "failed to record activity");
    }
}
