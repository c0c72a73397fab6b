// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/auth/login", post(crate::handlers::auth::login_handler))
        .route("/auth/logout", post(crate::handlers::auth::logout_handler))
        .route("/health", get(crate::handlers::health::health_handler))

        // Dashboard endpoints (require session)
        .route("/dashboard", get(crate::handlers::dashboard::dashboard_handler))
        .route("/dashboard/logs", get(crate::handlers::dashboard::logs_handler))
        .route("/dashboard/activity", get(crate::handlers::dashboard::activity_handler))

        // Profile endpoints (require session)
        .route("/profile", get(crate::handlers::profile::profile_handler))
        .route("/profile/update", post(crate::handlers::profile::update_profile_handler))
        .route("/profile/bot-settings", post(crate::handlers::profile::bot_settings_handler))
        .route("/profile/notifications", post(crate::handlers::profile::notifications_handler))
        .route("/profile/change-password", post(crate::handlers::profile::change_password_handler))

        // Admin endpoints (require session + admin role)
        .route("/admin/users", get(crate::handlers::admin::list_users_handler))
        .route("/admin/user/{id}/license", post(crate::handlers::admin::update_license_handler))
        .route("/admin/user/{id}/logs", get(crate::handlers::admin::user_logs_handler))
        .route("/admin/activity", get(crate::handlers::admin::global_activity_handler))

        // Bot endpoints
        .route("/api/bot/license-status/{user_id}", get(crate::handlers::bot::license_status_handler))
        .route("/api/bot/config/{user_id}", get(crate::handlers::bot::config_handler))
        .route("/api/bot/log", post(crate::handlers::bot::log_handler))
        .route("/api/bot/start/{user_id}", post(crate::handlers::bot::start_handler))
        .route("/api/bot/stop/{user_id}", post(crate::handlers::bot::stop_handler))
        .route("/api/bot/status/{user_id}", get(crate::handlers::bot::status_handler))

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}
