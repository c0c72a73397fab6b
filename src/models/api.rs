use crate::models::activity::{ActivityLogEntry, ActivityLogView};
use crate::models::block::{DashboardStats, DeliveryBlockLog};
use crate::models::session::Session;
use crate::models::user::{LicenseStatus, Role, User, UserSummary};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: Session,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// Machine-readable code for outcomes clients branch on,
    /// e.g. "license_expired"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: u32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub license_status: LicenseStatus,
    pub license_expiry: Option<i64>,
    pub bot_token: String,
    pub auto_accept: bool,
    pub min_block_value: f64,
    pub email_notifications: bool,
    pub telegram_notifications: bool,
    pub created_at: i64,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            license_status: user.license_status,
            license_expiry: user.license_expiry,
            bot_token: user.bot_token.clone(),
            auto_accept: user.auto_accept,
            min_block_value: user.min_block_value,
            email_notifications: user.email_notifications,
            telegram_notifications: user.telegram_notifications,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

#[derive(Deserialize)]
pub struct BotSettingsRequest {
    pub bot_token: String,
    #[serde(default)]
    pub auto_accept: bool,
    #[serde(default)]
    pub min_block_value: f64,
}

#[derive(Deserialize)]
pub struct NotificationsRequest {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub telegram_notifications: bool,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LicenseUpdateRequest {
    pub status: LicenseStatus,
    /// Unix seconds; omitted means keep the stored expiry
    pub expiry: Option<i64>,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

#[derive(Serialize)]
pub struct ActivityListResponse {
    pub success: bool,
    pub logs: Vec<ActivityLogEntry>,
}

#[derive(Serialize)]
pub struct GlobalActivityResponse {
    pub success: bool,
    pub logs: Vec<ActivityLogView>,
}

#[derive(Serialize)]
pub struct BlockLogsResponse {
    pub success: bool,
    pub logs: Vec<DeliveryBlockLog>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub user: ProfileResponse,
    pub stats: DashboardStats,
    pub recent_logs: Vec<DeliveryBlockLog>,
}

/// Response for the unauthenticated bot poll; reports stored state
/// without mutating it.
#[derive(Serialize)]
pub struct LicenseStatusResponse {
    pub active: bool,
    pub status: LicenseStatus,
    pub expiry: Option<i64>,
    pub message: String,
}

#[derive(Serialize)]
pub struct BotConfigResponse {
    pub user_id: u32,
    pub auto_accept: bool,
    pub min_block_value: f64,
    pub bot_token: String,
    pub email_notifications: bool,
    pub telegram_notifications: bool,
}

/// Log payload pushed by the bot process. A present `block_id` makes it
/// a delivery block outcome; it is always recorded as an activity entry.
#[derive(Deserialize)]
pub struct BotLogRequest {
    pub user_id: u32,
    pub action: String,
    pub details: Option<String>,
    pub block_id: Option<String>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub payout: Option<f64>,
    pub result: Option<String>,
    pub timestamp: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct BotStatusResponse {
    pub user_id: u32,
    pub is_running: bool,
    pub session_active: bool,
    pub last_check: Option<i64>,
}
