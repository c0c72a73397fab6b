use serde::{Deserialize, Serialize};

/// Account role. Fixed at creation time, there is no role-change operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// License entitlement state.
///
/// `Expired` is only ever written by the license evaluator when a past
/// expiry is detected; an admin reactivates by setting `Active` together
/// with a new expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Inactive,
    Expired,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Inactive => "inactive",
            LicenseStatus::Expired => "expired",
        }
    }
}

#[derive(Clone, Debug)]
pub struct User {
    /// User ID
    pub id: u32,
    /// Login key, stored lowercased
    pub email: String,
    /// bcrypt password hash, never exposed through the API
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub license_status: LicenseStatus,
    /// Unix seconds; None means no time bound on the license
    pub license_expiry: Option<i64>,
    /// Token the external bot process uses on the user's behalf
    pub bot_token: String,
    pub auto_accept: bool,
    /// Minimum payout for auto-accept, in currency units
    pub min_block_value: f64,
    pub email_notifications: bool,
    pub telegram_notifications: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when creating an account; the store assigns the id
/// and timestamps.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub license_status: LicenseStatus,
    pub license_expiry: Option<i64>,
}

/// Admin-facing projection of a user row, without the password hash.
#[derive(Clone, Debug, Serialize)]
pub struct UserSummary {
    pub id: u32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub license_status: LicenseStatus,
    pub license_expiry: Option<i64>,
    pub created_at: i64,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            license_status: user.license_status,
            license_expiry: user.license_expiry,
            created_at: user.created_at,
        }
    }
}
