use crate::models::user::{LicenseStatus, Role, User};
use serde::Serialize;

/// Snapshot of an authenticated identity, held server-side per token.
///
/// `license_status` is a hint captured at login; gate decisions always
/// re-read the persisted user row.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub user_id: u32,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub license_status: LicenseStatus,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            license_status: user.license_status,
        }
    }
}
