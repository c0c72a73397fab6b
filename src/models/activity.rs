use serde::Serialize;

/// One immutable audit record. Entries are never updated after being
/// written and are only deleted in bulk by age-based retention.
#[derive(Clone, Debug, Serialize)]
pub struct ActivityLogEntry {
    pub id: u64,
    pub user_id: u32,
    /// Short action tag, e.g. "login", "update_license"
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: i64,
}

/// Audit record joined with actor identity, for the admin listing.
#[derive(Clone, Debug, Serialize)]
pub struct ActivityLogView {
    pub id: u64,
    pub user_id: u32,
    pub action: String,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub timestamp: i64,
    /// None if the actor's account no longer exists
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl ActivityLogView {
    pub fn new(entry: ActivityLogEntry, email: Option<String>, full_name: Option<String>) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            details: entry.details,
            ip_address: entry.ip_address,
            timestamp: entry.timestamp,
            email,
            full_name,
        }
    }
}
