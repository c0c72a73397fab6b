use crate::core::error::StorageError;
use crate::models::user::{LicenseStatus, NewUser, User, UserSummary};
use crate::utils::time::current_timestamp;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Emails are compared case-insensitively; the store keys its index on
/// this normalized form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Persistence seam for user identity and entitlement rows.
///
/// All methods are fallible so callers can distinguish "row absent" from
/// "store unreachable" and fail closed on the latter. Contract for
/// implementations that support account deletion: removing a user also
/// removes that user's activity and block entries.
pub trait CredentialStore: Send + Sync {
    fn find_by_id(&self, id: u32) -> Result<Option<User>, StorageError>;

    /// Lookup by normalized email; the sole login key.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Returns the assigned user id; `Conflict` if the email is taken.
    fn insert(&self, new_user: NewUser) -> Result<u32, StorageError>;

    /// Update license status, and expiry when one is supplied. A `None`
    /// expiry keeps the stored value, so the evaluator's status-only
    /// expiry write leaves the timestamp intact.
    fn set_license(
        &self,
        id: u32,
        status: LicenseStatus,
        expiry: Option<i64>,
    ) -> Result<(), StorageError>;

    fn set_full_name(&self, id: u32, full_name: &str) -> Result<(), StorageError>;

    fn set_bot_settings(
        &self,
        id: u32,
        bot_token: &str,
        auto_accept: bool,
        min_block_value: f64,
    ) -> Result<(), StorageError>;

    fn set_notifications(
        &self,
        id: u32,
        email_notifications: bool,
        telegram_notifications: bool,
    ) -> Result<(), StorageError>;

    fn set_password_hash(&self, id: u32, password_hash: &str) -> Result<(), StorageError>;

    /// All accounts without password hashes, newest first.
    fn all_users(&self) -> Result<Vec<UserSummary>, StorageError>;
}

/// In-memory credential store backed by DashMap, with a secondary index
/// from normalized email to user id.
pub struct MemoryUserStore {
    users: DashMap<u32, User>,
    email_index: DashMap<String, u32>,
    next_id: AtomicU32,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            email_index: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn update<F>(&self, id: u32, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut User),
    {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                apply(&mut user);
                user.updated_at = current_timestamp();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("user {}", id))),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for MemoryUserStore {
    fn find_by_id(&self, id: u32) -> Result<Option<User>, StorageError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let key = normalize_email(email);
        match self.email_index.get(&key) {
            Some(id) => self.find_by_id(*id),
            None => Ok(None),
        }
    }

    fn insert(&self, new_user: NewUser) -> Result<u32, StorageError> {
        let email = normalize_email(&new_user.email);
        if self.email_index.contains_key(&email) {
            return Err(StorageError::Conflict(format!("email {} is taken", email)));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = current_timestamp();

        let user = User {
            id,
            email: email.clone(),
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            license_status: new_user.license_status,
            license_expiry: new_user.license_expiry,
            bot_token: String::new(),
            auto_accept: false,
            min_block_value: 0.0,
            email_notifications: true,
            telegram_notifications: true,
            created_at: now,
            updated_at: now,
        };

        self.users.insert(id, user);
        self.email_index.insert(email, id);

        Ok(id)
    }

    fn set_license(
        &self,
        id: u32,
        status: LicenseStatus,
        expiry: Option<i64>,
    ) -> Result<(), StorageError> {
        self.update(id, |user| {
            user.license_status = status;
            if expiry.is_some() {
                user.license_expiry = expiry;
            }
        })
    }

    fn set_full_name(&self, id: u32, full_name: &str) -> Result<(), StorageError> {
        self.update(id, |user| {
            user.full_name = full_name.to_string();
        })
    }

    fn set_bot_settings(
        &self,
        id: u32,
        bot_token: &str,
        auto_accept: bool,
        min_block_value: f64,
    ) -> Result<(), StorageError> {
        self.update(id, |user| {
            user.bot_token = bot_token.to_string();
            user.auto_accept = auto_accept;
            user.min_block_value = min_block_value;
        })
    }

    fn set_notifications(
        &self,
        id: u32,
        email_notifications: bool,
        telegram_notifications: bool,
    ) -> Result<(), StorageError> {
        self.update(id, |user| {
            user.email_notifications = email_notifications;
            user.telegram_notifications = telegram_notifications;
        })
    }

    fn set_password_hash(&self, id: u32, password_hash: &str) -> Result<(), StorageError> {
        self.update(id, |user| {
            user.password_hash = password_hash.to_string();
        })
    }

    fn all_users(&self) -> Result<Vec<UserSummary>, StorageError> {
        let mut users: Vec<UserSummary> = self
            .users
            .iter()
            .map(|entry| UserSummary::from(entry.value()))
            .collect();

        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(users)
    }
}
