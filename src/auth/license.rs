// License entitlement evaluation.
//
// The decision is a pure function of the stored license fields and the
// current time; the one side effect (persisting the expiry transition)
// is isolated in `is_entitled` and idempotent: once a row reads
// `Expired`, no further writes happen until an admin reactivates it.

use crate::core::error::StorageError;
use crate::models::user::LicenseStatus;
use crate::stores::user_store::CredentialStore;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseDecision {
    Entitled,
    NotEntitled,
    /// A past expiry was observed on a row not yet marked expired; the
    /// caller must persist the transition before denying access.
    ExpireNow,
}

#[derive(Error, Debug)]
pub enum LicenseError {
    #[error("Referenced user no longer exists")]
    UserNotFound,

    #[error(transparent)]
    Storage(StorageError),
}

/// Pure decision over the stored license fields.
pub fn evaluate(status: LicenseStatus, expiry: Option<i64>, now: i64) -> LicenseDecision {
    if status == LicenseStatus::Inactive {
        return LicenseDecision::NotEntitled;
    }

    if let Some(expiry) = expiry {
        if expiry < now && status != LicenseStatus::Expired {
            return LicenseDecision::ExpireNow;
        }
    }

    if status == LicenseStatus::Active {
        LicenseDecision::Entitled
    } else {
        LicenseDecision::NotEntitled
    }
}

/// Evaluate against the current persisted row, persisting the expiry
/// transition when one is due.
///
/// The transition write must succeed before the (negative) decision is
/// returned; a failed write surfaces as `Storage` so gates fail closed
/// instead of granting on a stale read.
pub fn is_entitled(
    store: &dyn CredentialStore,
    user_id: u32,
    now: i64,
) -> Result<bool, LicenseError> {
    let user = store
        .find_by_id(user_id)
        .map_err(LicenseError::Storage)?
        .ok_or(LicenseError::UserNotFound)?;

    match evaluate(user.license_status, user.license_expiry, now) {
        LicenseDecision::Entitled => Ok(true),
        LicenseDecision::NotEntitled => Ok(false),
        LicenseDecision::ExpireNow => {
            // Status-only write; the stored expiry stays for the record.
            match store.set_license(user_id, LicenseStatus::Expired, None) {
                Ok(()) => {
                    info!(user_id = user_id, "license expired, status persisted");
                    Ok(false)
                }
                Err(StorageError::NotFound(_)) => Err(LicenseError::UserNotFound),
                Err(e) => Err(LicenseError::Storage(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{NewUser, Role, User, UserSummary};
    use crate::stores::user_store::MemoryUserStore;
    use std::sync::Arc;

    const NOW: i64 = 1_700_000_000;

    fn seed(store: &MemoryUserStore, status: LicenseStatus, expiry: Option<i64>) -> u32 {
        let id = store
            .insert(NewUser {
                email: "user@example.com".to_string(),
                password_hash: "$2b$12$hash".to_string(),
                full_name: "Test User".to_string(),
                role: Role::User,
                license_status: status,
                license_expiry: None,
            })
            .unwrap();
        // seed with no expiry, then apply it through set_license so
        // that path gets exercised too
        if expiry.is_some() {
            store.set_license(id, status, expiry).unwrap();
        }
        id
    }

    #[test]
    fn test_evaluate_inactive_never_entitled() {
        assert_eq!(
            evaluate(LicenseStatus::Inactive, None, NOW),
            LicenseDecision::NotEntitled
        );
        // Even with a past expiry, inactive short-circuits first
        assert_eq!(
            evaluate(LicenseStatus::Inactive, Some(NOW - 100), NOW),
            LicenseDecision::NotEntitled
        );
    }

    #[test]
    fn test_evaluate_active_unexpired() {
        assert_eq!(
            evaluate(LicenseStatus::Active, Some(NOW + 100), NOW),
            LicenseDecision::Entitled
        );
        assert_eq!(
            evaluate(LicenseStatus::Active, None, NOW),
            LicenseDecision::Entitled
        );
    }

    #[test]
    fn test_evaluate_active_past_expiry_demands_transition() {
        assert_eq!(
            evaluate(LicenseStatus::Active, Some(NOW - 1), NOW),
            LicenseDecision::ExpireNow
        );
    }

    #[test]
    fn test_evaluate_expired_is_terminal_without_rewrite() {
        assert_eq!(
            evaluate(LicenseStatus::Expired, Some(NOW - 1), NOW),
            LicenseDecision::NotEntitled
        );
        assert_eq!(
            evaluate(LicenseStatus::Expired, None, NOW),
            LicenseDecision::NotEntitled
        );
    }

    #[test]
    fn test_expiry_exactly_now_is_not_expired() {
        assert_eq!(
            evaluate(LicenseStatus::Active, Some(NOW), NOW),
            LicenseDecision::Entitled
        );
    }

    #[test]
    fn test_is_entitled_flips_and_is_idempotent() {
        let store = MemoryUserStore::new();
        let id = seed(&store, LicenseStatus::Active, Some(NOW - 3600));

        assert!(!is_entitled(&store, id, NOW).unwrap());
        let user = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(user.license_status, LicenseStatus::Expired);
        assert_eq!(user.license_expiry, Some(NOW - 3600));
        let first_write = user.updated_at;

        // Second call returns false without another write
        assert!(!is_entitled(&store, id, NOW).unwrap());
        let user = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(user.license_status, LicenseStatus::Expired);
        assert_eq!(user.updated_at, first_write);
    }

    #[test]
    fn test_is_entitled_missing_user() {
        let store = MemoryUserStore::new();
        let err = is_entitled(&store, 404, NOW).unwrap_err();
        assert!(matches!(err, LicenseError::UserNotFound));
    }

    #[test]
    fn test_admin_reactivation_clears_expired() {
        let store = MemoryUserStore::new();
        let id = seed(&store, LicenseStatus::Active, Some(NOW - 3600));
        assert!(!is_entitled(&store, id, NOW).unwrap());

        // Admin reactivates with a fresh expiry
        store
            .set_license(id, LicenseStatus::Active, Some(NOW + 30 * 86_400))
            .unwrap();
        assert!(is_entitled(&store, id, NOW).unwrap());
    }

    /// Store double whose writes fail while reads keep working, for the
    /// fail-closed path.
    struct ReadOnlyStore {
        inner: MemoryUserStore,
    }

    impl CredentialStore for ReadOnlyStore {
        fn find_by_id(&self, id: u32) -> Result<Option<User>, StorageError> {
            self.inner.find_by_id(id)
        }

        fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
            self.inner.find_by_email(email)
        }

        fn insert(&self, new_user: NewUser) -> Result<u32, StorageError> {
            self.inner.insert(new_user)
        }

        fn set_license(
            &self,
            _id: u32,
            _status: LicenseStatus,
            _expiry: Option<i64>,
        ) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write path down".to_string()))
        }

        fn set_full_name(&self, _id: u32, _full_name: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write path down".to_string()))
        }

        fn set_bot_settings(
            &self,
            _id: u32,
            _bot_token: &str,
            _auto_accept: bool,
            _min_block_value: f64,
        ) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write path down".to_string()))
        }

        fn set_notifications(
            &self,
            _id: u32,
            _email_notifications: bool,
            _telegram_notifications: bool,
        ) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write path down".to_string()))
        }

        fn set_password_hash(&self, _id: u32, _password_hash: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("write path down".to_string()))
        }

        fn all_users(&self) -> Result<Vec<UserSummary>, StorageError> {
            self.inner.all_users()
        }
    }

    #[test]
    fn test_failed_transition_write_fails_closed() {
        let store = ReadOnlyStore {
            inner: MemoryUserStore::new(),
        };
        let id = seed(&store.inner, LicenseStatus::Active, Some(NOW - 1));

        let err = is_entitled(&store, id, NOW).unwrap_err();
        assert!(matches!(err, LicenseError::Storage(_)));

        // The stale active row must not have been granted
        let user = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(user.license_status, LicenseStatus::Active);
    }

    #[test]
    fn test_concurrent_expiry_detection_is_benign() {
        let store = Arc::new(MemoryUserStore::new());
        let id = seed(&store, LicenseStatus::Active, Some(NOW - 60));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || is_entitled(store.as_ref(), id, NOW))
            })
            .collect();

        for handle in handles {
            let entitled = handle.join().unwrap().unwrap();
            assert!(!entitled);
        }

        let user = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(user.license_status, LicenseStatus::Expired);
        assert_eq!(user.license_expiry, Some(NOW - 60));
    }
}
