use crate::models::session::Session;
use dashmap::DashMap;
use rand::RngCore;

struct StoredSession {
    session: Session,
    expires_at: i64,
}

/// In-memory session map keyed by bearer token, with a fixed TTL.
///
/// Single-slot policy: issuing a session for a user evicts any previous
/// session that user held, so the last login wins.
pub struct SessionStore {
    sessions: DashMap<String, StoredSession>,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_secs,
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Store a fresh session and return its token.
    pub fn issue(&self, session: Session, now: i64) -> String {
        let user_id = session.user_id;
        self.sessions.retain(|_, stored| stored.session.user_id != user_id);

        let token = Self::generate_token();
        self.sessions.insert(
            token.clone(),
            StoredSession {
                session,
                expires_at: now + self.ttl_secs,
            },
        );

        token
    }

    /// Look up a live session; a token past its TTL is dropped and
    /// treated as absent.
    pub fn resolve(&self, token: &str, now: i64) -> Option<Session> {
        let expired = match self.sessions.get(token) {
            Some(stored) if stored.expires_at > now => {
                return Some(stored.session.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove(token);
        }

        None
    }

    /// Returns whether a session existed for the token.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn purge_expired(&self, now: i64) -> usize {
        // Count inside the sweep; a length snapshot taken around the
        // retain can be skewed by concurrent issues.
        let mut removed = 0;
        self.sessions.retain(|_, stored| {
            let keep = stored.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{LicenseStatus, Role};

    fn session(user_id: u32) -> Session {
        Session {
            user_id,
            email: format!("user{}@example.com", user_id),
            full_name: "Test User".to_string(),
            role: Role::User,
            license_status: LicenseStatus::Active,
        }
    }

    #[test]
    fn test_issue_and_resolve() {
        let store = SessionStore::new(3600);
        let token = store.issue(session(1), 1000);

        assert_eq!(token.len(), 64);
        let resolved = store.resolve(&token, 1001).unwrap();
        assert_eq!(resolved.user_id, 1);
    }

    #[test]
    fn test_expired_token_is_dropped() {
        let store = SessionStore::new(100);
        let token = store.issue(session(1), 1000);

        assert!(store.resolve(&token, 1100).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_token_resolves_to_none() {
        let store = SessionStore::new(3600);
        assert!(store.resolve("deadbeef", 0).is_none());
    }

    #[test]
    fn test_second_login_evicts_first_session() {
        let store = SessionStore::new(3600);
        let first = store.issue(session(1), 1000);
        let second = store.issue(session(1), 1001);

        assert!(store.resolve(&first, 1002).is_none());
        assert!(store.resolve(&second, 1002).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sessions_for_different_users_coexist() {
        let store = SessionStore::new(3600);
        let a = store.issue(session(1), 1000);
        let b = store.issue(session(2), 1000);

        assert!(store.resolve(&a, 1001).is_some());
        assert!(store.resolve(&b, 1001).is_some());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new(3600);
        let token = store.issue(session(1), 1000);

        assert!(store.revoke(&token));
        assert!(!store.revoke(&token));
        assert!(store.resolve(&token, 1001).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new(100);
        store.issue(session(1), 1000);
        store.issue(session(2), 1050);

        let removed = store.purge_expired(1120);
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_purge_count_is_exact_under_concurrent_issues() {
        use std::sync::Arc;

        let store = Arc::new(SessionStore::new(100));
        for user_id in 0..20 {
            store.issue(session(user_id), 1000);
        }

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for user_id in 100..200 {
                    store.issue(session(user_id), 5000);
                }
            })
        };

        // Sessions issued at 5000 are live at this purge time, so only
        // the 20 stale ones count as removed regardless of interleaving.
        let removed = store.purge_expired(2000);
        writer.join().unwrap();

        assert_eq!(removed, 20);
        assert_eq!(store.len(), 100);
    }
}
