use crate::auth::password::verify_password;
use crate::core::error::AuthError;
use crate::models::session::Session;
use crate::stores::activity_store::ActivityLedger;
use crate::stores::session_store::SessionStore;
use crate::stores::user_store::CredentialStore;
use crate::utils::time::current_timestamp;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Issues, resolves and terminates sessions against the credential
/// store. Login and logout are the only paths that write the audit
/// ledger from here, and both writes are best-effort.
#[derive(Clone)]
pub struct SessionAuthority {
    users: Arc<dyn CredentialStore>,
    sessions: Arc<SessionStore>,
    ledger: Arc<dyn ActivityLedger>,
}

impl SessionAuthority {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        sessions: Arc<SessionStore>,
        ledger: Arc<dyn ActivityLedger>,
    ) -> Self {
        Self {
            users,
            sessions,
            ledger,
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password both return
    /// `InvalidCredentials`; nothing in the response distinguishes them.
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
        origin: Option<&str>,
    ) -> Result<(String, Session), AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = match user {
            Some(user) => user,
            None => {
                debug!("login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            debug!(user_id = user.id, "login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let session = Session::for_user(&user);
        let token = self.sessions.issue(session.clone(), current_timestamp());

        if let Err(e) = self
            .ledger
            .record(user.id, "login", Some("User logged in"), origin)
        {
            warn!(user_id = user.id, error = %e, "failed to record login activity");
        }

        info!(user_id = user.id, "user logged in");

        Ok((token, session))
    }

    /// Resolve a bearer token to its live session, if any.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.resolve(token, current_timestamp())
    }

    /// Invalidate a session. The logout audit entry is written first,
    /// best-effort; a failed revoke is reported but the session is not
    /// resurrected.
    pub fn terminate(&self, token: &str, origin: Option<&str>) {
        let session = match self.sessions.resolve(token, current_timestamp()) {
            Some(session) => session,
            None => return,
        };

        if let Err(e) = self
            .ledger
            .record(session.user_id, "logout", Some("User logged out"), origin)
        {
            warn!(user_id = session.user_id, error = %e, "failed to record logout activity");
        }

        if !self.sessions.revoke(token) {
            warn!(user_id = session.user_id, "session vanished during logout");
        }

        info!(user_id = session.user_id, "user logged out");
    }
}
