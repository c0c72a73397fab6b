use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::password::hash_password;
use crate::core::state::AppState;
use crate::models::user::{LicenseStatus, NewUser, Role};
use crate::stores::activity_store::ActivityLedger;
use crate::stores::user_store::CredentialStore;
use crate::utils::time::{current_timestamp, days_to_secs};

/// Ensure the configured admin account (and optionally a demo user)
/// exists. Runs at boot time; existing accounts are left untouched so a
/// restart never resets anyone's password.
pub fn seed_accounts(state: &AppState) -> Result<()> {
    let seed = &state.config.seed;

    if state
        .users
        .find_by_email(&seed.admin_email)
        .context("Failed to look up admin account")?
        .is_none()
    {
        let password_hash =
            hash_password(&seed.admin_password).context("Failed to hash admin password")?;

        let id = state
            .users
            .insert(NewUser {
                email: seed.admin_email.clone(),
                password_hash,
                full_name: seed.admin_name.clone(),
                role: Role::Admin,
                license_status: LicenseStatus::Active,
                license_expiry: None,
            })
            .context("Failed to seed admin account")?;

        info!(user_id = id, email = %seed.admin_email, "Admin account seeded");
    }

    if seed.demo_user {
        let demo_email = "demo@example.com";
        if state
            .users
            .find_by_email(demo_email)
            .context("Failed to look up demo account")?
            .is_none()
        {
            let password_hash =
                hash_password("demo123").context("Failed to hash demo password")?;

            let id = state
                .users
                .insert(NewUser {
                    email: demo_email.to_string(),
                    password_hash,
                    full_name: "Demo User".to_string(),
                    role: Role::User,
                    license_status: LicenseStatus::Active,
                    license_expiry: Some(current_timestamp() + days_to_secs(30)),
                })
                .context("Failed to seed demo account")?;

            info!(user_id = id, email = demo_email, "Demo account seeded");
        }
    }

    Ok(())
}

/// Spawn a background task that periodically drops expired sessions and
/// activity entries past the retention window.
pub fn spawn_retention_task(state: Arc<AppState>) {
    let interval_secs = state.config.retention.cleanup_interval_secs;
    let max_age_secs = days_to_secs(state.config.retention.activity_log_days);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

        loop {
            interval.tick().await;

            debug!("Running retention cleanup");
            let sessions_purged = state.sessions.purge_expired(current_timestamp());

            match state.activity.prune_older_than(max_age_secs) {
                Ok(removed) if removed > 0 || sessions_purged > 0 => {
                    info!(
                        activity_removed = removed,
                        sessions_purged = sessions_purged,
                        "Retention cleanup completed"
                    );
                }
                Ok(_) => {
                    debug!("Retention cleanup completed, nothing to remove");
                }
                Err(e) => {
                    warn!(error = %e, "Activity retention pass failed, will retry next interval");
                }
            }
        }
    });
}
