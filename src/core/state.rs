// Application state (AppState)

use crate::auth::session::SessionAuthority;
use crate::bot::client::BotClient;
use crate::core::config::Config;
use crate::stores::activity_store::{ActivityLedger, MemoryActivityStore};
use crate::stores::block_store::BlockStore;
use crate::stores::session_store::SessionStore;
use crate::stores::user_store::{CredentialStore, MemoryUserStore};
use anyhow::Result;
use std::sync::Arc;

/// Shared application state, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Credential store: user identity, entitlement and settings rows
    pub users: Arc<dyn CredentialStore>,

    /// Token-keyed session map
    pub sessions: Arc<SessionStore>,

    /// Append-only audit ledger
    pub activity: Arc<dyn ActivityLedger>,

    /// Delivery block outcomes pushed by the bot
    pub blocks: Arc<BlockStore>,

    /// Session issuance/termination on top of the stores above
    pub auth: SessionAuthority,

    /// Client for the external bot process
    pub bot: BotClient,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_stores(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryActivityStore::new()),
        )
    }

    /// Build state around caller-supplied stores. Used by tests to
    /// inject failing store doubles behind the trait seams.
    pub fn with_stores(
        config: Config,
        users: Arc<dyn CredentialStore>,
        activity: Arc<dyn ActivityLedger>,
    ) -> Result<Self> {
        let sessions = Arc::new(SessionStore::new(config.session.ttl_secs));
        let bot = BotClient::new(config.bot.endpoint.clone(), config.bot.timeout_secs)?;

        let auth = SessionAuthority::new(
            Arc::clone(&users),
            Arc::clone(&sessions),
            Arc::clone(&activity),
        );

        Ok(Self {
            users,
            sessions,
            activity,
            blocks: Arc::new(BlockStore::new()),
            auth,
            bot,
            config: Arc::new(config),
        })
    }
}
