use crate::models::api::BotStatusResponse;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::time::Duration;

/// HTTP client for the external bot process. The service only relays
/// start/stop/status; the bot itself runs elsewhere.
#[derive(Clone)]
pub struct BotClient {
    client: reqwest::Client,
    endpoint: String,
}

/// Per-user configuration handed to the bot on start.
#[derive(Debug, Serialize)]
pub struct BotStartConfig {
    pub auto_accept: bool,
    pub min_block_value: f64,
    pub bot_token: String,
}

#[derive(Serialize)]
struct StartRequest {
    user_id: u32,
    config: BotStartConfig,
}

#[derive(Serialize)]
struct StopRequest {
    user_id: u32,
}

impl BotClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, endpoint })
    }

    pub async fn start(&self, user_id: u32, config: BotStartConfig) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/bot/start", self.endpoint))
            .json(&StartRequest { user_id, config })
            .send()
            .await
            .context("Failed to reach bot service")?;

        if !response.status().is_success() {
            bail!("Bot service returned error status: {}", response.status());
        }

        Ok(())
    }

    pub async fn stop(&self, user_id: u32) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/bot/stop", self.endpoint))
            .json(&StopRequest { user_id })
            .send()
            .await
            .context("Failed to reach bot service")?;

        if !response.status().is_success() {
            bail!("Bot service returned error status: {}", response.status());
        }

        Ok(())
    }

    pub async fn status(&self, user_id: u32) -> Result<BotStatusResponse> {
        let response = self
            .client
            .get(format!("{}/bot/status/{}", self.endpoint, user_id))
            .send()
            .await
            .context("Failed to reach bot service")?;

        if !response.status().is_success() {
            bail!("Bot service returned error status: {}", response.status());
        }

        let status = response
            .json::<BotStatusResponse>()
            .await
            .context("Failed to parse bot status response")?;

        Ok(status)
    }
}
