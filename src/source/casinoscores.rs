//! CasinoScores Bac Bo feed.
//!
//! Base URL: https://api.casinoscores.com/svc-evolution-game-events/api/bacbo/latest
//! Auth: none for the public latest-round endpoint.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::RoundSource;
use crate::codec::RawRound;

pub const DEFAULT_API_URL: &str =
    "https://api.casinoscores.com/svc-evolution-game-events/api/bacbo/latest";
const SOURCE_NAME: &str = "casinoscores";

pub struct CasinoScoresClient {
    http: Client,
    url: String,
}

impl CasinoScoresClient {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("tablewatch/0.1.0")
            .build()
            .context("Failed to build HTTP client for CasinoScores")?;

        Ok(Self {
            http,
            url: url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RoundSource for CasinoScoresClient {
    async fn latest_round(&self) -> Result<RawRound> {
        debug!(url = %self.url, "Fetching latest round");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("CasinoScores request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("CasinoScores API error {status}: {body}");
        }

        let raw: RawRound = resp
            .json()
            .await
            .context("Failed to parse CasinoScores latest-round response")?;

        Ok(raw)
    }

    fn name(&self) -> &str {
        SOURCE_NAME
    }
}
