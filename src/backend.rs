//! Typed client for the assistant backend REST surface.
//!
//! Four independent request/response operations under `/api`: chat, system
//! stats, notifications, and history. The error mapping encodes the
//! recovery policy per operation: chat failures are `BackendUnavailable`
//! (surfaced as a degraded-mode message), poll failures are `PollFailed`
//! (tick silently skipped), and a failed history fetch is `HydrationFailed`
//! (session starts empty).

use crate::config::HudConfig;
use crate::error::{HudError, Result};
use crate::history::Message;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A local action the backend can trigger alongside a chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    /// Open the camera for a visual scan.
    OpenCamera,
    /// Read and announce the current geolocation.
    RequestLocation,
}

/// Response to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// The assistant's reply text.
    pub response: String,
    /// Optional local action to fire after the reply is displayed and spoken.
    #[serde(default)]
    pub action: Option<ChatAction>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// One poll tick's worth of system stats. Ephemeral; each tick overwrites
/// the previous reading.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SystemStats {
    /// CPU load percentage.
    pub cpu: f32,
    /// RAM usage percentage.
    pub ram: f32,
    /// Battery charge percentage.
    pub battery: f32,
}

/// A forwarded device notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Originating application.
    pub app: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
}

/// Typed wrapper over the backend's four remote operations.
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BackendClient {
    /// Build a client from config, with the configured request timeout.
    pub fn new(config: &HudConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .map_err(|e| HudError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            base_url: config.api_base(),
            client,
        })
    }

    /// Build a client against an explicit base URL (including the `/api`
    /// prefix). Used by tests to point at a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Send a chat message and return the assistant's reply.
    pub async fn chat(&self, message: &str) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| HudError::BackendUnavailable(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HudError::BackendUnavailable(format!(
                "chat returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<ChatReply>()
            .await
            .map_err(|e| HudError::BackendUnavailable(format!("chat reply malformed: {e}")))
    }

    /// Fetch the current system stats.
    pub async fn system_stats(&self) -> Result<SystemStats> {
        self.poll_json("system").await
    }

    /// Fetch pending notifications.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.poll_json("notifications").await
    }

    /// Fetch the persisted session transcript. Called once at startup.
    pub async fn history(&self) -> Result<Vec<Message>> {
        let url = format!("{}/history", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HudError::HydrationFailed(format!("history request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HudError::HydrationFailed(format!(
                "history returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<Vec<Message>>()
            .await
            .map_err(|e| HudError::HydrationFailed(format!("history payload malformed: {e}")))
    }

    async fn poll_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HudError::PollFailed(format!("{endpoint} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HudError::PollFailed(format!(
                "{endpoint} returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HudError::PollFailed(format!("{endpoint} payload malformed: {e}")))
    }
}
