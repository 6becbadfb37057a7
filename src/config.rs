//! Configuration types for the HUD controller.

use crate::error::{HudError, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a HUD session.
///
/// The backend base URL is derived from the deployment's own host with a
/// fixed port, over the same protocol as the hosting page; the pieces are
/// kept separate here so embedders can fill them in from their environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Protocol used to reach the backend ("http" or "https").
    pub scheme: String,
    /// Backend host name or address.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Per-request timeout in milliseconds. Bounds every backend call so a
    /// dead backend cannot wedge a poll task forever.
    pub request_timeout_ms: u64,
    /// Interval between system-stats poll ticks in milliseconds.
    pub stats_interval_ms: u64,
    /// Interval between notification poll ticks in milliseconds.
    pub notifications_interval_ms: u64,
    /// Maximum entries kept on the notification display list.
    pub notification_shelf_capacity: usize,
    /// Speech synthesis tuning.
    pub speech: SpeechTuning,
    /// Line shown and spoken once at session startup. Not persisted.
    pub greeting: String,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_owned(),
            host: "127.0.0.1".to_owned(),
            port: 8000,
            request_timeout_ms: 10_000,
            stats_interval_ms: 3_000,
            notifications_interval_ms: 5_000,
            notification_shelf_capacity: 5,
            speech: SpeechTuning::default(),
            greeting: "Systems initialized. Welcome back, Sir.".to_owned(),
        }
    }
}

impl HudConfig {
    /// Base URL for all backend operations, including the `/api` prefix.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}://{}:{}/api", self.scheme, self.host, self.port)
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| HudError::Config(format!("invalid config: {e}")))
    }
}

/// Voice parameters handed to the speech synthesis port.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechTuning {
    /// Speaking rate multiplier.
    pub rate: f32,
    /// Voice pitch multiplier.
    pub pitch: f32,
}

impl Default for SpeechTuning {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 0.95,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn api_base_joins_scheme_host_port() {
        let config = HudConfig::default();
        assert_eq!(config.api_base(), "http://127.0.0.1:8000/api");

        let config = HudConfig {
            scheme: "https".to_owned(),
            host: "hud.local".to_owned(),
            port: 8443,
            ..HudConfig::default()
        };
        assert_eq!(config.api_base(), "https://hud.local:8443/api");
    }

    #[test]
    fn defaults_match_original_cadence() {
        let config = HudConfig::default();
        assert_eq!(config.stats_interval_ms, 3_000);
        assert_eq!(config.notifications_interval_ms, 5_000);
        assert_eq!(config.notification_shelf_capacity, 5);
        assert!((config.speech.rate - 1.0).abs() < f32::EPSILON);
        assert!((config.speech.pitch - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = HudConfig::from_toml_str(
            r#"
host = "10.0.0.7"
stats_interval_ms = 1000
"#,
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.stats_interval_ms, 1_000);
        assert_eq!(config.port, 8000);
        assert_eq!(config.greeting, "Systems initialized. Welcome back, Sir.");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = HudConfig::from_toml_str("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, HudError::Config(_)));
    }
}
