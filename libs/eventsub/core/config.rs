use crate::error::{EventSubError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default EventSub WebSocket endpoint
pub const DEFAULT_URL: &str = "wss://eventsub.wss.twitch.tv/ws";

/// Default bound on waiting for the candidate welcome during a reconnect
pub const DEFAULT_RECONNECT_WELCOME_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding [`ClientConfig::url`]
pub const URL_ENV: &str = "EVENTSUB_WS_URL";

/// Environment variable overriding [`ClientConfig::reconnect_welcome_timeout`], in seconds
pub const RECONNECT_TIMEOUT_ENV: &str = "EVENTSUB_RECONNECT_TIMEOUT_SECS";

/// Configuration for [`crate::EventSubClient`]
///
/// All fields have defaults, so an empty YAML mapping is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket URL of the initial connection (wss:// or ws://)
    pub url: String,

    /// How long the reconnect handshake waits for the candidate's welcome
    #[serde(with = "duration_secs")]
    pub reconnect_welcome_timeout: Duration,

    /// Reason text sent with normal-closure frames
    pub close_reason: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            reconnect_welcome_timeout: DEFAULT_RECONNECT_WELCOME_TIMEOUT,
            close_reason: "Stopping Connection".to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults with a different initial URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `EVENTSUB_WS_URL` and `EVENTSUB_RECONNECT_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(URL_ENV) {
            self.url = url;
        }

        if let Ok(secs) = std::env::var(RECONNECT_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                EventSubError::Configuration(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    RECONNECT_TIMEOUT_ENV, secs
                ))
            })?;
            self.reconnect_welcome_timeout = Duration::from_secs(secs);
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(EventSubError::Configuration(format!(
                "url must start with ws:// or wss://, got {}",
                self.url
            )));
        }

        if self.reconnect_welcome_timeout.is_zero() {
            return Err(EventSubError::Configuration(
                "reconnect_welcome_timeout must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
