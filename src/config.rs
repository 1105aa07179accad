//! Feed endpoint and reconnection configuration

use serde::Deserialize;

/// Default feed endpoint
pub const DEFAULT_FEED_URL: &str = "ws://localhost:8081";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed endpoint URL
    pub url: String,
    /// Delay before the first reconnect attempt, in milliseconds
    pub base_reconnect_delay_ms: u64,
    /// Consecutive failed attempts before the client stops retrying;
    /// a successful open resets the count
    pub max_reconnect_attempts: u32,
    /// Buffer size for the event broadcast channel
    pub event_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            base_reconnect_delay_ms: 1000,
            max_reconnect_attempts: 5,
            event_buffer_size: 1000,
        }
    }
}

impl FeedConfig {
    /// Default config with the endpoint taken from `FEED_URL` when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FEED_URL") {
            config.url = url;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_feed() {
        let config = FeedConfig::default();
        assert_eq!(config.url, "ws://localhost:8081");
        assert_eq!(config.base_reconnect_delay_ms, 1000);
        assert_eq!(config.max_reconnect_attempts, 5);
    }

    #[test]
    fn deserializes_with_partial_overrides() {
        let config: FeedConfig =
            serde_json::from_str(r#"{"url":"ws://feed.internal:9000"}"#).unwrap();
        assert_eq!(config.url, "ws://feed.internal:9000");
        assert_eq!(config.max_reconnect_attempts, 5);
    }
}
