//! HTTP transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Timeouts applied to every request sent to the robot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "TransportConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "TransportConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl TransportConfig {
    const fn default_request_timeout() -> u64 {
        5
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"request_timeout_seconds":2}"#).unwrap();
        assert_eq!(config.request_timeout_seconds, 2);
        assert_eq!(config.connect_timeout_seconds, 5);
    }
}
