//! HTTP transport configuration.
//!
//! Deserialized from the `[http]` table of the bridge configuration file.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// HTTP transport configuration.
///
/// # Examples
///
/// ```toml
/// [http]
/// timeout_secs = 30
/// ping_timeout_secs = 10
/// pool_max_idle_per_host = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Maximum idle connections per host.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// Timeout for charge and status-query POSTs, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Timeout for liveness GETs, in seconds.
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: default_pool_max_idle(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            ping_timeout_secs: default_ping_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransportError`] if a timeout is outside its range:
    /// - `timeout_secs`: 1-300 seconds
    /// - `connect_timeout_secs`: 1-60 seconds
    /// - `ping_timeout_secs`: 1-60 seconds
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(BridgeError::TransportError(
                "timeout_secs must be between 1 and 300".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(BridgeError::TransportError(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        if self.ping_timeout_secs == 0 || self.ping_timeout_secs > 60 {
            return Err(BridgeError::TransportError(
                "ping_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the POST timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the ping timeout as Duration.
    #[must_use]
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

fn default_pool_max_idle() -> usize {
    16
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_ping_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_default() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.ping_timeout(), Duration::from_secs(10));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_config_partial_toml_uses_defaults() {
        let config: HttpConfig = toml::from_str("timeout_secs = 45").unwrap();
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.ping_timeout_secs, 10);
        assert_eq!(config.pool_max_idle_per_host, 16);
    }

    #[test]
    fn test_http_config_validate_bounds() {
        let zero = HttpConfig { timeout_secs: 0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(BridgeError::TransportError(_))));

        let long_ping = HttpConfig { ping_timeout_secs: 61, ..Default::default() };
        assert!(long_ping.validate().is_err());

        let long_connect = HttpConfig { connect_timeout_secs: 120, ..Default::default() };
        assert!(long_connect.validate().is_err());

        let max = HttpConfig { timeout_secs: 300, ..Default::default() };
        assert!(max.validate().is_ok());
    }
}
