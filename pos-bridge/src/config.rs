//! Bridge configuration.
//!
//! Configuration can be read from a TOML document or from environment variables. Both
//! paths validate eagerly: a missing merchant identifier or a malformed gateway URL is
//! reported when the configuration is loaded, never in the middle of a payment.
//!
//! # TOML Layout
//!
//! ```toml
//! environment = "test"
//! log_sensitive_data = false
//!
//! [rate_limit]
//! max_requests = 10
//! window_secs = 600
//!
//! [http]
//! timeout_secs = 30
//! ping_timeout_secs = 10
//!
//! [gateway_a]
//! url = "https://gateway-a.example.com/api"
//! test_url = "https://test.gateway-a.example.com/api"
//! merchant_id = "100100000"
//! password = "secret"
//! terminal_id = "T0001"
//!
//! [gateway_b]
//! url = "https://gateway-b.example.com/XML"
//! test_url = "https://test.gateway-b.example.com/XML"
//! posnet_id = "1010"
//! terminal_no = "67000001"
//! merchant_id = "6700000067"
//! enc_key = "10,10,10,10,10,10,10,10"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `APP_ENV` | `environment` (`production`, anything else is test) |
//! | `LOG_SENSITIVE_DATA` | `log_sensitive_data` (only `true` enables it) |
//! | `RATE_LIMIT_MAX_REQUESTS`, `RATE_LIMIT_WINDOW_SECS` | `rate_limit` |
//! | `HTTP_TIMEOUT_SECS`, `HTTP_CONNECT_TIMEOUT_SECS`, `HTTP_PING_TIMEOUT_SECS` | `http` |
//! | `GATEWAY_A_URL`, `GATEWAY_A_TEST_URL`, `GATEWAY_A_MERCHANT_ID`, `GATEWAY_A_PASSWORD`, `GATEWAY_A_TERMINAL_ID` | `gateway_a` |
//! | `GATEWAY_B_URL`, `GATEWAY_B_TEST_URL`, `GATEWAY_B_POSNET_ID`, `GATEWAY_B_TERMINAL_NO`, `GATEWAY_B_MERCHANT_ID`, `GATEWAY_B_ENC_KEY` | `gateway_b` |
//!
//! A gateway section is configured as soon as one of its variables is set; from then on
//! all of its variables are required.

use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;
use url::Url;
use zeroize::Zeroize;

use crate::{
    error::{BridgeError, Result},
    security::RateLimitConfig,
    transport::HttpConfig,
};

/// Deployment environment. Selects which URL each gateway uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Live bank endpoints.
    Production,
    /// Bank test endpoints.
    #[default]
    Test,
}

impl Environment {
    /// Interprets an environment name. Only `production` selects live endpoints.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim() == "production" { Self::Production } else { Self::Test }
    }
}

/// A secret string that is redacted in `Debug` output and wiped on drop.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Provider A credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayAConfig {
    /// Production endpoint.
    pub url: String,
    /// Test endpoint.
    pub test_url: String,
    /// Merchant id.
    pub merchant_id: String,
    /// Merchant API password.
    pub password: Secret,
    /// Terminal id.
    pub terminal_id: String,
}

impl GatewayAConfig {
    /// Returns the endpoint for `environment`.
    #[must_use]
    pub fn gateway_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Production => &self.url,
            Environment::Test => &self.test_url,
        }
    }

    /// Checks that every field is set and both URLs are http(s).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_url("gateway_a.url", &self.url)?;
        validate_url("gateway_a.test_url", &self.test_url)?;
        require("gateway_a.merchant_id", &self.merchant_id)?;
        require("gateway_a.terminal_id", &self.terminal_id)?;
        if self.password.is_blank() {
            return Err(missing("gateway_a.password"));
        }
        Ok(())
    }
}

/// Provider B credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayBConfig {
    /// Production endpoint.
    pub url: String,
    /// Test endpoint.
    pub test_url: String,
    /// POS network id, first field of the MAC.
    pub posnet_id: String,
    /// Terminal number.
    pub terminal_no: String,
    /// Merchant id.
    pub merchant_id: String,
    /// Shared MAC key.
    pub enc_key: Secret,
}

impl GatewayBConfig {
    /// Returns the endpoint for `environment`.
    #[must_use]
    pub fn gateway_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Production => &self.url,
            Environment::Test => &self.test_url,
        }
    }

    /// Checks that every field is set and both URLs are http(s).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_url("gateway_b.url", &self.url)?;
        validate_url("gateway_b.test_url", &self.test_url)?;
        require("gateway_b.posnet_id", &self.posnet_id)?;
        require("gateway_b.terminal_no", &self.terminal_no)?;
        require("gateway_b.merchant_id", &self.merchant_id)?;
        if self.enc_key.is_blank() {
            return Err(missing("gateway_b.enc_key"));
        }
        Ok(())
    }
}

/// Rate limiter settings as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitSettings {
    /// Admissions per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { max_requests: default_max_requests(), window_secs: default_window_secs() }
    }
}

impl RateLimitSettings {
    /// Converts to the limiter's runtime configuration.
    #[must_use]
    pub const fn to_config(self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.max_requests,
            window: Duration::from_secs(self.window_secs),
        }
    }
}

fn default_max_requests() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    600
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BridgeConfig {
    /// Selects production or test gateway URLs.
    #[serde(default)]
    pub environment: Environment,

    /// Logs masked request XML instead of a generic notice.
    #[serde(default)]
    pub log_sensitive_data: bool,

    /// Rate limiter settings.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Provider A, if deployed.
    #[serde(default)]
    pub gateway_a: Option<GatewayAConfig>,

    /// Provider B, if deployed.
    #[serde(default)]
    pub gateway_b: Option<GatewayBConfig>,
}

impl BridgeConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] on malformed TOML or invalid values.
    ///
    /// # Examples
    ///
    /// ```
    /// use pos_bridge::config::{BridgeConfig, Environment};
    ///
    /// let config = BridgeConfig::from_toml("environment = \"production\"")?;
    /// assert_eq!(config.environment, Environment::Production);
    /// assert!(config.gateway_a.is_none());
    /// # Ok::<(), pos_bridge::BridgeError>(())
    /// ```
    pub fn from_toml(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)
            .map_err(|e| BridgeError::ConfigError(format!("invalid configuration file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if a variable is malformed or a partially
    /// configured gateway is missing a required variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads and validates configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let defaults = Self::default();
        let config = Self {
            environment: var("APP_ENV")
                .map_or(Environment::Test, |name| Environment::from_name(&name)),
            log_sensitive_data: var("LOG_SENSITIVE_DATA").is_some_and(|value| value == "true"),
            rate_limit: RateLimitSettings {
                max_requests: parse_var(&var, "RATE_LIMIT_MAX_REQUESTS")?
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: parse_var(&var, "RATE_LIMIT_WINDOW_SECS")?
                    .unwrap_or(defaults.rate_limit.window_secs),
            },
            http: HttpConfig {
                timeout_secs: parse_var(&var, "HTTP_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http.timeout_secs),
                connect_timeout_secs: parse_var(&var, "HTTP_CONNECT_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http.connect_timeout_secs),
                ping_timeout_secs: parse_var(&var, "HTTP_PING_TIMEOUT_SECS")?
                    .unwrap_or(defaults.http.ping_timeout_secs),
                ..defaults.http
            },
            gateway_a: gateway_a_from(&var)?,
            gateway_b: gateway_b_from(&var)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] or [`BridgeError::TransportError`] for the first
    /// invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.max_requests == 0 {
            return Err(BridgeError::ConfigError(
                "rate_limit.max_requests must be at least 1".to_owned(),
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(BridgeError::ConfigError(
                "rate_limit.window_secs must be at least 1".to_owned(),
            ));
        }
        self.http.validate()?;
        if let Some(gateway_a) = &self.gateway_a {
            gateway_a.validate()?;
        }
        if let Some(gateway_b) = &self.gateway_b {
            gateway_b.validate()?;
        }
        Ok(())
    }
}

const GATEWAY_A_VARS: [&str; 5] = [
    "GATEWAY_A_URL",
    "GATEWAY_A_TEST_URL",
    "GATEWAY_A_MERCHANT_ID",
    "GATEWAY_A_PASSWORD",
    "GATEWAY_A_TERMINAL_ID",
];

const GATEWAY_B_VARS: [&str; 6] = [
    "GATEWAY_B_URL",
    "GATEWAY_B_TEST_URL",
    "GATEWAY_B_POSNET_ID",
    "GATEWAY_B_TERMINAL_NO",
    "GATEWAY_B_MERCHANT_ID",
    "GATEWAY_B_ENC_KEY",
];

fn gateway_a_from(var: &impl Fn(&str) -> Option<String>) -> Result<Option<GatewayAConfig>> {
    if GATEWAY_A_VARS.iter().all(|name| var(name).is_none()) {
        return Ok(None);
    }
    let required = |name: &str| var(name).ok_or_else(|| missing(name));

    Ok(Some(GatewayAConfig {
        url: required("GATEWAY_A_URL")?,
        test_url: required("GATEWAY_A_TEST_URL")?,
        merchant_id: required("GATEWAY_A_MERCHANT_ID")?,
        password: Secret::new(required("GATEWAY_A_PASSWORD")?),
        terminal_id: required("GATEWAY_A_TERMINAL_ID")?,
    }))
}

fn gateway_b_from(var: &impl Fn(&str) -> Option<String>) -> Result<Option<GatewayBConfig>> {
    if GATEWAY_B_VARS.iter().all(|name| var(name).is_none()) {
        return Ok(None);
    }
    let required = |name: &str| var(name).ok_or_else(|| missing(name));

    Ok(Some(GatewayBConfig {
        url: required("GATEWAY_B_URL")?,
        test_url: required("GATEWAY_B_TEST_URL")?,
        posnet_id: required("GATEWAY_B_POSNET_ID")?,
        terminal_no: required("GATEWAY_B_TERMINAL_NO")?,
        merchant_id: required("GATEWAY_B_MERCHANT_ID")?,
        enc_key: Secret::new(required("GATEWAY_B_ENC_KEY")?),
    }))
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T::Err: fmt::Display,
{
    var(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| BridgeError::ConfigError(format!("{name} is invalid: {e}")))
        })
        .transpose()
}

fn missing(name: &str) -> BridgeError {
    BridgeError::ConfigError(format!("{name} is required"))
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() { Err(missing(name)) } else { Ok(()) }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    require(name, value)?;
    let url = Url::parse(value)
        .map_err(|e| BridgeError::ConfigError(format!("{name} '{value}' is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BridgeError::ConfigError(format!(
            "{name} must use http or https, got: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(BridgeError::ConfigError(format!("{name} has no host")));
    }
    Ok(())
}
