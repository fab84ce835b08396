//! Fixed-window rate limiting for payment endpoints.
//!
//! Every client key gets at most `max_requests` admissions per window. The window starts
//! at the key's first admitted request and is not sliding: once it expires the next request
//! opens a fresh window with a count of 1. A burst straddling two windows can therefore
//! admit up to twice the nominal rate.
//!
//! # State Machine
//!
//! For a single key, with `now` the time of the request:
//!
//! 1. No entry: admit, store `count = 1`, `reset_at = now + window`
//! 2. Entry with `now <= reset_at` and `count < max_requests`: admit, increment
//! 3. Entry with `now <= reset_at` and `count >= max_requests`: reject with the seconds
//!    remaining until `reset_at`, count unchanged
//! 4. Entry with `now > reset_at`: handled as case 1
//!
//! Before each evaluation all expired entries are swept from the table, so it only grows
//! with the number of currently active clients.
//!
//! # Examples
//!
//! ```rust
//! use pos_bridge::security::{RateLimitConfig, RateLimiter, client_address, payment_key};
//! use reqwest::header::HeaderMap;
//!
//! # async fn example() -> pos_bridge::Result<()> {
//! let limiter = RateLimiter::new(RateLimitConfig::default());
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
//! let key = payment_key(&client_address(&headers, None));
//!
//! limiter.acquire(&key).await?;
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Duration};

use reqwest::header::HeaderMap;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::audit::{AuditEvent, AuditEventType, AuditSink, TracingAuditSink};
use crate::error::{BridgeError, Result};

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Admissions allowed per window.
    ///
    /// Default: 10
    pub max_requests: u32,

    /// Window length.
    ///
    /// Default: 10 minutes
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 10, window: Duration::from_secs(600) }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_reset_at: Instant,
}

/// Fixed-window rate limiter keyed by client.
///
/// The key table is owned by the limiter and guarded by a single mutex, so concurrent
/// admissions for the same key never lose an increment.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use pos_bridge::security::{RateLimitConfig, RateLimiter};
///
/// # async fn example() {
/// let limiter =
///     RateLimiter::new(RateLimitConfig { max_requests: 1, window: Duration::from_secs(60) });
///
/// assert!(limiter.acquire("10.0.0.1_payment").await.is_ok());
/// assert!(limiter.acquire("10.0.0.1_payment").await.is_err());
/// assert!(limiter.acquire("10.0.0.2_payment").await.is_ok());
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    audit: Arc<dyn AuditSink>,
}

impl RateLimiter {
    /// Creates a limiter with an empty key table that audits refusals through
    /// [`TracingAuditSink`].
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self { config, entries: Mutex::new(HashMap::new()), audit: Arc::new(TracingAuditSink) }
    }

    /// Replaces the sink refusals are reported to.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Admits one request for `key` or refuses it.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::RateLimitExceeded`] carrying the seconds until the key's
    /// window resets (rounded up) when the key already used its quota.
    #[instrument(skip(self), level = "debug")]
    pub async fn acquire(&self, key: &str) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let before = entries.len();
        entries.retain(|_, entry| now <= entry.window_reset_at);
        if entries.len() != before {
            debug!(evicted = before - entries.len(), "Expired rate limit entries swept");
        }

        match entries.get_mut(key) {
            None => {
                entries.insert(
                    key.to_owned(),
                    RateLimitEntry { count: 1, window_reset_at: now + self.config.window },
                );
                debug!(count = 1, "Rate limit window opened");
                Ok(())
            }
            Some(entry) if entry.count >= self.config.max_requests => {
                let retry_after_secs = ceil_secs(entry.window_reset_at - now);
                warn!(retry_after_secs, "Rate limit exceeded");
                self.audit.record(
                    &AuditEvent::new(AuditEventType::RateLimitExceeded, None, Uuid::new_v4())
                        .with_client_key(key),
                );
                Err(BridgeError::RateLimitExceeded { retry_after_secs })
            }
            Some(entry) => {
                entry.count += 1;
                debug!(count = entry.count, "Request admitted");
                Ok(())
            }
        }
    }

    /// Number of keys currently tracked (expired entries included until the next sweep).
    pub async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Resolves the client address of an inbound request.
///
/// Uses the first entry of `x-forwarded-for`, then `x-real-ip`, then the connection
/// address, and finally the literal `"unknown"`.
///
/// # Examples
///
/// ```
/// use pos_bridge::security::client_address;
/// use reqwest::header::HeaderMap;
///
/// assert_eq!(client_address(&HeaderMap::new(), None), "unknown");
/// ```
#[must_use]
pub fn client_address(headers: &HeaderMap, remote: Option<IpAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
    };

    if let Some(forwarded) = header("x-forwarded-for")
        && let Some(first) = forwarded.split(',').next()
    {
        return first.trim().to_owned();
    }
    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.trim().to_owned();
    }
    remote.map_or_else(|| "unknown".to_owned(), |ip| ip.to_string())
}

/// Builds the rate-limit key for payment endpoints from a client address.
#[must_use]
pub fn payment_key(address: &str) -> String {
    format!("{address}_payment")
}
