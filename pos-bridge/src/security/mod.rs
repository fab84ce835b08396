//! Admission control and log hygiene.
//!
//! # Rate Limiting
//!
//! [`RateLimiter`] is a fixed-window counter keyed by client. It is evaluated before any
//! adapter is invoked:
//!
//! ```rust
//! use pos_bridge::security::{RateLimitConfig, RateLimiter};
//!
//! # async fn example() -> pos_bridge::Result<()> {
//! let limiter = RateLimiter::new(RateLimitConfig::default());
//!
//! limiter.acquire("203.0.113.7_payment").await?;
//! // ... invoke the adapter ...
//! # Ok(())
//! # }
//! ```
//!
//! # Masking
//!
//! [`mask`] redacts request and outcome bodies before they are logged, and
//! [`audit::redact_sensitive`] scrubs free text.
//!
//! # Audit Logging
//!
//! [`audit`] defines the events adapters emit after each pipeline stage and the
//! [`AuditSink`] they are emitted to.

pub mod audit;
pub mod mask;
pub mod rate_limit;

pub use audit::{AuditEvent, AuditEventType, AuditSink, TracingAuditSink};
pub use rate_limit::{RateLimitConfig, RateLimiter, client_address, payment_key};
