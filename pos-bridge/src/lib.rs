//! POS Bridge: card payments through two XML bank gateways
//!
//! A Rust library that takes a validated card-payment request, translates it into the
//! XML dialect of one of two bank POS gateways, sends it, and normalizes the reply into a
//! single [`GatewayOutcome`](models::GatewayOutcome) shape.
//!
//! # What does it cover?
//!
//! - **Two wire formats**: Provider A (`<request>` over `text/xml`) and Provider B
//!   (`<posnetRequest>` with a SHA-1 MAC, posted form-encoded)
//! - **Typed transport failures**: unreachable, timeout and communication errors are
//!   distinguished so callers can answer differently
//! - **Uniform outcomes**: response codes resolved through per-provider tables, parse
//!   problems turned into failed outcomes instead of panics or raw errors
//! - **Admission control**: a fixed-window rate limiter keyed by client address
//! - **Log hygiene**: card numbers, CVVs, secrets and references are masked before they
//!   reach a log line
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Controller layer │  HTTP routing and field validation (not part of this crate)
//! └────────┬─────────┘
//!          │ PaymentRequest
//! ┌────────▼────────────────────────────────────────────────┐
//! │  security::RateLimiter  ──►  gateway::PaymentAdapter<P>  │
//! │                               │  encode (xml, mac)       │
//! │                               │  post   (transport)      │
//! │                               │  parse  (xml)            │
//! │                               │  normalize               │
//! │                               └─► AuditSink              │
//! └────────┬────────────────────────────────────────────────┘
//!          │ HTTPS POST, 30 s timeout, no retries
//! ┌────────▼────────┐
//! │  Bank gateway   │  Provider A or Provider B
//! └─────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pos_bridge::{
//!     config::BridgeConfig,
//!     gateway::PaymentAdapter,
//!     models::PaymentRequest,
//!     security::{RateLimiter, payment_key},
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> pos_bridge::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let limiter = RateLimiter::new(config.rate_limit.to_config());
//! let adapter = PaymentAdapter::gateway_b(&config)?;
//!
//! limiter.acquire(&payment_key("203.0.113.7")).await?;
//!
//! let request = PaymentRequest::new(
//!     "4111111111111111",
//!     "12/25".parse()?,
//!     "123",
//!     Decimal::new(10050, 2),
//!     "Test User",
//! )
//! .with_client_ip(Some("203.0.113.7"));
//!
//! let outcome = adapter.charge(&request).await?;
//! if outcome.success() {
//!     println!("approved as {:?}", outcome.transaction_id());
//! } else {
//!     println!("declined: {:?}", outcome.error_message());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BridgeError>`](error::Result). A charge
//! returns `Err` only before the gateway has produced a readable reply; afterwards every
//! result, approvals and declines alike, is an outcome. Status queries and pings never
//! fail.
//!
//! ```rust
//! use pos_bridge::BridgeError;
//!
//! fn respond(error: &BridgeError) -> (u16, &'static str) {
//!     (error.http_status(), error.user_message())
//! }
//!
//! let (status, _) = respond(&BridgeError::GatewayTimeout("30s elapsed".to_owned()));
//! assert_eq!(status, 408);
//! ```
//!
//! # Known Gap
//!
//! Neither gateway protocol carries an idempotency key. A charge that timed out may have
//! been executed; retrying it can charge the card twice.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and wiremock"
)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod security;
pub mod transport;
pub mod xml;

pub use error::{BridgeError, Result};
pub use gateway::{GatewayA, GatewayB, GatewayProvider, PaymentAdapter};
pub use models::{GatewayOutcome, PaymentRequest, Provider};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let _ = std::marker::PhantomData::<BridgeError>;
        let _ = std::marker::PhantomData::<PaymentAdapter<GatewayA>>;
        assert_eq!(Provider::GatewayB.as_str(), "gateway-B");
    }
}
