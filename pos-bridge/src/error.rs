//! Error types for the POS bridge.
//!
//! This module defines all error types that can occur while talking to the bank
//! gateways. All errors implement the standard [`std::error::Error`] trait via
//! [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Admission** ([`BridgeError::RateLimitExceeded`]): the caller was refused before any
//!   gateway work started
//! - **XML boundary** ([`BridgeError::EncodingError`], [`BridgeError::DecodingError`]):
//!   malformed request or response documents
//! - **Transport** ([`BridgeError::GatewayUnreachable`], [`BridgeError::GatewayTimeout`],
//!   [`BridgeError::GatewayCommunicationError`]): the HTTP exchange itself failed
//! - **Configuration** ([`BridgeError::ConfigError`], [`BridgeError::TransportError`]):
//!   detected at construction time, never mid-payment
//!
//! Every variant carries a machine-readable [`error_code`](BridgeError::error_code), a
//! [`user_message`](BridgeError::user_message) that never leaks gateway internals, and the
//! [`http_status`](BridgeError::http_status) a controller should answer with.
//!
//! # Examples
//!
//! ```
//! use pos_bridge::error::{BridgeError, Result};
//!
//! fn require(value: &str) -> Result<&str> {
//!     if value.trim().is_empty() {
//!         return Err(BridgeError::ConfigError("merchant_id is required".to_owned()));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(require("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for bridge operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in the POS bridge.
///
/// The `Display` text is meant for server-side logs. Use
/// [`user_message`](Self::user_message) for anything shown to an end user.
///
/// # Error Recovery
///
/// - **Rate limiting** ([`RateLimitExceeded`](Self::RateLimitExceeded)): wait
///   `retry_after_secs` and retry
/// - **Transport** ([`GatewayTimeout`](Self::GatewayTimeout) and friends): the charge may or
///   may not have reached the bank. Query the status before retrying a charge, there is no
///   idempotency key on the wire
/// - **Configuration** ([`ConfigError`](Self::ConfigError)): fix the deployment, nothing
///   to retry
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The payment request failed structural validation.
    ///
    /// Field-level validation happens upstream; this variant is raised only for values the
    /// bridge itself cannot interpret (for example an expiry that is not `MM/YY`).
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),

    /// The client exceeded its request quota for the current window.
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded {
        /// Seconds until the client's window resets.
        retry_after_secs: u64,
    },

    /// The outbound XML document could not be built.
    #[error("Failed to encode gateway request: {0}")]
    EncodingError(String),

    /// The gateway reply is not well-formed XML.
    #[error("Failed to decode gateway response: {0}")]
    DecodingError(String),

    /// The gateway host could not be resolved.
    #[error("Payment gateway unreachable: {0}")]
    GatewayUnreachable(String),

    /// The gateway did not answer within the configured timeout.
    #[error("Payment gateway timed out: {0}")]
    GatewayTimeout(String),

    /// Any other transport fault, including a non-200 status.
    #[error("Payment gateway communication error: {0}")]
    GatewayCommunicationError(String),

    /// A well-formed reply had an unexpected shape.
    ///
    /// The adapter converts this into a failed outcome; it never escapes a charge once the
    /// gateway has answered.
    #[error("Failed to interpret gateway response: {0}")]
    ResponseParseError(String),

    /// Required configuration is missing or invalid.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Transport settings are invalid or the HTTP client could not be built.
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl BridgeError {
    /// Returns the machine-readable error code.
    ///
    /// # Examples
    ///
    /// ```
    /// use pos_bridge::BridgeError;
    ///
    /// let err = BridgeError::GatewayTimeout("30s elapsed".to_owned());
    /// assert_eq!(err.error_code(), "GATEWAY_TIMEOUT");
    /// ```
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationRejected(_) => "VALIDATION_REJECTED",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            Self::EncodingError(_) => "ENCODING_ERROR",
            Self::DecodingError(_) => "DECODING_ERROR",
            Self::GatewayUnreachable(_) => "GATEWAY_UNREACHABLE",
            Self::GatewayTimeout(_) => "GATEWAY_TIMEOUT",
            Self::GatewayCommunicationError(_) => "GATEWAY_COMMUNICATION_ERROR",
            Self::ResponseParseError(_) => "RESPONSE_PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::TransportError(_) => "TRANSPORT_ERROR",
        }
    }

    /// Returns a message that is safe to show to an end user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::ValidationRejected(_) => "The payment request is invalid",
            Self::RateLimitExceeded { .. } => {
                "Too many requests. Please wait a while and try again."
            }
            Self::GatewayUnreachable(_) => "The payment gateway is unreachable",
            Self::GatewayTimeout(_) => "The payment request timed out",
            Self::GatewayCommunicationError(_) => "Communication error with the payment gateway",
            Self::ResponseParseError(_) => "The payment response could not be processed",
            Self::EncodingError(_)
            | Self::DecodingError(_)
            | Self::ConfigError(_)
            | Self::TransportError(_) => "An error occurred while processing the payment",
        }
    }

    /// Returns the HTTP status a controller should map this error to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::ValidationRejected(_) => 400,
            Self::GatewayTimeout(_) => 408,
            Self::RateLimitExceeded { .. } => 429,
            Self::GatewayCommunicationError(_) => 502,
            Self::GatewayUnreachable(_) => 503,
            Self::EncodingError(_)
            | Self::DecodingError(_)
            | Self::ResponseParseError(_)
            | Self::ConfigError(_)
            | Self::TransportError(_) => 500,
        }
    }

    /// Returns true for transport-layer failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::GatewayUnreachable(_)
                | Self::GatewayTimeout(_)
                | Self::GatewayCommunicationError(_)
        )
    }
}
