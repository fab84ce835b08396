//! Gateway transport abstraction.
//!
//! This module provides a sealed [`Transport`] trait for the single HTTP exchange each
//! gateway operation needs, and its reqwest implementation [`HttpTransport`].
//!
//! # Architecture
//!
//! The transport layer separates protocol mechanics from payload handling:
//! - **Transport**: one POST (charge, status query) or GET (liveness), with failures
//!   classified into typed errors
//! - **`GatewayProvider`**: XML encoding, headers, response interpretation
//!
//! # Failure Mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | Host name does not resolve | [`BridgeError::GatewayUnreachable`] |
//! | No response within the timeout | [`BridgeError::GatewayTimeout`] |
//! | Non-200 status, refused connection, TLS or body failure | [`BridgeError::GatewayCommunicationError`] |
//!
//! No call is ever retried. A charge that timed out may still have been executed by the
//! bank, so retry policy belongs to the caller.
//!
//! [`BridgeError::GatewayUnreachable`]: crate::BridgeError::GatewayUnreachable
//! [`BridgeError::GatewayTimeout`]: crate::BridgeError::GatewayTimeout
//! [`BridgeError::GatewayCommunicationError`]: crate::BridgeError::GatewayCommunicationError
//!
//! # Examples
//!
//! ```rust,no_run
//! use pos_bridge::transport::{HttpTransport, RequestContext, Transport};
//!
//! # async fn example() -> pos_bridge::Result<()> {
//! let transport = HttpTransport::new()?;
//!
//! let ctx = RequestContext {
//!     url: "https://gateway.example.com/api",
//!     content_type: "text/xml; charset=utf-8",
//!     headers: vec![("SOAPAction", "")],
//! };
//!
//! let body = transport.post(ctx, "<request/>").await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::error::Result;

pub mod config;
pub mod http;
pub(crate) mod sealed;

pub use config::HttpConfig;
pub use http::HttpTransport;

/// Request context for a gateway POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext<'a> {
    /// Absolute gateway URL.
    pub url: &'a str,
    /// Content-Type header value.
    pub content_type: &'a str,
    /// Additional HTTP headers.
    pub headers: Vec<(&'a str, &'a str)>,
}

/// Gateway transport.
///
/// This trait is sealed: only implementations within this crate are allowed, so every
/// transport applies the same failure mapping.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Posts `body` and returns the response body of a 200 reply.
    ///
    /// The body is sent with an exact `Content-Length`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayUnreachable`](crate::BridgeError::GatewayUnreachable),
    /// [`GatewayTimeout`](crate::BridgeError::GatewayTimeout) or
    /// [`GatewayCommunicationError`](crate::BridgeError::GatewayCommunicationError), or
    /// [`TransportError`](crate::BridgeError::TransportError) for an invalid URL or header.
    fn post<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a str,
    ) -> impl Future<Output = Result<String>> + Send + 'a;

    /// Issues a liveness GET and returns the HTTP status, whatever it is.
    ///
    /// # Errors
    ///
    /// Same classification as [`post`](Self::post), except that a non-200 status is
    /// returned rather than reported as an error.
    fn get<'a>(&'a self, url: &'a str) -> impl Future<Output = Result<u16>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}
