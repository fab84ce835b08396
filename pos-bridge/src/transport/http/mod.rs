//! HTTP transport implementation using reqwest.

use std::time::Duration;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::{debug, instrument, warn};
use url::Url;

use super::config::HttpConfig;
use crate::{
    error::{BridgeError, Result},
    transport::{RequestContext, Transport, sealed},
};

/// Validates the gateway URL.
///
/// Only absolute http(s) URLs with a host are accepted.
fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| BridgeError::TransportError(format!("invalid gateway URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(BridgeError::TransportError(format!(
            "unsupported gateway URL scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(BridgeError::TransportError("gateway URL has no host".to_owned()));
    }

    Ok(url)
}

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || name.contains(['\r', '\n', '\0']) {
        return Err(BridgeError::TransportError(
            "Invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if value.contains(['\r', '\n', '\0']) {
        return Err(BridgeError::TransportError(
            "Invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// True when a connect failure was caused by a failed host name lookup.
///
/// reqwest and hyper-util expose no typed DNS error: the resolver hands back an
/// `io::Error` whose kind is `Other`/`Uncategorized` on every platform, so the kind
/// cannot tell a lookup failure from a refused socket. The check is therefore limited
/// to connect errors and matches the resolver messages of glibc, musl, macOS and
/// Windows along the source chain.
fn is_unresolvable_host(error: &reqwest::Error) -> bool {
    error.is_connect() && chain_reports_lookup_failure(error)
}

fn chain_reports_lookup_failure(error: &(dyn std::error::Error + 'static)) -> bool {
    const MARKERS: [&str; 5] = [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname provided",
        "no such host",
    ];

    let mut source = Some(error);
    while let Some(err) = source {
        let message = err.to_string().to_ascii_lowercase();
        if MARKERS.iter().any(|marker| message.contains(marker)) {
            return true;
        }
        source = err.source();
    }
    false
}

/// Maps a reqwest failure to the gateway error taxonomy.
fn classify(error: reqwest::Error) -> BridgeError {
    let timed_out = error.is_timeout();
    let unresolvable = is_unresolvable_host(&error);
    let detail = describe(&error.without_url());

    if timed_out {
        BridgeError::GatewayTimeout(detail)
    } else if unresolvable {
        BridgeError::GatewayUnreachable(detail)
    } else {
        BridgeError::GatewayCommunicationError(detail)
    }
}

/// Joins an error and its causes into one line.
fn describe(error: &dyn std::error::Error) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        detail.push_str(": ");
        detail.push_str(&err.to_string());
        source = err.source();
    }
    detail
}

/// HTTP/1.1 transport using reqwest.
///
/// Supports connection pooling and keep-alive. POSTs use the configured request timeout
/// (30 seconds by default), GETs use the ping timeout (10 seconds by default).
///
/// # Examples
///
/// ```
/// use pos_bridge::transport::{HttpConfig, HttpTransport, Transport};
///
/// let config = HttpConfig { timeout_secs: 60, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config)?;
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// # Ok::<(), pos_bridge::BridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    ping_timeout: Duration,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Pool max idle per host: 16
    /// - Request timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - Ping timeout: 10 seconds
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransportError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransportError`] if the configuration is out of bounds or
    /// the HTTP client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| BridgeError::TransportError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, ping_timeout: config.ping_timeout() })
    }

    #[instrument(skip(self, ctx, body), fields(url = ctx.url, body_len = body.len()))]
    async fn execute_post(&self, ctx: RequestContext<'_>, body: &str) -> Result<String> {
        let url = validate_url(ctx.url)?;

        validate_header(CONTENT_TYPE.as_str(), ctx.content_type)?;
        for (key, value) in &ctx.headers {
            validate_header(key, value)?;
        }

        let mut request =
            self.client.post(url).header(CONTENT_TYPE, ctx.content_type).body(body.to_owned());
        for (key, value) in ctx.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            let error = classify(e);
            warn!(error_code = error.error_code(), "Gateway request failed");
            error
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Gateway returned non-200 status");
            return Err(BridgeError::GatewayCommunicationError(format!(
                "gateway returned HTTP {}",
                status.as_u16()
            )));
        }

        let text = response.text().await.map_err(classify)?;
        debug!(response_len = text.len(), "Gateway response received");
        Ok(text)
    }

    #[instrument(skip(self))]
    async fn execute_get(&self, url: &str) -> Result<u16> {
        let url = validate_url(url)?;

        let response = self
            .client
            .get(url)
            .timeout(self.ping_timeout)
            .send()
            .await
            .map_err(classify)?;

        Ok(response.status().as_u16())
    }
}

impl Transport for HttpTransport {
    async fn post<'a>(&'a self, ctx: RequestContext<'a>, body: &'a str) -> Result<String> {
        self.execute_post(ctx, body).await
    }

    async fn get<'a>(&'a self, url: &'a str) -> Result<u16> {
        self.execute_get(url).await
    }

    fn protocol_name(&self) -> &'static str {
        "http/1.1"
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_http_transport_new() {
        assert!(HttpTransport::new().is_ok());
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let config = HttpConfig { timeout_secs: 0, ..HttpConfig::default() };
        assert!(matches!(HttpTransport::with_config(&config), Err(BridgeError::TransportError(_))));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://gateway.example.com/api").is_ok());
        assert!(validate_url("http://127.0.0.1:8080/xml").is_ok());
        assert!(validate_url("ftp://gateway.example.com").is_err());
        assert!(validate_url("not-a-url").is_err());
    }

    #[test]
    fn test_validate_header_rejects_crlf() {
        assert!(validate_header("SOAPAction", "").is_ok());
        assert!(validate_header("User-Agent", "a\r\nX-Injected: 1").is_err());
        assert!(validate_header("Bad\nName", "v").is_err());
        assert!(validate_header("", "v").is_err());
    }

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl std::fmt::Display for Wrapped {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("client error (Connect)")
        }
    }

    impl std::error::Error for Wrapped {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_lookup_failure_found_in_source_chain() {
        let lookup = Wrapped(io::Error::other(
            "failed to lookup address information: Name or service not known",
        ));
        assert!(chain_reports_lookup_failure(&lookup));

        let macos = Wrapped(io::Error::other("nodename nor servname provided, or not known"));
        assert!(chain_reports_lookup_failure(&macos));

        let refused = Wrapped(io::Error::from(io::ErrorKind::ConnectionRefused));
        assert!(!chain_reports_lookup_failure(&refused));
    }

    #[tokio::test]
    async fn test_post_invalid_url_is_transport_error() {
        let transport = HttpTransport::new().unwrap();
        let ctx = RequestContext { url: "not-a-url", content_type: "text/xml", headers: vec![] };

        let result = transport.post(ctx, "<request/>").await;
        assert!(matches!(result, Err(BridgeError::TransportError(_))));
    }

    #[tokio::test]
    async fn test_post_unresolvable_host_is_unreachable() {
        let transport = HttpTransport::new().unwrap();
        let ctx = RequestContext {
            url: "http://gateway.invalid/api",
            content_type: "text/xml",
            headers: vec![],
        };

        let result = transport.post(ctx, "<request/>").await;
        assert!(matches!(result, Err(BridgeError::GatewayUnreachable(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_get_refused_connection_is_communication_error() {
        let transport = HttpTransport::new().unwrap();

        // Port 9 (discard) on loopback is closed in test environments.
        let result = transport.get("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(BridgeError::GatewayCommunicationError(_))), "{result:?}");
    }
}
