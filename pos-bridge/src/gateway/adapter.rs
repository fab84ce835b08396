//! The payment pipeline shared by both gateways.

use std::{sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    GatewayA, GatewayB, GatewayProvider,
    normalize::{OutcomeContext, normalize, parse_failure},
};
use crate::{
    config::BridgeConfig,
    error::{BridgeError, Result},
    models::{GatewayOutcome, PaymentRequest, PingResult},
    security::{
        AuditEvent, AuditEventType, AuditSink, TracingAuditSink,
        mask::{mask_outbound, mask_xml_elements},
    },
    transport::{HttpTransport, RequestContext, Transport},
    xml::parse_document,
};

/// Error code of a status query that failed before an outcome could be built.
pub const QUERY_ERROR: &str = "QUERY_ERROR";

/// Runs charges, status queries and pings against one gateway.
///
/// The adapter encodes with its [`GatewayProvider`], sends through its [`Transport`],
/// parses the reply and normalizes it. Each stage is reported to an [`AuditSink`].
///
/// Nothing is retried. A charge that fails with a transport error may still have reached
/// the bank; query its status before charging again.
///
/// # Examples
///
/// ```rust,no_run
/// use pos_bridge::{config::BridgeConfig, gateway::PaymentAdapter, models::PaymentRequest};
/// use rust_decimal::Decimal;
///
/// # async fn example() -> pos_bridge::Result<()> {
/// let config = BridgeConfig::from_env()?;
/// let adapter = PaymentAdapter::gateway_a(&config)?;
///
/// let request = PaymentRequest::new(
///     "4111111111111111",
///     "12/25".parse()?,
///     "123",
///     Decimal::new(10050, 2),
///     "Test User",
/// );
///
/// let outcome = adapter.charge(&request).await?;
/// println!("approved: {}", outcome.success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PaymentAdapter<P, T = HttpTransport> {
    provider: P,
    transport: T,
    audit: Arc<dyn AuditSink>,
    log_sensitive_data: bool,
}

impl PaymentAdapter<GatewayA> {
    /// Builds a Provider A adapter from the `gateway_a` section of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if the section is missing or invalid, or
    /// [`BridgeError::TransportError`] if the HTTP client cannot be built.
    pub fn gateway_a(config: &BridgeConfig) -> Result<Self> {
        let section = config
            .gateway_a
            .clone()
            .ok_or_else(|| BridgeError::ConfigError("gateway_a is not configured".to_owned()))?;
        Self::from_config(GatewayA::new(section, config.environment)?, config)
    }
}

impl PaymentAdapter<GatewayB> {
    /// Builds a Provider B adapter from the `gateway_b` section of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`] if the section is missing or invalid, or
    /// [`BridgeError::TransportError`] if the HTTP client cannot be built.
    pub fn gateway_b(config: &BridgeConfig) -> Result<Self> {
        let section = config
            .gateway_b
            .clone()
            .ok_or_else(|| BridgeError::ConfigError("gateway_b is not configured".to_owned()))?;
        Self::from_config(GatewayB::new(section, config.environment)?, config)
    }
}

impl<P: GatewayProvider> PaymentAdapter<P> {
    /// Builds an adapter over an HTTP transport configured from `config.http`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransportError`] if the HTTP settings are invalid.
    pub fn from_config(provider: P, config: &BridgeConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http)?;
        Ok(Self::new(provider, transport).with_sensitive_logging(config.log_sensitive_data))
    }
}

impl<P: GatewayProvider, T: Transport> PaymentAdapter<P, T> {
    /// Creates an adapter that audits through [`TracingAuditSink`] and does not log XML.
    pub fn new(provider: P, transport: T) -> Self {
        Self { provider, transport, audit: Arc::new(TracingAuditSink), log_sensitive_data: false }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Logs outbound XML with card data and secrets masked, instead of a generic notice.
    #[must_use]
    pub fn with_sensitive_logging(mut self, enabled: bool) -> Self {
        self.log_sensitive_data = enabled;
        self
    }

    /// The provider strategy.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Charges a card.
    ///
    /// Once the gateway has answered with well-formed XML the result is always an outcome:
    /// an unexpected response shape yields a failed outcome with code
    /// `RESPONSE_PARSE_ERROR`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::EncodingError`] if the request cannot be serialized or signed
    /// - [`BridgeError::GatewayUnreachable`], [`BridgeError::GatewayTimeout`] or
    ///   [`BridgeError::GatewayCommunicationError`] if the exchange fails
    /// - [`BridgeError::DecodingError`] if the gateway reply is not XML
    #[instrument(
        skip(self, request),
        fields(provider = %self.provider.provider(), request_id = tracing::field::Empty)
    )]
    pub async fn charge(&self, request: &PaymentRequest) -> Result<GatewayOutcome> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        let started = Instant::now();

        let mut attempted = self.event(AuditEventType::ChargeAttempted, request_id);
        if let Some(order_id) = request.order_id.as_deref() {
            attempted = attempted.with_order_id(order_id);
        }
        self.audit.record(&attempted);

        let result = self.run_charge(request, request_id).await;
        let duration = started.elapsed();

        match &result {
            Ok(outcome) => {
                let kind = if outcome.success() {
                    AuditEventType::ChargeApproved
                } else {
                    AuditEventType::ChargeDeclined
                };
                let mut event = self.event(kind, request_id).with_duration(duration);
                if let Some(order_id) = outcome.order_id() {
                    event = event.with_order_id(order_id);
                }
                if let Some(transaction_id) = outcome.transaction_id() {
                    event = event.with_transaction_id(transaction_id);
                }
                if let Some(code) = outcome.error_code().or(outcome.gateway_response_code()) {
                    event = event.with_code(code);
                }
                self.audit.record(&event);
                if let Ok(body) = serde_json::to_value(outcome) {
                    debug!(outcome = %mask_outbound(&body), "Charge outcome");
                }
                info!(success = outcome.success(), "Charge completed");
            }
            Err(error) => {
                self.audit.record(
                    &self
                        .event(AuditEventType::ChargeFailed, request_id)
                        .with_code(error.error_code())
                        .with_error(&error.to_string())
                        .with_duration(duration),
                );
                warn!(error_code = error.error_code(), "Charge failed");
            }
        }

        result
    }

    async fn run_charge(&self, request: &PaymentRequest, request_id: Uuid) -> Result<GatewayOutcome> {
        let now_millis = Utc::now().timestamp_millis();
        let encoded = self.provider.encode_charge(request, now_millis)?;
        self.log_outbound_xml(&encoded.body);
        self.audit.record(
            &self
                .event(AuditEventType::RequestEncoded, request_id)
                .with_order_id(&encoded.order_id),
        );

        let sent = Instant::now();
        let body = self.post(&encoded.body).await?;
        self.audit.record(
            &self
                .event(AuditEventType::GatewayResponded, request_id)
                .with_order_id(&encoded.order_id)
                .with_duration(sent.elapsed()),
        );

        let document = parse_document(&body)?;
        let context = OutcomeContext {
            order_id: Some(&encoded.order_id),
            amount: Some((request.amount, &encoded.currency)),
        };

        Ok(normalize(&self.provider, &document, &context, now_millis).unwrap_or_else(|error| {
            warn!(error = %error, "Gateway response could not be normalized");
            parse_failure().with_order_id(&encoded.order_id)
        }))
    }

    /// Queries the status of an earlier charge.
    ///
    /// `reference` is the transaction id for Provider A and the order id for Provider B.
    /// This never fails: an empty reference yields `INVALID_TRANSACTION_ID` or
    /// `INVALID_ORDER_ID`, any encoding, transport or decoding failure yields
    /// [`QUERY_ERROR`], and an unexpected response shape yields `RESPONSE_PARSE_ERROR`.
    #[instrument(skip(self, reference), fields(provider = %self.provider.provider()))]
    pub async fn query_status(&self, reference: &str) -> GatewayOutcome {
        let request_id = Uuid::new_v4();
        let reference = reference.trim();

        let outcome = if reference.is_empty() {
            let missing = self.provider.missing_reference();
            GatewayOutcome::failed(missing.code, missing.message)
        } else {
            self.run_status_query(reference).await.unwrap_or_else(|error| {
                warn!(error_code = error.error_code(), error = %error, "Status query failed");
                GatewayOutcome::failed(QUERY_ERROR, "The payment status could not be queried")
            })
        };

        let mut event = self.event(AuditEventType::StatusQueried, request_id);
        if !reference.is_empty() {
            event = event.with_transaction_id(reference);
        }
        if let Some(code) = outcome.error_code().or(outcome.gateway_response_code()) {
            event = event.with_code(code);
        }
        self.audit.record(&event);

        outcome
    }

    async fn run_status_query(&self, reference: &str) -> Result<GatewayOutcome> {
        let body = self.provider.encode_status_query(reference)?;
        self.log_outbound_xml(&body);

        let reply = self.post(&body).await?;
        let document = parse_document(&reply)?;

        let context = self.provider.status_context(reference);
        let now_millis = Utc::now().timestamp_millis();
        Ok(normalize(&self.provider, &document, &context, now_millis).unwrap_or_else(|error| {
            warn!(error = %error, "Status response could not be normalized");
            parse_failure()
        }))
    }

    /// Checks that the gateway endpoint answers a GET with a success status.
    ///
    /// Failures are reported in the result, never returned as errors.
    #[instrument(skip(self), fields(provider = %self.provider.provider()))]
    pub async fn ping(&self) -> PingResult {
        let provider = self.provider.provider();
        let started = Instant::now();

        let result = match self.transport.get(self.provider.endpoint()).await {
            Ok(status) if (200..300).contains(&status) => {
                PingResult { reachable: true, detail: format!("{provider} reachable (HTTP {status})") }
            }
            Ok(status) => PingResult {
                reachable: false,
                detail: format!("{provider} unreachable: HTTP {status}"),
            },
            Err(error) => {
                PingResult { reachable: false, detail: format!("{provider} unreachable: {error}") }
            }
        };

        let code = if result.reachable { "REACHABLE" } else { "UNREACHABLE" };
        self.audit.record(
            &self
                .event(AuditEventType::PingCompleted, Uuid::new_v4())
                .with_code(code)
                .with_duration(started.elapsed()),
        );
        debug!(reachable = result.reachable, "Ping completed");

        result
    }

    async fn post(&self, body: &str) -> Result<String> {
        let ctx = RequestContext {
            url: self.provider.endpoint(),
            content_type: self.provider.content_type(),
            headers: self.provider.headers().to_vec(),
        };
        self.transport.post(ctx, body).await
    }

    fn log_outbound_xml(&self, xml: &str) {
        if self.log_sensitive_data {
            let masked = mask_xml_elements(xml, self.provider.sensitive_elements());
            info!(xml = %masked, "Request XML generated");
        } else {
            info!("Request XML generated successfully");
        }
    }

    fn event(&self, event_type: AuditEventType, request_id: Uuid) -> AuditEvent {
        AuditEvent::new(event_type, Some(self.provider.provider()), request_id)
    }
}

#[cfg(test)]
mod tests {
    use std::{io, sync::Mutex};

    use rust_decimal::Decimal;
    use tracing::Level;

    use super::*;
    use crate::{
        config::{Environment, GatewayAConfig, GatewayBConfig, Secret},
        transport::sealed,
    };

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Body(&'static str),
        Timeout,
        Unreachable,
        Status(u16),
    }

    #[derive(Debug)]
    struct StubTransport {
        reply: Reply,
        posted: Mutex<Vec<(String, String)>>,
    }

    impl StubTransport {
        fn new(reply: Reply) -> Self {
            Self { reply, posted: Mutex::new(Vec::new()) }
        }

        fn posted(&self) -> Vec<(String, String)> {
            self.posted.lock().unwrap().clone()
        }
    }

    impl sealed::private::Sealed for StubTransport {}

    impl Transport for StubTransport {
        async fn post<'a>(&'a self, ctx: RequestContext<'a>, body: &'a str) -> Result<String> {
            self.posted.lock().unwrap().push((ctx.content_type.to_owned(), body.to_owned()));
            match self.reply {
                Reply::Body(body) => Ok(body.to_owned()),
                Reply::Timeout => Err(BridgeError::GatewayTimeout("30s elapsed".to_owned())),
                Reply::Unreachable => Err(BridgeError::GatewayUnreachable("dns error".to_owned())),
                Reply::Status(status) => Err(BridgeError::GatewayCommunicationError(format!(
                    "gateway returned HTTP {status}"
                ))),
            }
        }

        async fn get<'a>(&'a self, _url: &'a str) -> Result<u16> {
            match self.reply {
                Reply::Body(_) => Ok(200),
                Reply::Status(status) => Ok(status),
                Reply::Timeout => Err(BridgeError::GatewayTimeout("10s elapsed".to_owned())),
                Reply::Unreachable => Err(BridgeError::GatewayUnreachable("dns error".to_owned())),
            }
        }

        fn protocol_name(&self) -> &'static str {
            "stub"
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        events: Mutex<Vec<AuditEvent>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<AuditEventType> {
            self.events.lock().unwrap().iter().map(|event| event.event_type).collect()
        }
    }

    impl AuditSink for RecordingSink {
        fn record(&self, event: &AuditEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn gateway_a() -> GatewayA {
        GatewayA::new(
            GatewayAConfig {
                url: "https://a.example.com/pay".to_owned(),
                test_url: "https://test.a.example.com/pay".to_owned(),
                merchant_id: "M1".to_owned(),
                password: Secret::new("pw"),
                terminal_id: "T1".to_owned(),
            },
            Environment::Test,
        )
        .unwrap()
    }

    fn gateway_b() -> GatewayB {
        GatewayB::new(
            GatewayBConfig {
                url: "https://b.example.com/xml".to_owned(),
                test_url: "https://test.b.example.com/xml".to_owned(),
                posnet_id: "1010".to_owned(),
                terminal_no: "67000001".to_owned(),
                merchant_id: "6700000067".to_owned(),
                enc_key: Secret::new("key"),
            },
            Environment::Test,
        )
        .unwrap()
    }

    fn request() -> PaymentRequest {
        PaymentRequest::new(
            "4111111111111111",
            "12/25".parse().unwrap(),
            "123",
            Decimal::new(10050, 2),
            "Test User",
        )
        .with_currency("TRY")
    }

    fn adapter<P: GatewayProvider>(
        provider: P,
        reply: Reply,
    ) -> (PaymentAdapter<P, StubTransport>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let adapter = PaymentAdapter::new(provider, StubTransport::new(reply))
            .with_audit_sink(sink.clone());
        (adapter, sink)
    }

    #[tokio::test]
    async fn test_charge_approved_records_stages() {
        let (adapter, sink) = adapter(
            gateway_a(),
            Reply::Body("<response><response_code>00</response_code></response>"),
        );

        let outcome = adapter.charge(&request().with_order_id("ORD-1")).await.unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.amount(), Some(Decimal::new(10050, 2)));
        assert_eq!(outcome.currency(), Some("TRY"));
        assert_eq!(outcome.order_id(), Some("ORD-1"));

        assert_eq!(
            sink.kinds(),
            vec![
                AuditEventType::ChargeAttempted,
                AuditEventType::RequestEncoded,
                AuditEventType::GatewayResponded,
                AuditEventType::ChargeApproved,
            ]
        );

        let posted = adapter.transport.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "text/xml; charset=utf-8");
        assert!(posted[0].1.contains("<order_id>ORD-1</order_id>"));
    }

    #[tokio::test]
    async fn test_charge_reports_generated_order_id() {
        let (adapter, _) = adapter(
            gateway_b(),
            Reply::Body(
                "<posnetResponse><oosResponseData><approved>0</approved><respCode>51</respCode>\
                 </oosResponseData></posnetResponse>",
            ),
        );

        let outcome = adapter.charge(&request()).await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.error_code(), Some("51"));
        assert_eq!(outcome.error_message(), Some("Insufficient funds"));
        assert!(outcome.order_id().unwrap().starts_with("YK"));
    }

    #[tokio::test]
    async fn test_charge_transport_error_propagates() {
        let (adapter, sink) = adapter(gateway_a(), Reply::Timeout);

        let result = adapter.charge(&request()).await;
        assert!(matches!(result, Err(BridgeError::GatewayTimeout(_))));
        assert_eq!(sink.kinds().last(), Some(&AuditEventType::ChargeFailed));

        let events = sink.events.lock().unwrap();
        let failed = events.last().unwrap();
        assert_eq!(failed.details.code.as_deref(), Some("GATEWAY_TIMEOUT"));
    }

    #[tokio::test]
    async fn test_charge_encoding_error_skips_transport() {
        let (adapter, _) = adapter(gateway_b(), Reply::Body("<unused/>"));
        let mut request = request();
        request.amount = Decimal::new(-5, 0);

        let result = adapter.charge(&request).await;
        assert!(matches!(result, Err(BridgeError::EncodingError(_))));
        assert!(adapter.transport.posted().is_empty());
    }

    #[tokio::test]
    async fn test_charge_malformed_xml_is_decoding_error() {
        let (adapter, _) = adapter(gateway_a(), Reply::Body("<html><body>maintenance"));

        let result = adapter.charge(&request()).await;
        assert!(matches!(result, Err(BridgeError::DecodingError(_))));
    }

    #[tokio::test]
    async fn test_charge_unexpected_shape_is_parse_error_outcome() {
        let (adapter, sink) = adapter(
            gateway_a(),
            Reply::Body("<response><response_code><nested/></response_code></response>"),
        );

        let outcome = adapter.charge(&request().with_order_id("ORD-2")).await.unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.error_code(), Some("RESPONSE_PARSE_ERROR"));
        assert_eq!(outcome.order_id(), Some("ORD-2"));
        assert_eq!(sink.kinds().last(), Some(&AuditEventType::ChargeDeclined));
    }

    #[tokio::test]
    async fn test_query_status_empty_reference() {
        let (adapter_a, _) = adapter(gateway_a(), Reply::Body("<unused/>"));
        let outcome = adapter_a.query_status("  ").await;
        assert_eq!(outcome.error_code(), Some("INVALID_TRANSACTION_ID"));
        assert!(adapter_a.transport.posted().is_empty());

        let (adapter_b, _) = adapter(gateway_b(), Reply::Body("<unused/>"));
        let outcome = adapter_b.query_status("").await;
        assert_eq!(outcome.error_code(), Some("INVALID_ORDER_ID"));
    }

    #[tokio::test]
    async fn test_query_status_failure_is_query_error() {
        for reply in [Reply::Timeout, Reply::Unreachable, Reply::Status(500), Reply::Body("not xml")] {
            let (adapter, _) = adapter(gateway_a(), reply);
            let outcome = adapter.query_status("TXN-1").await;
            assert_eq!(outcome.error_code(), Some(QUERY_ERROR), "{reply:?}");
        }
    }

    #[tokio::test]
    async fn test_query_status_gateway_b_keeps_order_id() {
        let (adapter, sink) = adapter(
            gateway_b(),
            Reply::Body(
                "<posnetResponse><oosResponseData><approved>1</approved>\
                 <hostLogKey>HK1</hostLogKey></oosResponseData></posnetResponse>",
            ),
        );

        let outcome = adapter.query_status("YK-5").await;
        assert!(outcome.success());
        assert_eq!(outcome.transaction_id(), Some("HK1"));
        assert_eq!(outcome.order_id(), Some("YK-5"));
        assert_eq!(outcome.amount(), None);
        assert_eq!(sink.kinds(), vec![AuditEventType::StatusQueried]);

        let posted = adapter.transport.posted();
        assert_eq!(posted[0].0, "application/x-www-form-urlencoded");
        assert!(posted[0].1.contains("<orderID>YK-5</orderID>"));
    }

    #[tokio::test]
    async fn test_ping_results() {
        let (up, sink) = adapter(gateway_a(), Reply::Body(""));
        let result = up.ping().await;
        assert!(result.reachable);
        assert_eq!(result.detail, "gateway-A reachable (HTTP 200)");
        assert_eq!(sink.kinds(), vec![AuditEventType::PingCompleted]);

        let (not_found, _) = adapter(gateway_b(), Reply::Status(404));
        let result = not_found.ping().await;
        assert!(!result.reachable);
        assert_eq!(result.detail, "gateway-B unreachable: HTTP 404");

        let (down, _) = adapter(gateway_b(), Reply::Unreachable);
        let result = down.ping().await;
        assert!(!result.reachable);
        assert!(result.detail.starts_with("gateway-B unreachable: "));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    async fn charge_logs<P: GatewayProvider>(
        provider: P,
        reply: &'static str,
        sensitive: bool,
    ) -> String {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (adapter, _) = adapter(provider, Reply::Body(reply));
        adapter.with_sensitive_logging(sensitive).charge(&request()).await.unwrap();
        log.text()
    }

    #[tokio::test]
    async fn test_request_xml_logged_masked_at_info() {
        let logs = charge_logs(
            gateway_a(),
            "<response><response_code>00</response_code></response>",
            true,
        )
        .await;

        assert_eq!(logs.matches("Request XML generated").count(), 1, "{logs}");
        assert!(logs.contains("<card_number>****-****-****-****</card_number>"), "{logs}");
        assert!(logs.contains("<cvv>***</cvv>"), "{logs}");
        assert!(logs.contains("<password>***</password>"), "{logs}");
        assert!(logs.contains("<merchant_id>M1</merchant_id>"), "{logs}");
        assert!(!logs.contains("4111111111111111"));
        assert!(!logs.contains("<cvv>123</cvv>"));
        assert!(!logs.contains("<password>pw</password>"));

        let logs = charge_logs(
            gateway_b(),
            "<posnetResponse><oosResponseData><approved>1</approved></oosResponseData></posnetResponse>",
            true,
        )
        .await;

        assert_eq!(logs.matches("Request XML generated").count(), 1, "{logs}");
        assert!(logs.contains("<ccno>****-****-****-****</ccno>"), "{logs}");
        assert!(logs.contains("<cvc>***</cvc>"), "{logs}");
        assert!(logs.contains("<mac>***MASKED***</mac>"), "{logs}");
        assert_eq!(logs.matches("<mac>").count(), 1);
        assert!(!logs.contains("4111111111111111"));
        assert!(!logs.contains("<cvc>123</cvc>"));
    }

    #[tokio::test]
    async fn test_request_xml_notice_without_sensitive_logging() {
        for logs in [
            charge_logs(
                gateway_a(),
                "<response><response_code>00</response_code></response>",
                false,
            )
            .await,
            charge_logs(
                gateway_b(),
                "<posnetResponse><oosResponseData><approved>1</approved></oosResponseData></posnetResponse>",
                false,
            )
            .await,
        ] {
            assert_eq!(logs.matches("Request XML generated successfully").count(), 1, "{logs}");
            assert!(!logs.contains("<?xml"), "{logs}");
            assert!(!logs.contains("4111111111111111"));
        }
    }

    #[test]
    fn test_from_config_requires_section() {
        let config = BridgeConfig::default();
        assert!(matches!(
            PaymentAdapter::gateway_a(&config),
            Err(BridgeError::ConfigError(_))
        ));
        assert!(matches!(
            PaymentAdapter::gateway_b(&config),
            Err(BridgeError::ConfigError(_))
        ));
    }
}
