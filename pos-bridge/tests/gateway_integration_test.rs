//! Integration tests for the payment pipeline.
//!
//! Drives both providers through the real HTTP transport against stub gateways.

use std::time::Duration;

use pos_bridge::{
    BridgeError,
    config::BridgeConfig,
    gateway::{GatewayA, GatewayB, PaymentAdapter},
    models::PaymentRequest,
    xml::parse_document,
};
use rust_decimal::Decimal;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, header_exists, method, path},
};

fn config(server: &MockServer) -> BridgeConfig {
    let uri = server.uri();
    let document = format!(
        r#"
        environment = "test"

        [http]
        timeout_secs = 1
        ping_timeout_secs = 1

        [gateway_a]
        url = "https://a.example.com/pay"
        test_url = "{uri}/a"
        merchant_id = "M100"
        password = "s3cret"
        terminal_id = "T200"

        [gateway_b]
        url = "https://b.example.com/xml"
        test_url = "{uri}/b"
        posnet_id = "1010"
        terminal_no = "67000001"
        merchant_id = "6700000067"
        enc_key = "10,10,10,10,10,10,10,10"
        "#
    );
    BridgeConfig::from_toml(&document).expect("test configuration should be valid")
}

fn gateway_a(server: &MockServer) -> PaymentAdapter<GatewayA> {
    PaymentAdapter::gateway_a(&config(server)).expect("adapter should build")
}

fn gateway_b(server: &MockServer) -> PaymentAdapter<GatewayB> {
    PaymentAdapter::gateway_b(&config(server)).expect("adapter should build")
}

fn sample_request() -> PaymentRequest {
    serde_json::from_value(serde_json::json!({
        "cardNumber": "4111111111111111",
        "expiryDate": "12/25",
        "cvv": "123",
        "amount": 100.50,
        "currency": "TRY",
        "cardHolderName": "Test User"
    }))
    .expect("sample request should deserialize")
}

fn xml_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body).insert_header("content-type", "text/xml")
}

#[tokio::test]
async fn test_gateway_a_approved_charge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a"))
        .and(header("content-type", "text/xml; charset=utf-8"))
        .and(header_exists("SOAPAction"))
        .and(body_string_contains("<amount>10050</amount>"))
        .and(body_string_contains("<expiry_date>1225</expiry_date>"))
        .respond_with(xml_response(
            "<response><response_code>00</response_code>\
             <transaction_id>TXN-123</transaction_id><auth_code>654321</auth_code></response>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = gateway_a(&server).charge(&sample_request()).await.expect("charge should succeed");

    assert!(outcome.success());
    assert_eq!(outcome.transaction_id(), Some("TXN-123"));
    assert_eq!(outcome.amount(), Some(Decimal::new(10050, 2)));
    assert_eq!(outcome.currency(), Some("TRY"));
    assert_eq!(outcome.auth_code(), Some("654321"));
    assert!(outcome.error_code().is_none());
    assert!(outcome.error_message().is_none());
    assert!(outcome.order_id().is_some_and(|id| id.starts_with("ORD_")));
}

#[tokio::test]
async fn test_gateway_a_insufficient_funds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a"))
        .respond_with(xml_response("<response><response_code>51</response_code></response>"))
        .mount(&server)
        .await;

    let outcome = gateway_a(&server).charge(&sample_request()).await.expect("charge should complete");

    assert!(!outcome.success());
    assert_eq!(outcome.error_code(), Some("51"));
    assert_eq!(outcome.error_message(), Some("Insufficient funds"));
    assert!(outcome.transaction_id().is_none());
}

#[tokio::test]
async fn test_gateway_b_signed_charge_approved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("<expDate>2512</expDate>"))
        .and(body_string_contains("<currencyCode>TRY</currencyCode>"))
        .respond_with(xml_response(
            "<posnetResponse><oosResponseData><approved>1</approved><respCode>00</respCode>\
             <hostLogKey>0001000004P0503281</hostLogKey><authCode>007912</authCode>\
             </oosResponseData></posnetResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = sample_request().with_order_id("YK-ORDER-1");
    let outcome = gateway_b(&server).charge(&request).await.expect("charge should succeed");

    assert!(outcome.success());
    assert_eq!(outcome.transaction_id(), Some("0001000004P0503281"));
    assert_eq!(outcome.order_id(), Some("YK-ORDER-1"));
    assert_eq!(outcome.gateway_response_message(), Some("Transaction approved"));

    let received = server.received_requests().await.expect("recording is enabled");
    let body = String::from_utf8(received[0].body.clone()).expect("body is UTF-8");
    let content_length = received[0]
        .headers
        .get("content-length")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    assert_eq!(content_length, Some(body.len()));

    let document = parse_document(&body).expect("request body is XML");
    let mac = document
        .at_path(&["posnetRequest", "oosRequestData", "mac"])
        .and_then(|value| value.as_text())
        .expect("MAC is present");
    assert_eq!(mac.len(), 40);
    assert!(mac.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[tokio::test]
async fn test_gateway_b_declined_with_gateway_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .respond_with(xml_response(
            "<posnetResponse><oosResponseData><approved>0</approved>\
             <respCode>CORE-2008</respCode><respText>INVALID CARD</respText>\
             </oosResponseData></posnetResponse>",
        ))
        .mount(&server)
        .await;

    let outcome = gateway_b(&server).charge(&sample_request()).await.expect("charge should complete");

    assert!(!outcome.success());
    assert_eq!(outcome.error_code(), Some("CORE-2008"));
    assert_eq!(outcome.error_message(), Some("INVALID CARD"));
}

#[tokio::test]
async fn test_non_200_status_is_communication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = gateway_a(&server).charge(&sample_request()).await;
    assert!(matches!(result, Err(BridgeError::GatewayCommunicationError(_))), "{result:?}");
}

#[tokio::test]
async fn test_slow_gateway_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            xml_response("<response><response_code>00</response_code></response>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = gateway_b(&server).charge(&sample_request()).await;
    assert!(matches!(result, Err(BridgeError::GatewayTimeout(_))), "{result:?}");
}

#[tokio::test]
async fn test_html_reply_is_decoding_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Maintenance"))
        .mount(&server)
        .await;

    let result = gateway_a(&server).charge(&sample_request()).await;
    assert!(matches!(result, Err(BridgeError::DecodingError(_))), "{result:?}");
}

#[tokio::test]
async fn test_status_queries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a"))
        .and(body_string_contains("<transaction_type>query</transaction_type>"))
        .and(body_string_contains("<transaction_id>TXN-9</transaction_id>"))
        .respond_with(xml_response(
            "<response><responseCode>00</responseCode><transactionId>TXN-9</transactionId></response>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b"))
        .and(body_string_contains("<orderID>YK-1</orderID>"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let outcome = gateway_a(&server).query_status("TXN-9").await;
    assert!(outcome.success());
    assert_eq!(outcome.transaction_id(), Some("TXN-9"));
    assert!(outcome.amount().is_none());

    let outcome = gateway_b(&server).query_status("YK-1").await;
    assert!(!outcome.success());
    assert_eq!(outcome.error_code(), Some("QUERY_ERROR"));
}

#[tokio::test]
async fn test_ping_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let up = gateway_a(&server).ping().await;
    assert!(up.reachable);
    assert_eq!(up.detail, "gateway-A reachable (HTTP 200)");

    let down = gateway_b(&server).ping().await;
    assert!(!down.reachable);
    assert_eq!(down.detail, "gateway-B unreachable: HTTP 404");
}

#[tokio::test]
async fn test_sensitive_logging_does_not_change_wire_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<cvv>123</cvv>"))
        .respond_with(xml_response("<response><response_code>00</response_code></response>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = BridgeConfig { log_sensitive_data: true, ..config(&server) };
    let adapter = PaymentAdapter::gateway_a(&config).expect("adapter should build");

    let outcome = adapter.charge(&sample_request()).await.expect("charge should succeed");
    assert!(outcome.success());
}
