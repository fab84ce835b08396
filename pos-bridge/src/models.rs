//! Provider-agnostic payment types.
//!
//! [`PaymentRequest`] is what the (excluded) validation layer hands to an adapter.
//! [`GatewayOutcome`] is what every charge and status query yields once a gateway has
//! answered. Its constructors make it impossible to build an approved outcome that carries
//! an error, or a failed outcome without one.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{BridgeError, Result},
    security::mask::mask_card_number,
};

/// The two supported bank gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Provider A, plain `<request>` XML posted as `text/xml`.
    #[serde(rename = "gateway-A")]
    GatewayA,
    /// Provider B, `<posnetRequest>` XML with a SHA-1 MAC, posted form-encoded.
    #[serde(rename = "gateway-B")]
    GatewayB,
}

impl Provider {
    /// Returns the stable identifier used in logs and health reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GatewayA => "gateway-A",
            Self::GatewayB => "gateway-B",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card expiry as entered by the cardholder (`MM/YY`).
///
/// # Examples
///
/// ```
/// use pos_bridge::models::CardExpiry;
///
/// let expiry: CardExpiry = "12/25".parse()?;
/// assert_eq!(expiry.month_first(), "1225");
/// assert_eq!(expiry.year_first(), "2512");
/// # Ok::<(), pos_bridge::BridgeError>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardExpiry {
    month: u8,
    year: u8,
}

impl CardExpiry {
    /// Creates an expiry from a month (1-12) and a two-digit year.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ValidationRejected`] if the month or year is out of range.
    pub fn new(month: u8, year: u8) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(BridgeError::ValidationRejected(format!(
                "expiry month must be 01-12, got {month:02}"
            )));
        }
        if year > 99 {
            return Err(BridgeError::ValidationRejected(format!(
                "expiry year must have two digits, got {year}"
            )));
        }
        Ok(Self { month, year })
    }

    /// Month as a number between 1 and 12.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Two-digit year.
    #[must_use]
    pub const fn year(self) -> u8 {
        self.year
    }

    /// `MMYY`, the layout Provider A expects.
    #[must_use]
    pub fn month_first(self) -> String {
        format!("{:02}{:02}", self.month, self.year)
    }

    /// `YYMM`, the layout Provider B expects.
    #[must_use]
    pub fn year_first(self) -> String {
        format!("{:02}{:02}", self.year, self.month)
    }
}

impl FromStr for CardExpiry {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        let reject = || BridgeError::ValidationRejected("expiry must be in MM/YY format".to_owned());

        let (month, year) = s.split_once('/').ok_or_else(reject)?;
        if month.len() != 2
            || year.len() != 2
            || !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(reject());
        }

        let month = month.parse().map_err(|_| reject())?;
        let year = year.parse().map_err(|_| reject())?;
        Self::new(month, year)
    }
}

impl TryFrom<String> for CardExpiry {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CardExpiry> for String {
    fn from(value: CardExpiry) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year)
    }
}

impl fmt::Debug for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XX/XX")
    }
}

/// A structurally valid card payment request.
///
/// Field-level validation (digit-only card number of 13-19 characters, 3-4 digit CVV,
/// amount between 0.01 and 999999.99) happens before a request reaches this crate.
/// Provider defaults for `currency`, `installments` and `extra_point` are applied by the
/// provider that encodes the request, so the same value can be sent to either gateway.
///
/// Deserializes from the camelCase JSON both public endpoints accept, including Provider
/// B's `installment` and `orderID` spellings.
///
/// `Debug` output never contains the full card number or the CVV.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Primary account number, digits only.
    pub card_number: String,
    /// Card expiry.
    pub expiry_date: CardExpiry,
    /// Card verification value.
    pub cvv: String,
    /// Amount in major units.
    pub amount: Decimal,
    /// Three-letter currency code; the provider default applies when absent.
    #[serde(default)]
    pub currency: Option<String>,
    /// Name printed on the card.
    pub card_holder_name: String,
    /// Installment count; the provider default applies when absent.
    #[serde(default, alias = "installment")]
    pub installments: Option<String>,
    /// Provider B loyalty points field.
    #[serde(default)]
    pub extra_point: Option<String>,
    /// Merchant order id; generated from the current time when absent.
    #[serde(default, alias = "orderID")]
    pub order_id: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Payer IP address.
    #[serde(default)]
    pub customer_ip: Option<String>,
    /// Payer e-mail address.
    #[serde(default)]
    pub customer_email: Option<String>,
}

impl PaymentRequest {
    /// Creates a request with only the mandatory fields set.
    #[must_use]
    pub fn new(
        card_number: impl Into<String>,
        expiry_date: CardExpiry,
        cvv: impl Into<String>,
        amount: Decimal,
        card_holder_name: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            expiry_date,
            cvv: cvv.into(),
            amount,
            currency: None,
            card_holder_name: card_holder_name.into(),
            installments: None,
            extra_point: None,
            order_id: None,
            description: None,
            customer_ip: None,
            customer_email: None,
        }
    }

    /// Sets the currency code.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the merchant order id.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Sets the installment count.
    #[must_use]
    pub fn with_installments(mut self, installments: impl Into<String>) -> Self {
        self.installments = Some(installments.into());
        self
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the payer e-mail address.
    #[must_use]
    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Fills the payer IP from the connection when the caller did not supply one.
    #[must_use]
    pub fn with_client_ip(mut self, ip: Option<&str>) -> Self {
        if self.customer_ip.is_none()
            && let Some(ip) = ip
        {
            self.customer_ip = Some(ip.to_owned());
        }
        self
    }
}

impl fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"***")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("installments", &self.installments)
            .field("order_id", &self.order_id)
            .finish_non_exhaustive()
    }
}

/// Normalized result of a charge or status query.
///
/// Build approved outcomes with [`GatewayOutcome::approved`] and everything else with
/// [`GatewayOutcome::failed`]. The remaining builders only attach context and cannot
/// change whether the outcome is a success.
///
/// # Examples
///
/// ```
/// use pos_bridge::models::GatewayOutcome;
///
/// let outcome = GatewayOutcome::failed("51", "Insufficient funds").with_order_id("ORD_1");
/// assert!(!outcome.success());
/// assert_eq!(outcome.error_code(), Some("51"));
/// assert_eq!(outcome.order_id(), Some("ORD_1"));
/// ```
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOutcome {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway_response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway_response_message: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    timestamp: DateTime<Utc>,
}

impl GatewayOutcome {
    /// Creates an approved outcome.
    pub fn approved(transaction_id: impl Into<String>) -> Self {
        Self { success: true, transaction_id: Some(transaction_id.into()), ..Self::empty() }
    }

    /// Creates a failed outcome.
    pub fn failed(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            success: false,
            transaction_id: None,
            gateway_response_code: None,
            gateway_response_message: None,
            amount: None,
            currency: None,
            order_id: None,
            auth_code: None,
            host_reference: None,
            error_code: None,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    /// Attaches the raw gateway response code and message.
    pub fn with_gateway_response(mut self, code: Option<String>, message: Option<String>) -> Self {
        self.gateway_response_code = code;
        self.gateway_response_message = message;
        self
    }

    /// Attaches the charged amount and currency.
    pub fn with_amount(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    /// Attaches the merchant order id.
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    /// Attaches the authorization code and host reference, if the gateway sent them.
    pub fn with_references(
        mut self,
        auth_code: Option<String>,
        host_reference: Option<String>,
    ) -> Self {
        self.auth_code = auth_code;
        self.host_reference = host_reference;
        self
    }

    /// Whether the gateway approved the operation.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Gateway transaction id (always present on success).
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    /// Raw response code as reported by the gateway.
    #[must_use]
    pub fn gateway_response_code(&self) -> Option<&str> {
        self.gateway_response_code.as_deref()
    }

    /// Response message from the gateway or the provider's code table.
    #[must_use]
    pub fn gateway_response_message(&self) -> Option<&str> {
        self.gateway_response_message.as_deref()
    }

    /// Charged amount in major units.
    #[must_use]
    pub const fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    /// Currency of [`amount`](Self::amount).
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Merchant order id that was sent to the gateway.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    /// Bank authorization code.
    #[must_use]
    pub fn auth_code(&self) -> Option<&str> {
        self.auth_code.as_deref()
    }

    /// Host reference (Provider B host log key).
    #[must_use]
    pub fn host_reference(&self) -> Option<&str> {
        self.host_reference.as_deref()
    }

    /// Machine-readable error code (always present on failure).
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Human-readable error message (always present on failure).
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// When the outcome was built.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Result of a liveness probe against a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PingResult {
    /// Whether the gateway answered with a success status.
    pub reachable: bool,
    /// Status line or failure reason.
    pub detail: String,
}

/// Read-only documentation payload with test card data for one provider.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplePayload {
    /// Short introduction.
    pub message: &'static str,
    /// A request body the provider's endpoint accepts.
    pub sample_request: serde_json::Value,
    /// Usage warning.
    pub note: &'static str,
}

/// Returns the documentation payload for `provider`.
///
/// These values have no production effect. Provider A uses currency `TRY`, Provider B
/// uses `TL`.
#[must_use]
pub fn sample_payload(provider: Provider) -> SamplePayload {
    match provider {
        Provider::GatewayA => SamplePayload {
            message: "These test values can be used with gateway-A",
            sample_request: serde_json::json!({
                "cardNumber": "4111111111111111",
                "expiryDate": "12/25",
                "cvv": "123",
                "amount": 100.50,
                "currency": "TRY",
                "cardHolderName": "Test User",
                "installments": "1",
                "orderId": "GATEWAY_A_TEST_ORDER_123",
                "description": "gateway-A test payment",
                "customerEmail": "test@example.com",
            }),
            note: "For gateway-A testing only. Never use real card data.",
        },
        Provider::GatewayB => SamplePayload {
            message: "These test values can be used with gateway-B",
            sample_request: serde_json::json!({
                "cardNumber": "4111111111111111",
                "expiryDate": "12/25",
                "cvv": "123",
                "amount": 100.50,
                "currency": "TL",
                "cardHolderName": "Test User",
                "installment": "00",
                "orderID": "GATEWAY_B_TEST_ORDER_123",
                "description": "gateway-B test payment",
                "customerEmail": "test@example.com",
                "extraPoint": "000000",
            }),
            note: "For gateway-B testing only. Never use real card data.",
        },
    }
}
