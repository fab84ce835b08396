//! Gateway providers and the payment pipeline.
//!
//! Both banks are driven by the same [`PaymentAdapter`] pipeline:
//!
//! ```text
//! PaymentRequest -> encode_charge -> Transport::post -> parse_document -> normalize -> GatewayOutcome
//! ```
//!
//! Everything that differs between the banks lives behind [`GatewayProvider`]: the XML
//! schema, the optional MAC, the HTTP headers, where the response fields sit and what
//! counts as an approval, and the response-code table.
//!
//! | | Provider A ([`GatewayA`]) | Provider B ([`GatewayB`]) |
//! |---|---|---|
//! | Root element | `<request>` | `<posnetRequest>` |
//! | Content type | `text/xml; charset=utf-8` | `application/x-www-form-urlencoded` |
//! | Expiry layout | `MMYY` | `YYMM` |
//! | Signing | none | SHA-1 [`mac`] |
//! | Approval | `response_code == "00"` | `approved == "1"` |
//! | Default currency | `TRY` | `TL` |
//! | Status query key | transaction id | order id |

use std::{borrow::Cow, fmt};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{
    error::{BridgeError, Result},
    models::{PaymentRequest, Provider},
    xml::XmlValue,
};

pub mod adapter;
pub mod gateway_a;
pub mod gateway_b;
pub mod mac;
pub mod normalize;
pub mod response_codes;

pub use adapter::PaymentAdapter;
pub use gateway_a::GatewayA;
pub use gateway_b::GatewayB;
pub use normalize::{OutcomeContext, ResponseFields};
pub use response_codes::ResponseCodeTable;

/// A charge serialized for the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCharge {
    /// Complete XML document.
    pub body: String,
    /// Order id sent to the gateway, supplied or generated.
    pub order_id: String,
    /// Currency sent to the gateway, supplied or defaulted.
    pub currency: String,
}

impl fmt::Debug for EncodedCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedCharge")
            .field("body_len", &self.body.len())
            .field("order_id", &self.order_id)
            .field("currency", &self.currency)
            .finish()
    }
}

/// Error outcome reported when a status query is missing its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingReference {
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: &'static str,
}

/// Per-bank behavior plugged into [`PaymentAdapter`].
///
/// Implementations are pure: they never perform I/O and never log. The adapter owns
/// transport, timing and audit.
pub trait GatewayProvider: Send + Sync + fmt::Debug {
    /// Which bank this is.
    fn provider(&self) -> Provider;

    /// Endpoint for charges, status queries and pings.
    fn endpoint(&self) -> &str;

    /// `Content-Type` of every POST.
    fn content_type(&self) -> &'static str;

    /// Extra headers sent with every POST.
    fn headers(&self) -> &'static [(&'static str, &'static str)];

    /// Elements whose text is replaced before the XML is logged, with their replacement.
    fn sensitive_elements(&self) -> &'static [(&'static str, &'static str)];

    /// Serializes a charge.
    ///
    /// `now_millis` seeds the generated order id when the request carries none.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EncodingError`] if the request cannot be represented, for
    /// example a negative amount or an empty MAC field.
    fn encode_charge(&self, request: &PaymentRequest, now_millis: i64) -> Result<EncodedCharge>;

    /// Serializes a status query for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::EncodingError`] if serialization fails.
    fn encode_status_query(&self, reference: &str) -> Result<String>;

    /// Outcome to report for a status query without a reference.
    fn missing_reference(&self) -> MissingReference;

    /// Context a status query outcome is built with.
    fn status_context<'a>(&self, reference: &'a str) -> OutcomeContext<'a>;

    /// Pulls the normalized fields out of a parsed response.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ResponseParseError`] if the response has an unexpected shape.
    fn extract(&self, document: &XmlValue) -> Result<ResponseFields>;

    /// Code-to-message table.
    fn response_codes(&self) -> ResponseCodeTable;

    /// Prefix of the transaction id generated for approvals without one.
    fn transaction_prefix(&self) -> &'static str;

    /// Message for a response code, falling back to `"Unknown error code: <code>"`.
    fn describe_code(&self, code: &str) -> Cow<'static, str> {
        self.response_codes().describe(code)
    }
}

/// Converts an amount in major units to integer minor units.
///
/// Rounds half away from zero, so `100.505` becomes `10051`.
///
/// # Errors
///
/// Returns [`BridgeError::EncodingError`] for negative amounts or amounts that do not fit
/// in an `i64`.
///
/// # Examples
///
/// ```
/// use pos_bridge::gateway::minor_units;
/// use rust_decimal::Decimal;
///
/// assert_eq!(minor_units(Decimal::new(10050, 2))?, 10050);
/// assert_eq!(minor_units(Decimal::new(1, 3))?, 0);
/// assert!(minor_units(Decimal::new(-1, 0)).is_err());
/// # Ok::<(), pos_bridge::BridgeError>(())
/// ```
pub fn minor_units(amount: Decimal) -> Result<i64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BridgeError::EncodingError("amount must not be negative".to_owned()));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| BridgeError::EncodingError(format!("amount {amount} is out of range")))
}

/// Uses `value` unless it is absent or empty.
pub(crate) fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}
