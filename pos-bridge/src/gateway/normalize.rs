//! Response normalization shared by both providers.
//!
//! A provider only decides where its fields live and whether the response is an approval
//! (see [`GatewayProvider::extract`]). Turning those fields into a [`GatewayOutcome`] is
//! the same for both banks:
//!
//! - approved: transaction id from the gateway or `<prefix><now_millis>`, response code
//!   defaults to `00`, message from the gateway or the code table
//! - declined: error code is the response code or `UNKNOWN_ERROR`, error message from the
//!   gateway or the code table; the raw gateway code and message are kept as sent
//!
//! [`GatewayProvider::extract`]: super::GatewayProvider::extract

use rust_decimal::Decimal;

use super::GatewayProvider;
use crate::{error::Result, models::GatewayOutcome, xml::XmlValue};

/// Error code for responses without a response code.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Error code for responses that could not be interpreted.
pub const RESPONSE_PARSE_ERROR: &str = "RESPONSE_PARSE_ERROR";

const APPROVED_CODE: &str = "00";

/// Fields a provider extracts from its response, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFields {
    /// Whether the provider's approval rule matched.
    pub approved: bool,
    /// Response code.
    pub code: Option<String>,
    /// Human-readable message sent by the gateway.
    pub message: Option<String>,
    /// Gateway transaction id.
    pub transaction_id: Option<String>,
    /// Authorization code.
    pub auth_code: Option<String>,
    /// Host reference.
    pub host_reference: Option<String>,
}

/// Request-side data echoed into an outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeContext<'a> {
    /// Order id the operation was made for.
    pub order_id: Option<&'a str>,
    /// Charged amount and its currency.
    pub amount: Option<(Decimal, &'a str)>,
}

/// Builds an outcome from a parsed response.
///
/// # Errors
///
/// Returns [`BridgeError::ResponseParseError`](crate::BridgeError::ResponseParseError) if
/// the provider cannot read the response. Callers turn that into an outcome with code
/// [`RESPONSE_PARSE_ERROR`].
pub fn normalize<P: GatewayProvider + ?Sized>(
    provider: &P,
    document: &XmlValue,
    context: &OutcomeContext<'_>,
    now_millis: i64,
) -> Result<GatewayOutcome> {
    let fields = provider.extract(document)?;
    Ok(build_outcome(provider, fields, context, now_millis))
}

fn build_outcome<P: GatewayProvider + ?Sized>(
    provider: &P,
    fields: ResponseFields,
    context: &OutcomeContext<'_>,
    now_millis: i64,
) -> GatewayOutcome {
    let ResponseFields { approved, code, message, transaction_id, auth_code, host_reference } =
        fields;

    let outcome = if approved {
        let transaction_id = transaction_id
            .unwrap_or_else(|| format!("{}{now_millis}", provider.transaction_prefix()));
        let code = code.unwrap_or_else(|| APPROVED_CODE.to_owned());
        let message = message.unwrap_or_else(|| provider.describe_code(&code).into_owned());

        let outcome = GatewayOutcome::approved(transaction_id)
            .with_gateway_response(Some(code), Some(message))
            .with_references(auth_code, host_reference);
        match context.amount {
            Some((amount, currency)) => outcome.with_amount(amount, currency),
            None => outcome,
        }
    } else {
        let error_code = code.clone().unwrap_or_else(|| UNKNOWN_ERROR.to_owned());
        let error_message =
            message.clone().unwrap_or_else(|| provider.describe_code(&error_code).into_owned());

        GatewayOutcome::failed(error_code, error_message).with_gateway_response(code, message)
    };

    match context.order_id {
        Some(order_id) => outcome.with_order_id(order_id),
        None => outcome,
    }
}

/// Looks up a wrapper element such as `<response>` or `<oosResponseData>`.
///
/// An absent or empty element is `None`.
///
/// # Errors
///
/// Returns [`BridgeError::ResponseParseError`](crate::BridgeError::ResponseParseError) if
/// the element holds text or is repeated.
pub fn section<'a>(parent: &'a XmlValue, key: &str) -> Result<Option<&'a XmlValue>> {
    match parent.child(key) {
        None => Ok(None),
        Some(XmlValue::Text(text)) if text.is_empty() => Ok(None),
        Some(node @ XmlValue::Node(_)) => Ok(Some(node)),
        Some(XmlValue::Text(_) | XmlValue::List(_)) => Err(
            crate::BridgeError::ResponseParseError(format!("<{key}> is not a single element")),
        ),
    }
}

/// Outcome for a response the provider could not read.
pub fn parse_failure() -> GatewayOutcome {
    GatewayOutcome::failed(RESPONSE_PARSE_ERROR, "The payment response could not be processed")
}
