//! Sensitive-data masking for log output.
//!
//! Two directions are covered:
//!
//! - **Inbound** ([`mask_inbound`]): payment request bodies. Card number keeps its first 6
//!   and last 4 digits, CVV, expiry and password are replaced entirely.
//! - **Outbound** ([`mask_outbound`]): outcome bodies. Transaction id, authorization code
//!   and host reference keep a short prefix (and suffix when long enough).
//!
//! Masking works on a shallow copy of the top-level object. Nested values are not visited,
//! the input is never mutated and no function here can fail: a field that is absent, empty
//! or not a scalar is left as it is.
//!
//! [`mask_xml_elements`] does the same job for the provider XML documents, replacing the
//! text of selected elements before a request body is logged.
//!
//! # Examples
//!
//! ```
//! use pos_bridge::security::mask::mask_inbound;
//! use serde_json::json;
//!
//! let body = json!({ "cardNumber": "4111111111111111", "cvv": "123", "amount": 10 });
//! let masked = mask_inbound(&body);
//!
//! assert_eq!(masked["cardNumber"], "411111****1111");
//! assert_eq!(masked["cvv"], "***");
//! assert_eq!(masked["amount"], 10);
//! assert_eq!(body["cvv"], "123");
//! ```
//!
//! # Idempotence
//!
//! Re-masking is stable: a masked card number `411111****1111` is 14 characters, so it
//! still passes the 10-character threshold and keeps the same prefix and suffix, and the
//! outbound forms keep the prefix and suffix they were built from. Shorter card values
//! collapse to `****` on the first pass, which loses their length.

use serde_json::{Map, Value};

const CARD_NUMBER_FIELDS: [&str; 2] = ["cardNumber", "card_number"];
const EXPIRY_FIELDS: [&str; 2] = ["expiryDate", "expiry_date"];
const OUTBOUND_FIELDS: [&str; 3] = ["transactionId", "authCode", "hostReference"];

/// Masks a card number to `first6****last4`.
///
/// Values shorter than 10 characters collapse to `****`.
///
/// # Examples
///
/// ```
/// use pos_bridge::security::mask::mask_card_number;
///
/// assert_eq!(mask_card_number("4111111111111111"), "411111****1111");
/// assert_eq!(mask_card_number("411111"), "****");
/// ```
#[must_use]
pub fn mask_card_number(card_number: &str) -> String {
    let chars: Vec<char> = card_number.chars().collect();
    if chars.len() < 10 {
        return "****".to_owned();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// Masks a gateway reference (transaction id, auth code, host reference).
///
/// - more than 8 characters: `first4****last4`
/// - 5 to 8 characters: `first2****`
/// - 4 characters or fewer: unchanged
///
/// # Examples
///
/// ```
/// use pos_bridge::security::mask::mask_reference;
///
/// assert_eq!(mask_reference("TXN_1234567890"), "TXN_****7890");
/// assert_eq!(mask_reference("AB1234"), "AB****");
/// assert_eq!(mask_reference("1234"), "1234");
/// ```
#[must_use]
pub fn mask_reference(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        len if len > 8 => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[len - 4..].iter().collect();
            format!("{head}****{tail}")
        }
        len if len > 4 => {
            let head: String = chars[..2].iter().collect();
            format!("{head}****")
        }
        _ => value.to_owned(),
    }
}

/// Returns a masked shallow copy of an inbound request body.
///
/// Non-object values are returned unchanged.
#[must_use]
pub fn mask_inbound(body: &Value) -> Value {
    let Some(object) = body.as_object() else {
        return body.clone();
    };

    let mut masked = object.clone();
    for field in CARD_NUMBER_FIELDS {
        if let Some(text) = present_text(&masked, field) {
            masked.insert(field.to_owned(), Value::String(mask_card_number(&text)));
        }
    }
    replace_if_present(&mut masked, "cvv", "***");
    for field in EXPIRY_FIELDS {
        replace_if_present(&mut masked, field, "XX/XX");
    }
    replace_if_present(&mut masked, "password", "***");

    Value::Object(masked)
}

/// Returns a masked shallow copy of an outbound outcome body.
///
/// Non-object values are returned unchanged.
#[must_use]
pub fn mask_outbound(body: &Value) -> Value {
    let Some(object) = body.as_object() else {
        return body.clone();
    };

    let mut masked = object.clone();
    for field in OUTBOUND_FIELDS {
        if let Some(text) = present_text(&masked, field) {
            masked.insert(field.to_owned(), Value::String(mask_reference(&text)));
        }
    }

    Value::Object(masked)
}

/// Replaces the text content of each listed element in an XML document.
///
/// Every occurrence of `<tag>...</tag>` is rewritten to `<tag>replacement</tag>`. Elements
/// with attributes or self-closing forms are left alone; provider documents never use them
/// for secret values.
///
/// # Examples
///
/// ```
/// use pos_bridge::security::mask::mask_xml_elements;
///
/// let xml = "<request><cvv>123</cvv><amount>100</amount></request>";
/// assert_eq!(
///     mask_xml_elements(xml, &[("cvv", "***")]),
///     "<request><cvv>***</cvv><amount>100</amount></request>"
/// );
/// ```
#[must_use]
pub fn mask_xml_elements(xml: &str, elements: &[(&str, &str)]) -> String {
    let mut output = xml.to_owned();
    for (tag, replacement) in elements {
        output = mask_xml_element(&output, tag, replacement);
    }
    output
}

fn mask_xml_element(xml: &str, tag: &str, replacement: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let mut output = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let content_start = start + open.len();
        let Some(content_len) = rest[content_start..].find(&close) else {
            break;
        };
        output.push_str(&rest[..content_start]);
        output.push_str(replacement);
        output.push_str(&close);
        rest = &rest[content_start + content_len + close.len()..];
    }
    output.push_str(rest);
    output
}

/// Field text when the field holds a non-empty scalar.
fn present_text(object: &Map<String, Value>, field: &str) -> Option<String> {
    match object.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn replace_if_present(object: &mut Map<String, Value>, field: &str, replacement: &str) {
    let present = match object.get(field) {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    };
    if present {
        object.insert(field.to_owned(), Value::String(replacement.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_mask_card_number_thresholds() {
        assert_eq!(mask_card_number("4111111111111111"), "411111****1111");
        assert_eq!(mask_card_number("4111111111"), "411111****1111");
        assert_eq!(mask_card_number("123456789"), "****");
        assert_eq!(mask_card_number(""), "****");
    }

    #[test]
    fn test_mask_card_number_ten_chars() {
        assert_eq!(mask_card_number("1234567890"), "123456****7890");
    }

    #[test]
    fn test_mask_card_number_is_stable_when_reapplied() {
        let once = mask_card_number("4111111111111111");
        assert_eq!(mask_card_number(&once), once);
    }

    #[test]
    fn test_mask_reference_thresholds() {
        assert_eq!(mask_reference("123456789"), "1234****6789");
        assert_eq!(mask_reference("12345678"), "12****");
        assert_eq!(mask_reference("12345"), "12****");
        assert_eq!(mask_reference("1234"), "1234");
        assert_eq!(mask_reference(""), "");
    }

    #[test]
    fn test_mask_inbound_all_fields() {
        let body = json!({
            "cardNumber": "4111111111111111",
            "card_number": "5555444433331111",
            "cvv": "123",
            "expiryDate": "12/25",
            "expiry_date": "12/25",
            "password": "secret",
            "cardHolderName": "Test User"
        });

        let masked = mask_inbound(&body);
        assert_eq!(masked["cardNumber"], "411111****1111");
        assert_eq!(masked["card_number"], "555544****1111");
        assert_eq!(masked["cvv"], "***");
        assert_eq!(masked["expiryDate"], "XX/XX");
        assert_eq!(masked["expiry_date"], "XX/XX");
        assert_eq!(masked["password"], "***");
        assert_eq!(masked["cardHolderName"], "Test User");
    }

    #[test]
    fn test_mask_inbound_does_not_mutate_input() {
        let body = json!({ "cvv": "123" });
        let _ = mask_inbound(&body);
        assert_eq!(body["cvv"], "123");
    }

    #[test]
    fn test_mask_inbound_leaves_absent_and_empty_fields() {
        let body = json!({ "cvv": "", "password": null, "amount": 5 });
        let masked = mask_inbound(&body);
        assert_eq!(masked, body);
    }

    #[test]
    fn test_mask_inbound_numeric_card_number() {
        let body = json!({ "cardNumber": 4_111_111_111_111_111_u64 });
        assert_eq!(mask_inbound(&body)["cardNumber"], "411111****1111");
    }

    #[test]
    fn test_mask_inbound_is_shallow() {
        let body = json!({ "payment": { "cvv": "123" } });
        assert_eq!(mask_inbound(&body)["payment"]["cvv"], "123");
    }

    #[test]
    fn test_mask_non_object_passthrough() {
        assert_eq!(mask_inbound(&json!("text")), json!("text"));
        assert_eq!(mask_outbound(&Value::Null), Value::Null);
    }

    #[test]
    fn test_mask_outbound_fields() {
        let body = json!({
            "success": true,
            "transactionId": "TXN_1700000000000",
            "authCode": "A12345",
            "hostReference": "HL1",
            "orderId": "ORD_1700000000000"
        });

        let masked = mask_outbound(&body);
        assert_eq!(masked["transactionId"], "TXN_****0000");
        assert_eq!(masked["authCode"], "A1****");
        assert_eq!(masked["hostReference"], "HL1");
        assert_eq!(masked["orderId"], "ORD_1700000000000");
    }

    #[test]
    fn test_mask_xml_elements_replaces_every_occurrence() {
        let xml = "<a><ccno>4111</ccno><b><ccno>5555</ccno></b><cvc>1</cvc></a>";
        let masked = mask_xml_elements(xml, &[("ccno", "****"), ("cvc", "***")]);
        assert_eq!(masked, "<a><ccno>****</ccno><b><ccno>****</ccno></b><cvc>***</cvc></a>");
    }

    #[test]
    fn test_mask_xml_elements_unclosed_tag_left_alone() {
        let xml = "<a><cvv>123</a>";
        assert_eq!(mask_xml_elements(xml, &[("cvv", "***")]), xml);
    }

    #[test]
    fn test_mask_xml_elements_does_not_touch_prefixed_tags() {
        let xml = "<cvv2>1</cvv2><cvv>2</cvv>";
        assert_eq!(mask_xml_elements(xml, &[("cvv", "***")]), "<cvv2>1</cvv2><cvv>***</cvv>");
    }
}
