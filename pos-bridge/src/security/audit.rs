//! Audit logging for payment pipeline stages.
//!
//! Adapters report what they did through the [`AuditSink`] trait instead of logging
//! inline. Production code uses [`TracingAuditSink`], which writes every event on the
//! `audit` tracing target; tests inject their own sink and assert on the recorded events.
//!
//! Identifiers are masked with [`mask_reference`] and free-text errors pass through
//! [`redact_sensitive`] before they are stored on an event, so a sink never sees raw card
//! data.

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{models::Provider, security::mask::mask_reference};

/// Pipeline stages worth an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A charge was accepted for processing.
    ChargeAttempted,
    /// The provider XML document was built.
    RequestEncoded,
    /// The gateway answered with a 200 response.
    GatewayResponded,
    /// The gateway approved the charge.
    ChargeApproved,
    /// The gateway declined the charge or its reply could not be interpreted.
    ChargeDeclined,
    /// The charge failed before the gateway produced an answer.
    ChargeFailed,
    /// A status query finished (successfully or not).
    StatusQueried,
    /// A liveness probe finished.
    PingCompleted,
    /// A client was refused by the rate limiter.
    RateLimitExceeded,
}

/// Contextual fields attached to an [`AuditEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDetails {
    /// Merchant order id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Gateway transaction id, masked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Gateway response code or crate error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Rate-limit key of the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    /// Error description, redacted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Time spent in the stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// A single audit record.
///
/// # Examples
///
/// ```
/// use pos_bridge::{
///     models::Provider,
///     security::audit::{AuditEvent, AuditEventType},
/// };
/// use uuid::Uuid;
///
/// let event = AuditEvent::new(AuditEventType::ChargeDeclined, Some(Provider::GatewayA), Uuid::new_v4())
///     .with_order_id("ORD_1700000000000")
///     .with_code("51");
///
/// assert_eq!(event.details.code.as_deref(), Some("51"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub event_type: AuditEventType,
    /// Gateway involved, if any.
    pub provider: Option<Provider>,
    /// Correlation id shared by every event of one operation.
    pub request_id: Uuid,
    /// Contextual fields.
    pub details: AuditDetails,
}

impl AuditEvent {
    /// Creates an event with empty details.
    #[must_use]
    pub fn new(event_type: AuditEventType, provider: Option<Provider>, request_id: Uuid) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            provider,
            request_id,
            details: AuditDetails::default(),
        }
    }

    /// Adds the merchant order id.
    #[must_use]
    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.details.order_id = Some(order_id.into());
        self
    }

    /// Adds the gateway transaction id, masked.
    #[must_use]
    pub fn with_transaction_id(mut self, transaction_id: &str) -> Self {
        self.details.transaction_id = Some(mask_reference(transaction_id));
        self
    }

    /// Adds a gateway response code or crate error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.details.code = Some(code.into());
        self
    }

    /// Adds the caller's rate-limit key.
    #[must_use]
    pub fn with_client_key(mut self, key: impl Into<String>) -> Self {
        self.details.client_key = Some(key.into());
        self
    }

    /// Adds an error description with card data redacted.
    #[must_use]
    pub fn with_error(mut self, error: &str) -> Self {
        self.details.error = Some(redact_sensitive(error));
        self
    }

    /// Adds the stage duration.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "duration in ms fits u64 for practical values"
    )]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.details.duration_ms = Some(duration.as_millis() as u64);
        self
    }
}

/// Receiver of audit events.
///
/// Implementations must not block: sinks are called inline on the payment path.
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Records one event.
    fn record(&self, event: &AuditEvent);
}

/// Sink that writes events to `tracing` with target `audit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        audit_log(event);
    }
}

/// Logs an audit event to tracing with target `audit`.
///
/// Audit logs use a dedicated target so they can be routed to a separate file.
pub fn audit_log(event: &AuditEvent) {
    tracing::info!(
        target: "audit",
        timestamp = %event.timestamp.to_rfc3339(),
        event_type = ?event.event_type,
        provider = event.provider.map(Provider::as_str),
        request_id = %event.request_id,
        details = ?event.details,
        "AUDIT"
    );
}

const CVV_KEYWORDS: [&str; 4] = ["cvv2", "cvv", "cvc", "cid"];

/// Redacts card numbers and CVV values from free text.
///
/// - Runs of 13 to 19 digits, optionally grouped by single spaces or dashes, become
///   `XXXX-XXXX-XXXX-XXXX`.
/// - 3 or 4 digits following `cvv`, `cvv2`, `cvc` or `cid` (any case, optionally followed
///   by `:` or `=`) become `XXX`.
///
/// # Examples
///
/// ```
/// use pos_bridge::security::audit::redact_sensitive;
///
/// let msg = "declined card 4111 1111 1111 1111 with CVV: 123";
/// assert_eq!(redact_sensitive(msg), "declined card XXXX-XXXX-XXXX-XXXX with CVV: XXX");
/// ```
#[must_use]
pub fn redact_sensitive(input: &str) -> String {
    redact_cvv(&redact_card_numbers(input))
}

fn redact_card_numbers(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let starts_run = bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit());
        if !starts_run {
            i += 1;
            continue;
        }

        let mut digits = 0;
        let mut end = i;
        let mut j = i;
        while j < bytes.len() {
            if bytes[j].is_ascii_digit() {
                digits += 1;
                j += 1;
                end = j;
            } else if matches!(bytes[j], b' ' | b'-')
                && bytes.get(j + 1).is_some_and(u8::is_ascii_digit)
            {
                j += 1;
            } else {
                break;
            }
        }

        if (13..=19).contains(&digits) {
            output.push_str(&input[copied..i]);
            output.push_str("XXXX-XXXX-XXXX-XXXX");
            copied = end;
        }
        i = end;
    }

    output.push_str(&input[copied..]);
    output
}

fn redact_cvv(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let at_word_start = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let keyword = CVV_KEYWORDS.iter().find(|keyword| {
            bytes.get(i..i + keyword.len()).is_some_and(|s| s.eq_ignore_ascii_case(keyword.as_bytes()))
        });
        let Some(keyword) = keyword.filter(|_| at_word_start) else {
            i += 1;
            continue;
        };

        let mut j = i + keyword.len();
        if matches!(bytes.get(j), Some(b':' | b'=')) {
            j += 1;
        }
        while matches!(bytes.get(j), Some(b' ' | b'\t')) {
            j += 1;
        }

        let digits = bytes[j..].iter().take_while(|b| b.is_ascii_digit()).count();
        if (3..=4).contains(&digits) {
            output.push_str(&input[copied..j]);
            output.push_str("XXX");
            copied = j + digits;
        }
        i = j + digits.max(1);
    }

    if copied < input.len() {
        output.push_str(&input[copied..]);
    }
    output
}
