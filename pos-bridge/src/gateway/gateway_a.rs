//! Provider A: plain XML over `text/xml`.
//!
//! Charges are posted as a flat `<request>` document authenticated by merchant id and
//! password. Responses carry their fields either inside a `<response>` wrapper or at the
//! root, spelled in snake case or camel case.

use serde::Serialize;

use super::{
    EncodedCharge, GatewayProvider, MissingReference, minor_units,
    normalize::{OutcomeContext, ResponseFields, section},
    or_default,
    response_codes::{GATEWAY_A_CODES, ResponseCodeTable},
};
use crate::{
    config::{Environment, GatewayAConfig},
    error::Result,
    models::{PaymentRequest, Provider},
    xml::{XmlValue, to_document},
};

const CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const USER_AGENT: &str = concat!("pos-bridge/", env!("CARGO_PKG_VERSION"), " (gateway-A)");
const HEADERS: &[(&str, &str)] = &[("SOAPAction", ""), ("User-Agent", USER_AGENT)];

const SENSITIVE_ELEMENTS: &[(&str, &str)] =
    &[("card_number", "****-****-****-****"), ("cvv", "***"), ("password", "***")];

const DEFAULT_CURRENCY: &str = "TRY";
const DEFAULT_INSTALLMENTS: &str = "1";
const ORDER_PREFIX: &str = "ORD_";

#[derive(Serialize)]
struct SaleRequest<'a> {
    merchant_id: &'a str,
    password: &'a str,
    terminal_id: &'a str,
    transaction_type: &'static str,
    order_id: &'a str,
    amount: i64,
    currency: &'a str,
    installments: &'a str,
    card_number: &'a str,
    expiry_date: String,
    cvv: &'a str,
    card_holder_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_ip: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<&'a str>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    merchant_id: &'a str,
    password: &'a str,
    terminal_id: &'a str,
    transaction_type: &'static str,
    transaction_id: &'a str,
}

/// Provider A strategy.
#[derive(Debug, Clone)]
pub struct GatewayA {
    config: GatewayAConfig,
    endpoint: String,
}

impl GatewayA {
    /// Creates the provider for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`](crate::BridgeError::ConfigError) if a credential
    /// is empty or a URL is invalid.
    pub fn new(config: GatewayAConfig, environment: Environment) -> Result<Self> {
        config.validate()?;
        let endpoint = config.gateway_url(environment).to_owned();
        Ok(Self { config, endpoint })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl GatewayProvider for GatewayA {
    fn provider(&self) -> Provider {
        Provider::GatewayA
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn headers(&self) -> &'static [(&'static str, &'static str)] {
        HEADERS
    }

    fn sensitive_elements(&self) -> &'static [(&'static str, &'static str)] {
        SENSITIVE_ELEMENTS
    }

    fn encode_charge(&self, request: &PaymentRequest, now_millis: i64) -> Result<EncodedCharge> {
        let generated_order_id = format!("{ORDER_PREFIX}{now_millis}");
        let order_id = or_default(request.order_id.as_deref(), &generated_order_id);
        let currency = or_default(request.currency.as_deref(), DEFAULT_CURRENCY);

        let sale = SaleRequest {
            merchant_id: &self.config.merchant_id,
            password: self.config.password.expose(),
            terminal_id: &self.config.terminal_id,
            transaction_type: "sale",
            order_id,
            amount: minor_units(request.amount)?,
            currency,
            installments: or_default(request.installments.as_deref(), DEFAULT_INSTALLMENTS),
            card_number: &request.card_number,
            expiry_date: request.expiry_date.month_first(),
            cvv: &request.cvv,
            card_holder_name: &request.card_holder_name,
            description: present(request.description.as_deref()),
            customer_ip: present(request.customer_ip.as_deref()),
            customer_email: present(request.customer_email.as_deref()),
        };

        Ok(EncodedCharge {
            body: to_document("request", &sale)?,
            order_id: order_id.to_owned(),
            currency: currency.to_owned(),
        })
    }

    fn encode_status_query(&self, reference: &str) -> Result<String> {
        let query = QueryRequest {
            merchant_id: &self.config.merchant_id,
            password: self.config.password.expose(),
            terminal_id: &self.config.terminal_id,
            transaction_type: "query",
            transaction_id: reference,
        };
        to_document("request", &query)
    }

    fn missing_reference(&self) -> MissingReference {
        MissingReference { code: "INVALID_TRANSACTION_ID", message: "A transaction id is required" }
    }

    fn status_context<'a>(&self, _reference: &'a str) -> OutcomeContext<'a> {
        OutcomeContext::default()
    }

    fn extract(&self, document: &XmlValue) -> Result<ResponseFields> {
        let response = section(document, "response")?.unwrap_or(document);
        let field = |snake: &str, camel: &str| response.first_text_field(&[snake, camel]);

        let code = field("response_code", "responseCode")?;
        Ok(ResponseFields {
            approved: code.as_deref() == Some("00"),
            code,
            message: field("response_message", "responseMessage")?,
            transaction_id: field("transaction_id", "transactionId")?,
            auth_code: field("auth_code", "authCode")?,
            host_reference: field("host_reference", "hostReference")?,
        })
    }

    fn response_codes(&self) -> ResponseCodeTable {
        GATEWAY_A_CODES
    }

    fn transaction_prefix(&self) -> &'static str {
        "TXN_"
    }
}
