//! Provider B: MAC-signed `<posnetRequest>` documents.
//!
//! The gateway expects the raw XML as the body of a form-encoded POST. Card data sits in
//! `<oosRequestData>` together with a [`mac`](super::mac) over the card number, amount
//! and merchant identifiers. Responses report `approved` inside
//! `<posnetResponse><oosResponseData>`.

use serde::Serialize;

use super::{
    EncodedCharge, GatewayProvider, MissingReference,
    mac::SignedFieldSet,
    minor_units,
    normalize::{OutcomeContext, ResponseFields, section},
    or_default,
    response_codes::{GATEWAY_B_CODES, ResponseCodeTable},
};
use crate::{
    config::{Environment, GatewayBConfig},
    error::Result,
    models::{PaymentRequest, Provider},
    xml::{XmlValue, to_document},
};

const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const USER_AGENT: &str = concat!("pos-bridge/", env!("CARGO_PKG_VERSION"), " (gateway-B)");
const HEADERS: &[(&str, &str)] = &[("User-Agent", USER_AGENT)];

const SENSITIVE_ELEMENTS: &[(&str, &str)] =
    &[("ccno", "****-****-****-****"), ("cvc", "***"), ("mac", "***MASKED***")];

const DEFAULT_CURRENCY: &str = "TL";
const DEFAULT_INSTALLMENT: &str = "00";
const DEFAULT_EXTRA_POINT: &str = "000000";
const ORDER_PREFIX: &str = "YK";

#[derive(Serialize)]
struct SaleRequest<'a> {
    mid: &'a str,
    tid: &'a str,
    #[serde(rename = "oosRequestData")]
    data: CardData<'a>,
}

#[derive(Serialize)]
struct CardData<'a> {
    posnetid: &'a str,
    ccno: &'a str,
    #[serde(rename = "expDate")]
    exp_date: String,
    cvc: &'a str,
    amount: &'a str,
    #[serde(rename = "currencyCode")]
    currency_code: &'a str,
    installment: &'a str,
    #[serde(rename = "extraPoint")]
    extra_point: &'a str,
    #[serde(rename = "orderID")]
    order_id: &'a str,
    mac: String,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    mid: &'a str,
    tid: &'a str,
    #[serde(rename = "tranDateRequired")]
    tran_date_required: &'static str,
    #[serde(rename = "orderStatusRequestData")]
    data: OrderStatusData<'a>,
}

#[derive(Serialize)]
struct OrderStatusData<'a> {
    #[serde(rename = "orderID")]
    order_id: &'a str,
}

/// Provider B strategy.
#[derive(Debug, Clone)]
pub struct GatewayB {
    config: GatewayBConfig,
    endpoint: String,
}

impl GatewayB {
    /// Creates the provider for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConfigError`](crate::BridgeError::ConfigError) if an
    /// identifier or the MAC key is empty, or a URL is invalid.
    pub fn new(config: GatewayBConfig, environment: Environment) -> Result<Self> {
        config.validate()?;
        let endpoint = config.gateway_url(environment).to_owned();
        Ok(Self { config, endpoint })
    }
}

impl GatewayProvider for GatewayB {
    fn provider(&self) -> Provider {
        Provider::GatewayB
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
        let amount = minor_units(request.amount)?.to_string();

        let mac = SignedFieldSet {
            posnet_id: &self.config.posnet_id,
            terminal_no: &self.config.terminal_no,
            card_number: &request.card_number,
            amount: &amount,
            currency_code: currency,
            merchant_id: &self.config.merchant_id,
            enc_key: self.config.enc_key.expose(),
        }
        .sign()?;

        let sale = SaleRequest {
            mid: &self.config.merchant_id,
            tid: &self.config.terminal_no,
            data: CardData {
                posnetid: &self.config.posnet_id,
                ccno: &request.card_number,
                exp_date: request.expiry_date.year_first(),
                cvc: &request.cvv,
                amount: &amount,
                currency_code: currency,
                installment: or_default(request.installments.as_deref(), DEFAULT_INSTALLMENT),
                extra_point: or_default(request.extra_point.as_deref(), DEFAULT_EXTRA_POINT),
                order_id,
                mac,
            },
        };

        Ok(EncodedCharge {
            body: to_document("posnetRequest", &sale)?,
            order_id: order_id.to_owned(),
            currency: currency.to_owned(),
        })
    }

    fn encode_status_query(&self, reference: &str) -> Result<String> {
        let query = StatusRequest {
            mid: &self.config.merchant_id,
            tid: &self.config.terminal_no,
            tran_date_required: "1",
            data: OrderStatusData { order_id: reference },
        };
        to_document("posnetRequest", &query)
    }

    fn missing_reference(&self) -> MissingReference {
        MissingReference { code: "INVALID_ORDER_ID", message: "An order id is required" }
    }

    fn status_context<'a>(&self, reference: &'a str) -> OutcomeContext<'a> {
        OutcomeContext { order_id: Some(reference), amount: None }
    }

    fn extract(&self, document: &XmlValue) -> Result<ResponseFields> {
        let response = section(document, "posnetResponse")?.unwrap_or(document);
        let Some(data) = section(response, "oosResponseData")? else {
            return Ok(ResponseFields::default());
        };

        let host_log_key = data.text_field("hostLogKey")?;
        Ok(ResponseFields {
            approved: data.text_field("approved")?.as_deref() == Some("1"),
            code: data.text_field("respCode")?,
            message: data.text_field("respText")?,
            transaction_id: host_log_key.clone(),
            auth_code: data.text_field("authCode")?,
            host_reference: host_log_key,
        })
    }

    fn response_codes(&self) -> ResponseCodeTable {
        GATEWAY_B_CODES
    }

    fn transaction_prefix(&self) -> &'static str {
        "YK_TXN_"
    }
}
