//! Key=value HTTP gateway
//!
//! Requests are `NAME=value` lines POSTed to an HTTPS endpoint; replies are
//! CRLF-delimited `NAME=value` lines.

use crate::{
    classify::{Classify, ResultCodeRule},
    field_map::names,
    profile::{Gateway, GatewayProfile},
    response::PaymentResponse,
    types::{TransactionStatus, TransactionType},
    wire::WireFormat,
};

pub static PROFILE: GatewayProfile = GatewayProfile {
    name: "keyvalue",
    operation_field: names::TRXTYPE,
    test_endpoint: "https://pilot-payflowpro.paypal.com",
    live_endpoint: "https://payflowpro.paypal.com",
    type_codes: &[
        (TransactionType::Pay, "PAYMENT"),
        (TransactionType::Verify, "AUTHENTICATE"),
        (TransactionType::VerifiedPay, "AUTHORISE"),
        (TransactionType::Hold, "DEFERRED"),
        (TransactionType::Release, "RELEASE"),
        (TransactionType::Abort, "ABORT"),
        (TransactionType::Void, "VOID"),
        (TransactionType::Refund, "REFUND"),
    ],
    defaults: &[(names::TENDER, "C"), (names::VERBOSITY, "MEDIUM")],
    required: &[names::TRXTYPE, names::TENDER, names::AMT, names::ACCT],
    sensitive: &[names::ACCT, names::CVV2, names::PWD],
    format: WireFormat::Lines,
};

/// Key=value gateway: `RESULT=0` is an approval.
#[derive(Debug, Clone)]
pub struct KeyValueGateway {
    rule: ResultCodeRule,
}

impl KeyValueGateway {
    pub fn new() -> Self {
        Self {
            rule: ResultCodeRule::new(names::RESULT, "0"),
        }
    }
}

impl Default for KeyValueGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for KeyValueGateway {
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus {
        self.rule.classify(response)
    }
}

impl Gateway for KeyValueGateway {
    fn profile(&self) -> &'static GatewayProfile {
        &PROFILE
    }
}
