//! Extension gateway
//!
//! Fields are handed to the gateway's own client (see
//! [`ProcessTransport`](crate::transport::ProcessTransport)) as an `&`-joined
//! parmlist, and the reply comes back in the same form. Endpoints are
//! `host:port` pairs rather than URLs.

use crate::{
    classify::{Classify, ResultCodeRule},
    field_map::names,
    profile::{Gateway, GatewayProfile},
    response::PaymentResponse,
    types::{TransactionStatus, TransactionType},
    wire::WireFormat,
};

pub static PROFILE: GatewayProfile = GatewayProfile {
    name: "extension",
    operation_field: names::TRXTYPE,
    test_endpoint: "test-payflow.verisign.com:443",
    live_endpoint: "payflow.verisign.com:443",
    type_codes: &[
        (TransactionType::Pay, "S"),
        (TransactionType::Verify, "A"),
        (TransactionType::VerifiedPay, "D"),
        (TransactionType::Void, "V"),
        (TransactionType::Refund, "C"),
        (TransactionType::Normal, "S"),
        (TransactionType::Auth, "A"),
        (TransactionType::Credit, "C"),
        (TransactionType::PostAuth, "D"),
    ],
    defaults: &[(names::TENDER, "C"), (names::PARTNER, "VeriSign")],
    required: &[
        names::TRXTYPE,
        names::TENDER,
        names::PARTNER,
        names::VENDOR,
        names::USER,
        names::PWD,
    ],
    sensitive: &[names::ACCT, names::CVV2, names::PWD],
    format: WireFormat::ParmList,
};

/// Extension gateway.
///
/// `RESULT=0` is an approval. Negative results are raised by the client
/// itself when it could not reach the gateway, so they say nothing about the
/// transaction and classify as `NotChecked`.
#[derive(Debug, Clone)]
pub struct ExtensionGateway {
    rule: ResultCodeRule,
}

impl ExtensionGateway {
    pub fn new() -> Self {
        Self {
            rule: ResultCodeRule::new(names::RESULT, "0"),
        }
    }
}

impl Default for ExtensionGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Classify for ExtensionGateway {
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus {
        let client_side = response
            .field(self.rule.field())
            .and_then(|code| code.trim().parse::<i64>().ok())
            .is_some_and(|code| code < 0);

        if client_side {
            TransactionStatus::NotChecked
        } else {
            self.rule.classify(response)
        }
    }
}

impl Gateway for ExtensionGateway {
    fn profile(&self) -> &'static GatewayProfile {
        &PROFILE
    }
}
