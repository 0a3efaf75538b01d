//! Per-gateway static configuration and the gateway capability trait

use crate::{
    classify::Classify,
    error::{PaymentError, PaymentResult},
    field_map::FieldMap,
    response::PaymentResponse,
    types::{GatewayMode, TransactionType},
    wire::WireFormat,
};

/// Static description of a gateway's protocol
#[derive(Debug)]
pub struct GatewayProfile {
    /// Short gateway name used in logs and errors
    pub name: &'static str,
    /// Field carrying the operation code
    pub operation_field: &'static str,
    /// Endpoint used in test mode
    pub test_endpoint: &'static str,
    /// Endpoint used in live mode
    pub live_endpoint: &'static str,
    /// Operation code per supported transaction type
    pub type_codes: &'static [(TransactionType, &'static str)],
    /// Fields seeded into every request
    pub defaults: &'static [(&'static str, &'static str)],
    /// Fields that must be present and non-empty at dispatch, in reporting order
    pub required: &'static [&'static str],
    /// Fields masked in logs
    pub sensitive: &'static [&'static str],
    /// Request and reply encoding
    pub format: WireFormat,
}

impl GatewayProfile {
    /// The gateway's operation code for `transaction_type`.
    pub fn type_code(&self, transaction_type: TransactionType) -> PaymentResult<&'static str> {
        self.type_codes
            .iter()
            .find(|(ty, _)| *ty == transaction_type)
            .map(|(_, code)| *code)
            .ok_or(PaymentError::UnsupportedTransactionType {
                gateway: self.name,
                transaction_type,
            })
    }

    pub fn supports(&self, transaction_type: TransactionType) -> bool {
        self.type_codes.iter().any(|(ty, _)| *ty == transaction_type)
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        self.required
    }

    pub fn default_fields(&self) -> FieldMap {
        self.defaults.iter().copied().collect()
    }

    pub fn endpoint(&self, mode: GatewayMode) -> &'static str {
        match mode {
            GatewayMode::Test => self.test_endpoint,
            GatewayMode::Live => self.live_endpoint,
        }
    }

    pub fn is_sensitive(&self, field: &str) -> bool {
        self.sensitive.contains(&field)
    }
}

/// A payment gateway: its static profile plus its reply classification.
///
/// Implementors are small stateless values; everything protocol-specific is
/// in the profile table.
pub trait Gateway: Classify + Clone + Send + Sync + 'static {
    fn profile(&self) -> &'static GatewayProfile;

    fn name(&self) -> &'static str {
        self.profile().name
    }

    /// Serialize request fields for the transport.
    fn encode(&self, fields: &FieldMap) -> Vec<u8> {
        self.profile().format.encode(fields).into_bytes()
    }

    /// Parse reply bytes in the gateway's wire format.
    fn parse_reply(&self, raw: &[u8]) -> PaymentResult<PaymentResponse> {
        PaymentResponse::parse_with(self.profile().format, raw)
    }
}
