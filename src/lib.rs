// paygate - payment gateway request/response core
//
// One request/response contract over flat name/value gateway protocols:
// build, validate, dispatch once, parse, classify.

// Re-export the payment core
pub use paygate_payments::*;

// Re-export logging
pub use paygate_log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use paygate_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Classify,
        Credentials,
        FieldMap,
        Gateway,
        GatewayMode,
        Outcome,
        PaymentError,
        PaymentProcessor,
        PaymentRequest,
        PaymentResponse,
        PaymentResult,
        ProcessorConfig,
        TransactionStatus,
        TransactionType,
        Transport,
    };

    #[cfg(feature = "extension")]
    pub use crate::ExtensionGateway;
    #[cfg(feature = "keyvalue")]
    pub use crate::KeyValueGateway;
}
