//! Error types for payment gateway operations

use crate::types::TransactionType;
use thiserror::Error;

/// Payment gateway error types
#[derive(Error, Debug)]
pub enum PaymentError {
    /// The gateway has no operation code for the requested transaction type
    #[error("Gateway `{gateway}` does not support {transaction_type} transactions")]
    UnsupportedTransactionType {
        gateway: &'static str,
        transaction_type: TransactionType,
    },

    /// A required field is absent or empty at validation time
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// A field name or value cannot be framed by the gateway's wire format
    #[error("Field {0} contains characters the gateway format cannot carry")]
    InvalidField(String),

    /// `set_field` or `dispatch` called on a request that was already dispatched
    #[error("Request has already been dispatched")]
    AlreadyDispatched,

    /// `set_field` or `dispatch` called on a request that failed validation in `dispatch`
    #[error("Request was rejected by validation; build a new request")]
    RequestRejected,

    /// The gateway mechanism cannot be used in this environment
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// Network or process failure during an otherwise valid call
    #[error("Transport error: {0}")]
    Transport(String),

    /// The reply does not follow the gateway's flat field format
    #[error("Malformed response at line {line}")]
    MalformedResponse { line: usize },

    /// Invalid endpoint or settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Stable snake_case name for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedTransactionType { .. } => "unsupported_transaction_type",
            Self::MissingRequiredField(_) => "missing_required_field",
            Self::InvalidField(_) => "invalid_field",
            Self::AlreadyDispatched => "already_dispatched",
            Self::RequestRejected => "request_rejected",
            Self::TransportUnavailable(_) => "transport_unavailable",
            Self::Transport(_) => "transport_error",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Config(_) => "config",
        }
    }

    /// Only transport failures during a valid call may be retried, and only
    /// with a new request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Message safe to show to a shopper.
    pub fn user_message(&self) -> &'static str {
        "Your payment could not be processed. Please try again or use a different payment method."
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            PaymentError::Config(err.to_string())
        } else {
            PaymentError::Transport(err.to_string())
        }
    }
}

impl From<paygate_config::ConfigError> for PaymentError {
    fn from(err: paygate_config::ConfigError) -> Self {
        PaymentError::Config(err.to_string())
    }
}

/// Result type for payment gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;
