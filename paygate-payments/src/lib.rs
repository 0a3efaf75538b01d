//! Payment gateway request/response core
//!
//! Normalizes flat name/value gateway protocols behind one contract:
//! build a request for a [`TransactionType`], validate it, dispatch it once
//! through a [`Transport`], parse the reply into a [`PaymentResponse`] and
//! classify it as a [`TransactionStatus`].
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PaymentProcessor                         │
//! │   request(type) ─► PaymentRequest ─► submit() ─► Outcome      │
//! │                            │                                  │
//! │        ┌───────────────────┴───────────────────┐              │
//! │        ▼                                       ▼              │
//! │  ┌─────────────┐  NAME=value\n  ┌───────────────────────┐     │
//! │  │  keyvalue   │ ─────────────► │  HttpTransport        │     │
//! │  └─────────────┘                └───────────────────────┘     │
//! │  ┌─────────────┐  NAME=value&   ┌───────────────────────┐     │
//! │  │  extension  │ ─────────────► │  ProcessTransport     │     │
//! │  └─────────────┘                └───────────────────────┘     │
//! │                                                               │
//! │  reply ─► PaymentResponse ─► Classify ─► TransactionStatus    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paygate_payments::{KeyValueGateway, PaymentProcessor, ProcessorConfig, TransactionType};
//!
//! let processor = PaymentProcessor::from_config(KeyValueGateway::new(), ProcessorConfig::from_env()?)?;
//!
//! let mut request = processor.request(TransactionType::Pay)?;
//! request.set_amount(rust_decimal::Decimal::new(1999, 2))?;
//! request.set_field("ACCT", card_number)?;
//! request.set_field("EXPDATE", "1230")?;
//!
//! let outcome = processor.submit(&mut request).await?;
//! if outcome.status.is_passed() {
//!     println!("approved: {:?}", outcome.response.field("PNREF"));
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod field_map;
pub mod gateways;
pub mod profile;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;
pub mod wire;

pub use classify::{Classify, ResultCodeRule};
pub use config::{Credentials, ProcessorConfig, TransportSettings};
pub use error::{PaymentError, PaymentResult};
pub use field_map::FieldMap;
pub use profile::{Gateway, GatewayProfile};
pub use request::{DispatchState, PaymentRequest};
pub use response::PaymentResponse;
pub use transport::{HttpTransport, MockTransport, OutboundMessage, ProcessTransport, Transport};
pub use types::{GatewayMode, TransactionStatus, TransactionType};
pub use wire::WireFormat;

#[cfg(feature = "extension")]
pub use gateways::ExtensionGateway;
#[cfg(feature = "keyvalue")]
pub use gateways::KeyValueGateway;

use chrono::{DateTime, Utc};
use paygate_log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a submitted request
#[derive(Debug, Clone)]
pub struct Outcome {
    pub request_id: Uuid,
    pub transaction_type: TransactionType,
    pub response: PaymentResponse,
    pub status: TransactionStatus,
    pub received_at: DateTime<Utc>,
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        self.status.is_passed()
    }
}

/// Main payment processor
pub struct PaymentProcessor<G: Gateway> {
    gateway: G,
    transport: Arc<dyn Transport>,
    config: Arc<ProcessorConfig>,
}

impl<G: Gateway> PaymentProcessor<G> {
    /// Create a processor with default configuration
    pub fn new(gateway: G, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(gateway, transport, ProcessorConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(gateway: G, transport: Arc<dyn Transport>, config: ProcessorConfig) -> Self {
        Self {
            gateway,
            transport,
            config: Arc::new(config),
        }
    }

    /// Create with the transport selected in `config`
    pub fn from_config(gateway: G, config: ProcessorConfig) -> PaymentResult<Self> {
        let transport = transport::from_settings(&config.transport)?;
        Ok(Self::with_config(gateway, transport, config))
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Start a request in the configured mode, with the configured endpoint
    /// override and credentials applied.
    pub fn request(&self, transaction_type: TransactionType) -> PaymentResult<PaymentRequest<G>> {
        let mut request = PaymentRequest::new(self.gateway.clone(), transaction_type, self.config.mode)?;

        if let Some(endpoint) = &self.config.endpoint {
            request = request.with_endpoint(endpoint.clone())?;
        }
        if let Some(credentials) = &self.config.credentials {
            request = request.with_credentials(credentials)?;
        }

        Ok(request)
    }

    /// Dispatch `request`, parse the reply and classify it.
    pub async fn submit(&self, request: &mut PaymentRequest<G>) -> PaymentResult<Outcome> {
        let raw = match request.dispatch(self.transport.as_ref()).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    target: "paygate::processor",
                    fields: [("kind", e.kind()), ("request_id", request.request_id())],
                    "{} request failed: {}",
                    request.transaction_type(),
                    e
                );
                return Err(e);
            }
        };

        let response = match self.gateway.parse_reply(&raw) {
            Ok(response) => response,
            Err(e) => {
                error!(
                    target: "paygate::processor",
                    fields: [("kind", e.kind()), ("request_id", request.request_id())],
                    "{}; reply was: {}",
                    e,
                    String::from_utf8_lossy(&raw).escape_debug()
                );
                return Err(e);
            }
        };

        let status = self.gateway.classify(&response);

        if self.config.log_transactions {
            let reference = response.field(field_map::names::PNREF).unwrap_or("-");
            if status.is_passed() {
                info!(
                    target: "paygate::processor",
                    fields: [("request_id", request.request_id()), ("status", status), ("pnref", reference)],
                    "{} {} via {}",
                    request.transaction_type(),
                    status,
                    self.gateway.name()
                );
            } else {
                warn!(
                    target: "paygate::processor",
                    fields: [
                        ("request_id", request.request_id()),
                        ("status", status),
                        ("pnref", reference),
                        ("respmsg", response.field(field_map::names::RESPMSG).unwrap_or("-"))
                    ],
                    "{} {} via {}",
                    request.transaction_type(),
                    status,
                    self.gateway.name()
                );
            }
        }

        Ok(Outcome {
            request_id: request.request_id(),
            transaction_type: request.transaction_type(),
            response,
            status,
            received_at: Utc::now(),
        })
    }
}

impl<G: Gateway> Clone for PaymentProcessor<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}
