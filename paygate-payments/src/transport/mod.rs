//! Transports carry encoded requests to a gateway and bring back the reply
//! bytes. The core never interprets the channel; it only hands over the
//! endpoint, the fields and their encoding.

pub mod http;
pub mod mock;
pub mod process;

pub use http::HttpTransport;
pub use mock::{MockTransport, SentMessage};
pub use process::ProcessTransport;

use crate::{config::TransportSettings, error::PaymentResult, field_map::FieldMap};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Everything a transport needs for one dispatch
#[derive(Debug, Clone, Copy)]
pub struct OutboundMessage<'a> {
    /// Gateway name, for logs
    pub gateway: &'static str,
    /// URL or `host:port`, depending on the gateway
    pub endpoint: &'a str,
    /// Request fields, for transports that pass them through natively
    pub fields: &'a FieldMap,
    /// Fields encoded in the gateway's wire format
    pub body: &'a [u8],
    /// Unique per request; usable as an idempotency key
    pub request_id: Uuid,
}

/// Channel to a gateway.
///
/// Implementations must be safe to share between concurrently dispatching
/// requests.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one request and return the raw reply.
    ///
    /// `TransportUnavailable` means the mechanism itself cannot work here;
    /// `Transport` means this call failed and a new request may be tried.
    async fn send(&self, message: &OutboundMessage<'_>) -> PaymentResult<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn send(&self, message: &OutboundMessage<'_>) -> PaymentResult<Vec<u8>> {
        (**self).send(message).await
    }
}

/// Build the transport selected in configuration.
///
/// Fails with `TransportUnavailable` when the mechanism cannot be initialized,
/// e.g. the gateway client program is not installed.
pub fn from_settings(settings: &TransportSettings) -> PaymentResult<Arc<dyn Transport>> {
    let transport: Arc<dyn Transport> = match settings {
        TransportSettings::Http { timeout_secs } => {
            Arc::new(HttpTransport::new(Duration::from_secs(*timeout_secs))?)
        }
        TransportSettings::Process {
            program,
            timeout_secs,
        } => Arc::new(ProcessTransport::new(
            program.clone(),
            Duration::from_secs(*timeout_secs),
        )?),
    };
    paygate_log::debug!(target: "paygate::transport", "Using {} transport", transport.name());
    Ok(transport)
}
