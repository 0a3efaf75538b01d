//! HTTP transport for name/value gateways

use super::{OutboundMessage, Transport};
use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use paygate_log::debug;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Content type for newline-joined `NAME=value` bodies.
pub const NAMEVALUE_CONTENT_TYPE: &str = "text/namevalue";

/// Idempotency header; a gateway that sees the same id twice returns the
/// original result instead of processing again.
pub const REQUEST_ID_HEADER: &str = "X-VPS-REQUEST-ID";

/// Client timeout hint header, in seconds.
pub const CLIENT_TIMEOUT_HEADER: &str = "X-VPS-CLIENT-TIMEOUT";

/// POSTs the encoded body to the endpoint URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a client with the given request timeout.
    pub fn new(timeout: Duration) -> PaymentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paygate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaymentError::TransportUnavailable(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Use an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, message: &OutboundMessage<'_>) -> PaymentResult<Vec<u8>> {
        let url = Url::parse(message.endpoint).map_err(|e| {
            PaymentError::Config(format!("invalid endpoint `{}`: {}", message.endpoint, e))
        })?;

        debug!(
            target: "paygate::transport",
            fields: [("gateway", message.gateway), ("request_id", message.request_id), ("bytes", message.body.len())],
            "POST {}",
            url
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, NAMEVALUE_CONTENT_TYPE)
            .header(REQUEST_ID_HEADER, message.request_id.simple().to_string())
            .header(CLIENT_TIMEOUT_HEADER, self.timeout.as_secs().to_string())
            .body(message.body.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::Transport(format!("gateway returned HTTP {}", status)));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
