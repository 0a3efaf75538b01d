//! Scripted in-memory transport for tests

use super::{OutboundMessage, Transport};
use crate::{
    error::{PaymentError, PaymentResult},
    field_map::FieldMap,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Scripted {
    Reply(Vec<u8>),
    Unavailable(String),
    Failure(String),
}

/// A message captured by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub gateway: &'static str,
    pub endpoint: String,
    pub fields: FieldMap,
    pub body: Vec<u8>,
    pub request_id: Uuid,
}

impl SentMessage {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Returns scripted outcomes in order and records every message.
///
/// Clones share the script and the record.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_reply(self, raw: impl AsRef<[u8]>) -> Self {
        lock(&self.script).push_back(Scripted::Reply(raw.as_ref().to_vec()));
        self
    }

    /// Queue a `Transport` failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        lock(&self.script).push_back(Scripted::Failure(message.into()));
        self
    }

    /// Queue a `TransportUnavailable` failure.
    pub fn with_unavailable(self, message: impl Into<String>) -> Self {
        lock(&self.script).push_back(Scripted::Unavailable(message.into()));
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.sent).len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, message: &OutboundMessage<'_>) -> PaymentResult<Vec<u8>> {
        lock(&self.sent).push(SentMessage {
            gateway: message.gateway,
            endpoint: message.endpoint.to_string(),
            fields: message.fields.clone(),
            body: message.body.to_vec(),
            request_id: message.request_id,
        });

        let next = lock(&self.script).pop_front();
        match next {
            Some(Scripted::Reply(raw)) => Ok(raw),
            Some(Scripted::Unavailable(msg)) => Err(PaymentError::TransportUnavailable(msg)),
            Some(Scripted::Failure(msg)) => Err(PaymentError::Transport(msg)),
            None => Err(PaymentError::Transport("mock transport has no scripted reply".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_order_then_exhaustion() {
        let transport = MockTransport::new().with_reply("RESULT=0").with_unavailable("offline");
        let fields = FieldMap::new();
        let message = OutboundMessage {
            gateway: "mock",
            endpoint: "https://gateway.invalid",
            fields: &fields,
            body: b"TRXTYPE=S",
            request_id: Uuid::new_v4(),
        };

        assert_eq!(tokio_test::block_on(transport.send(&message)).unwrap(), b"RESULT=0".to_vec());
        assert!(matches!(
            tokio_test::block_on(transport.send(&message)),
            Err(PaymentError::TransportUnavailable(_))
        ));
        assert!(matches!(
            tokio_test::block_on(transport.send(&message)),
            Err(PaymentError::Transport(_))
        ));

        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.sent()[0].body_text(), "TRXTYPE=S");
    }

    #[test]
    fn test_clones_share_record() {
        let transport = MockTransport::new().with_reply("RESULT=0");
        let observer = transport.clone();
        let fields = FieldMap::new();
        let message = OutboundMessage {
            gateway: "mock",
            endpoint: "https://gateway.invalid",
            fields: &fields,
            body: b"",
            request_id: Uuid::new_v4(),
        };

        tokio_test::block_on(transport.send(&message)).unwrap();
        assert_eq!(observer.call_count(), 1);
    }
}
