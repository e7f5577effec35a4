//! The transport seam.
//!
//! A transport delivers one message at a time and owes the caller
//! nothing about ordering; `OrderedPublisher` sequences per key before
//! handing messages over. Concrete network transports live in the
//! binary. `MemoryTransport` is the in-process one used by tests.

use crate::types::MessageId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Rejected by service (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Transport is shut down")]
    Closed,

    #[error("Publish task aborted: {0}")]
    Aborted(String),

    #[error("Injected failure on attempt {attempt}")]
    Injected { attempt: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub ordering_key: String,
    pub data:         String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit one message. Resolves once the service accepts or refuses it.
    async fn publish(&self, message: OutboundMessage) -> Result<MessageId, TransportError>;

    /// Release connections. Called once, after the in-flight set drains.
    async fn shutdown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    pub message_id:   MessageId,
    pub ordering_key: String,
    pub data:         String,
}

/// Records accepted messages in arrival order.
///
/// Latency is taken round-robin from `latencies` per attempt, so tests
/// can make an early message slower than a later one. With
/// `fail_every = Some(k)` every k-th attempt is refused.
#[derive(Default)]
pub struct MemoryTransport {
    delivered: Mutex<Vec<DeliveredMessage>>,
    attempts:  AtomicUsize,
    closed:    AtomicBool,
    latencies: Vec<Duration>,
    fail_every: Option<usize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latencies(mut self, latencies: Vec<Duration>) -> Self {
        self.latencies = latencies;
        self
    }

    pub fn failing_every(mut self, k: usize) -> Self {
        assert!(k > 0, "k must be > 0");
        self.fail_every = Some(k);
        self
    }

    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.delivered.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Payloads accepted for one ordering key, in arrival order.
    pub fn delivered_for(&self, key: &str) -> Vec<String> {
        self.delivered()
            .into_iter()
            .filter(|m| m.ordering_key == key)
            .map(|m| m.data)
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn publish(&self, message: OutboundMessage) -> Result<MessageId, TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.latencies.is_empty() {
            tokio::time::sleep(self.latencies[attempt % self.latencies.len()]).await;
        }
        if let Some(k) = self.fail_every {
            if (attempt + 1) % k == 0 {
                return Err(TransportError::Injected { attempt });
            }
        }
        let message_id = Uuid::new_v4().to_string();
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DeliveredMessage {
                message_id: message_id.clone(),
                ordering_key: message.ordering_key,
                data: message.data,
            });
        Ok(message_id)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(key: &str, data: &str) -> OutboundMessage {
        OutboundMessage { ordering_key: key.into(), data: data.into() }
    }

    #[tokio::test]
    async fn records_in_arrival_order() {
        let transport = MemoryTransport::new();
        transport.publish(msg("a", "1")).await.unwrap();
        transport.publish(msg("b", "2")).await.unwrap();
        transport.publish(msg("a", "3")).await.unwrap();
        assert_eq!(transport.delivered_for("a"), ["1", "3"]);
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test]
    async fn fails_every_kth_attempt() {
        let transport = MemoryTransport::new().failing_every(2);
        assert!(transport.publish(msg("a", "1")).await.is_ok());
        assert_eq!(
            transport.publish(msg("a", "2")).await,
            Err(TransportError::Injected { attempt: 1 })
        );
        assert_eq!(transport.delivered().len(), 1);
    }

    #[tokio::test]
    async fn refuses_after_shutdown() {
        let transport = MemoryTransport::new();
        transport.shutdown().await.unwrap();
        assert_eq!(transport.publish(msg("a", "1")).await, Err(TransportError::Closed));
    }
}
