//! Ordered publisher.
//!
//! `publish` serializes an event, spawns the submission and returns a
//! handle immediately. Submissions sharing an ordering key form a
//! chain: each waits for its predecessor to settle (accepted or
//! refused) before reaching the transport. Different keys never wait
//! on each other.
//!
//! Completion tasks only log and bump counters. They never touch
//! generator state.

use crate::{
    error::GenResult,
    event::TransactionEvent,
    transport::{OutboundMessage, Transport, TransportError},
    types::{CardNumber, MessageId},
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { key: CardNumber, message_id: MessageId },
    Failed { key: CardNumber, error: TransportError },
}

impl PublishOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Completion handle for one publish.
pub struct PublishHandle {
    key:   CardNumber,
    inner: JoinHandle<PublishOutcome>,
}

impl PublishHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.inner.abort_handle()
    }

    pub async fn wait(self) -> PublishOutcome {
        let key = self.key;
        match self.inner.await {
            Ok(outcome) => outcome,
            Err(e) => PublishOutcome::Failed { key, error: TransportError::Aborted(e.to_string()) },
        }
    }
}

#[derive(Debug, Default)]
pub struct PublishStats {
    published: AtomicU64,
    failed:    AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishCounts {
    pub published: u64,
    pub failed:    u64,
}

impl PublishStats {
    pub fn snapshot(&self) -> PublishCounts {
        PublishCounts {
            published: self.published.load(Ordering::Relaxed),
            failed:    self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Per-key sequencing over an unordered transport.
///
/// A refused publish does not pause its key: the next message for the
/// same card is still submitted once the failed one settles. Generation
/// never stalls on a bad key, at the cost that a subscriber may see a
/// fraud sequence's large purchase without the drip that preceded it.
/// Every such gap is logged at `error` and counted in `failed`.
pub struct OrderedPublisher {
    transport: Arc<dyn Transport>,
    /// Settlement signal of the latest submission per key. Bounded by
    /// the identity pool size.
    tails:     HashMap<CardNumber, oneshot::Receiver<()>>,
    stats:     Arc<PublishStats>,
}

impl OrderedPublisher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            tails: HashMap::new(),
            stats: Arc::new(PublishStats::default()),
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    pub fn counts(&self) -> PublishCounts {
        self.stats.snapshot()
    }

    /// Serialize and submit `event` keyed by its card number. Never
    /// waits for the transport. Must be called inside a Tokio runtime.
    pub fn publish(&mut self, event: &TransactionEvent) -> GenResult<PublishHandle> {
        let message = OutboundMessage {
            ordering_key: event.ordering_key().to_string(),
            data:         event.to_wire_json()?,
        };
        let key = message.ordering_key.clone();

        let (settled_tx, settled_rx) = oneshot::channel::<()>();
        let predecessor = self.tails.insert(key.clone(), settled_rx);
        let transport = Arc::clone(&self.transport);
        let stats = Arc::clone(&self.stats);
        let task_key = key.clone();

        let inner = tokio::spawn(async move {
            if let Some(predecessor) = predecessor {
                // A dropped sender (panicked predecessor) also releases us.
                let _ = predecessor.await;
            }
            let result = transport.publish(message).await;
            drop(settled_tx);

            match result {
                Ok(message_id) => {
                    stats.published.fetch_add(1, Ordering::Relaxed);
                    log::trace!("published {message_id} key=...{}", crate::sticky::card_suffix(&task_key));
                    PublishOutcome::Published { key: task_key, message_id }
                }
                Err(error) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    log::error!(" -> Error publishing message: {error}");
                    PublishOutcome::Failed { key: task_key, error }
                }
            }
        });

        Ok(PublishHandle { key, inner })
    }

    /// Close the transport. Call after in-flight handles are drained.
    pub async fn shutdown(&self) -> GenResult<()> {
        self.transport.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Amount;
    use crate::transport::MemoryTransport;
    use chrono::NaiveDate;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn event(card: &str, cents: u64) -> TransactionEvent {
        TransactionEvent {
            card_number: card.into(),
            receiver:    "Target".into(),
            amount:      Amount::from_cents(cents),
            ip_address:  Ipv4Addr::new(1, 2, 3, 4),
            timestamp:   NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn same_key_keeps_publish_order_despite_latency() {
        // First attempt is the slowest; without chaining it would land last.
        let transport = Arc::new(MemoryTransport::new().with_latencies(vec![
            Duration::from_millis(60),
            Duration::from_millis(1),
            Duration::from_millis(1),
        ]));
        let mut publisher = OrderedPublisher::new(transport.clone());

        let handles: Vec<_> = (1..=3)
            .map(|i| publisher.publish(&event("4200000000000001", i * 100)).unwrap())
            .collect();
        for h in handles {
            assert!(h.wait().await.is_ok());
        }

        let amounts: Vec<f64> = transport
            .delivered_for("4200000000000001")
            .iter()
            .map(|d| serde_json::from_str::<serde_json::Value>(d).unwrap()["amount"].as_f64().unwrap())
            .collect();
        assert_eq!(amounts, [1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn different_keys_do_not_wait_on_each_other() {
        let transport = Arc::new(MemoryTransport::new().with_latencies(vec![
            Duration::from_millis(80),
            Duration::from_millis(1),
        ]));
        let mut publisher = OrderedPublisher::new(transport.clone());

        let slow = publisher.publish(&event("4200000000000001", 100)).unwrap();
        let fast = publisher.publish(&event("5500000000000002", 200)).unwrap();
        fast.wait().await;
        slow.wait().await;

        let order: Vec<_> = transport.delivered().into_iter().map(|m| m.ordering_key).collect();
        assert_eq!(order, ["5500000000000002", "4200000000000001"]);
    }

    #[tokio::test]
    async fn failure_is_reported_and_chain_continues() {
        let transport = Arc::new(MemoryTransport::new().failing_every(2));
        let mut publisher = OrderedPublisher::new(transport.clone());

        let a = publisher.publish(&event("4200000000000001", 100)).unwrap();
        let b = publisher.publish(&event("4200000000000001", 200)).unwrap();
        let c = publisher.publish(&event("4200000000000001", 300)).unwrap();

        assert!(a.wait().await.is_ok());
        assert!(matches!(
            b.wait().await,
            PublishOutcome::Failed { error: TransportError::Injected { attempt: 1 }, .. }
        ));
        assert!(c.wait().await.is_ok());
        assert_eq!(publisher.counts(), PublishCounts { published: 2, failed: 1 });
    }
}
