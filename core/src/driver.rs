//! The driver loop.
//!
//! Per tick:
//!   1. Ask the scenario engine for the next scenario.
//!   2. Publish every event in generation order.
//!   3. Wait `tick_interval` of wall-clock time, or stop on shutdown.
//!
//! On stop (shutdown signal, tick limit, or a failed tick) the loop
//! schedules nothing new, drains the in-flight set within
//! `drain_timeout`, then closes the transport.

use crate::{
    error::{GenError, GenResult},
    event::TaggedEvent,
    publisher::{OrderedPublisher, PublishCounts, PublishHandle},
    rng::{RandomSource, SimRng},
    scenario::{ScenarioEngine, ScenarioKind},
    sticky::card_suffix,
    types::Tick,
};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Interrupted,
    TickLimit,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub ticks:              Tick,
    pub events:             u64,
    pub normal:             u64,
    pub charity_scenarios:  u64,
    pub double_drip_scenarios: u64,
    pub publish:            PublishCounts,
    /// Publishes still pending when the drain timed out.
    pub abandoned:          usize,
    pub stop_reason:        Option<StopReason>,
}

impl RunSummary {
    fn record(&mut self, kind: ScenarioKind, events: usize) {
        self.ticks += 1;
        self.events += events as u64;
        match kind {
            ScenarioKind::Normal                 => self.normal += 1,
            ScenarioKind::CharityThenPurchase    => self.charity_scenarios += 1,
            ScenarioKind::DoubleDripThenPurchase => self.double_drip_scenarios += 1,
        }
    }
}

/// Bounded set of publishes not yet settled.
pub struct InFlight {
    handles:  VecDeque<PublishHandle>,
    capacity: usize,
}

impl InFlight {
    pub fn new(capacity: usize) -> Self {
        Self { handles: VecDeque::new(), capacity }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Drop handles whose publish already settled.
    pub fn reap(&mut self) {
        self.handles.retain(|h| !h.is_finished());
    }

    /// Track a new handle. At capacity, waits for the oldest to settle:
    /// the only point where a stalled transport slows generation.
    pub async fn push(&mut self, handle: PublishHandle) {
        self.reap();
        if self.handles.len() >= self.capacity {
            log::warn!("{} publishes in flight; waiting on the oldest", self.handles.len());
            if let Some(oldest) = self.handles.pop_front() {
                oldest.wait().await;
            }
        }
        self.handles.push_back(handle);
    }

    /// Await every handle, oldest first, until `timeout` elapses.
    /// Leftovers are aborted and reported as `DrainTimeout`.
    pub async fn drain(&mut self, timeout: Duration) -> GenResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        while let Some(handle) = self.handles.pop_front() {
            if handle.is_finished() {
                continue;
            }
            let key = handle.key().to_string();
            let abort = handle.abort_handle();
            let wait = handle.wait();
            tokio::pin!(wait);
            tokio::select! {
                _ = &mut wait => {}
                _ = tokio::time::sleep_until(deadline) => {
                    log::warn!("drain deadline hit while waiting on key ...{}", card_suffix(&key));
                    let pending = self.handles.len() + 1;
                    abort.abort();
                    for h in &self.handles {
                        h.abort();
                    }
                    self.handles.clear();
                    return Err(GenError::DrainTimeout { pending });
                }
            }
        }
        Ok(())
    }
}

pub struct Driver<R: RandomSource = SimRng> {
    engine:        ScenarioEngine<R>,
    publisher:     OrderedPublisher,
    in_flight:     InFlight,
    tick_interval: Duration,
    drain_timeout: Duration,
    tick_limit:    Option<Tick>,
    summary:       RunSummary,
}

impl<R: RandomSource> Driver<R> {
    pub fn new(engine: ScenarioEngine<R>, publisher: OrderedPublisher) -> Self {
        let config = engine.config();
        let in_flight = InFlight::new(config.max_in_flight);
        let tick_interval = config.tick_interval;
        let drain_timeout = config.drain_timeout;
        Self {
            engine,
            publisher,
            in_flight,
            tick_interval,
            drain_timeout,
            tick_limit: None,
            summary: RunSummary::default(),
        }
    }

    /// Stop after `limit` ticks instead of running until interrupted.
    pub fn with_tick_limit(mut self, limit: Option<Tick>) -> Self {
        self.tick_limit = limit;
        self
    }

    /// Run until `shutdown` resolves, the tick limit is reached, or a
    /// tick fails. Always drains before returning. A failed tick is
    /// returned as the error after the drain.
    pub async fn run<F>(mut self, shutdown: F) -> GenResult<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!(
            "driver started: transport={} pool={} tick_interval={:?}",
            self.publisher.transport_name(),
            self.engine.pool().size(),
            self.tick_interval,
        );

        let stopped: GenResult<StopReason> = loop {
            if self.tick_limit.is_some_and(|limit| self.summary.ticks >= limit) {
                break Ok(StopReason::TickLimit);
            }
            // Polled before every tick, so a signal raised before the
            // first tick is already seen.
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("Transaction generator interrupted. Shutting down.");
                    break Ok(StopReason::Interrupted);
                }
                _ = std::future::ready(()) => {}
            }
            if let Err(e) = self.run_tick().await {
                log::error!("tick {} failed: {e}", self.engine.tick() + 1);
                break Err(e);
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("Transaction generator interrupted. Shutting down.");
                    break Ok(StopReason::Interrupted);
                }
                _ = tokio::time::sleep(self.tick_interval) => {}
            }
        };

        log::info!("Shutting down publisher...");
        self.in_flight.reap();
        if !self.in_flight.is_empty() {
            log::info!("waiting on {} in-flight publishes", self.in_flight.len());
        }
        match self.in_flight.drain(self.drain_timeout).await {
            Ok(()) => {}
            Err(GenError::DrainTimeout { pending }) => {
                log::warn!("publisher drain timed out; {pending} publishes abandoned");
                self.summary.abandoned = pending;
            }
            Err(e) => return Err(e),
        }
        if let Err(e) = self.publisher.shutdown().await {
            log::warn!("transport shutdown failed: {e}");
        }
        log::info!("Publisher shut down.");

        self.summary.publish = self.publisher.counts();
        match stopped {
            Ok(reason) => {
                self.summary.stop_reason = Some(reason);
                Ok(self.summary)
            }
            Err(e) => Err(e),
        }
    }

    async fn run_tick(&mut self) -> GenResult<()> {
        let scenario = self.engine.next_scenario()?;
        if scenario.kind.is_fraud() {
            log::info!(
                "tick {}: {} on card ...{}",
                scenario.tick,
                scenario.kind.name(),
                card_suffix(scenario.card()),
            );
        }
        self.summary.record(scenario.kind, scenario.events.len());
        for tagged in &scenario.events {
            log_event(tagged);
            let handle = self.publisher.publish(&tagged.event)?;
            self.in_flight.push(handle).await;
        }
        Ok(())
    }
}

fn log_event(tagged: &TaggedEvent) {
    let e = &tagged.event;
    if tagged.tag.is_fraud() {
        log::info!(
            ">>> [Card: ...{}, {}, IP: {}, Amt: ${}, Time: {}, Source: {}]",
            card_suffix(&e.card_number),
            e.receiver,
            e.ip_address,
            e.amount,
            e.timestamp.format(crate::event::wire_timestamp::FORMAT),
            tagged.tag,
        );
    } else {
        log::debug!(
            "[Card: ...{}, {}, IP: {}, Amt: ${}]",
            card_suffix(&e.card_number),
            e.receiver,
            e.ip_address,
            e.amount,
        );
    }
}
