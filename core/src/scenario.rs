//! The scenario engine: decides and builds each tick's events.
//!
//! TICK ORDER (fixed, never reordered, or seeded runs stop replaying):
//!   1. Advance the virtual clock by a random increment.
//!   2. Decide the scenario kind (one fraud draw, then one branch draw).
//!   3. Draw the card.
//!   4. Build the steps: sticky IP for normal traffic, one fresh
//!      non-sticky IP shared by every fraud step.
//!   5. Move the clock to the last step's timestamp.
//!
//! RULES:
//!   - Every scenario holds 1–3 events for one card, in causal order.
//!   - Fraud steps are exactly `fraud_short_delay_ms` apart.
//!   - Only this engine touches the pool, the sticky table and the clock.

use crate::{
    catalog::ReceiverClass,
    clock::VirtualClock,
    config::GeneratorConfig,
    error::GenResult,
    event::{Amount, StepTag, TaggedEvent, TransactionEvent},
    identity::IdentityPool,
    rng::{RandomSource, RngBank, RngSlot, SimRng},
    sticky::{random_ipv4, StickyIpTracker},
    types::{CardNumber, Tick},
};
use chrono::{Duration, NaiveDateTime};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    Normal,
    /// Charity drip, then a large purchase. Two steps.
    CharityThenPurchase,
    /// Two general drips, then a large purchase. Three steps.
    DoubleDripThenPurchase,
}

impl ScenarioKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal                 => "NORMAL",
            Self::CharityThenPurchase    => "FRAUD_CHARITY_THEN_PURCHASE",
            Self::DoubleDripThenPurchase => "FRAUD_DOUBLE_DRIP_THEN_PURCHASE",
        }
    }

    pub fn step_count(&self) -> usize {
        match self {
            Self::Normal                 => 1,
            Self::CharityThenPurchase    => 2,
            Self::DoubleDripThenPurchase => 3,
        }
    }

    pub fn is_fraud(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Pick this tick's scenario. Draws once for fraud and, only when
/// fraud fires, once more for the branch.
pub fn decide(
    rng: &mut impl RandomSource,
    fraud_probability: f64,
    double_drip_share: f64,
) -> ScenarioKind {
    if !rng.chance(fraud_probability) {
        return ScenarioKind::Normal;
    }
    if rng.chance(double_drip_share) {
        ScenarioKind::DoubleDripThenPurchase
    } else {
        ScenarioKind::CharityThenPurchase
    }
}

/// One tick's output, in publish order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub tick:   Tick,
    pub kind:   ScenarioKind,
    pub events: Vec<TaggedEvent>,
}

impl Scenario {
    pub fn card(&self) -> &str {
        &self.events[0].event.card_number
    }

    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.events[self.events.len() - 1].event.timestamp
    }

    pub fn transactions(&self) -> impl Iterator<Item = &TransactionEvent> {
        self.events.iter().map(|t| &t.event)
    }
}

pub struct ScenarioEngine<R: RandomSource = SimRng> {
    config:  GeneratorConfig,
    pool:    IdentityPool,
    tracker: StickyIpTracker,
    clock:   VirtualClock,
    rng:     R,
    tick:    Tick,
}

impl ScenarioEngine<SimRng> {
    /// Fully wired engine: pool drawn from the identity slot, scenarios
    /// from the scenario slot, clock starting in the past.
    pub fn build(config: GeneratorConfig, seed: u64) -> GenResult<Self> {
        let origin = VirtualClock::from_config(&config).now();
        Self::build_at(config, seed, origin)
    }

    /// Same as `build` with a fixed clock origin, so two engines with
    /// one seed produce byte-identical payloads.
    pub fn build_at(config: GeneratorConfig, seed: u64, origin: NaiveDateTime) -> GenResult<Self> {
        config.validate()?;
        let bank = RngBank::new(seed);
        let mut pool_rng = bank.for_slot(RngSlot::IdentityPool);
        let pool = IdentityPool::generate(config.identity_pool_size, &mut pool_rng)?;
        let tracker = StickyIpTracker::new(config.ip_change_probability);
        let clock = VirtualClock::starting_at(origin, config.time_increment_ms);
        Ok(Self::new(config, pool, tracker, clock, bank.for_slot(RngSlot::Scenario)))
    }
}

impl<R: RandomSource> ScenarioEngine<R> {
    pub fn new(
        config: GeneratorConfig,
        pool: IdentityPool,
        tracker: StickyIpTracker,
        clock: VirtualClock,
        rng: R,
    ) -> Self {
        Self { config, pool, tracker, clock, rng, tick: 0 }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn pool(&self) -> &IdentityPool {
        &self.pool
    }

    pub fn tracker(&self) -> &StickyIpTracker {
        &self.tracker
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    /// Ticks generated so far.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Generate one tick's scenario and move the clock past it.
    pub fn next_scenario(&mut self) -> GenResult<Scenario> {
        let start = self.clock.advance(&mut self.rng);
        let kind = decide(
            &mut self.rng,
            self.config.fraud_probability,
            self.config.double_drip_share,
        );
        let card = self.pool.random_card(&mut self.rng).clone();

        let events = match kind {
            ScenarioKind::Normal => vec![self.normal_step(card, start)],
            ScenarioKind::CharityThenPurchase => self.fraud_steps(
                card,
                start,
                &[
                    (StepTag::CharityDrip, ReceiverClass::Charity),
                    (StepTag::CharityLargePurchase, ReceiverClass::HighValueTarget),
                ],
            ),
            ScenarioKind::DoubleDripThenPurchase => self.fraud_steps(
                card,
                start,
                &[
                    (StepTag::MicroDrip1, ReceiverClass::General),
                    (StepTag::MicroDrip2, ReceiverClass::General),
                    (StepTag::DoubleDripLargePurchase, ReceiverClass::HighValueTarget),
                ],
            ),
        };

        self.tick += 1;
        let scenario = Scenario { tick: self.tick, kind, events };
        self.clock.advance_to(scenario.last_timestamp())?;
        Ok(scenario)
    }

    fn normal_step(&mut self, card: CardNumber, at: NaiveDateTime) -> TaggedEvent {
        let receiver = ReceiverClass::General.pick(&mut self.rng);
        let amount = self.normal_amount();
        let ip_address = self.tracker.address_for(&card, &mut self.rng);
        TaggedEvent {
            tag:   StepTag::Normal,
            event: TransactionEvent {
                card_number: card,
                receiver: receiver.to_string(),
                amount,
                ip_address,
                timestamp: at,
            },
        }
    }

    /// Build a fraud sequence. High-value-target steps draw from the
    /// fraud amount range, every other step from the normal one.
    fn fraud_steps(
        &mut self,
        card: CardNumber,
        start: NaiveDateTime,
        plan: &[(StepTag, ReceiverClass)],
    ) -> Vec<TaggedEvent> {
        // Registration keeps the home IP defined for later normal traffic.
        let home = self.tracker.address_for(&card, &mut self.rng);
        let fraud_ip = self.fresh_ip_other_than(home);
        let delay = Duration::milliseconds(self.config.fraud_short_delay_ms as i64);

        let mut at = start;
        let mut steps = Vec::with_capacity(plan.len());
        for (i, (tag, class)) in plan.iter().enumerate() {
            if i > 0 {
                at += delay;
            }
            let receiver = class.pick(&mut self.rng);
            let amount = match class {
                ReceiverClass::HighValueTarget => self.fraud_amount(),
                _ => self.normal_amount(),
            };
            steps.push(TaggedEvent {
                tag:   *tag,
                event: TransactionEvent {
                    card_number: card.clone(),
                    receiver: receiver.to_string(),
                    amount,
                    ip_address: fraud_ip,
                    timestamp: at,
                },
            });
        }
        steps
    }

    fn fresh_ip_other_than(&mut self, home: Ipv4Addr) -> Ipv4Addr {
        loop {
            let ip = random_ipv4(&mut self.rng);
            if ip != home {
                return ip;
            }
        }
    }

    fn normal_amount(&mut self) -> Amount {
        let (lo, hi) = self.config.normal_amount_cents;
        Amount::from_cents(self.rng.next_u64_between(lo, hi))
    }

    fn fraud_amount(&mut self) -> Amount {
        let (lo, hi) = self.config.fraud_amount_cents;
        Amount::from_cents(self.rng.next_u64_between(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::VecDeque;

    /// Replays fixed f64 draws, then walks a fixed stride so later
    /// draws still differ. Integer draws scale the same value.
    struct Scripted(VecDeque<f64>, f64);

    impl Scripted {
        fn new<const N: usize>(draws: [f64; N]) -> Self {
            Self(VecDeque::from(draws), 0.0)
        }
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            self.0.pop_front().unwrap_or_else(|| {
                self.1 = (self.1 + 0.377) % 1.0;
                self.1
            })
        }

        fn next_u64_below(&mut self, n: u64) -> u64 {
            ((self.next_f64() * n as f64) as u64).min(n - 1)
        }
    }

    fn origin() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn decide_branches_on_scripted_draws() {
        let mut rng = Scripted::new([0.9]);
        assert_eq!(decide(&mut rng, 0.02, 0.5), ScenarioKind::Normal);

        let mut rng = Scripted::new([0.01, 0.2]);
        assert_eq!(decide(&mut rng, 0.02, 0.5), ScenarioKind::DoubleDripThenPurchase);

        let mut rng = Scripted::new([0.01, 0.7]);
        assert_eq!(decide(&mut rng, 0.02, 0.5), ScenarioKind::CharityThenPurchase);
    }

    #[test]
    fn normal_decision_consumes_one_draw() {
        let mut rng = Scripted::new([0.9, 0.123]);
        decide(&mut rng, 0.02, 0.5);
        assert_eq!(rng.0.front(), Some(&0.123));
    }

    #[test]
    fn charity_branch_with_scripted_source() {
        let config = GeneratorConfig::default_test();
        let pool = IdentityPool::from_cards(vec!["4200111122223333".into()]).unwrap();
        let clock = VirtualClock::starting_at(origin(), config.time_increment_ms);
        // clock step, fraud draw, branch draw.
        let rng = Scripted::new([0.0, 0.0, 0.9]);
        let mut engine = ScenarioEngine::new(config, pool, StickyIpTracker::new(0.0), clock, rng);

        let scenario = engine.next_scenario().unwrap();
        assert_eq!(scenario.kind, ScenarioKind::CharityThenPurchase);
        assert_eq!(scenario.events.len(), 2);
        assert_eq!(scenario.events[0].tag, StepTag::CharityDrip);
        assert_eq!(scenario.events[1].tag, StepTag::CharityLargePurchase);
        assert_eq!(scenario.events[0].event.timestamp, origin() + Duration::seconds(1));
        assert_eq!(
            scenario.events[1].event.timestamp - scenario.events[0].event.timestamp,
            Duration::seconds(4)
        );
        assert_eq!(engine.clock().now(), scenario.last_timestamp());
    }

    #[test]
    fn scenario_kind_step_counts() {
        assert_eq!(ScenarioKind::Normal.step_count(), 1);
        assert_eq!(ScenarioKind::CharityThenPurchase.step_count(), 2);
        assert_eq!(ScenarioKind::DoubleDripThenPurchase.step_count(), 3);
        assert!(!ScenarioKind::Normal.is_fraud());
        assert_eq!(ScenarioKind::CharityThenPurchase.name(), "FRAUD_CHARITY_THEN_PURCHASE");
    }
}
