//! Generator tunables.
//!
//! These are fixed at build time. The binary never exposes them as
//! flags; tests build their own `GeneratorConfig` through
//! `default_test()` and struct update syntax.

use crate::error::{GenError, GenResult};
use serde::Serialize;
use std::time::Duration;

// ── Scenario selection ─────────────────────────────────────────────

/// Chance per tick that a multi-step fraud sequence is injected.
pub const FRAUD_SCENARIO_PROBABILITY: f64 = 0.02;
/// Given fraud, chance of the three-step double-drip branch.
pub const DOUBLE_DRIP_SHARE: f64 = 0.5;
/// Spacing between consecutive steps of one fraud sequence.
pub const FRAUD_SHORT_DELAY_MS: u64 = 4_000;

// ── Amounts (cents) ────────────────────────────────────────────────

pub const NORMAL_MIN_AMOUNT_CENTS: u64 = 100;
pub const NORMAL_MAX_AMOUNT_CENTS: u64 = 50_000;
pub const FRAUD_MIN_AMOUNT_CENTS:  u64 = 200_000;
pub const FRAUD_MAX_AMOUNT_CENTS:  u64 = 700_000;

// ── Sticky IP ──────────────────────────────────────────────────────

/// Chance per lookup that an account's home IP moves.
pub const IP_CHANGE_PROBABILITY: f64 = 0.005;

// ── Virtual clock ──────────────────────────────────────────────────

pub const MIN_TIME_INCREMENT_MS: u64 = 1_000;
pub const MAX_TIME_INCREMENT_MS: u64 = 3_600_000;
/// The virtual clock starts this far behind the wall clock.
pub const CLOCK_ORIGIN_LAG_MINUTES: i64 = 125_400;

// ── Pool and driver ────────────────────────────────────────────────

pub const IDENTITY_POOL_SIZE: usize = 10_000;
pub const TICK_INTERVAL_MS: u64 = 1_000;
pub const DRAIN_TIMEOUT_SECS: u64 = 60;
pub const MAX_IN_FLIGHT: usize = 1_024;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorConfig {
    pub fraud_probability:         f64,
    pub double_drip_share:         f64,
    pub fraud_short_delay_ms:      u64,
    pub normal_amount_cents:       (u64, u64),
    pub fraud_amount_cents:        (u64, u64),
    pub ip_change_probability:     f64,
    pub time_increment_ms:         (u64, u64),
    pub clock_origin_lag_minutes:  i64,
    pub identity_pool_size:        usize,
    pub tick_interval:             Duration,
    pub drain_timeout:             Duration,
    pub max_in_flight:             usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fraud_probability:        FRAUD_SCENARIO_PROBABILITY,
            double_drip_share:        DOUBLE_DRIP_SHARE,
            fraud_short_delay_ms:     FRAUD_SHORT_DELAY_MS,
            normal_amount_cents:      (NORMAL_MIN_AMOUNT_CENTS, NORMAL_MAX_AMOUNT_CENTS),
            fraud_amount_cents:       (FRAUD_MIN_AMOUNT_CENTS, FRAUD_MAX_AMOUNT_CENTS),
            ip_change_probability:    IP_CHANGE_PROBABILITY,
            time_increment_ms:        (MIN_TIME_INCREMENT_MS, MAX_TIME_INCREMENT_MS),
            clock_origin_lag_minutes: CLOCK_ORIGIN_LAG_MINUTES,
            identity_pool_size:       IDENTITY_POOL_SIZE,
            tick_interval:            Duration::from_millis(TICK_INTERVAL_MS),
            drain_timeout:            Duration::from_secs(DRAIN_TIMEOUT_SECS),
            max_in_flight:            MAX_IN_FLIGHT,
        }
    }
}

impl GeneratorConfig {
    /// Config for unit and integration tests: small pool, no wall-clock wait.
    pub fn default_test() -> Self {
        Self {
            identity_pool_size: 50,
            tick_interval:      Duration::ZERO,
            drain_timeout:      Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Startup precondition check. A config that fails here never
    /// reaches the scenario engine.
    pub fn validate(&self) -> GenResult<()> {
        for (name, p) in [
            ("fraud_probability", self.fraud_probability),
            ("double_drip_share", self.double_drip_share),
            ("ip_change_probability", self.ip_change_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GenError::InvalidConfig(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        for (name, (lo, hi)) in [
            ("normal_amount_cents", self.normal_amount_cents),
            ("fraud_amount_cents", self.fraud_amount_cents),
            ("time_increment_ms", self.time_increment_ms),
        ] {
            if lo > hi {
                return Err(GenError::InvalidConfig(format!("{name} bounds inverted: {lo} > {hi}")));
            }
        }
        if self.time_increment_ms.0 == 0 {
            return Err(GenError::InvalidConfig("time_increment_ms lower bound must be > 0".into()));
        }
        if self.fraud_short_delay_ms == 0 {
            return Err(GenError::InvalidConfig("fraud_short_delay_ms must be > 0".into()));
        }
        if self.identity_pool_size == 0 {
            return Err(GenError::EmptyPool);
        }
        if self.max_in_flight == 0 {
            return Err(GenError::InvalidConfig("max_in_flight must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GeneratorConfig::default().validate().unwrap();
        GeneratorConfig::default_test().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let cfg = GeneratorConfig { fraud_probability: 1.5, ..GeneratorConfig::default_test() };
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_amount_bounds() {
        let cfg = GeneratorConfig {
            fraud_amount_cents: (700_000, 200_000),
            ..GeneratorConfig::default_test()
        };
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_empty_pool() {
        let cfg = GeneratorConfig { identity_pool_size: 0, ..GeneratorConfig::default_test() };
        assert!(matches!(cfg.validate(), Err(GenError::EmptyPool)));
    }
}
