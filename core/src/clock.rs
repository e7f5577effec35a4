//! Virtual clock: the simulation's notion of time.
//!
//! Decoupled from the wall clock: one tick may cover anywhere from a
//! second to an hour of virtual time. Never moves backward.

use crate::{
    config::GeneratorConfig,
    error::{GenError, GenResult},
    rng::RandomSource,
};
use chrono::{Duration, NaiveDateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualClock {
    now:          NaiveDateTime,
    increment_ms: (u64, u64),
}

impl VirtualClock {
    pub fn starting_at(origin: NaiveDateTime, increment_ms: (u64, u64)) -> Self {
        Self { now: origin, increment_ms }
    }

    /// Clock starting `clock_origin_lag_minutes` behind the wall clock.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let origin = Utc::now().naive_utc() - Duration::minutes(config.clock_origin_lag_minutes);
        Self::starting_at(origin, config.time_increment_ms)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Advance by a uniform random increment. Returns the new time.
    pub fn advance(&mut self, rng: &mut impl RandomSource) -> NaiveDateTime {
        let (lo, hi) = self.increment_ms;
        let step = rng.next_u64_between(lo, hi);
        self.now += Duration::milliseconds(step as i64);
        self.now
    }

    /// Move to `t`, the last step of a fraud sequence. Rejects regression.
    pub fn advance_to(&mut self, t: NaiveDateTime) -> GenResult<()> {
        if t < self.now {
            return Err(GenError::ClockRegression { current: self.now, requested: t });
        }
        self.now = t;
        Ok(())
    }
}
