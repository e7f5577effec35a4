//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call a platform RNG directly.
//! All randomness flows through a `RandomSource`, normally a `SimRng`
//! derived from the single master seed of the run.
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot_index * golden-ratio constant). This means:
//!   - Adding a new slot never changes existing streams.
//!   - The identity pool and the scenario engine are reproducible
//!     in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The draws the generator needs. Implemented by `SimRng`; tests
/// substitute scripted sources to pin exact branch selection.
pub trait RandomSource {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n).
    fn next_u64_below(&mut self, n: u64) -> u64;

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Roll a u64 in [lo, hi].
    fn next_u64_between(&mut self, lo: u64, hi: u64) -> u64 {
        assert!(lo <= hi, "empty range {lo}..={hi}");
        lo + self.next_u64_below(hi - lo + 1)
    }

    /// Pick one element uniformly. Panics on an empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T
    where
        Self: Sized,
    {
        let index = self.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }
}

/// A named, deterministic RNG for one consumer.
pub struct SimRng {
    pub name: &'static str,
    inner:    Pcg64Mcg,
}

impl SimRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name:  "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }
}

impl RandomSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.next_u64() % n
    }
}

/// All streams for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: RngSlot) -> SimRng {
        SimRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries. Only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    IdentityPool = 0,
    Scenario     = 1,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::IdentityPool => "identity_pool",
            Self::Scenario     => "scenario",
        }
    }
}
