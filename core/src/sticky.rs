//! Sticky home-IP tracking.
//!
//! Each card keeps one "home" IPv4 address for normal traffic. The
//! address is assigned on first lookup and may drift on any later
//! lookup (travel, new network), including the very next one.

use crate::{rng::RandomSource, types::CardNumber};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Draw a fresh address with each octet uniform over 0–255.
pub fn random_ipv4(rng: &mut impl RandomSource) -> Ipv4Addr {
    let mut octet = || rng.next_u64_below(256) as u8;
    Ipv4Addr::new(octet(), octet(), octet(), octet())
}

pub struct StickyIpTracker {
    change_probability: f64,
    homes:              HashMap<CardNumber, Ipv4Addr>,
}

impl StickyIpTracker {
    pub fn new(change_probability: f64) -> Self {
        Self {
            change_probability,
            homes: HashMap::new(),
        }
    }

    /// Current home address for `card`, assigning or drifting it as
    /// needed. The only mutator of the table.
    pub fn address_for(&mut self, card: &str, rng: &mut impl RandomSource) -> Ipv4Addr {
        match self.homes.get_mut(card) {
            None => {
                let home = random_ipv4(rng);
                self.homes.insert(card.to_string(), home);
                home
            }
            Some(home) => {
                if rng.chance(self.change_probability) {
                    let moved = random_ipv4(rng);
                    log::debug!("home IP for ...{} drifted {home} -> {moved}", card_suffix(card));
                    *home = moved;
                }
                *home
            }
        }
    }

    /// Stored address without drawing. None until the first lookup.
    pub fn peek(&self, card: &str) -> Option<Ipv4Addr> {
        self.homes.get(card).copied()
    }

    pub fn len(&self) -> usize {
        self.homes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.homes.is_empty()
    }
}

/// Last four characters of a card, for log lines.
pub fn card_suffix(card: &str) -> &str {
    &card[card.len().saturating_sub(4)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    #[test]
    fn first_lookup_assigns_and_stores() {
        let mut rng = SimRng::new(5, 0);
        let mut tracker = StickyIpTracker::new(0.0);
        assert_eq!(tracker.peek("4200000000000001"), None);
        let ip = tracker.address_for("4200000000000001", &mut rng);
        assert_eq!(tracker.peek("4200000000000001"), Some(ip));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn no_drift_returns_same_address() {
        let mut rng = SimRng::new(5, 0);
        let mut tracker = StickyIpTracker::new(0.0);
        let first = tracker.address_for("card", &mut rng);
        for _ in 0..1_000 {
            assert_eq!(tracker.address_for("card", &mut rng), first);
        }
    }

    #[test]
    fn certain_drift_can_fire_on_second_lookup() {
        let mut rng = SimRng::new(5, 0);
        let mut tracker = StickyIpTracker::new(1.0);
        let first = tracker.address_for("card", &mut rng);
        let second = tracker.address_for("card", &mut rng);
        // Drift replaces the stored value; a collision is 1 in 2^32.
        assert_ne!(first, second);
        assert_eq!(tracker.peek("card"), Some(second));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn card_suffix_handles_short_input() {
        assert_eq!(card_suffix("4200123412341234"), "1234");
        assert_eq!(card_suffix("12"), "12");
    }
}
