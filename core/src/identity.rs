//! Identity pool: the fixed universe of synthetic card numbers.
//!
//! Generated once at startup, never mutated afterwards. Every card in
//! the pool matches exactly one vendor template.

use crate::{
    error::{GenError, GenResult},
    rng::RandomSource,
    types::CardNumber,
};

/// Simulated card vendor. Determines prefix and total length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardVendor {
    Visa,
    Mastercard,
    Amex,
}

impl CardVendor {
    pub const ALL: [CardVendor; 3] = [Self::Visa, Self::Mastercard, Self::Amex];

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Visa       => "4200",
            Self::Mastercard => "5500",
            Self::Amex       => "3700",
        }
    }

    /// Total digit count including the prefix.
    pub fn length(&self) -> usize {
        match self {
            Self::Visa | Self::Mastercard => 16,
            Self::Amex                    => 15,
        }
    }

    /// 40% Visa, 40% Mastercard, 20% Amex.
    fn draw(rng: &mut impl RandomSource) -> Self {
        match rng.next_u64_below(10) {
            0..=3 => Self::Visa,
            4..=7 => Self::Mastercard,
            _     => Self::Amex,
        }
    }

    /// The template a card number matches, if any.
    pub fn classify(card: &str) -> Option<Self> {
        if !card.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|v| card.len() == v.length() && card.starts_with(v.prefix()))
    }

    fn synthesize(&self, rng: &mut impl RandomSource) -> CardNumber {
        let mut card = String::with_capacity(self.length());
        card.push_str(self.prefix());
        while card.len() < self.length() {
            let digit = rng.next_u64_below(10) as u8;
            card.push(char::from(b'0' + digit));
        }
        card
    }
}

pub struct IdentityPool {
    cards: Vec<CardNumber>,
}

impl IdentityPool {
    /// Generate `size` card numbers. Fails on a zero size: an empty
    /// pool would make every later draw impossible.
    pub fn generate(size: usize, rng: &mut impl RandomSource) -> GenResult<Self> {
        if size == 0 {
            return Err(GenError::EmptyPool);
        }
        let cards = (0..size)
            .map(|_| CardVendor::draw(rng).synthesize(rng))
            .collect();
        log::info!("Generated {size} card numbers.");
        Ok(Self { cards })
    }

    /// Build a pool from known cards (replay and tests).
    pub fn from_cards(cards: Vec<CardNumber>) -> GenResult<Self> {
        if cards.is_empty() {
            return Err(GenError::EmptyPool);
        }
        Ok(Self { cards })
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[CardNumber] {
        &self.cards
    }

    pub fn random_card(&self, rng: &mut impl RandomSource) -> &CardNumber {
        rng.pick(&self.cards)
    }
}
