//! Shared primitive types used across the generator.

/// One iteration of the driver loop. One tick = one scenario.
pub type Tick = u64;

/// A synthetic card number. Doubles as the transport ordering key.
pub type CardNumber = String;

/// Identifier the transport assigns to an accepted message.
pub type MessageId = String;
