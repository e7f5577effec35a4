//! txgen-core: synthetic card-transaction stream with injected
//! multi-step fraud, published per card in causal order.
//!
//! Data flow, one tick:
//!   driver → clock → scenario engine (identity pool, sticky IPs)
//!          → ordered publisher → transport

pub mod catalog;
pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod identity;
pub mod publisher;
pub mod rng;
pub mod scenario;
pub mod sticky;
pub mod transport;
pub mod types;
