use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Identity pool is empty")]
    EmptyPool,

    #[error("Clock regression: {current} -> {requested}")]
    ClockRegression {
        current:   chrono::NaiveDateTime,
        requested: chrono::NaiveDateTime,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Publisher drain timed out with {pending} publishes still in flight")]
    DrainTimeout { pending: usize },
}

pub type GenResult<T> = Result<T, GenError>;
