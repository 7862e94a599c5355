use thiserror::Error;

/// Precondition violations raised by the ledger surface.
///
/// Tamper detection is not an error: a failed digest replay is reported as
/// `false` from the `is_valid` family instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("sender and receiver addresses are required")]
    MissingAddress,
    #[error("transaction {0} failed validation")]
    InvalidTransaction(String),
    #[error("mining requires a reward address")]
    MissingRewardAddress,
    #[error("chain contains no blocks")]
    EmptyChain,
}

pub type Result<T> = std::result::Result<T, ChainError>;
