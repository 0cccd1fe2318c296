//! Ledger errors and results

use serde::Serialize;
use shared::{AppError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Balance store failure: {0}")]
    Store(#[from] StoreError),

    /// The stored value is not a decimal integer. Never coerced to zero.
    #[error("Corrupt balance for {username}: {raw:?}")]
    CorruptBalance { username: String, raw: String },
}

impl LedgerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Store(e) => e.is_retryable(),
            LedgerError::CorruptBalance { .. } => false,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Store(e) => AppError::Store(e),
            corrupt @ LedgerError::CorruptBalance { .. } => AppError::internal(corrupt.to_string()),
        }
    }
}

/// Balance change reported back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceUpdate {
    pub username: String,
    pub delta: i64,
    pub new_balance: i64,
}
