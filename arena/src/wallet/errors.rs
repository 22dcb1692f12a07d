//! Wallet error types.

use crate::store::StoreError;
use thiserror::Error;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Balance would go negative
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}. Amount must be positive")]
    InvalidAmount(i64),

    /// Deposit outside the accepted range
    #[error("Deposit amount must be between {min} and {max}, got {amount}")]
    DepositOutOfRange { amount: i64, min: i64, max: i64 },

    /// Withdrawal below the minimum
    #[error("Minimum withdrawal is {min}, got {amount}")]
    WithdrawalTooSmall { amount: i64, min: i64 },

    /// Balance arithmetic overflowed
    #[error("Balance overflow")]
    BalanceOverflow,

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            WalletError::Store(e) => e.client_message(),
            WalletError::TransactionNotFound(_) => "Transaction not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
