//! Wallet data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Free-form transaction details
pub type TransactionDetails = Map<String, Value>;

/// Wallet model, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn empty(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    EntryFee,
    Prize,
    Refund,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
            TransactionKind::EntryFee => write!(f, "entry_fee"),
            TransactionKind::Prize => write!(f, "prize"),
            TransactionKind::Refund => write!(f, "refund"),
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Transaction record; `amount` is signed (credits positive, debits negative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    #[serde(default)]
    pub details: TransactionDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to append a transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: String,
    pub amount: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    #[serde(default)]
    pub details: TransactionDetails,
}

/// Wallet limits and simulated payment timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Simulated payment processor delay for deposits and withdrawals
    pub processing_delay: Duration,
    pub min_deposit: i64,
    pub max_deposit: i64,
    pub min_withdrawal: i64,
}

impl WalletConfig {
    /// Load from the environment
    ///
    /// - `PAYMENT_PROCESSING_DELAY_MS` (default: 2000)
    /// - `MIN_DEPOSIT` (default: 10)
    /// - `MAX_DEPOSIT` (default: 100000)
    /// - `MIN_WITHDRAWAL` (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let delay_ms = parse_env_or(
            "PAYMENT_PROCESSING_DELAY_MS",
            defaults.processing_delay.as_millis() as u64,
        );
        Self {
            processing_delay: Duration::from_millis(delay_ms),
            min_deposit: parse_env_or("MIN_DEPOSIT", defaults.min_deposit),
            max_deposit: parse_env_or("MAX_DEPOSIT", defaults.max_deposit),
            min_withdrawal: parse_env_or("MIN_WITHDRAWAL", defaults.min_withdrawal),
        }
    }

    /// No processing delay, for tests
    pub fn instant() -> Self {
        Self {
            processing_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(2000),
            min_deposit: 10,
            max_deposit: 100_000,
            min_withdrawal: 100,
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(TransactionKind::EntryFee).unwrap(),
            serde_json::json!("entry_fee")
        );
        assert_eq!(TransactionKind::EntryFee.to_string(), "entry_fee");
        assert_eq!(TransactionStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_transaction_details_default_to_empty() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "user_id": "u1",
            "amount": -50,
            "kind": "withdrawal",
            "status": "pending",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(tx.details.is_empty());
        assert_eq!(tx.amount, -50);
    }
}
