//! Wallet module: per-user balances and a transaction ledger.
//!
//! This module implements:
//! - Lazily created wallets with a zero starting balance
//! - Versioned balance updates that never drop below zero
//! - A transaction record for every money movement (pending, then completed or failed)
//! - Simulated deposits and withdrawals with configurable limits
//! - Live balance and history subscriptions
//!
//! ## Example
//!
//! ```
//! use arena::store::MemoryStore;
//! use arena::wallet::{WalletConfig, WalletManager};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let wallets = WalletManager::with_config(Arc::new(MemoryStore::new()), WalletConfig::instant());
//!
//! let deposit = wallets.deposit("user-1", 500, Default::default()).await?;
//! println!("Deposit {} is {}", deposit.id, deposit.status);
//!
//! assert_eq!(wallets.balance("user-1").await?, 500);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod subscription;

pub use errors::{WalletError, WalletResult};
pub use manager::WalletManager;
pub use models::{
    NewTransaction, Transaction, TransactionDetails, TransactionKind, TransactionStatus, Wallet,
    WalletConfig,
};
pub use subscription::{TransactionSubscription, WalletSubscription};
