//! Wallet manager: lazy wallets, versioned balance updates and a transaction ledger.

use super::{
    errors::{WalletError, WalletResult},
    models::{
        NewTransaction, Transaction, TransactionDetails, TransactionKind, TransactionStatus,
        Wallet, WalletConfig,
    },
    subscription::{TransactionSubscription, WalletSubscription},
};
use crate::store::{DocumentStore, Filter, StoreError, collections, decode_all, encode, modify};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;

/// Wallet manager
#[derive(Clone)]
pub struct WalletManager {
    store: Arc<dyn DocumentStore>,
    config: WalletConfig,
}

impl WalletManager {
    /// Create a new wallet manager configured from the environment
    ///
    /// # Arguments
    ///
    /// * `store` - Document store holding wallets and transactions
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, WalletConfig::from_env())
    }

    /// Create a wallet manager with explicit limits
    pub fn with_config(store: Arc<dyn DocumentStore>, config: WalletConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Get the user's wallet, creating it with a zero balance on first access
    ///
    /// Two concurrent first accesses both end up with the same wallet: the
    /// losing insert re-reads the winner's document.
    pub async fn get_or_create_wallet(&self, user_id: &str) -> WalletResult<Wallet> {
        if let Some(document) = self.store.get(collections::WALLETS, user_id).await? {
            return Ok(document.decode()?);
        }

        let wallet = Wallet::empty(user_id);
        match self
            .store
            .insert(collections::WALLETS, user_id, encode(&wallet)?)
            .await
        {
            Ok(document) => {
                log::info!("Created wallet for user {user_id}");
                Ok(document.decode()?)
            }
            Err(StoreError::AlreadyExists { .. }) => {
                let document = self
                    .store
                    .get(collections::WALLETS, user_id)
                    .await?
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collections::WALLETS.to_string(),
                        id: user_id.to_string(),
                    })?;
                Ok(document.decode()?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current balance
    pub async fn balance(&self, user_id: &str) -> WalletResult<i64> {
        Ok(self.get_or_create_wallet(user_id).await?.balance)
    }

    /// Subscribe to live balance changes of one wallet
    pub fn subscribe(&self, user_id: &str) -> WalletSubscription {
        WalletSubscription::new(user_id, self.store.subscribe())
    }

    /// Subscribe to the user's transaction history
    pub fn subscribe_transactions(&self, user_id: &str) -> TransactionSubscription {
        TransactionSubscription::new(user_id, self.store.subscribe())
    }

    /// Atomically add `delta` to the balance
    ///
    /// # Errors
    ///
    /// * `WalletError::InsufficientBalance` - The balance would go negative
    /// * `WalletError::BalanceOverflow` - The balance would overflow
    pub async fn adjust_balance(&self, user_id: &str, delta: i64) -> WalletResult<Wallet> {
        self.get_or_create_wallet(user_id).await?;

        let (wallet, ()) = modify(
            self.store.as_ref(),
            collections::WALLETS,
            user_id,
            |wallet: &mut Wallet| -> WalletResult<()> {
                let new_balance = wallet
                    .balance
                    .checked_add(delta)
                    .ok_or(WalletError::BalanceOverflow)?;
                if new_balance < 0 {
                    return Err(WalletError::InsufficientBalance {
                        available: wallet.balance,
                        required: delta.saturating_neg(),
                    });
                }
                wallet.balance = new_balance;
                wallet.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        log::debug!("Wallet {user_id} adjusted by {delta}, balance {}", wallet.balance);
        Ok(wallet)
    }

    /// Append a transaction record
    ///
    /// This only writes the ledger row; pair it with [`adjust_balance`] or use
    /// one of the settling flows ([`deposit`], [`withdraw`], ...).
    ///
    /// [`adjust_balance`]: Self::adjust_balance
    /// [`deposit`]: Self::deposit
    /// [`withdraw`]: Self::withdraw
    pub async fn record_transaction(&self, request: NewTransaction) -> WalletResult<Transaction> {
        let now = Utc::now();
        let transaction = Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id,
            amount: request.amount,
            kind: request.kind,
            status: request.status,
            details: request.details,
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(
                collections::TRANSACTIONS,
                &transaction.id,
                encode(&transaction)?,
            )
            .await?;

        Ok(transaction)
    }

    /// Change the status of a transaction
    pub async fn set_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> WalletResult<Transaction> {
        let result = modify(
            self.store.as_ref(),
            collections::TRANSACTIONS,
            transaction_id,
            |transaction: &mut Transaction| -> WalletResult<()> {
                transaction.status = status;
                transaction.updated_at = Utc::now();
                Ok(())
            },
        )
        .await;

        match result {
            Ok((transaction, ())) => Ok(transaction),
            Err(WalletError::Store(StoreError::NotFound { .. })) => {
                Err(WalletError::TransactionNotFound(transaction_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Transaction history, newest first
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> WalletResult<Vec<Transaction>> {
        let documents = self
            .store
            .list(
                collections::TRANSACTIONS,
                &Filter::new().eq("user_id", user_id),
            )
            .await?;

        let mut transactions: Vec<Transaction> = decode_all(&documents)?;
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions.truncate(limit);
        Ok(transactions)
    }

    /// Simulated deposit: pending record, processing delay, credit
    ///
    /// # Errors
    ///
    /// * `WalletError::DepositOutOfRange` - Amount outside the configured range
    pub async fn deposit(
        &self,
        user_id: &str,
        amount: i64,
        details: TransactionDetails,
    ) -> WalletResult<Transaction> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        if amount < self.config.min_deposit || amount > self.config.max_deposit {
            return Err(WalletError::DepositOutOfRange {
                amount,
                min: self.config.min_deposit,
                max: self.config.max_deposit,
            });
        }

        let pending = self
            .record_transaction(NewTransaction {
                user_id: user_id.to_string(),
                amount,
                kind: TransactionKind::Deposit,
                status: TransactionStatus::Pending,
                details,
            })
            .await?;

        tokio::time::sleep(self.config.processing_delay).await;
        self.settle(pending).await
    }

    /// Simulated withdrawal: balance check, pending record, processing delay, debit
    ///
    /// # Errors
    ///
    /// * `WalletError::WithdrawalTooSmall` - Amount below the configured minimum
    /// * `WalletError::InsufficientBalance` - Amount exceeds the balance
    pub async fn withdraw(
        &self,
        user_id: &str,
        amount: i64,
        details: TransactionDetails,
    ) -> WalletResult<Transaction> {
        if amount <= 0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        if amount < self.config.min_withdrawal {
            return Err(WalletError::WithdrawalTooSmall {
                amount,
                min: self.config.min_withdrawal,
            });
        }

        let available = self.balance(user_id).await?;
        if amount > available {
            return Err(WalletError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        let pending = self
            .record_transaction(NewTransaction {
                user_id: user_id.to_string(),
                amount: -amount,
                kind: TransactionKind::Withdrawal,
                status: TransactionStatus::Pending,
                details,
            })
            .await?;

        tokio::time::sleep(self.config.processing_delay).await;
        self.settle(pending).await
    }

    /// Debit a tournament entry fee
    pub async fn charge_entry_fee(
        &self,
        user_id: &str,
        tournament_id: &str,
        fee: i64,
    ) -> WalletResult<Transaction> {
        self.transfer(
            user_id,
            -fee,
            TransactionKind::EntryFee,
            json!({ "tournament_id": tournament_id }),
        )
        .await
    }

    /// Credit back a tournament entry fee
    pub async fn refund_entry_fee(
        &self,
        user_id: &str,
        tournament_id: &str,
        fee: i64,
    ) -> WalletResult<Transaction> {
        self.transfer(
            user_id,
            fee,
            TransactionKind::Refund,
            json!({ "tournament_id": tournament_id }),
        )
        .await
    }

    /// Credit a tournament prize
    pub async fn pay_prize(
        &self,
        user_id: &str,
        tournament_id: &str,
        position: &str,
        amount: i64,
    ) -> WalletResult<Transaction> {
        self.transfer(
            user_id,
            amount,
            TransactionKind::Prize,
            json!({ "tournament_id": tournament_id, "position": position }),
        )
        .await
    }

    /// Record and settle an internal transfer without processing delay
    async fn transfer(
        &self,
        user_id: &str,
        amount: i64,
        kind: TransactionKind,
        details: Value,
    ) -> WalletResult<Transaction> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(amount));
        }

        let pending = self
            .record_transaction(NewTransaction {
                user_id: user_id.to_string(),
                amount,
                kind,
                status: TransactionStatus::Pending,
                details: details.as_object().cloned().unwrap_or_default(),
            })
            .await?;

        self.settle(pending).await
    }

    /// Apply a pending transaction to the balance and close it
    ///
    /// The record is marked `completed` when the balance write succeeds and
    /// `failed` otherwise, so every attempted movement stays visible.
    async fn settle(&self, transaction: Transaction) -> WalletResult<Transaction> {
        match self
            .adjust_balance(&transaction.user_id, transaction.amount)
            .await
        {
            Ok(_) => {
                self.set_transaction_status(&transaction.id, TransactionStatus::Completed)
                    .await
            }
            Err(e) => {
                log::warn!(
                    "{} transaction {} for user {} failed: {}",
                    transaction.kind,
                    transaction.id,
                    transaction.user_id,
                    e
                );
                if let Err(mark_err) = self
                    .set_transaction_status(&transaction.id, TransactionStatus::Failed)
                    .await
                {
                    log::error!(
                        "Could not mark transaction {} as failed: {}",
                        transaction.id,
                        mark_err
                    );
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn manager() -> WalletManager {
        WalletManager::with_config(Arc::new(MemoryStore::new()), WalletConfig::instant())
    }

    #[tokio::test]
    async fn test_wallet_created_lazily_at_zero() {
        let wallets = manager();
        let wallet = wallets.get_or_create_wallet("u1").await.unwrap();
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.user_id, "u1");

        // Second access returns the same wallet
        let again = wallets.get_or_create_wallet("u1").await.unwrap();
        assert_eq!(again.created_at, wallet.created_at);
    }

    #[tokio::test]
    async fn test_adjust_balance_rejects_negative() {
        let wallets = manager();
        wallets.adjust_balance("u1", 100).await.unwrap();

        let err = wallets.adjust_balance("u1", -150).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::InsufficientBalance {
                available: 100,
                required: 150
            }
        ));
        assert_eq!(wallets.balance("u1").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_adjust_balance_overflow() {
        let wallets = manager();
        wallets.adjust_balance("u1", i64::MAX).await.unwrap();
        let err = wallets.adjust_balance("u1", 1).await.unwrap_err();
        assert!(matches!(err, WalletError::BalanceOverflow));
    }

    #[tokio::test]
    async fn test_settle_marks_failed_transaction() {
        let wallets = manager();
        let err = wallets.charge_entry_fee("u1", "t1", 50).await.unwrap_err();
        assert!(matches!(err, WalletError::InsufficientBalance { .. }));

        let history = wallets.list_transactions("u1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, TransactionStatus::Failed);
        assert_eq!(history[0].kind, TransactionKind::EntryFee);
        assert_eq!(wallets.balance("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_status_unknown_transaction() {
        let wallets = manager();
        let err = wallets
            .set_transaction_status("nope", TransactionStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::TransactionNotFound(_)));
    }
}
