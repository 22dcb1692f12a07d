//! Integration tests for wallet flows: deposits, withdrawals, the ledger and
//! live subscriptions.

use arena::store::MemoryStore;
use arena::wallet::{
    TransactionKind, TransactionStatus, WalletConfig, WalletError, WalletManager,
};
use serde_json::{Map, json};
use std::sync::Arc;
use std::time::Duration;

fn wallets() -> WalletManager {
    WalletManager::with_config(Arc::new(MemoryStore::new()), WalletConfig::instant())
}

fn details(method: &str) -> Map<String, serde_json::Value> {
    json!({ "method": method })
        .as_object()
        .cloned()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_deposit_completes_and_credits() {
    let wallets = wallets();
    let tx = wallets.deposit("u1", 500, details("upi")).await.unwrap();

    assert_eq!(tx.kind, TransactionKind::Deposit);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.amount, 500);
    assert_eq!(tx.details.get("method"), Some(&json!("upi")));
    assert_eq!(wallets.balance("u1").await.unwrap(), 500);
}

#[tokio::test]
async fn test_deposit_limits() {
    let wallets = wallets();
    let config = wallets.config().clone();

    let err = wallets
        .deposit("u1", config.min_deposit - 1, Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::DepositOutOfRange { .. }));

    let err = wallets
        .deposit("u1", config.max_deposit + 1, Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::DepositOutOfRange { .. }));

    let err = wallets.deposit("u1", -5, Map::new()).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(-5)));

    // Rejected requests leave no ledger rows
    assert!(wallets.list_transactions("u1", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_withdrawal_never_overdraws() {
    let wallets = wallets();
    wallets.deposit("u1", 300, Map::new()).await.unwrap();

    let err = wallets.withdraw("u1", 301, Map::new()).await.unwrap_err();
    assert!(matches!(
        err,
        WalletError::InsufficientBalance {
            available: 300,
            required: 301
        }
    ));

    let err = wallets.withdraw("u1", 50, Map::new()).await.unwrap_err();
    assert!(matches!(err, WalletError::WithdrawalTooSmall { min: 100, .. }));

    let tx = wallets.withdraw("u1", 300, Map::new()).await.unwrap();
    assert_eq!(tx.amount, -300);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(wallets.balance("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_extreme_debit_is_rejected_without_overflow() {
    let wallets = wallets();
    wallets.deposit("u1", 300, Map::new()).await.unwrap();

    let err = wallets.adjust_balance("u1", i64::MIN).await.unwrap_err();
    assert!(matches!(
        err,
        WalletError::InsufficientBalance {
            available: 300,
            required: i64::MAX
        }
    ));
    assert_eq!(wallets.balance("u1").await.unwrap(), 300);

    let err = wallets.adjust_balance("empty", i64::MIN).await.unwrap_err();
    assert!(matches!(err, WalletError::InsufficientBalance { available: 0, .. }));
}

#[tokio::test]
async fn test_concurrent_withdrawals_keep_balance_non_negative() {
    let wallets = wallets();
    wallets.deposit("u1", 1000, Map::new()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let wallets = wallets.clone();
        handles.push(tokio::spawn(async move {
            wallets.withdraw("u1", 300, Map::new()).await
        }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    let balance = wallets.balance("u1").await.unwrap();
    assert!(balance >= 0);

    // Balance matches the completed ledger rows
    let history = wallets.list_transactions("u1", 100).await.unwrap();
    let settled: i64 = history
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Completed)
        .map(|tx| tx.amount)
        .sum();
    assert_eq!(settled, balance);
    assert!(
        history
            .iter()
            .all(|tx| tx.status != TransactionStatus::Pending)
    );
}

#[tokio::test]
async fn test_history_newest_first_with_limit() {
    let wallets = wallets();
    for amount in [10, 20, 30] {
        wallets.deposit("u1", amount, Map::new()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    wallets.deposit("u2", 99, Map::new()).await.unwrap();

    let history = wallets.list_transactions("u1", 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, 30);
    assert_eq!(history[1].amount, 20);
}

#[tokio::test]
async fn test_balance_subscription_sees_changes() {
    let wallets = wallets();
    wallets.get_or_create_wallet("u1").await.unwrap();

    let mut subscription = wallets.subscribe("u1");
    wallets.adjust_balance("u2", 5).await.unwrap();
    wallets.adjust_balance("u1", 70).await.unwrap();

    let wallet = tokio::time::timeout(Duration::from_secs(1), subscription.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(wallet.user_id, "u1");
    assert_eq!(wallet.balance, 70);
}

#[tokio::test]
async fn test_transaction_subscription_follows_settlement() {
    let wallets = wallets();
    let mut subscription = wallets.subscribe_transactions("u1");

    wallets.deposit("u1", 100, Map::new()).await.unwrap();

    let pending = subscription.next().await.unwrap();
    assert_eq!(pending.status, TransactionStatus::Pending);
    let completed = subscription.next().await.unwrap();
    assert_eq!(completed.id, pending.id);
    assert_eq!(completed.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_simulated_processing_delay() {
    let config = WalletConfig {
        processing_delay: Duration::from_millis(50),
        ..WalletConfig::default()
    };
    let wallets = WalletManager::with_config(Arc::new(MemoryStore::new()), config);

    let started = std::time::Instant::now();
    wallets.deposit("u1", 100, Map::new()).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
}
