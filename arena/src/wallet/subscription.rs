//! Live views over the store's change feed, filtered to one user.
//!
//! Dropping a subscription unsubscribes it.

use super::models::{Transaction, Wallet};
use crate::store::{DocumentChange, collections};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast::{self, error::RecvError};

/// Wait for the next change accepted by `select` and decode its document
async fn next_matching<T, F>(
    changes: &mut broadcast::Receiver<DocumentChange>,
    mut select: F,
) -> Option<T>
where
    T: DeserializeOwned,
    F: FnMut(&DocumentChange) -> bool,
{
    loop {
        match changes.recv().await {
            Ok(change) if select(&change) => {
                let Some(document) = change.document else {
                    continue;
                };
                match document.decode() {
                    Ok(value) => return Some(value),
                    Err(e) => log::warn!(
                        "Skipping undecodable {}/{}: {}",
                        change.collection,
                        change.id,
                        e
                    ),
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Subscription lagged, skipped {skipped} changes");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// Live balance updates for one wallet
pub struct WalletSubscription {
    user_id: String,
    changes: broadcast::Receiver<DocumentChange>,
}

impl WalletSubscription {
    pub(crate) fn new(user_id: &str, changes: broadcast::Receiver<DocumentChange>) -> Self {
        Self {
            user_id: user_id.to_string(),
            changes,
        }
    }

    /// Wait for the next wallet state; `None` once the store shuts down
    pub async fn next(&mut self) -> Option<Wallet> {
        let user_id = self.user_id.clone();
        next_matching(&mut self.changes, |change| {
            change.collection == collections::WALLETS && change.id == user_id
        })
        .await
    }
}

/// Live transaction-history updates for one user
pub struct TransactionSubscription {
    user_id: String,
    changes: broadcast::Receiver<DocumentChange>,
}

impl TransactionSubscription {
    pub(crate) fn new(user_id: &str, changes: broadcast::Receiver<DocumentChange>) -> Self {
        Self {
            user_id: user_id.to_string(),
            changes,
        }
    }

    /// Wait for the next created or updated transaction of this user
    pub async fn next(&mut self) -> Option<Transaction> {
        let user_id = self.user_id.clone();
        next_matching(&mut self.changes, |change| {
            change.collection == collections::TRANSACTIONS
                && change
                    .document
                    .as_ref()
                    .and_then(|doc| doc.data.get("user_id"))
                    .and_then(|id| id.as_str())
                    == Some(user_id.as_str())
        })
        .await
    }
}
