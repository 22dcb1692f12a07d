//! Wallet API handlers: balance, history, simulated deposits and withdrawals.

use arena::wallet::{Transaction, TransactionDetails, Wallet, WalletResult};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::{AppState, errors::ApiResult, middleware::AuthUser};
use crate::metrics;

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AmountPayload {
    pub amount: i64,
    /// Payment method details, stored on the transaction
    #[serde(default)]
    pub details: TransactionDetails,
}

fn record(result: &WalletResult<Transaction>, kind: &str) {
    match result {
        Ok(tx) => metrics::wallet_transactions_total(&tx.kind.to_string(), &tx.status.to_string()),
        Err(_) => metrics::wallet_transactions_total(kind, "rejected"),
    }
}

/// `GET /wallet`
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state
        .wallet_manager
        .get_or_create_wallet(&user.user_id)
        .await?;
    Ok(Json(wallet))
}

/// `GET /wallet/transactions?limit=`: newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let transactions = state
        .wallet_manager
        .list_transactions(&user.user_id, limit)
        .await?;
    Ok(Json(transactions))
}

/// `POST /wallet/deposit`
pub async fn deposit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AmountPayload>,
) -> ApiResult<Json<Transaction>> {
    let result = state
        .wallet_manager
        .deposit(&user.user_id, payload.amount, payload.details)
        .await;
    record(&result, "deposit");
    Ok(Json(result?))
}

/// `POST /wallet/withdraw`
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AmountPayload>,
) -> ApiResult<Json<Transaction>> {
    let result = state
        .wallet_manager
        .withdraw(&user.user_id, payload.amount, payload.details)
        .await;
    record(&result, "withdrawal");
    Ok(Json(result?))
}
