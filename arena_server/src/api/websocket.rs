//! Live wallet feed over WebSocket.
//!
//! Clients connect to `/ws/wallet?token=<jwt>` and receive JSON events:
//!
//! ```json
//! {"type": "balance", "wallet": {...}}
//! {"type": "transaction", "transaction": {...}}
//! ```
//!
//! The first message is always the current balance. Incoming client
//! messages are ignored apart from close frames.

use arena::wallet::{Transaction, Wallet};
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::{AppState, errors::ApiError};
use crate::{logging::log_security_event, metrics};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

/// Event pushed to wallet subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    Balance { wallet: Wallet },
    Transaction { transaction: Transaction },
}

/// `GET /ws/wallet?token=`
pub async fn wallet_feed_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let user_id = match state.auth_manager.verify_access_token(&query.token) {
        Ok(claims) => claims.sub,
        Err(e) => {
            log_security_event("invalid_ws_token", None, &e.to_string());
            return ApiError::from(e).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

async fn send_event(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    event: &WalletEvent,
) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize wallet event: {}", e);
            return true;
        }
    };

    if sender.send(Message::Text(json.into())).await.is_err() {
        return false;
    }
    metrics::websocket_messages_sent();
    true
}

async fn handle_socket(socket: WebSocket, user_id: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    metrics::websocket_connected();
    info!("Wallet feed connected: user={}", user_id);

    // Subscribe before the snapshot so no change slips in between
    let mut balances = state.wallet_manager.subscribe(&user_id);
    let mut transactions = state.wallet_manager.subscribe_transactions(&user_id);

    match state.wallet_manager.get_or_create_wallet(&user_id).await {
        Ok(wallet) => {
            if !send_event(&mut sender, &WalletEvent::Balance { wallet }).await {
                metrics::websocket_disconnected();
                return;
            }
        }
        Err(e) => error!("Failed to load wallet of {}: {}", user_id, e),
    }

    loop {
        let event = tokio::select! {
            Some(wallet) = balances.next() => WalletEvent::Balance { wallet },
            Some(transaction) = transactions.next() => WalletEvent::Transaction { transaction },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                Some(Ok(_)) => continue,
            },
            else => break,
        };

        if !send_event(&mut sender, &event).await {
            break;
        }
    }

    info!("Wallet feed closed: user={}", user_id);
    metrics::websocket_disconnected();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_event_format() {
        let event = WalletEvent::Balance {
            wallet: Wallet::empty("u1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "balance");
        assert_eq!(json["wallet"]["user_id"], "u1");
        assert_eq!(json["wallet"]["balance"], 0);
    }
}
