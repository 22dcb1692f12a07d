//! WebSocket integration tests for the live wallet feed.
//!
//! These run a real listener on an ephemeral port, since the upgrade
//! handshake needs an actual connection.

use arena::Arena;
use arena::storage::MemoryObjectStore;
use arena::store::MemoryStore;
use arena::wallet::{WalletConfig, WalletManager};
use arena_server::api::{AppState, create_router, websocket::WalletEvent};
use futures_util::StreamExt;
use serde_json::Map;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

struct TestServer {
    addr: SocketAddr,
    state: AppState,
}

async fn start_server() -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let objects = Arc::new(MemoryObjectStore::new("http://localhost/files"));
    let arena = Arena::new(
        store.clone(),
        objects.clone(),
        WalletConfig::instant(),
        "test_pepper_for_testing_only".to_string(),
        "test_secret_key_for_testing_only_0123456789".to_string(),
    );
    let state = AppState::new(arena, store, objects);
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, state }
}

async fn next_event<S>(stream: &mut S) -> WalletEvent
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for wallet event")
            .expect("stream ended")
            .expect("websocket error");
        if message.is_text() {
            return serde_json::from_str(message.to_text().unwrap()).unwrap();
        }
    }
}

fn wallets(server: &TestServer) -> &WalletManager {
    &server.state.wallet_manager
}

#[tokio::test]
async fn test_wallet_feed_sends_snapshot_then_updates() {
    let server = start_server().await;
    let (_, tokens) = server
        .state
        .auth_manager
        .sign_in_anonymously("fp".to_string())
        .await
        .unwrap();
    let user_id = server
        .state
        .auth_manager
        .verify_access_token(&tokens.access_token)
        .unwrap()
        .sub;

    let url = format!("ws://{}/ws/wallet?token={}", server.addr, tokens.access_token);
    let (mut stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();

    // The first event is the current balance
    match next_event(&mut stream).await {
        WalletEvent::Balance { wallet } => {
            assert_eq!(wallet.user_id, user_id);
            assert_eq!(wallet.balance, 0);
        }
        other => panic!("expected balance snapshot, got {other:?}"),
    }

    wallets(&server)
        .deposit(&user_id, 250, Map::new())
        .await
        .unwrap();

    // Balance and transaction events may interleave in either order
    let mut saw_transaction = false;
    let mut latest_balance = 0;
    while latest_balance != 250 || !saw_transaction {
        match next_event(&mut stream).await {
            WalletEvent::Balance { wallet } => latest_balance = wallet.balance,
            WalletEvent::Transaction { transaction } => {
                assert_eq!(transaction.user_id, user_id);
                saw_transaction = true;
            }
        }
    }
}

#[tokio::test]
async fn test_wallet_feed_rejects_bad_token() {
    let server = start_server().await;
    let url = format!("ws://{}/ws/wallet?token=garbage", server.addr);

    let err = tokio_tungstenite::connect_async(url).await.unwrap_err();
    match err {
        tokio_tungstenite::tungstenite::Error::Http(response) => {
            assert_eq!(response.status(), 401);
        }
        other => panic!("expected HTTP rejection, got {other:?}"),
    }
}
