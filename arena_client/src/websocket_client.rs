//! WebSocket client for the live wallet feed.

use anyhow::{Context, Result};
use arena::wallet::{Transaction, Wallet};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Event pushed by the server's wallet feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    Balance { wallet: Wallet },
    Transaction { transaction: Transaction },
}

/// One line of output for an event
pub fn format_event(event: &WalletEvent) -> String {
    match event {
        WalletEvent::Balance { wallet } => format!("Balance: {} coins", wallet.balance),
        WalletEvent::Transaction { transaction } => format!(
            "{} {:+} ({}) at {}",
            transaction.kind,
            transaction.amount,
            transaction.status,
            transaction.created_at.format("%Y-%m-%d %H:%M:%S")
        ),
    }
}

/// Wallet feed client
pub struct WebSocketClient {
    ws_url: String,
}

impl WebSocketClient {
    /// Create a new WebSocket client
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// Print wallet events until the server closes the feed or Ctrl+C is pressed
    pub async fn watch(self) -> Result<()> {
        let (ws_stream, _) = connect_async(&self.ws_url)
            .await
            .context("Failed to connect to wallet feed")?;

        println!("Watching wallet (Ctrl+C to stop)...");

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    println!("Stopped watching.");
                    break;
                }
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<WalletEvent>(&text) {
                            Ok(event) => println!("{}", format_event(&event)),
                            Err(e) => eprintln!("Failed to parse wallet event: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        println!("Server closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        eprintln!("WebSocket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }

        let _ = write.close().await;
        Ok(())
    }
}
