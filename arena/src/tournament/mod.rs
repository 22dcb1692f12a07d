//! Tournament module for community-hosted gaming tournaments.
//!
//! This module provides tournament management functionality including:
//! - Tournament creation with validated capacity, schedule and prize split
//! - Joining and leaving with entry fees charged and refunded through the wallet
//! - Room credentials visible only to the host and participants
//! - Status changes, cancellation refunds and prize payouts on completion
//! - Per-host drafts of unfinished configurations
//!
//! ## Example
//!
//! ```
//! use arena::storage::MemoryObjectStore;
//! use arena::store::MemoryStore;
//! use arena::tournament::{NewTournament, PrizeShare, TournamentManager, TournamentMode};
//! use arena::wallet::{WalletConfig, WalletManager};
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let wallets = WalletManager::with_config(store.clone(), WalletConfig::instant());
//! let tournaments = TournamentManager::new(
//!     store,
//!     wallets,
//!     Arc::new(MemoryObjectStore::new("http://localhost/files")),
//! );
//!
//! let tournament = tournaments
//!     .create_tournament(
//!         "host-1",
//!         NewTournament {
//!             name: "Sunday Cup".to_string(),
//!             game: "Free Fire".to_string(),
//!             description: String::new(),
//!             rules: String::new(),
//!             mode: TournamentMode::Squad,
//!             max_participants: 12,
//!             entry_fee: 0,
//!             prize_distribution: vec![PrizeShare::new("1st", 100)],
//!             start_time: Utc::now() + Duration::days(2),
//!             banner_url: None,
//!         },
//!     )
//!     .await?;
//!
//! tournaments.join_tournament(&tournament.id, "player-1").await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod payouts;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    NewTournament, PrizeShare, RoomDetails, Tournament, TournamentDraft, TournamentId,
    TournamentMode, TournamentResults, TournamentStatus, validate_prize_distribution,
};
pub use payouts::calculate_payouts;
