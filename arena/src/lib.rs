//! # Arena
//!
//! Community gaming tournaments: hosting, joining, player profiles and an
//! in-app wallet.
//!
//! Every piece of state lives in a [`store::DocumentStore`]. Managers are thin,
//! cloneable handles over that store; any read-modify-write they perform is a
//! versioned compare-and-swap, so concurrent joins and balance changes cannot
//! overfill a tournament or overdraw a wallet.
//!
//! ## Core Modules
//!
//! - [`store`]: Document store trait, in-memory and PostgreSQL backends, change feed
//! - [`storage`]: Object storage for avatars and tournament banners
//! - [`auth`]: Registration, sign-in and JWT sessions
//! - [`profile`]: Player profiles, IGN/game ID uniqueness, validators
//! - [`wallet`]: Balances, transaction ledger, simulated deposits and withdrawals
//! - [`tournament`]: Tournament lifecycle, entry fees and prize payouts
//!
//! ## Example
//!
//! ```
//! use arena::Arena;
//! use arena::store::MemoryStore;
//! use arena::storage::MemoryObjectStore;
//! use arena::wallet::WalletConfig;
//! use std::sync::Arc;
//!
//! let arena = Arena::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryObjectStore::new("http://localhost:8080/files")),
//!     WalletConfig::instant(),
//!     "pepper".to_string(),
//!     "jwt_secret".to_string(),
//! );
//! # let _ = arena.tournaments;
//! ```

pub mod auth;
pub mod profile;
pub mod storage;
pub mod store;
pub mod tournament;
pub mod wallet;

use std::sync::Arc;

/// All managers wired to one store
#[derive(Clone)]
pub struct Arena {
    pub auth: auth::AuthManager,
    pub profiles: profile::ProfileManager,
    pub wallets: wallet::WalletManager,
    pub tournaments: tournament::TournamentManager,
}

impl Arena {
    pub fn new(
        store: Arc<dyn store::DocumentStore>,
        objects: Arc<dyn storage::ObjectStore>,
        wallet_config: wallet::WalletConfig,
        pepper: String,
        jwt_secret: String,
    ) -> Self {
        let profiles = profile::ProfileManager::new(store.clone(), objects.clone());
        let wallets = wallet::WalletManager::with_config(store.clone(), wallet_config);
        let tournaments =
            tournament::TournamentManager::new(store.clone(), wallets.clone(), objects);
        let auth = auth::AuthManager::new(store, profiles.clone(), pepper, jwt_secret);

        Self {
            auth,
            profiles,
            wallets,
            tournaments,
        }
    }

    /// Enable federated sign-in with tokens signed by `secret`
    pub fn with_federation_secret(mut self, secret: String) -> Self {
        self.auth = self.auth.with_federation_secret(secret);
        self
    }
}
