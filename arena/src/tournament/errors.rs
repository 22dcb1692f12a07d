//! Tournament error types.

use super::models::{TournamentId, TournamentStatus};
use crate::{storage::StorageError, store::StoreError, wallet::WalletError};
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    /// Tournament not found
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    /// Creation or update input rejected
    #[error("{0}")]
    Validation(String),

    /// Caller is not the tournament host
    #[error("Only the host can manage this tournament")]
    NotHost,

    /// No spots left
    #[error("Tournament is full")]
    TournamentFull,

    /// Caller is already a participant
    #[error("You have already joined this tournament")]
    AlreadyJoined,

    /// Hosts play in other people's tournaments only
    #[error("You cannot join your own tournament")]
    HostCannotJoin,

    /// Registration is closed
    #[error("Tournament is not open for registration (status: {0})")]
    NotJoinable(TournamentStatus),

    /// Caller is not a participant
    #[error("You have not joined this tournament")]
    NotParticipant,

    /// Status change not allowed
    #[error("Cannot change tournament status from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },

    /// Entry fee, refund or prize movement failed
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Banner upload failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Document store error
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TournamentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => TournamentError::NotFound(id),
            other => TournamentError::Store(other),
        }
    }
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Store(e) => e.client_message(),
            TournamentError::Wallet(e) => e.client_message(),
            TournamentError::Storage(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
