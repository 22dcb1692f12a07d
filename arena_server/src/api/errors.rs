//! Mapping of library errors onto HTTP responses.
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Messages come
//! from each error's `client_message()`, so store and I/O details never reach
//! clients; those are logged here instead.

use arena::{
    auth::AuthError, profile::ProfileError, storage::StorageError, store::StoreError,
    tournament::TournamentError, wallet::WalletError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Authentication required")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists { .. } | StoreError::VersionConflict { .. } => {
            StatusCode::CONFLICT
        }
        StoreError::Contention { .. } | StoreError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Database(_) | StoreError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        StorageError::UnsupportedType(_) | StorageError::Empty | StorageError::InvalidPath(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn wallet_status(error: &WalletError) -> StatusCode {
    match error {
        WalletError::Store(e) => store_status(e),
        WalletError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        WalletError::InsufficientBalance { .. }
        | WalletError::InvalidAmount(_)
        | WalletError::DepositOutOfRange { .. }
        | WalletError::WithdrawalTooSmall { .. }
        | WalletError::BalanceOverflow => StatusCode::BAD_REQUEST,
    }
}

fn profile_status(error: &ProfileError) -> StatusCode {
    match error {
        ProfileError::Store(e) => store_status(e),
        ProfileError::Storage(e) => storage_status(e),
        ProfileError::Validation(_) => StatusCode::BAD_REQUEST,
        ProfileError::IgnTaken | ProfileError::GameIdTaken => StatusCode::CONFLICT,
        ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

fn log_if_internal(status: StatusCode, error: &dyn std::fmt::Display) {
    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let status = store_status(&error);
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        let status = storage_status(&error);
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}

impl From<WalletError> for ApiError {
    fn from(error: WalletError) -> Self {
        let status = wallet_status(&error);
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}

impl From<ProfileError> for ApiError {
    fn from(error: ProfileError) -> Self {
        let status = profile_status(&error);
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}

impl From<TournamentError> for ApiError {
    fn from(error: TournamentError) -> Self {
        let status = match &error {
            TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
            TournamentError::Validation(_) => StatusCode::BAD_REQUEST,
            TournamentError::NotHost => StatusCode::FORBIDDEN,
            TournamentError::TournamentFull
            | TournamentError::AlreadyJoined
            | TournamentError::HostCannotJoin
            | TournamentError::NotJoinable(_)
            | TournamentError::NotParticipant
            | TournamentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            TournamentError::Wallet(e) => wallet_status(e),
            TournamentError::Storage(e) => storage_status(e),
            TournamentError::Store(e) => store_status(e),
        };
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        let status = match &error {
            AuthError::Store(e) => store_status(e),
            AuthError::Profile(e) => profile_status(e),
            AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidPassword
            | AuthError::UserNotFound
            | AuthError::JwtError(_)
            | AuthError::SessionExpired
            | AuthError::InvalidRefreshToken
            | AuthError::UnverifiedIdentity
            | AuthError::FederationDisabled => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::InvalidIdentity(_) => StatusCode::BAD_REQUEST,
        };
        log_if_internal(status, &error);
        Self::new(status, error.client_message())
    }
}
