//! HTTP REST API and WebSocket endpoints for the arena server.
//!
//! # Architecture
//!
//! - **REST API**: Authentication, tournaments, drafts, wallet and profile
//!   under `/api/v1`
//! - **WebSocket**: Live wallet balance and transaction feed
//! - **Files**: Uploaded avatars and banners under `/files`
//! - **State**: Shared managers over one document store
//!
//! # Authentication
//!
//! Protected endpoints require a JWT access token:
//! ```text
//! Authorization: Bearer <access_token>
//! ```
//! The WebSocket endpoint takes the token as a `token` query parameter.
//!
//! # Errors
//!
//! Failures are JSON bodies `{"error": "<message>"}`; see [`errors`].
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod auth;
pub mod drafts;
pub mod errors;
pub mod files;
pub mod middleware;
pub mod profile;
pub mod request_id;
pub mod tournaments;
pub mod wallet;
pub mod websocket;

use arena::{
    Arena,
    auth::AuthManager,
    profile::ProfileManager,
    storage::ObjectStore,
    store::DocumentStore,
    tournament::TournamentManager,
    wallet::WalletManager,
};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Largest accepted upload body (banners are the bigger kind)
const MAX_UPLOAD_BODY: usize = 6 * 1024 * 1024;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub profile_manager: Arc<ProfileManager>,
    pub wallet_manager: Arc<WalletManager>,
    pub tournament_manager: Arc<TournamentManager>,
    pub store: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl AppState {
    /// Wire the managers of `arena` together with the stores they were built on
    pub fn new(
        arena: Arena,
        store: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            auth_manager: Arc::new(arena.auth),
            profile_manager: Arc::new(arena.profiles),
            wallet_manager: Arc::new(arena.wallets),
            tournament_manager: Arc::new(arena.tournaments),
            store,
            objects,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET  /health                               - Health check (public)
/// GET  /files/{*path}                        - Uploaded file (public)
/// GET  /ws/wallet?token=<jwt>                - Wallet feed (token)
///
/// POST /api/v1/auth/register                 - Register (public)
/// POST /api/v1/auth/login                    - Email/password sign-in (public)
/// POST /api/v1/auth/anonymous                - Guest sign-in (public)
/// POST /api/v1/auth/federated                - Provider sign-in (public)
/// POST /api/v1/auth/refresh                  - Rotate refresh token (public)
/// POST /api/v1/auth/logout                   - Revoke refresh token (public)
/// GET  /api/v1/tournaments?status=           - List tournaments (public)
///
/// GET  /api/v1/tournaments/hosted            - Caller's hosted tournaments
/// GET  /api/v1/tournaments/joined            - Caller's joined tournaments
/// POST /api/v1/tournaments                   - Create tournament
/// GET  /api/v1/tournaments/{id}              - Get tournament
/// POST /api/v1/tournaments/{id}/join         - Join (charges entry fee)
/// POST /api/v1/tournaments/{id}/leave        - Leave (refunds entry fee)
/// POST /api/v1/tournaments/{id}/status       - Change status (host)
/// PUT  /api/v1/tournaments/{id}/room         - Set room details (host)
/// POST /api/v1/tournaments/{id}/complete     - Record results, pay prizes (host)
/// POST /api/v1/tournaments/{id}/banner       - Upload banner (host)
/// GET|PUT|DELETE /api/v1/drafts              - Caller's tournament draft
/// GET  /api/v1/wallet                        - Balance
/// GET  /api/v1/wallet/transactions?limit=    - History, newest first
/// POST /api/v1/wallet/deposit                - Simulated deposit
/// POST /api/v1/wallet/withdraw               - Simulated withdrawal
/// GET|PUT /api/v1/profile                    - Caller's profile
/// GET  /api/v1/profile/availability          - IGN / game ID availability
/// POST /api/v1/profile/avatar                - Upload avatar
/// ```
///
/// # Example
///
/// ```rust,no_run
/// # use arena_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/files/{*path}", get(files::get_file))
        // WebSocket route handles its own auth via query parameter
        .route("/ws/wallet", get(websocket::wallet_feed_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/anonymous", post(auth::anonymous))
        .route("/auth/federated", post(auth::federated))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/tournaments", get(tournaments::list_tournaments));

    let upload_routes = Router::new()
        .route(
            "/tournaments/{tournament_id}/banner",
            post(tournaments::upload_banner),
        )
        .route("/profile/avatar", post(profile::upload_avatar))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY));

    let protected_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/hosted", get(tournaments::list_hosted))
        .route("/tournaments/joined", get(tournaments::list_joined))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/join",
            post(tournaments::join_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/leave",
            post(tournaments::leave_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/status",
            post(tournaments::update_status),
        )
        .route("/tournaments/{tournament_id}/room", put(tournaments::set_room))
        .route(
            "/tournaments/{tournament_id}/complete",
            post(tournaments::complete_tournament),
        )
        .route(
            "/drafts",
            get(drafts::get_draft)
                .put(drafts::save_draft)
                .delete(drafts::delete_draft),
        )
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/transactions", get(wallet::list_transactions))
        .route("/wallet/deposit", post(wallet::deposit))
        .route("/wallet/withdraw", post(wallet::withdraw))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/profile/availability", get(profile::check_availability))
        .merge(upload_routes)
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the document store answers, `503 Service Unavailable`
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.store.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
