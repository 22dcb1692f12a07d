//! HTTP API client for the arena server.

use anyhow::{Context, Result};
use arena::{
    auth::{LoginRequest, RegisterRequest, User},
    profile::{Availability, ProfileUpdate, UserProfile},
    tournament::{
        NewTournament, RoomDetails, Tournament, TournamentDraft, TournamentResults,
        TournamentStatus,
    },
    wallet::{Transaction, TransactionDetails, Wallet},
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use std::path::Path;

/// Content type to upload a local image file with, by extension
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// API client for communicating with the arena server
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    access_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a non-success response into an error carrying the server's message
async fn check(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text),
        Err(e) => format!("Failed to read error response: {}", e),
    };
    anyhow::bail!("{} failed ({}): {}", action, status.as_u16(), message)
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            access_token: None,
            refresh_token: None,
        }
    }

    /// Whether the client holds a session
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.access_token.as_ref().context("Not signed in")?;
        Ok(self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path))
            .bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, action: &str) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", action))?;
        check(response, action)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", action))
    }

    async fn authenticate(&mut self, path: &str, body: Option<serde_json::Value>, action: &str) -> Result<User> {
        let mut builder = self
            .client
            .post(format!("{}/api/v1{}", self.base_url, path));
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let auth: AuthResponse = self.send(builder, action).await?;
        self.access_token = Some(auth.access_token);
        self.refresh_token = Some(auth.refresh_token);
        Ok(auth.user)
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Register a new account and sign in
    pub async fn register(&mut self, request: RegisterRequest) -> Result<User> {
        self.authenticate("/auth/register", Some(serde_json::to_value(request)?), "register")
            .await
    }

    /// Sign in with email and password
    pub async fn login(&mut self, request: LoginRequest) -> Result<User> {
        self.authenticate("/auth/login", Some(serde_json::to_value(request)?), "login")
            .await
    }

    /// Sign in as a guest
    pub async fn sign_in_anonymously(&mut self) -> Result<User> {
        self.authenticate("/auth/anonymous", None, "guest sign-in").await
    }

    /// Rotate the refresh token, returning the user it belongs to
    pub async fn refresh(&mut self) -> Result<User> {
        let refresh_token = self.refresh_token.clone().context("Not signed in")?;
        self.authenticate(
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh_token })),
            "refresh",
        )
        .await
    }

    /// Revoke the session; local tokens are dropped even if the server call fails
    pub async fn logout(&mut self) -> Result<()> {
        self.access_token = None;
        let Some(refresh_token) = self.refresh_token.take() else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/api/v1/auth/logout", self.base_url))
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .context("Failed to send logout request")?;
        check(response, "logout").await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tournaments
    // ------------------------------------------------------------------

    /// List tournaments, optionally filtered by status (no session needed)
    pub async fn list_tournaments(&self, status: Option<TournamentStatus>) -> Result<Vec<Tournament>> {
        let mut builder = self
            .client
            .get(format!("{}/api/v1/tournaments", self.base_url));
        if let Some(status) = status {
            builder = builder.query(&[("status", status.to_string())]);
        }
        self.send(builder, "list tournaments").await
    }

    pub async fn list_hosted(&self) -> Result<Vec<Tournament>> {
        self.send(self.request(Method::GET, "/tournaments/hosted")?, "list hosted")
            .await
    }

    pub async fn list_joined(&self) -> Result<Vec<Tournament>> {
        self.send(self.request(Method::GET, "/tournaments/joined")?, "list joined")
            .await
    }

    pub async fn get_tournament(&self, id: &str) -> Result<Tournament> {
        self.send(
            self.request(Method::GET, &format!("/tournaments/{id}"))?,
            "get tournament",
        )
        .await
    }

    pub async fn create_tournament(&self, tournament: &NewTournament) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, "/tournaments")?.json(tournament),
            "create tournament",
        )
        .await
    }

    pub async fn join_tournament(&self, id: &str) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, &format!("/tournaments/{id}/join"))?,
            "join",
        )
        .await
    }

    pub async fn leave_tournament(&self, id: &str) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, &format!("/tournaments/{id}/leave"))?,
            "leave",
        )
        .await
    }

    pub async fn update_status(&self, id: &str, status: TournamentStatus) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, &format!("/tournaments/{id}/status"))?
                .json(&json!({ "status": status })),
            "update status",
        )
        .await
    }

    pub async fn set_room(&self, id: &str, room: &RoomDetails) -> Result<Tournament> {
        self.send(
            self.request(Method::PUT, &format!("/tournaments/{id}/room"))?
                .json(room),
            "set room",
        )
        .await
    }

    pub async fn complete_tournament(&self, id: &str, results: &TournamentResults) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, &format!("/tournaments/{id}/complete"))?
                .json(&json!({ "results": results })),
            "complete tournament",
        )
        .await
    }

    pub async fn upload_banner(&self, id: &str, content_type: &str, bytes: Vec<u8>) -> Result<Tournament> {
        self.send(
            self.request(Method::POST, &format!("/tournaments/{id}/banner"))?
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes),
            "upload banner",
        )
        .await
    }

    // ------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------

    /// The saved draft, if any
    pub async fn get_draft(&self) -> Result<Option<TournamentDraft>> {
        let response = self
            .request(Method::GET, "/drafts")?
            .send()
            .await
            .context("Failed to send draft request")?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let draft = check(response, "get draft")
            .await?
            .json()
            .await
            .context("Failed to parse draft response")?;
        Ok(Some(draft))
    }

    pub async fn save_draft(&self, draft: &TournamentDraft) -> Result<TournamentDraft> {
        self.send(self.request(Method::PUT, "/drafts")?.json(draft), "save draft")
            .await
    }

    pub async fn delete_draft(&self) -> Result<()> {
        let response = self
            .request(Method::DELETE, "/drafts")?
            .send()
            .await
            .context("Failed to send draft request")?;
        check(response, "delete draft").await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Wallet
    // ------------------------------------------------------------------

    pub async fn wallet(&self) -> Result<Wallet> {
        self.send(self.request(Method::GET, "/wallet")?, "get wallet").await
    }

    pub async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        self.send(
            self.request(Method::GET, "/wallet/transactions")?
                .query(&[("limit", limit)]),
            "list transactions",
        )
        .await
    }

    pub async fn deposit(&self, amount: i64, details: TransactionDetails) -> Result<Transaction> {
        self.send(
            self.request(Method::POST, "/wallet/deposit")?
                .json(&json!({ "amount": amount, "details": details })),
            "deposit",
        )
        .await
    }

    pub async fn withdraw(&self, amount: i64, details: TransactionDetails) -> Result<Transaction> {
        self.send(
            self.request(Method::POST, "/wallet/withdraw")?
                .json(&json!({ "amount": amount, "details": details })),
            "withdraw",
        )
        .await
    }

    // ------------------------------------------------------------------
    // Profile
    // ------------------------------------------------------------------

    pub async fn profile(&self) -> Result<UserProfile> {
        self.send(self.request(Method::GET, "/profile")?, "get profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        self.send(
            self.request(Method::PUT, "/profile")?.json(update),
            "update profile",
        )
        .await
    }

    pub async fn check_availability(&self, ign: Option<&str>, game_id: Option<&str>) -> Result<Availability> {
        let mut query = Vec::new();
        if let Some(ign) = ign {
            query.push(("ign", ign));
        }
        if let Some(game_id) = game_id {
            query.push(("game_id", game_id));
        }
        self.send(
            self.request(Method::GET, "/profile/availability")?.query(&query),
            "check availability",
        )
        .await
    }

    pub async fn upload_avatar(&self, content_type: &str, bytes: Vec<u8>) -> Result<UserProfile> {
        self.send(
            self.request(Method::POST, "/profile/avatar")?
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(bytes),
            "upload avatar",
        )
        .await
    }

    /// WebSocket URL of the caller's live wallet feed
    pub fn wallet_feed_url(&self) -> Result<String> {
        let token = self.access_token.as_ref().context("Not signed in")?;

        let ws_url = self
            .base_url
            .replacen("http://", "ws://", 1)
            .replacen("https://", "wss://", 1);
        Ok(format!("{}/ws/wallet?token={}", ws_url, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_feed_url_requires_session() {
        let client = ApiClient::new("http://localhost:8080/".to_string());
        assert!(client.wallet_feed_url().is_err());
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("banner.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(
            content_type_for(Path::new("notes.txt")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_wallet_feed_url_scheme() {
        let mut client = ApiClient::new("https://arena.example".to_string());
        client.access_token = Some("abc".to_string());
        assert_eq!(
            client.wallet_feed_url().unwrap(),
            "wss://arena.example/ws/wallet?token=abc"
        );
    }
}
