//! Authentication API handlers.
//!
//! - Registration with email and password
//! - Email/password, anonymous and federated sign-in
//! - Refresh token rotation and logout
//!
//! Refresh tokens are bound to a device fingerprint derived from the
//! `User-Agent` and forwarding headers of the request.
//!
//! # Examples
//!
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "ace@example.com", "password": "SecurePass123", "display_name": "Ace"}'
//! ```

use arena::auth::{FederatedSignIn, LoginRequest, RegisterRequest, SessionTokens, User};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{AppState, errors::ApiResult, request_id::RequestId};
use crate::{logging::log_security_event, metrics};

/// Tokens plus the signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: User,
}

impl AuthResponse {
    fn new(user: User, tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

/// Stable fingerprint of the calling device
pub fn device_fingerprint(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    let user_agent = header(USER_AGENT.as_str());
    // First hop only; later hops are proxies
    let forwarded_for = header("x-forwarded-for");
    let client_ip = forwarded_for.split(',').next().unwrap_or_default().trim();

    let mut hasher = Sha256::new();
    hasher.update(user_agent.as_bytes());
    hasher.update(b"|");
    hasher.update(client_ip.as_bytes());
    hex::encode(hasher.finalize())
}

/// `POST /auth/register`: create an account and sign it in
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let login = LoginRequest {
        email: payload.email.clone(),
        password: payload.password.clone(),
    };

    state.auth_manager.register(payload).await?;
    let (user, tokens) = state
        .auth_manager
        .login(login, device_fingerprint(&headers))
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = payload.email.clone();

    match state
        .auth_manager
        .login(payload, device_fingerprint(&headers))
        .await
    {
        Ok((user, tokens)) => {
            metrics::login_attempts_total("password", true);
            Ok(Json(AuthResponse::new(user, tokens)))
        }
        Err(e) => {
            metrics::login_attempts_total("password", false);
            log_security_event(
                "failed_login",
                None,
                &format!("request {} for {}: {}", request_id.as_str(), email, e),
            );
            Err(e.into())
        }
    }
}

/// `POST /auth/anonymous`
pub async fn anonymous(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthResponse>> {
    let (user, tokens) = state
        .auth_manager
        .sign_in_anonymously(device_fingerprint(&headers))
        .await?;
    metrics::login_attempts_total("anonymous", true);
    Ok(Json(AuthResponse::new(user, tokens)))
}

/// `POST /auth/federated`: sign in with a broker-signed identity token
pub async fn federated(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FederatedSignIn>,
) -> ApiResult<Json<AuthResponse>> {
    let result = state
        .auth_manager
        .sign_in_federated(&request.id_token, device_fingerprint(&headers))
        .await;
    metrics::login_attempts_total("federated", result.is_ok());

    let (user, tokens) = result?;
    Ok(Json(AuthResponse::new(user, tokens)))
}

/// `POST /auth/refresh`: rotate the refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RefreshPayload>,
) -> ApiResult<Json<AuthResponse>> {
    let tokens = state
        .auth_manager
        .refresh_token(payload.refresh_token, device_fingerprint(&headers))
        .await
        .inspect_err(|e| log_security_event("refresh_rejected", None, &e.to_string()))?;

    let claims = state.auth_manager.verify_access_token(&tokens.access_token)?;
    let user = state.auth_manager.get_user(&claims.sub).await?;
    Ok(Json(AuthResponse::new(user, tokens)))
}

/// `POST /auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> ApiResult<StatusCode> {
    state.auth_manager.logout(payload.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_device_fingerprint_is_stable() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("arena-cli/0.4"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));

        let first = device_fingerprint(&headers);
        assert_eq!(first.len(), 64);
        assert_eq!(first, device_fingerprint(&headers));

        // Proxy hops don't change the fingerprint
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.9.9.9"));
        assert_eq!(first, device_fingerprint(&headers));

        headers.insert(USER_AGENT, HeaderValue::from_static("other"));
        assert_ne!(first, device_fingerprint(&headers));
    }
}
