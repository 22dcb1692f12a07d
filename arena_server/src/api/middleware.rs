//! Authentication middleware for protected endpoints.
//!
//! Extracts and validates the JWT access token from the `Authorization`
//! header, then injects an [`AuthUser`] into request extensions for
//! downstream handlers.
//!
//! # Extracting the caller
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use arena_server::api::middleware::AuthUser;
//!
//! async fn protected_handler(Extension(user): Extension<AuthUser>) -> String {
//!     format!("Authenticated as user {}", user.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use super::{AppState, errors::ApiError};
use crate::logging::log_security_event;

/// The authenticated caller of a protected route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub anonymous: bool,
}

/// Pull the bearer token out of an `Authorization` header value
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that validates JWT tokens and injects the caller.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects [`AuthUser`] → Calls next handler
/// - **Missing header / invalid format**: `401 Unauthorized`
/// - **Invalid or expired token**: `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(ApiError::unauthorized)?;

    match state.auth_manager.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
                anonymous: claims.anonymous,
            });
            Ok(next.run(request).await)
        }
        Err(e) => {
            log_security_event("invalid_access_token", None, &e.to_string());
            Err(ApiError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
