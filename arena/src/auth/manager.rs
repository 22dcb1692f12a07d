//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, AuthAccount, AuthProvider, FederatedClaims, FederatedIdentity,
        LoginRequest, RegisterRequest, Session, SessionTokens, User, UserId,
    },
};
use crate::{
    profile::{ProfileManager, validation::validate_email},
    store::{DocumentStore, Filter, collections, decode_all, encode as encode_doc, modify},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;
use uuid::Uuid;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileManager,
    pepper: String,
    jwt_secret: String,
    federation_secret: Option<String>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Document store holding accounts and sessions
    /// * `profiles` - Profile manager; every new account gets a profile
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    ///
    /// * `AuthManager` - New authentication manager instance
    pub fn new(
        store: Arc<dyn DocumentStore>,
        profiles: ProfileManager,
        pepper: String,
        jwt_secret: String,
    ) -> Self {
        Self {
            store,
            profiles,
            pepper,
            jwt_secret,
            federation_secret: None,
            access_token_duration: Duration::minutes(15),
            refresh_token_duration: Duration::days(7),
        }
    }

    /// Accept federated sign-in tokens signed with `secret`
    ///
    /// Without a federation secret every federated sign-in is refused.
    pub fn with_federation_secret(mut self, secret: String) -> Self {
        self.federation_secret = Some(secret);
        self
    }

    /// Register a new email/password account
    ///
    /// # Arguments
    ///
    /// * `request` - Registration request with email, password and optional display name
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user or error
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password too weak
    /// * `AuthError::EmailTaken` - Email already registered
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        let email = request.email.trim().to_string();
        validate_email(&email).map_err(|e| AuthError::InvalidEmail(e.to_string()))?;
        validate_password(&request.password)?;

        let email_key = email.to_lowercase();
        if self.find_account("email_key", &email_key).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let display_name = request
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_display_name(&email));

        let account = AuthAccount {
            user_id: Uuid::new_v4().to_string(),
            email: Some(email),
            email_key: Some(email_key),
            password_hash: Some(self.hash_password(&request.password)?),
            provider: AuthProvider::Password,
            provider_key: None,
            display_name,
            created_at: Utc::now(),
            last_login: None,
        };

        self.create_account(&account).await?;
        log::info!("Registered user {}", account.user_id);
        Ok(User::from(&account))
    }

    /// Login with email and password
    ///
    /// # Arguments
    ///
    /// * `request` - Login request with email and password
    /// * `device_fingerprint` - Device fingerprint (User-Agent + IP hash)
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, SessionTokens)>` - User and session tokens or error
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No account with this email
    /// * `AuthError::InvalidPassword` - Incorrect password
    pub async fn login(
        &self,
        request: LoginRequest,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let account = self
            .find_account("email_key", &request.email.trim().to_lowercase())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let hash = account
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidPassword)?;
        self.verify_password(&request.password, hash)?;

        self.start_session(&account.user_id, device_fingerprint)
            .await
    }

    /// Sign in without credentials
    ///
    /// Creates a fresh guest account with its own profile on every call.
    pub async fn sign_in_anonymously(
        &self,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let user_id = Uuid::new_v4().to_string();
        let account = AuthAccount {
            display_name: format!("Guest-{}", &user_id[..6]),
            user_id,
            email: None,
            email_key: None,
            password_hash: None,
            provider: AuthProvider::Anonymous,
            provider_key: None,
            created_at: Utc::now(),
            last_login: None,
        };

        self.create_account(&account).await?;
        log::info!("Anonymous sign-in created user {}", account.user_id);
        self.start_session(&account.user_id, device_fingerprint)
            .await
    }

    /// Sign in with an identity token issued by the identity broker
    ///
    /// The token must be an unexpired HS256 JWT signed with the federation
    /// secret. The first sign-in creates the account and profile; later
    /// sign-ins with the same provider and subject reuse it.
    ///
    /// # Errors
    ///
    /// * `AuthError::FederationDisabled` - No federation secret configured
    /// * `AuthError::UnverifiedIdentity` - Token forged, malformed or expired
    /// * `AuthError::InvalidIdentity` - Provider or subject missing
    /// * `AuthError::EmailTaken` - Email already belongs to another account
    pub async fn sign_in_federated(
        &self,
        id_token: &str,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let identity = self.verify_identity_token(id_token)?;
        self.sign_in_verified(identity, device_fingerprint).await
    }

    /// Check an identity token's signature and expiry
    pub fn verify_identity_token(&self, id_token: &str) -> AuthResult<FederatedIdentity> {
        let secret = self
            .federation_secret
            .as_ref()
            .ok_or(AuthError::FederationDisabled)?;

        let data = decode::<FederatedClaims>(
            id_token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            log::warn!("Rejected federated identity token: {}", e);
            AuthError::UnverifiedIdentity
        })?;

        Ok(data.claims.into())
    }

    async fn sign_in_verified(
        &self,
        identity: FederatedIdentity,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let provider = identity.provider.trim();
        let subject = identity.subject.trim();
        if provider.is_empty() || subject.is_empty() {
            return Err(AuthError::InvalidIdentity(
                "Provider and subject are required".to_string(),
            ));
        }

        let provider_key = AuthProvider::federated_key(provider, subject);
        if let Some(account) = self.find_account("provider_key", &provider_key).await? {
            return self
                .start_session(&account.user_id, device_fingerprint)
                .await;
        }

        let email = identity
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        let email_key = email.as_ref().map(|email| email.to_lowercase());
        if let Some(key) = &email_key
            && self.find_account("email_key", key).await?.is_some()
        {
            return Err(AuthError::EmailTaken);
        }

        let display_name = identity
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .or_else(|| email.as_deref().map(default_display_name))
            .unwrap_or_else(|| "Player".to_string());

        let account = AuthAccount {
            user_id: Uuid::new_v4().to_string(),
            email,
            email_key,
            password_hash: None,
            provider: AuthProvider::Federated {
                provider: provider.to_lowercase(),
                subject: subject.to_string(),
            },
            provider_key: Some(provider_key),
            display_name,
            created_at: Utc::now(),
            last_login: None,
        };

        self.create_account(&account).await?;
        log::info!("Federated sign-in via {} created user {}", provider, account.user_id);
        self.start_session(&account.user_id, device_fingerprint)
            .await
    }

    /// Get the public view of an account
    pub async fn get_user(&self, user_id: &str) -> AuthResult<User> {
        let account: AuthAccount = self
            .store
            .get(collections::AUTH_ACCOUNTS, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .decode()?;
        Ok(User::from(&account))
    }

    /// Refresh access token using refresh token
    ///
    /// The old refresh token is consumed; a token can be used once.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Refresh token
    /// * `device_fingerprint` - Device fingerprint
    ///
    /// # Returns
    ///
    /// * `AuthResult<SessionTokens>` - New access and refresh tokens
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidRefreshToken` - Unknown token or different device
    /// * `AuthError::SessionExpired` - Refresh token expired
    pub async fn refresh_token(
        &self,
        refresh_token: String,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let session: Session = self
            .store
            .get(collections::AUTH_SESSIONS, &refresh_token)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?
            .decode()?;

        if session.expires_at < Utc::now() {
            self.store
                .delete(collections::AUTH_SESSIONS, &refresh_token)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        if session.device_fingerprint != device_fingerprint {
            return Err(AuthError::InvalidRefreshToken);
        }

        // Rotation: whoever deletes the token first wins
        if !self
            .store
            .delete(collections::AUTH_SESSIONS, &refresh_token)
            .await?
        {
            return Err(AuthError::InvalidRefreshToken);
        }

        let account = self.load_account(&session.user_id).await?;
        self.create_session(&account, device_fingerprint).await
    }

    /// Logout user by invalidating refresh token
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - Refresh token to invalidate
    ///
    /// # Returns
    ///
    /// * `AuthResult<()>` - Success or error
    pub async fn logout(&self, refresh_token: String) -> AuthResult<()> {
        self.store
            .delete(collections::AUTH_SESSIONS, &refresh_token)
            .await?;
        Ok(())
    }

    /// Verify an access token
    ///
    /// # Arguments
    ///
    /// * `token` - JWT access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Store the account and give it a profile
    async fn create_account(&self, account: &AuthAccount) -> AuthResult<()> {
        self.store
            .insert(
                collections::AUTH_ACCOUNTS,
                &account.user_id,
                encode_doc(account)?,
            )
            .await?;

        self.profiles
            .ensure_profile(
                &account.user_id,
                &account.display_name,
                account.email.clone(),
            )
            .await?;
        Ok(())
    }

    async fn find_account(&self, field: &str, value: &str) -> AuthResult<Option<AuthAccount>> {
        let documents = self
            .store
            .list(collections::AUTH_ACCOUNTS, &Filter::new().eq(field, value))
            .await?;
        Ok(decode_all(&documents)?.into_iter().next())
    }

    async fn load_account(&self, user_id: &str) -> AuthResult<AuthAccount> {
        Ok(self
            .store
            .get(collections::AUTH_ACCOUNTS, user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .decode()?)
    }

    /// Record the login and issue tokens
    async fn start_session(
        &self,
        user_id: &UserId,
        device_fingerprint: String,
    ) -> AuthResult<(User, SessionTokens)> {
        let (account, ()) = modify(
            self.store.as_ref(),
            collections::AUTH_ACCOUNTS,
            user_id,
            |account: &mut AuthAccount| -> AuthResult<()> {
                account.last_login = Some(Utc::now());
                Ok(())
            },
        )
        .await?;

        let tokens = self.create_session(&account, device_fingerprint).await?;
        Ok((User::from(&account), tokens))
    }

    /// Create a new session with access and refresh tokens
    async fn create_session(
        &self,
        account: &AuthAccount,
        device_fingerprint: String,
    ) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(account)?;
        let refresh_token = Uuid::new_v4().to_string();

        let now = Utc::now();
        let session = Session {
            token: refresh_token.clone(),
            user_id: account.user_id.clone(),
            device_fingerprint,
            created_at: now,
            expires_at: now + self.refresh_token_duration,
        };
        self.store
            .insert(
                collections::AUTH_SESSIONS,
                &refresh_token,
                encode_doc(&session)?,
            )
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
            expires_in: self.access_token_duration.num_seconds(),
        })
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidPassword)
    }

    /// Generate JWT access token
    fn generate_access_token(&self, account: &AuthAccount) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: account.user_id.clone(),
            email: account.email.clone(),
            anonymous: account.provider == AuthProvider::Anonymous,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?)
    }
}

/// Validate password strength
///
/// At least 8 characters with one digit, one uppercase and one lowercase letter.
pub fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());

    if !has_digit || !has_uppercase || !has_lowercase {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number, one uppercase and one lowercase letter"
                .to_string(),
        ));
    }

    Ok(())
}

fn default_display_name(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or("Player")
        .to_string()
}
