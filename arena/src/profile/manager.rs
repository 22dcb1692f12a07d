//! Profile manager: player identity, uniqueness checks and avatars.

use super::{
    errors::{ProfileError, ProfileResult},
    models::{Availability, ProfileUpdate, UserProfile},
    validation::{
        ign_key, validate_display_name, validate_email, validate_game_id, validate_ign,
        validate_phone,
    },
};
use crate::{
    storage::{ObjectStore, UploadKind, object_path, validate_upload},
    store::{DocumentStore, Filter, StoreError, collections, encode, modify},
};
use chrono::Utc;
use std::sync::Arc;

/// Profile manager
#[derive(Clone)]
pub struct ProfileManager {
    store: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
}

impl ProfileManager {
    /// Create a new profile manager
    ///
    /// # Arguments
    ///
    /// * `store` - Document store holding the `users` collection
    /// * `objects` - Object store receiving avatar images
    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self { store, objects }
    }

    /// Get a user's profile
    pub async fn get_profile(&self, user_id: &str) -> ProfileResult<UserProfile> {
        let document = self
            .store
            .get(collections::USERS, user_id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;
        Ok(document.decode()?)
    }

    /// Create the profile on first sign-in, or return the existing one
    pub async fn ensure_profile(
        &self,
        user_id: &str,
        display_name: &str,
        email: Option<String>,
    ) -> ProfileResult<UserProfile> {
        if let Some(document) = self.store.get(collections::USERS, user_id).await? {
            return Ok(document.decode()?);
        }

        let profile = UserProfile::new(user_id, display_name.trim(), email);
        match self
            .store
            .insert(collections::USERS, user_id, encode(&profile)?)
            .await
        {
            Ok(_) => {
                log::info!("Created profile for user {user_id}");
                Ok(profile)
            }
            Err(StoreError::AlreadyExists { .. }) => self.get_profile(user_id).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Whether no other user holds this IGN (case-insensitive)
    ///
    /// # Arguments
    ///
    /// * `ign` - Candidate IGN
    /// * `requester` - The asking user, whose own record does not count
    pub async fn is_ign_available(&self, ign: &str, requester: &str) -> ProfileResult<bool> {
        self.is_unclaimed("ign_key", &ign_key(ign.trim()), requester)
            .await
    }

    /// Whether no other user has linked this game ID
    pub async fn is_game_id_available(
        &self,
        game_id: &str,
        requester: &str,
    ) -> ProfileResult<bool> {
        self.is_unclaimed("game_id", game_id.trim(), requester).await
    }

    /// Check the fields that were supplied
    ///
    /// Malformed values are reported as validation errors rather than as
    /// unavailable.
    pub async fn check_availability(
        &self,
        requester: &str,
        ign: Option<&str>,
        game_id: Option<&str>,
    ) -> ProfileResult<Availability> {
        let mut availability = Availability::default();

        if let Some(ign) = ign {
            validate_ign(ign.trim())?;
            availability.ign_available = Some(self.is_ign_available(ign, requester).await?);
        }
        if let Some(game_id) = game_id {
            validate_game_id(game_id.trim())?;
            availability.game_id_available =
                Some(self.is_game_id_available(game_id, requester).await?);
        }

        Ok(availability)
    }

    async fn is_unclaimed(&self, field: &str, value: &str, requester: &str) -> ProfileResult<bool> {
        let documents = self
            .store
            .list(collections::USERS, &Filter::new().eq(field, value))
            .await?;
        Ok(documents.iter().all(|document| document.id == requester))
    }

    /// Apply a partial update
    ///
    /// Only supplied fields are validated and changed. A changed IGN or game
    /// ID must not belong to anyone else. An empty phone clears it.
    ///
    /// # Errors
    ///
    /// * `ProfileError::Validation` - No field supplied, or a supplied field is malformed
    /// * `ProfileError::IgnTaken` - The IGN belongs to another user
    /// * `ProfileError::GameIdTaken` - The game ID belongs to another user
    /// * `ProfileError::NotFound` - The user has no profile
    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> ProfileResult<UserProfile> {
        if update.is_empty() {
            return Err(ProfileError::Validation("No fields to update".to_string()));
        }

        let ign = update.ign.map(|v| v.trim().to_string());
        let game_id = update.game_id.map(|v| v.trim().to_string());
        let display_name = update.display_name.map(|v| v.trim().to_string());
        let email = update.email.map(|v| v.trim().to_string());
        let phone = update.phone.map(|v| v.trim().to_string());

        if let Some(ign) = &ign {
            validate_ign(ign)?;
        }
        if let Some(game_id) = &game_id {
            validate_game_id(game_id)?;
        }
        if let Some(display_name) = &display_name {
            validate_display_name(display_name)?;
        }
        if let Some(email) = &email {
            validate_email(email)?;
        }
        if let Some(phone) = phone.as_deref().filter(|p| !p.is_empty()) {
            validate_phone(phone)?;
        }

        let current = self.get_profile(user_id).await?;
        if let Some(ign) = &ign
            && current.ign_key.as_deref() != Some(ign_key(ign).as_str())
            && !self.is_ign_available(ign, user_id).await?
        {
            return Err(ProfileError::IgnTaken);
        }
        if let Some(game_id) = &game_id
            && current.game_id.as_deref() != Some(game_id.as_str())
            && !self.is_game_id_available(game_id, user_id).await?
        {
            return Err(ProfileError::GameIdTaken);
        }

        let (profile, ()) = modify(
            self.store.as_ref(),
            collections::USERS,
            user_id,
            |profile: &mut UserProfile| -> ProfileResult<()> {
                if let Some(ign) = &ign {
                    profile.ign = Some(ign.clone());
                    profile.ign_key = Some(ign_key(ign));
                }
                if let Some(game_id) = &game_id {
                    profile.game_id = Some(game_id.clone());
                }
                if let Some(display_name) = &display_name {
                    profile.display_name = display_name.clone();
                }
                if let Some(email) = &email {
                    profile.email = Some(email.clone());
                }
                if let Some(phone) = &phone {
                    profile.phone = (!phone.is_empty()).then(|| phone.clone());
                }
                profile.updated_at = Utc::now();
                Ok(())
            },
        )
        .await
        .map_err(|e| match e {
            ProfileError::Store(StoreError::NotFound { id, .. }) => ProfileError::NotFound(id),
            other => other,
        })?;

        log::info!("Updated profile of user {user_id}");
        Ok(profile)
    }

    /// Upload an avatar image and store its URL on the profile
    ///
    /// # Errors
    ///
    /// * `ProfileError::Storage` - Wrong type, larger than the avatar limit, or empty
    pub async fn upload_avatar(
        &self,
        user_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ProfileResult<UserProfile> {
        let extension = validate_upload(UploadKind::Avatar, content_type, bytes.len())?;

        // Fail before writing the object if there is no profile to attach it to
        self.get_profile(user_id).await?;

        let path = object_path(UploadKind::Avatar, user_id, extension);
        let url = self.objects.put(&path, content_type, bytes).await?;

        let (profile, ()) = modify(
            self.store.as_ref(),
            collections::USERS,
            user_id,
            |profile: &mut UserProfile| -> ProfileResult<()> {
                profile.avatar_url = Some(url.clone());
                profile.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        Ok(profile)
    }
}
