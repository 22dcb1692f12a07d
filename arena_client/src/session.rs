//! Session context shared by every page.
//!
//! Holds the signed-in user and the tournaments they host. The hosted list
//! is refetched whenever the session changes to a different user and cleared
//! on sign-out.

use anyhow::Result;
use arena::{auth::User, tournament::Tournament};

use crate::api_client::ApiClient;

#[derive(Debug, Default)]
pub struct SessionContext {
    user: Option<User>,
    hosted: Vec<Tournament>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Tournaments hosted by the signed-in user, newest first
    pub fn hosted(&self) -> &[Tournament] {
        &self.hosted
    }

    /// Switch to a new session (or none), refetching dependent data
    pub async fn set_user(&mut self, api: &ApiClient, user: Option<User>) -> Result<()> {
        let changed = self.user.as_ref().map(|u| &u.id) != user.as_ref().map(|u| &u.id);
        self.user = user;

        if !changed {
            return Ok(());
        }
        if self.user.is_some() {
            self.refresh_hosted(api).await
        } else {
            self.hosted.clear();
            Ok(())
        }
    }

    /// Refetch the hosted list, e.g. after creating a tournament
    pub async fn refresh_hosted(&mut self, api: &ApiClient) -> Result<()> {
        self.hosted = if self.user.is_some() {
            api.list_hosted().await?
        } else {
            Vec::new()
        };
        Ok(())
    }
}
