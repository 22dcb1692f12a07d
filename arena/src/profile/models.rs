//! Profile data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Player profile, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub ign: Option<String>,
    /// Lower-cased IGN, used for uniqueness
    pub ign_key: Option<String>,
    pub game_id: Option<String>,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user_id: &str, display_name: &str, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            ign: None,
            ign_key: None,
            game_id: None,
            display_name: display_name.to_string(),
            email,
            phone: None,
            avatar_url: None,
            is_premium: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the player has linked an IGN and game ID
    pub fn is_complete(&self) -> bool {
        self.ign.is_some() && self.game_id.is_some()
    }
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub ign: Option<String>,
    pub game_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.ign.is_none()
            && self.game_id.is_none()
            && self.display_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
    }
}

/// Result of an availability check; unchecked fields stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub ign_available: Option<bool>,
    pub game_id_available: Option<bool>,
}
