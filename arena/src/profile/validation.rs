//! Field validators shared by the service and the client.
//!
//! Each validator returns the message shown to the user when the value is
//! rejected.

use super::errors::{ProfileError, ProfileResult};
use regex::Regex;
use std::sync::LazyLock;

static IGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{3,20}$").expect("IGN pattern"));

static GAME_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8,12}$").expect("game ID pattern"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("phone pattern"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern")
});

/// Longest accepted display name
pub const MAX_DISPLAY_NAME_LEN: usize = 50;

/// In-game name: 3-20 letters or digits
pub fn validate_ign(ign: &str) -> ProfileResult<()> {
    if IGN_RE.is_match(ign) {
        Ok(())
    } else {
        Err(ProfileError::Validation(
            "IGN must be 3-20 characters, letters and numbers only".to_string(),
        ))
    }
}

/// Game account id: 8-12 digits
pub fn validate_game_id(game_id: &str) -> ProfileResult<()> {
    if GAME_ID_RE.is_match(game_id) {
        Ok(())
    } else {
        Err(ProfileError::Validation(
            "Game ID must be 8-12 digits".to_string(),
        ))
    }
}

/// Phone number: 10-15 digits with an optional leading `+`
pub fn validate_phone(phone: &str) -> ProfileResult<()> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ProfileError::Validation(
            "Phone number must be 10-15 digits, optionally starting with +".to_string(),
        ))
    }
}

pub fn validate_email(email: &str) -> ProfileResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ProfileError::Validation(
            "Please enter a valid email address".to_string(),
        ))
    }
}

pub fn validate_display_name(display_name: &str) -> ProfileResult<()> {
    let len = display_name.trim().chars().count();
    if len == 0 || len > MAX_DISPLAY_NAME_LEN {
        return Err(ProfileError::Validation(format!(
            "Display name must be 1-{MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Key used for case-insensitive IGN uniqueness
pub fn ign_key(ign: &str) -> String {
    ign.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ign() {
        assert!(validate_ign("Sniper01").is_ok());
        assert!(validate_ign("ab").is_err());
        assert!(validate_ign("has space").is_err());
        assert!(validate_ign("under_score").is_err());
        assert!(validate_ign(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_game_id() {
        assert!(validate_game_id("12345678").is_ok());
        assert!(validate_game_id("123456789012").is_ok());
        assert!(validate_game_id("1234567").is_err());
        assert!(validate_game_id("1234567890123").is_err());
        assert!(validate_game_id("12345678a").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("+919876543210").is_ok());
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("98765").is_err());
        assert!(validate_phone("+91 98765 43210").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("player@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.co.uk").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("user@host").is_err());
        assert!(validate_email("user @example.com").is_err());
    }

    #[test]
    fn test_display_name() {
        assert!(validate_display_name("Ace").is_ok());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(51)).is_err());
    }

    proptest! {
        #[test]
        fn prop_alphanumeric_igns_accepted(ign in "[A-Za-z0-9]{3,20}") {
            prop_assert!(validate_ign(&ign).is_ok());
        }

        #[test]
        fn prop_short_igns_rejected(ign in "[A-Za-z0-9]{0,2}") {
            prop_assert!(validate_ign(&ign).is_err());
        }

        #[test]
        fn prop_game_ids_are_digits_only(id in "[0-9]{8,12}", junk in "[a-z]") {
            prop_assert!(validate_game_id(&id).is_ok());
            let with_junk = format!("{id}{junk}");
            prop_assert!(validate_game_id(&with_junk).is_err());
        }

        #[test]
        fn prop_ign_key_is_case_insensitive(ign in "[A-Za-z0-9]{3,20}") {
            prop_assert_eq!(ign_key(&ign), ign_key(&ign.to_uppercase()));
        }
    }
}
