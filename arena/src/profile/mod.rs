//! Profile module: player identity (IGN, game ID, contact details, avatar).
//!
//! IGNs are unique case-insensitively and game IDs are unique outright; both
//! checks ignore the requesting user's own record so re-saving a profile never
//! conflicts with itself. The validators in [`validation`] are shared with the
//! client so input is rejected before it is ever sent.

pub mod errors;
pub mod manager;
pub mod models;
pub mod validation;

pub use errors::{ProfileError, ProfileResult};
pub use manager::ProfileManager;
pub use models::{Availability, ProfileUpdate, UserProfile};
