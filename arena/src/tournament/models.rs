//! Tournament data models.

use super::errors::{TournamentError, TournamentResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tournament ID type
pub type TournamentId = String;

/// Longest accepted tournament name
pub const MAX_NAME_LEN: usize = 80;

/// Smallest accepted capacity
pub const MIN_PARTICIPANTS: u32 = 2;

/// Largest accepted capacity
pub const MAX_PARTICIPANTS: u32 = 1000;

/// Team size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentMode {
    Solo,
    Duo,
    Squad,
}

impl std::fmt::Display for TournamentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentMode::Solo => write!(f, "Solo"),
            TournamentMode::Duo => write!(f, "Duo"),
            TournamentMode::Squad => write!(f, "Squad"),
        }
    }
}

/// Tournament status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Open for registration
    Active,
    /// Matches in progress
    Ongoing,
    /// Results recorded and prizes paid
    Completed,
    /// Cancelled, entry fees refunded
    Cancelled,
}

impl TournamentStatus {
    /// Whether the host may move a tournament from `self` to `next`
    ///
    /// `Completed` is only reachable through completion with results.
    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        matches!(
            (self, next),
            (TournamentStatus::Active, TournamentStatus::Ongoing)
                | (TournamentStatus::Active, TournamentStatus::Cancelled)
                | (TournamentStatus::Ongoing, TournamentStatus::Cancelled)
        )
    }

    /// Completed and cancelled tournaments no longer change
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TournamentStatus::Completed | TournamentStatus::Cancelled
        )
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentStatus::Active => write!(f, "active"),
            TournamentStatus::Ongoing => write!(f, "ongoing"),
            TournamentStatus::Completed => write!(f, "completed"),
            TournamentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TournamentStatus::Active),
            "ongoing" => Ok(TournamentStatus::Ongoing),
            "completed" => Ok(TournamentStatus::Completed),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(TournamentError::Validation(format!(
                "Unknown tournament status: {other}"
            ))),
        }
    }
}

/// One prize position and its share of the pool, in whole percent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeShare {
    pub position: String,
    pub percentage: u32,
}

impl PrizeShare {
    pub fn new(position: &str, percentage: u32) -> Self {
        Self {
            position: position.to_string(),
            percentage,
        }
    }
}

/// Game room credentials shared with participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetails {
    pub room_id: String,
    pub password: String,
}

/// Position label → winning user id
pub type TournamentResults = BTreeMap<String, String>;

/// Tournament model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: String,
    pub mode: TournamentMode,
    pub max_participants: u32,
    pub entry_fee: i64,
    /// Ordered; the first position absorbs payout rounding
    pub prize_distribution: Vec<PrizeShare>,
    pub start_time: DateTime<Utc>,
    pub room: Option<RoomDetails>,
    pub status: TournamentStatus,
    pub participants: Vec<String>,
    pub filled_spots: u32,
    pub host_id: String,
    pub banner_url: Option<String>,
    #[serde(default)]
    pub results: TournamentResults,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_full(&self) -> bool {
        self.filled_spots >= self.max_participants
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    /// Total of all entry fees collected
    pub fn prize_pool(&self) -> i64 {
        self.entry_fee.saturating_mul(i64::from(self.filled_spots))
    }

    /// Copy of the tournament as `viewer` may see it
    ///
    /// Room credentials are stripped unless the viewer hosts or joined.
    pub fn visible_to(&self, viewer: Option<&str>) -> Self {
        let mut tournament = self.clone();
        let privileged = viewer.is_some_and(|v| self.is_host(v) || self.is_participant(v));
        if !privileged {
            tournament.room = None;
        }
        tournament
    }

    /// Check that a user may join right now
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotJoinable` - Status is not active
    /// * `TournamentError::HostCannotJoin` - The user hosts this tournament
    /// * `TournamentError::AlreadyJoined` - The user is already a participant
    /// * `TournamentError::TournamentFull` - No spots left
    pub fn check_joinable(&self, user_id: &str) -> TournamentResult<()> {
        if self.status != TournamentStatus::Active {
            return Err(TournamentError::NotJoinable(self.status));
        }
        if self.is_host(user_id) {
            return Err(TournamentError::HostCannotJoin);
        }
        if self.is_participant(user_id) {
            return Err(TournamentError::AlreadyJoined);
        }
        if self.is_full() {
            return Err(TournamentError::TournamentFull);
        }
        Ok(())
    }
}

/// Input for creating a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub game: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: String,
    pub mode: TournamentMode,
    pub max_participants: u32,
    #[serde(default)]
    pub entry_fee: i64,
    pub prize_distribution: Vec<PrizeShare>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub banner_url: Option<String>,
}

impl NewTournament {
    /// Validate the input against `now`
    ///
    /// # Errors
    ///
    /// * `TournamentError::Validation` - Describes the first rejected field
    pub fn validate(&self, now: DateTime<Utc>) -> TournamentResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("Tournament name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(invalid(format!(
                "Tournament name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.game.trim().is_empty() {
            return Err(invalid("Game is required"));
        }
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&self.max_participants) {
            return Err(invalid(format!(
                "Maximum participants must be between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS}"
            )));
        }
        if self.entry_fee < 0 {
            return Err(invalid("Entry fee cannot be negative"));
        }
        if self.start_time <= now {
            return Err(invalid("Start time must be in the future"));
        }
        validate_prize_distribution(&self.prize_distribution)
    }
}

/// Check that the shares are labelled, positive, unique and total exactly 100
pub fn validate_prize_distribution(shares: &[PrizeShare]) -> TournamentResult<()> {
    if shares.is_empty() {
        return Err(invalid("At least one prize position is required"));
    }

    let mut seen = std::collections::HashSet::new();
    let mut total: u32 = 0;
    for share in shares {
        let position = share.position.trim();
        if position.is_empty() {
            return Err(invalid("Prize position labels cannot be empty"));
        }
        if !seen.insert(position) {
            return Err(invalid(format!("Duplicate prize position: {position}")));
        }
        if share.percentage == 0 {
            return Err(invalid(format!(
                "Prize share for {position} must be greater than 0"
            )));
        }
        total = total.saturating_add(share.percentage);
    }

    if total != 100 {
        return Err(invalid(format!(
            "Prize distribution must total 100%, got {total}%"
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> TournamentError {
    TournamentError::Validation(message.into())
}

/// In-progress tournament configuration, one per host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentDraft {
    #[serde(default)]
    pub host_id: String,
    /// Wizard step the host stopped at
    #[serde(default)]
    pub step: u32,
    pub name: Option<String>,
    pub game: Option<String>,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub mode: Option<TournamentMode>,
    pub max_participants: Option<u32>,
    pub entry_fee: Option<i64>,
    pub prize_distribution: Option<Vec<PrizeShare>>,
    pub start_time: Option<DateTime<Utc>>,
    pub banner_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
