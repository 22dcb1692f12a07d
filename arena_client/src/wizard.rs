//! Tournament creation wizard.
//!
//! Each step fills one part of a [`TournamentDraft`]; the draft is saved
//! after every step so an interrupted wizard resumes where it stopped.

use arena::tournament::{NewTournament, PrizeShare, TournamentDraft, TournamentMode};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Name,
    Game,
    Mode,
    MaxParticipants,
    EntryFee,
    Prizes,
    StartTime,
    Description,
    Rules,
}

pub const STEPS: [Step; 9] = [
    Step::Name,
    Step::Game,
    Step::Mode,
    Step::MaxParticipants,
    Step::EntryFee,
    Step::Prizes,
    Step::StartTime,
    Step::Description,
    Step::Rules,
];

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

impl Step {
    pub fn prompt(self) -> &'static str {
        match self {
            Step::Name => "Tournament name",
            Step::Game => "Game",
            Step::Mode => "Mode (solo/duo/squad)",
            Step::MaxParticipants => "Maximum participants",
            Step::EntryFee => "Entry fee (0 for free)",
            Step::Prizes => "Prize split (e.g. 1st=60,2nd=40)",
            Step::StartTime => "Start time, UTC (YYYY-MM-DD HH:MM)",
            Step::Description => "Description (optional)",
            Step::Rules => "Rules (optional)",
        }
    }

    /// The draft's current answer, shown as the default
    pub fn current(self, draft: &TournamentDraft) -> Option<String> {
        match self {
            Step::Name => draft.name.clone(),
            Step::Game => draft.game.clone(),
            Step::Mode => draft.mode.map(|m| m.to_string().to_lowercase()),
            Step::MaxParticipants => draft.max_participants.map(|n| n.to_string()),
            Step::EntryFee => draft.entry_fee.map(|n| n.to_string()),
            Step::Prizes => draft.prize_distribution.as_deref().map(format_prizes),
            Step::StartTime => draft
                .start_time
                .map(|t| t.format(START_TIME_FORMAT).to_string()),
            Step::Description => draft.description.clone(),
            Step::Rules => draft.rules.clone(),
        }
    }

    /// Record an answer on the draft
    pub fn apply(self, draft: &mut TournamentDraft, input: &str) -> Result<(), String> {
        let input = input.trim();
        match self {
            Step::Name => draft.name = Some(required(input, "Tournament name")?),
            Step::Game => draft.game = Some(required(input, "Game")?),
            Step::Mode => draft.mode = Some(parse_mode(input)?),
            Step::MaxParticipants => {
                draft.max_participants = Some(
                    input
                        .parse()
                        .map_err(|_| format!("'{input}' is not a whole number"))?,
                )
            }
            Step::EntryFee => {
                draft.entry_fee = Some(
                    input
                        .parse()
                        .map_err(|_| format!("'{input}' is not a whole number"))?,
                )
            }
            Step::Prizes => draft.prize_distribution = Some(parse_prizes(input)?),
            Step::StartTime => draft.start_time = Some(parse_start_time(input)?),
            Step::Description => draft.description = Some(input.to_string()),
            Step::Rules => draft.rules = Some(input.to_string()),
        }
        Ok(())
    }
}

fn required(input: &str, field: &str) -> Result<String, String> {
    if input.is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(input.to_string())
    }
}

pub fn parse_mode(input: &str) -> Result<TournamentMode, String> {
    match input.to_lowercase().as_str() {
        "solo" => Ok(TournamentMode::Solo),
        "duo" => Ok(TournamentMode::Duo),
        "squad" => Ok(TournamentMode::Squad),
        _ => Err(format!("Unknown mode '{input}'. Use solo, duo or squad")),
    }
}

/// Parse `1st=60,2nd=40` into ordered shares
pub fn parse_prizes(input: &str) -> Result<Vec<PrizeShare>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| -> Result<PrizeShare, String> {
            let (position, percentage) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid prize '{entry}'. Use POSITION=PERCENT"))?;
            let percentage = percentage
                .trim()
                .trim_end_matches('%')
                .parse()
                .map_err(|_| format!("Invalid percentage in '{entry}'"))?;
            Ok(PrizeShare::new(position.trim(), percentage))
        })
        .collect()
}

pub fn format_prizes(shares: &[PrizeShare]) -> String {
    shares
        .iter()
        .map(|s| format!("{}={}", s.position, s.percentage))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn parse_start_time(input: &str) -> Result<DateTime<Utc>, String> {
    NaiveDateTime::parse_from_str(input, START_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("Invalid start time '{input}'. Use YYYY-MM-DD HH:MM"))
}

/// Build the creation request from a finished draft
///
/// Field rules are left to [`NewTournament::validate`]; this only checks that
/// every required step was answered.
pub fn build(draft: &TournamentDraft) -> Result<NewTournament, String> {
    let missing = |step: Step| format!("{} is missing", step.prompt());
    Ok(NewTournament {
        name: draft.name.clone().ok_or_else(|| missing(Step::Name))?,
        game: draft.game.clone().ok_or_else(|| missing(Step::Game))?,
        description: draft.description.clone().unwrap_or_default(),
        rules: draft.rules.clone().unwrap_or_default(),
        mode: draft.mode.ok_or_else(|| missing(Step::Mode))?,
        max_participants: draft
            .max_participants
            .ok_or_else(|| missing(Step::MaxParticipants))?,
        entry_fee: draft.entry_fee.unwrap_or(0),
        prize_distribution: draft
            .prize_distribution
            .clone()
            .ok_or_else(|| missing(Step::Prizes))?,
        start_time: draft.start_time.ok_or_else(|| missing(Step::StartTime))?,
        banner_url: draft.banner_url.clone(),
    })
}
