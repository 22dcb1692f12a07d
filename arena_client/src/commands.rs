//! REPL command parsing.
//!
//! Parsing also runs the same field validators the server uses, so bad input
//! is rejected before any request is sent.

use arena::{
    auth::validate_password,
    profile::{ProfileUpdate, validation},
    tournament::{RoomDetails, TournamentResults, TournamentStatus},
};
use std::fmt;
use std::path::PathBuf;

/// Default number of transactions shown by `history`
pub const DEFAULT_HISTORY: usize = 10;

/// A parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Navigate to a page
    Go(String),
    Register {
        email: String,
        password: String,
        display_name: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Guest,
    Logout,
    Tournaments(Option<TournamentStatus>),
    Hosted,
    Joined,
    /// Start the tournament creation wizard
    Create,
    Join(String),
    Leave(String),
    SetStatus {
        id: String,
        status: TournamentStatus,
    },
    Room {
        id: String,
        room: RoomDetails,
    },
    Results {
        id: String,
        results: TournamentResults,
    },
    Banner {
        id: String,
        file: PathBuf,
    },
    Draft,
    DiscardDraft,
    Wallet,
    History(usize),
    Deposit {
        amount: i64,
        method: Option<String>,
    },
    Withdraw {
        amount: i64,
        method: Option<String>,
    },
    /// Stream live wallet updates until interrupted
    Watch,
    Profile,
    UpdateProfile(ProfileUpdate),
    Avatar(PathBuf),
    Available {
        ign: Option<String>,
        game_id: Option<String>,
    },
    Help,
    Quit,
}

impl Command {
    /// Whether the command calls a protected endpoint
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Command::Go(_)
                | Command::Register { .. }
                | Command::Login { .. }
                | Command::Guest
                | Command::Logout
                | Command::Tournaments(_)
                | Command::Help
                | Command::Quit
        )
    }
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Required arguments missing; holds the usage line.
    Usage(&'static str),
    /// Amount is not a positive whole number.
    InvalidAmount(String),
    /// Unknown tournament status.
    InvalidStatus(String),
    /// Result entry not of the form `POSITION=USER_ID`.
    InvalidResult(String),
    /// Field rejected by a validator.
    Invalid(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "Usage: {}", usage),
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a positive number (e.g., 'deposit 500')",
                value
            ),
            Self::InvalidStatus(value) => write!(
                f,
                "Unknown status '{}'. Use active, ongoing, completed or cancelled",
                value
            ),
            Self::InvalidResult(value) => write!(
                f,
                "Invalid result '{}'. Use POSITION=USER_ID (e.g., '1st=abc123')",
                value
            ),
            Self::Invalid(message) => write!(f, "{}", message),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP_TEXT: &str = "\
Navigation:
  go PATH                      Open a page (/, /auth, /home, /tournament/create,
                               /tournament/ID, /settings, /terms-and-privacy)
Account:
  register EMAIL PASSWORD [NAME]   Create an account
  login EMAIL PASSWORD         Sign in
  guest                        Sign in anonymously
  logout                       Sign out
Tournaments:
  tournaments [STATUS]         Browse tournaments
  hosted | joined              Your hosted / joined tournaments
  create                       Create a tournament (resumes your draft)
  draft | draft discard        Show or discard your saved draft
  join ID | leave ID           Join (pays entry fee) or leave (refunds it)
  start ID | cancel ID         Move your tournament to ongoing / cancel it
  room ID ROOM_ID PASSWORD     Share room credentials with participants
  results ID POS=USER...       Record results and pay prizes
  banner ID FILE               Upload a banner image
Wallet:
  wallet                       Show balance
  history [N]                  Recent transactions
  deposit AMOUNT [METHOD]      Simulated deposit
  withdraw AMOUNT [METHOD]     Simulated withdrawal
  watch                        Live balance updates (Ctrl+C to stop)
Profile:
  profile                      Show your profile
  set ign|gameid|name|email|phone VALUE   Update a field (empty phone clears it)
  avatar FILE                  Upload an avatar image
  check ign|gameid VALUE       Check availability
Other:
  help | quit";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use arena_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("wallet"), Ok(Command::Wallet));
/// assert_eq!(parse_command("join t-42"), Ok(Command::Join("t-42".to_string())));
/// assert!(parse_command("deposit -5").is_err());
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();

    let Some((&name, args)) = parts.split_first() else {
        return Err(ParseError::UnrecognizedCommand(String::new()));
    };

    match name {
        "go" => one_arg(args, "go PATH").map(Command::Go),
        "register" => parse_register(args),
        "login" => parse_login(args),
        "guest" => Ok(Command::Guest),
        "logout" => Ok(Command::Logout),
        "tournaments" => match args.first() {
            Some(status) => Ok(Command::Tournaments(Some(parse_status(status)?))),
            None => Ok(Command::Tournaments(None)),
        },
        "hosted" => Ok(Command::Hosted),
        "joined" => Ok(Command::Joined),
        "create" => Ok(Command::Create),
        "draft" => match args.first() {
            None => Ok(Command::Draft),
            Some(&"discard") => Ok(Command::DiscardDraft),
            Some(_) => Err(ParseError::Usage("draft [discard]")),
        },
        "join" => one_arg(args, "join ID").map(Command::Join),
        "leave" => one_arg(args, "leave ID").map(Command::Leave),
        "start" => one_arg(args, "start ID").map(|id| Command::SetStatus {
            id,
            status: TournamentStatus::Ongoing,
        }),
        "cancel" => one_arg(args, "cancel ID").map(|id| Command::SetStatus {
            id,
            status: TournamentStatus::Cancelled,
        }),
        "room" => match args {
            [id, room_id, password] => Ok(Command::Room {
                id: id.to_string(),
                room: RoomDetails {
                    room_id: room_id.to_string(),
                    password: password.to_string(),
                },
            }),
            _ => Err(ParseError::Usage("room ID ROOM_ID PASSWORD")),
        },
        "results" => parse_results(args),
        "banner" => match args {
            [id, file] => Ok(Command::Banner {
                id: id.to_string(),
                file: PathBuf::from(file),
            }),
            _ => Err(ParseError::Usage("banner ID FILE")),
        },
        "wallet" | "balance" => Ok(Command::Wallet),
        "history" => match args.first() {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::History)
                .ok_or_else(|| ParseError::InvalidAmount(value.to_string())),
            None => Ok(Command::History(DEFAULT_HISTORY)),
        },
        "deposit" => {
            let (amount, method) = parse_amount(args, "deposit AMOUNT [METHOD]")?;
            Ok(Command::Deposit { amount, method })
        }
        "withdraw" => {
            let (amount, method) = parse_amount(args, "withdraw AMOUNT [METHOD]")?;
            Ok(Command::Withdraw { amount, method })
        }
        "watch" => Ok(Command::Watch),
        "profile" => Ok(Command::Profile),
        "set" => parse_set(args),
        "avatar" => one_arg(args, "avatar FILE").map(|file| Command::Avatar(PathBuf::from(file))),
        "check" => parse_check(args),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

fn one_arg(args: &[&str], usage: &'static str) -> Result<String, ParseError> {
    match args {
        [value] => Ok(value.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn invalid(message: String) -> ParseError {
    ParseError::Invalid(message)
}

fn parse_status(value: &str) -> Result<TournamentStatus, ParseError> {
    value
        .to_lowercase()
        .parse()
        .map_err(|_| ParseError::InvalidStatus(value.to_string()))
}

fn parse_register(args: &[&str]) -> Result<Command, ParseError> {
    let [email, password, name @ ..] = args else {
        return Err(ParseError::Usage("register EMAIL PASSWORD [NAME]"));
    };

    validation::validate_email(email).map_err(|e| invalid(e.client_message()))?;
    validate_password(password).map_err(|e| invalid(e.client_message()))?;

    let display_name = if name.is_empty() {
        None
    } else {
        let name = name.join(" ");
        validation::validate_display_name(&name).map_err(|e| invalid(e.client_message()))?;
        Some(name)
    };

    Ok(Command::Register {
        email: email.to_string(),
        password: password.to_string(),
        display_name,
    })
}

fn parse_login(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [email, password] => Ok(Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(ParseError::Usage("login EMAIL PASSWORD")),
    }
}

fn parse_results(args: &[&str]) -> Result<Command, ParseError> {
    let [id, entries @ ..] = args else {
        return Err(ParseError::Usage("results ID POS=USER..."));
    };
    if entries.is_empty() {
        return Err(ParseError::Usage("results ID POS=USER..."));
    }

    let mut results = TournamentResults::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((position, user)) if !position.is_empty() && !user.is_empty() => {
                results.insert(position.to_string(), user.to_string());
            }
            _ => return Err(ParseError::InvalidResult(entry.to_string())),
        }
    }

    Ok(Command::Results {
        id: id.to_string(),
        results,
    })
}

fn parse_amount(args: &[&str], usage: &'static str) -> Result<(i64, Option<String>), ParseError> {
    let (value, method) = match args {
        [value] => (value, None),
        [value, method] => (value, Some(method.to_string())),
        _ => return Err(ParseError::Usage(usage)),
    };

    let amount = value
        .parse::<i64>()
        .ok()
        .filter(|amount| *amount > 0)
        .ok_or_else(|| ParseError::InvalidAmount(value.to_string()))?;
    Ok((amount, method))
}

fn parse_set(args: &[&str]) -> Result<Command, ParseError> {
    let [field, rest @ ..] = args else {
        return Err(ParseError::Usage("set ign|gameid|name|email|phone VALUE"));
    };
    let value = rest.join(" ");

    let mut update = ProfileUpdate::default();
    match *field {
        "ign" => {
            validation::validate_ign(&value).map_err(|e| invalid(e.client_message()))?;
            update.ign = Some(value);
        }
        "gameid" | "game_id" => {
            validation::validate_game_id(&value).map_err(|e| invalid(e.client_message()))?;
            update.game_id = Some(value);
        }
        "name" => {
            validation::validate_display_name(&value).map_err(|e| invalid(e.client_message()))?;
            update.display_name = Some(value);
        }
        "email" => {
            validation::validate_email(&value).map_err(|e| invalid(e.client_message()))?;
            update.email = Some(value);
        }
        "phone" => {
            if !value.is_empty() {
                validation::validate_phone(&value).map_err(|e| invalid(e.client_message()))?;
            }
            update.phone = Some(value);
        }
        _ => return Err(ParseError::Usage("set ign|gameid|name|email|phone VALUE")),
    }

    Ok(Command::UpdateProfile(update))
}

fn parse_check(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        ["ign", value] => {
            validation::validate_ign(value).map_err(|e| invalid(e.client_message()))?;
            Ok(Command::Available {
                ign: Some(value.to_string()),
                game_id: None,
            })
        }
        ["gameid" | "game_id", value] => {
            validation::validate_game_id(value).map_err(|e| invalid(e.client_message()))?;
            Ok(Command::Available {
                ign: None,
                game_id: Some(value.to_string()),
            })
        }
        _ => Err(ParseError::Usage("check ign|gameid VALUE")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Simple commands ===

    #[test]
    fn test_parse_single_word_commands() {
        assert_eq!(parse_command("guest"), Ok(Command::Guest));
        assert_eq!(parse_command("hosted"), Ok(Command::Hosted));
        assert_eq!(parse_command("balance"), Ok(Command::Wallet));
        assert_eq!(parse_command("watch"), Ok(Command::Watch));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(parse_command("  wallet  "), Ok(Command::Wallet));
        assert_eq!(
            parse_command("join   t1"),
            Ok(Command::Join("t1".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert!(parse_command("").is_err());
        assert_eq!(
            parse_command("dance"),
            Err(ParseError::UnrecognizedCommand("dance".to_string()))
        );
    }

    // === Tournaments ===

    #[test]
    fn test_parse_tournament_filters() {
        assert_eq!(parse_command("tournaments"), Ok(Command::Tournaments(None)));
        assert_eq!(
            parse_command("tournaments Ongoing"),
            Ok(Command::Tournaments(Some(TournamentStatus::Ongoing)))
        );
        assert_eq!(
            parse_command("tournaments paused"),
            Err(ParseError::InvalidStatus("paused".to_string()))
        );
    }

    #[test]
    fn test_parse_status_changes() {
        assert_eq!(
            parse_command("start t1"),
            Ok(Command::SetStatus {
                id: "t1".to_string(),
                status: TournamentStatus::Ongoing
            })
        );
        assert_eq!(
            parse_command("cancel t1"),
            Ok(Command::SetStatus {
                id: "t1".to_string(),
                status: TournamentStatus::Cancelled
            })
        );
        assert_eq!(parse_command("start"), Err(ParseError::Usage("start ID")));
    }

    #[test]
    fn test_parse_results() {
        let Ok(Command::Results { id, results }) = parse_command("results t1 1st=u1 2nd=u2") else {
            panic!("expected results command");
        };
        assert_eq!(id, "t1");
        assert_eq!(results.get("1st").map(String::as_str), Some("u1"));
        assert_eq!(results.get("2nd").map(String::as_str), Some("u2"));

        assert_eq!(
            parse_command("results t1 1st"),
            Err(ParseError::InvalidResult("1st".to_string()))
        );
        assert!(parse_command("results t1").is_err());
    }

    #[test]
    fn test_parse_room() {
        assert_eq!(
            parse_command("room t1 778812 pass"),
            Ok(Command::Room {
                id: "t1".to_string(),
                room: RoomDetails {
                    room_id: "778812".to_string(),
                    password: "pass".to_string()
                }
            })
        );
        assert!(parse_command("room t1 778812").is_err());
    }

    // === Wallet ===

    #[test]
    fn test_parse_amounts() {
        assert_eq!(
            parse_command("deposit 500 upi"),
            Ok(Command::Deposit {
                amount: 500,
                method: Some("upi".to_string())
            })
        );
        assert_eq!(
            parse_command("withdraw 100"),
            Ok(Command::Withdraw {
                amount: 100,
                method: None
            })
        );
        assert_eq!(
            parse_command("deposit 0"),
            Err(ParseError::InvalidAmount("0".to_string()))
        );
        assert_eq!(
            parse_command("deposit lots"),
            Err(ParseError::InvalidAmount("lots".to_string()))
        );
    }

    #[test]
    fn test_parse_history() {
        assert_eq!(parse_command("history"), Ok(Command::History(DEFAULT_HISTORY)));
        assert_eq!(parse_command("history 3"), Ok(Command::History(3)));
        assert!(parse_command("history 0").is_err());
    }

    // === Validation before submission ===

    #[test]
    fn test_register_validates_locally() {
        assert!(matches!(
            parse_command("register ace@example.com SecurePass123 Ace High"),
            Ok(Command::Register { display_name: Some(ref name), .. }) if name == "Ace High"
        ));
        assert!(matches!(
            parse_command("register not-an-email SecurePass123"),
            Err(ParseError::Invalid(_))
        ));
        assert!(matches!(
            parse_command("register ace@example.com weak"),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn test_set_profile_fields_validate() {
        assert_eq!(
            parse_command("set ign SniperKing"),
            Ok(Command::UpdateProfile(ProfileUpdate {
                ign: Some("SniperKing".to_string()),
                ..ProfileUpdate::default()
            }))
        );
        assert_eq!(
            parse_command("set ign ab"),
            Err(ParseError::Invalid(
                "IGN must be 3-20 characters, letters and numbers only".to_string()
            ))
        );
        assert_eq!(
            parse_command("set gameid 12345"),
            Err(ParseError::Invalid("Game ID must be 8-12 digits".to_string()))
        );
        assert!(parse_command("set phone 12ab").is_err());
        assert_eq!(
            parse_command("set phone"),
            Ok(Command::UpdateProfile(ProfileUpdate {
                phone: Some(String::new()),
                ..ProfileUpdate::default()
            }))
        );
    }

    #[test]
    fn test_parse_check() {
        assert_eq!(
            parse_command("check gameid 123456789"),
            Ok(Command::Available {
                ign: None,
                game_id: Some("123456789".to_string())
            })
        );
        assert!(parse_command("check ign x").is_err());
    }

    #[test]
    fn test_needs_session() {
        assert!(!Command::Guest.needs_session());
        assert!(!Command::Tournaments(None).needs_session());
        assert!(Command::Wallet.needs_session());
        assert!(Command::Join("t1".to_string()).needs_session());
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            ParseError::Usage("join ID").to_string(),
            "Usage: join ID"
        );
        assert!(
            ParseError::UnrecognizedCommand("x".to_string())
                .to_string()
                .contains("help")
        );
    }
}
