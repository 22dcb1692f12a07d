//! Text rendering for client pages.

use arena::{
    auth::User,
    profile::UserProfile,
    tournament::{Tournament, TournamentDraft, calculate_payouts},
    wallet::{Transaction, Wallet},
};
use chrono::{DateTime, Utc};

pub const LANDING: &str = "\
Welcome to Arena!

Host and join mobile esports tournaments. Entry fees go into the prize pool
and winners are paid straight to their wallet.

Type 'go /auth' to sign in, or 'tournaments' to browse what's on.";

pub const TERMS: &str = "\
Terms and Privacy

Deposits and withdrawals are simulated; no real money changes hands.
Entry fees are refunded when you leave an open tournament or the host
cancels it. Prizes are split by the published distribution once the host
records results. Your in-game name and game ID are shown to other players.";

fn timestamp(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// One-line summary used in lists
pub fn tournament_line(tournament: &Tournament) -> String {
    format!(
        "[{}] {} - {} {} - {}/{} joined - entry {} - starts {} ({})",
        tournament.id,
        tournament.name,
        tournament.game,
        tournament.mode,
        tournament.filled_spots,
        tournament.max_participants,
        tournament.entry_fee,
        timestamp(&tournament.start_time),
        tournament.status
    )
}

pub fn tournament_list(title: &str, tournaments: &[Tournament]) -> String {
    if tournaments.is_empty() {
        return format!("{title}: none");
    }
    let mut out = format!("{title}:");
    for tournament in tournaments {
        out.push_str("\n  ");
        out.push_str(&tournament_line(tournament));
    }
    out
}

/// Full tournament page as `viewer` sees it
pub fn tournament_detail(tournament: &Tournament, viewer: Option<&str>) -> String {
    let mut lines = vec![
        format!("{} ({})", tournament.name, tournament.status),
        format!("Game: {} - {}", tournament.game, tournament.mode),
        format!("Starts: {}", timestamp(&tournament.start_time)),
        format!(
            "Spots: {}/{}{}",
            tournament.filled_spots,
            tournament.max_participants,
            if tournament.is_full() { " (full)" } else { "" }
        ),
        format!(
            "Entry fee: {} - prize pool: {}",
            tournament.entry_fee,
            tournament.prize_pool()
        ),
    ];

    if !tournament.description.is_empty() {
        lines.push(format!("About: {}", tournament.description));
    }
    if !tournament.rules.is_empty() {
        lines.push(format!("Rules: {}", tournament.rules));
    }
    if let Some(banner) = &tournament.banner_url {
        lines.push(format!("Banner: {banner}"));
    }

    lines.push("Prizes:".to_string());
    let payouts = calculate_payouts(tournament.prize_pool(), &tournament.prize_distribution);
    for (share, (_, amount)) in tournament.prize_distribution.iter().zip(payouts) {
        lines.push(format!(
            "  {}: {}% ({})",
            share.position, share.percentage, amount
        ));
    }

    if let Some(room) = &tournament.room {
        lines.push(format!(
            "Room: {} / password {}",
            room.room_id, room.password
        ));
    }
    for (position, user) in &tournament.results {
        lines.push(format!("Result {position}: {user}"));
    }

    if let Some(viewer) = viewer {
        if tournament.is_host(viewer) {
            lines.push("You host this tournament.".to_string());
        } else if tournament.is_participant(viewer) {
            lines.push("You have joined.".to_string());
        } else if tournament.check_joinable(viewer).is_ok() {
            lines.push(format!("Type 'join {}' to enter.", tournament.id));
        }
    }

    lines.join("\n")
}

pub fn draft_summary(draft: &TournamentDraft) -> String {
    let field = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    [
        format!("Saved draft (step {}):", draft.step),
        format!("  Name: {}", field(draft.name.clone())),
        format!("  Game: {}", field(draft.game.clone())),
        format!("  Mode: {}", field(draft.mode.map(|m| m.to_string()))),
        format!(
            "  Max participants: {}",
            field(draft.max_participants.map(|n| n.to_string()))
        ),
        format!("  Entry fee: {}", field(draft.entry_fee.map(|n| n.to_string()))),
        format!("  Starts: {}", field(draft.start_time.as_ref().map(timestamp))),
    ]
    .join("\n")
}

pub fn wallet(wallet: &Wallet) -> String {
    format!(
        "Balance: {} coins (updated {})",
        wallet.balance,
        timestamp(&wallet.updated_at)
    )
}

pub fn transaction_line(transaction: &Transaction) -> String {
    format!(
        "{}  {:<10} {:>+8}  {}",
        timestamp(&transaction.created_at),
        transaction.kind,
        transaction.amount,
        transaction.status
    )
}

pub fn transactions(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions yet".to_string();
    }
    transactions
        .iter()
        .map(transaction_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile(user: &User, profile: &UserProfile) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let mut lines = vec![
        format!(
            "{}{}",
            profile.display_name,
            if user.is_anonymous { " (guest)" } else { "" }
        ),
        format!("IGN: {}", field(&profile.ign)),
        format!("Game ID: {}", field(&profile.game_id)),
        format!("Email: {}", field(&profile.email)),
        format!("Phone: {}", field(&profile.phone)),
    ];
    if let Some(avatar) = &profile.avatar_url {
        lines.push(format!("Avatar: {avatar}"));
    }
    if profile.is_premium {
        lines.push("Premium member".to_string());
    }
    if !profile.is_complete() {
        lines.push(
            "Link your IGN and game ID with 'set ign NAME' and 'set gameid NUMBER'."
                .to_string(),
        );
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena::tournament::{PrizeShare, RoomDetails, TournamentMode, TournamentStatus};
    use chrono::TimeZone;

    fn sample() -> Tournament {
        let start = Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap();
        Tournament {
            id: "t1".to_string(),
            name: "Friday Scrims".to_string(),
            game: "Free Fire".to_string(),
            description: String::new(),
            rules: String::new(),
            mode: TournamentMode::Squad,
            max_participants: 4,
            entry_fee: 50,
            prize_distribution: vec![PrizeShare::new("1st", 70), PrizeShare::new("2nd", 30)],
            start_time: start,
            room: None,
            status: TournamentStatus::Active,
            participants: vec!["p1".to_string(), "p2".to_string()],
            filled_spots: 2,
            host_id: "host".to_string(),
            banner_url: None,
            results: Default::default(),
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_tournament_line() {
        assert_eq!(
            tournament_line(&sample()),
            "[t1] Friday Scrims - Free Fire Squad - 2/4 joined - entry 50 - starts 2026-11-01 18:00 UTC (active)"
        );
    }

    #[test]
    fn test_detail_shows_prize_split() {
        let detail = tournament_detail(&sample(), None);
        assert!(detail.contains("prize pool: 100"));
        assert!(detail.contains("1st: 70% (70)"));
        assert!(detail.contains("2nd: 30% (30)"));
    }

    #[test]
    fn test_detail_reflects_viewer() {
        let mut tournament = sample();
        tournament.room = Some(RoomDetails {
            room_id: "9911".to_string(),
            password: "pw".to_string(),
        });

        assert!(tournament_detail(&tournament, Some("host")).contains("You host"));
        assert!(tournament_detail(&tournament, Some("p1")).contains("Room: 9911"));
        assert!(tournament_detail(&tournament, Some("p3")).contains("join t1"));
    }

    #[test]
    fn test_profile_prompts_until_complete() {
        let user = User {
            id: "u1".to_string(),
            email: None,
            display_name: "Ace".to_string(),
            is_anonymous: true,
            created_at: Utc::now(),
            last_login: None,
        };
        let mut player = UserProfile::new("u1", "Ace", None);
        player.ign = Some("Sniper".to_string());

        let page = profile(&user, &player);
        assert!(page.starts_with("Ace (guest)"));
        assert!(page.contains("Link your IGN and game ID"));

        player.game_id = Some("1234567890".to_string());
        assert!(!profile(&user, &player).contains("Link your IGN"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(tournament_list("Hosted", &[]), "Hosted: none");
        assert_eq!(transactions(&[]), "No transactions yet");
    }
}
