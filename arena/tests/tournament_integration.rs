//! Integration tests for tournament functionality
//!
//! These tests drive the complete lifecycle through the public managers:
//! creation, joining with entry fees, room details, cancellation refunds and
//! completion payouts.

use arena::Arena;
use arena::storage::MemoryObjectStore;
use arena::store::MemoryStore;
use arena::tournament::{
    NewTournament, PrizeShare, RoomDetails, TournamentDraft, TournamentError, TournamentMode,
    TournamentResults, TournamentStatus,
};
use arena::wallet::{TransactionKind, TransactionStatus, WalletConfig, WalletError};
use chrono::{Duration, Utc};
use std::sync::Arc;

fn arena() -> Arena {
    Arena::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryObjectStore::new("http://files.test")),
        WalletConfig::instant(),
        "test_pepper".to_string(),
        "test_jwt_secret".to_string(),
    )
}

fn new_tournament(capacity: u32, entry_fee: i64) -> NewTournament {
    NewTournament {
        name: "Weekend Showdown".to_string(),
        game: "Free Fire".to_string(),
        description: "Custom room, 4 rounds".to_string(),
        rules: "No emulators".to_string(),
        mode: TournamentMode::Solo,
        max_participants: capacity,
        entry_fee,
        prize_distribution: vec![
            PrizeShare::new("1st", 50),
            PrizeShare::new("2nd", 30),
            PrizeShare::new("3rd", 20),
        ],
        start_time: Utc::now() + Duration::days(3),
        banner_url: None,
    }
}

async fn fund(arena: &Arena, user: &str, amount: i64) {
    arena.wallets.adjust_balance(user, amount).await.unwrap();
}

#[tokio::test]
async fn test_created_tournament_appears_in_hosted_list() {
    let arena = arena();
    let created = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 0))
        .await
        .unwrap();

    assert_eq!(created.status, TournamentStatus::Active);
    assert_eq!(created.filled_spots, 0);

    let hosted = arena.tournaments.list_hosted_by("host").await.unwrap();
    assert_eq!(hosted.len(), 1);
    assert_eq!(hosted[0].id, created.id);

    let active = arena
        .tournaments
        .list_tournaments(Some(TournamentStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert!(
        arena
            .tournaments
            .list_tournaments(Some(TournamentStatus::Ongoing))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_past_start_time_fails_with_message() {
    let arena = arena();
    let mut input = new_tournament(10, 0);
    input.start_time = Utc::now() - Duration::minutes(5);

    let err = arena
        .tournaments
        .create_tournament("host", input)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
    assert_eq!(err.client_message(), "Start time must be in the future");
    assert!(arena.tournaments.list_hosted_by("host").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_prize_distribution_must_total_100() {
    let arena = arena();
    let mut input = new_tournament(10, 0);
    input.prize_distribution = vec![PrizeShare::new("1st", 70), PrizeShare::new("2nd", 20)];

    let err = arena
        .tournaments
        .create_tournament("host", input)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("100%"));
}

#[tokio::test]
async fn test_create_deletes_draft() {
    let arena = arena();
    arena
        .tournaments
        .save_draft(
            "host",
            TournamentDraft {
                step: 2,
                name: Some("Half done".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let draft = arena.tournaments.get_draft("host").await.unwrap().unwrap();
    assert_eq!(draft.step, 2);
    assert_eq!(draft.host_id, "host");

    arena
        .tournaments
        .create_tournament("host", new_tournament(10, 0))
        .await
        .unwrap();
    assert!(arena.tournaments.get_draft("host").await.unwrap().is_none());
}

#[tokio::test]
async fn test_join_rules() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(2, 0))
        .await
        .unwrap();

    let err = arena.tournaments.join_tournament(&t.id, "host").await.unwrap_err();
    assert!(matches!(err, TournamentError::HostCannotJoin));

    arena.tournaments.join_tournament(&t.id, "p1").await.unwrap();
    let err = arena.tournaments.join_tournament(&t.id, "p1").await.unwrap_err();
    assert!(matches!(err, TournamentError::AlreadyJoined));

    let full = arena.tournaments.join_tournament(&t.id, "p2").await.unwrap();
    assert_eq!(full.filled_spots, 2);
    assert_eq!(full.participants, vec!["p1".to_string(), "p2".to_string()]);

    let err = arena.tournaments.join_tournament(&t.id, "p3").await.unwrap_err();
    assert!(matches!(err, TournamentError::TournamentFull));

    let joined = arena.tournaments.list_joined_by("p2").await.unwrap();
    assert_eq!(joined.len(), 1);

    let err = arena
        .tournaments
        .join_tournament("missing", "p1")
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_joins_never_overfill() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(5, 0))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let tournaments = arena.tournaments.clone();
        let id = t.id.clone();
        handles.push(tokio::spawn(async move {
            tournaments.join_tournament(&id, &format!("p{i}")).await
        }));
    }

    let mut joined = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            joined += 1;
        }
    }

    let t = arena.tournaments.get_tournament(&t.id).await.unwrap();
    assert!(joined <= 5);
    assert_eq!(t.filled_spots as usize, t.participants.len());
    assert_eq!(t.filled_spots as usize, joined);
}

#[tokio::test]
async fn test_entry_fee_charged_and_refunded_on_leave() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 100))
        .await
        .unwrap();

    // Broke players cannot join
    let err = arena.tournaments.join_tournament(&t.id, "p1").await.unwrap_err();
    assert!(matches!(
        err,
        TournamentError::Wallet(WalletError::InsufficientBalance { .. })
    ));
    assert_eq!(arena.tournaments.get_tournament(&t.id).await.unwrap().filled_spots, 0);

    fund(&arena, "p1", 250).await;
    arena.tournaments.join_tournament(&t.id, "p1").await.unwrap();
    assert_eq!(arena.wallets.balance("p1").await.unwrap(), 150);

    arena.tournaments.leave_tournament(&t.id, "p1").await.unwrap();
    assert_eq!(arena.wallets.balance("p1").await.unwrap(), 250);

    let history = arena.wallets.list_transactions("p1", 10).await.unwrap();
    let kinds: Vec<TransactionKind> = history
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Completed)
        .map(|tx| tx.kind)
        .collect();
    assert!(kinds.contains(&TransactionKind::EntryFee));
    assert!(kinds.contains(&TransactionKind::Refund));

    let err = arena.tournaments.leave_tournament(&t.id, "p1").await.unwrap_err();
    assert!(matches!(err, TournamentError::NotParticipant));
}

#[tokio::test]
async fn test_room_details_visibility() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 0))
        .await
        .unwrap();
    arena.tournaments.join_tournament(&t.id, "p1").await.unwrap();

    let room = RoomDetails {
        room_id: "ROOM42".to_string(),
        password: "hunter2".to_string(),
    };

    let err = arena
        .tournaments
        .set_room_details(&t.id, "p1", room.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotHost));

    let err = arena
        .tournaments
        .set_room_details(
            &t.id,
            "host",
            RoomDetails {
                room_id: " ".to_string(),
                password: "x".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));

    let t = arena
        .tournaments
        .set_room_details(&t.id, "host", room.clone())
        .await
        .unwrap();

    assert_eq!(t.visible_to(Some("host")).room, Some(room.clone()));
    assert_eq!(t.visible_to(Some("p1")).room, Some(room));
    assert!(t.visible_to(Some("stranger")).room.is_none());
    assert!(t.visible_to(None).room.is_none());
}

#[tokio::test]
async fn test_cancellation_refunds_everyone() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 40))
        .await
        .unwrap();

    for player in ["p1", "p2", "p3"] {
        fund(&arena, player, 40).await;
        arena.tournaments.join_tournament(&t.id, player).await.unwrap();
        assert_eq!(arena.wallets.balance(player).await.unwrap(), 0);
    }

    let err = arena
        .tournaments
        .update_status(&t.id, "p1", TournamentStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotHost));

    let t = arena
        .tournaments
        .update_status(&t.id, "host", TournamentStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(t.status, TournamentStatus::Cancelled);

    for player in ["p1", "p2", "p3"] {
        assert_eq!(arena.wallets.balance(player).await.unwrap(), 40);
    }

    let err = arena
        .tournaments
        .update_status(&t.id, "host", TournamentStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidTransition { .. }));

    let err = arena
        .tournaments
        .set_room_details(
            &t.id,
            "host",
            RoomDetails {
                room_id: "r".to_string(),
                password: "p".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));
}

#[tokio::test]
async fn test_completion_pays_out_pool() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 33))
        .await
        .unwrap();

    let players = ["p1", "p2", "p3", "p4"];
    for player in players {
        fund(&arena, player, 33).await;
        arena.tournaments.join_tournament(&t.id, player).await.unwrap();
    }

    let mut results = TournamentResults::new();
    results.insert("1st".to_string(), "p3".to_string());
    results.insert("2nd".to_string(), "p1".to_string());
    results.insert("3rd".to_string(), "p4".to_string());

    // Still active
    let err = arena
        .tournaments
        .complete_tournament(&t.id, "host", results.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::InvalidTransition { .. }));

    arena
        .tournaments
        .update_status(&t.id, "host", TournamentStatus::Ongoing)
        .await
        .unwrap();

    // Joining is closed once ongoing
    let err = arena.tournaments.join_tournament(&t.id, "late").await.unwrap_err();
    assert!(matches!(err, TournamentError::NotJoinable(TournamentStatus::Ongoing)));

    let mut bad = results.clone();
    bad.insert("4th".to_string(), "p2".to_string());
    let err = arena
        .tournaments
        .complete_tournament(&t.id, "host", bad)
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::Validation(_)));

    let t = arena
        .tournaments
        .complete_tournament(&t.id, "host", results)
        .await
        .unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.prize_pool(), 132);

    // 132: 66 / 39 / 26 floored = 131, remainder 1 to 1st
    assert_eq!(arena.wallets.balance("p3").await.unwrap(), 67);
    assert_eq!(arena.wallets.balance("p1").await.unwrap(), 39);
    assert_eq!(arena.wallets.balance("p4").await.unwrap(), 26);
    assert_eq!(arena.wallets.balance("p2").await.unwrap(), 0);

    let mut paid = 0;
    for player in players {
        paid += arena.wallets.balance(player).await.unwrap();
    }
    assert_eq!(paid, t.prize_pool());
}

async fn ongoing_with_players(arena: &Arena, players: &[&str], entry_fee: i64) -> String {
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, entry_fee))
        .await
        .unwrap();
    for player in players {
        fund(arena, player, entry_fee).await;
        arena.tournaments.join_tournament(&t.id, player).await.unwrap();
    }
    arena
        .tournaments
        .update_status(&t.id, "host", TournamentStatus::Ongoing)
        .await
        .unwrap();
    t.id
}

#[tokio::test]
async fn test_partial_results_are_rejected() {
    let arena = arena();
    let id = ongoing_with_players(&arena, &["p1", "p2", "p3"], 100).await;

    let partials = [
        vec![("2nd", "p1"), ("3rd", "p2")],
        vec![("1st", "p1"), ("3rd", "p2")],
        vec![("1st", "p1")],
    ];
    for partial in partials {
        let results: TournamentResults = partial
            .iter()
            .map(|(position, winner)| (position.to_string(), winner.to_string()))
            .collect();
        let err = arena
            .tournaments
            .complete_tournament(&id, "host", results)
            .await
            .unwrap_err();
        assert!(matches!(err, TournamentError::Validation(ref msg) if msg.starts_with("No winner named for")));
    }

    // Nothing was saved or paid
    let t = arena.tournaments.get_tournament(&id).await.unwrap();
    assert_eq!(t.status, TournamentStatus::Ongoing);
    assert!(t.results.is_empty());
    for player in ["p1", "p2", "p3"] {
        assert_eq!(arena.wallets.balance(player).await.unwrap(), 0);
    }

    // One player may hold several positions when the field is small
    let mut results = TournamentResults::new();
    results.insert("1st".to_string(), "p1".to_string());
    results.insert("2nd".to_string(), "p1".to_string());
    results.insert("3rd".to_string(), "p2".to_string());
    arena
        .tournaments
        .complete_tournament(&id, "host", results)
        .await
        .unwrap();
    assert_eq!(arena.wallets.balance("p1").await.unwrap(), 240);
    assert_eq!(arena.wallets.balance("p2").await.unwrap(), 60);
}

#[tokio::test]
async fn test_failed_prize_credit_does_not_block_other_winners() {
    let arena = arena();
    let id = ongoing_with_players(&arena, &["p1", "p2", "p3"], 100).await;

    // p1's wallet cannot take another credit
    fund(&arena, "p1", i64::MAX).await;

    let mut results = TournamentResults::new();
    results.insert("1st".to_string(), "p1".to_string());
    results.insert("2nd".to_string(), "p2".to_string());
    results.insert("3rd".to_string(), "p3".to_string());
    let t = arena
        .tournaments
        .complete_tournament(&id, "host", results)
        .await
        .unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);

    assert_eq!(arena.wallets.balance("p1").await.unwrap(), i64::MAX);
    assert_eq!(arena.wallets.balance("p2").await.unwrap(), 90);
    assert_eq!(arena.wallets.balance("p3").await.unwrap(), 60);

    let history = arena.wallets.list_transactions("p1", 10).await.unwrap();
    assert!(
        history
            .iter()
            .any(|tx| tx.kind == TransactionKind::Prize && tx.status == TransactionStatus::Failed)
    );
}

#[tokio::test]
async fn test_leave_keeps_failed_refund_on_record() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 100))
        .await
        .unwrap();
    fund(&arena, "p1", 100).await;
    arena.tournaments.join_tournament(&t.id, "p1").await.unwrap();
    fund(&arena, "p1", i64::MAX).await;

    let left = arena.tournaments.leave_tournament(&t.id, "p1").await.unwrap();
    assert!(!left.is_participant("p1"));

    let history = arena.wallets.list_transactions("p1", 10).await.unwrap();
    assert!(
        history
            .iter()
            .any(|tx| tx.kind == TransactionKind::Refund && tx.status == TransactionStatus::Failed)
    );
}

#[tokio::test]
async fn test_banner_upload_host_only() {
    let arena = arena();
    let t = arena
        .tournaments
        .create_tournament("host", new_tournament(10, 0))
        .await
        .unwrap();

    let err = arena
        .tournaments
        .upload_banner(&t.id, "p1", "image/jpeg", vec![0xFF, 0xD8])
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::NotHost));

    let err = arena
        .tournaments
        .upload_banner(&t.id, "host", "application/pdf", vec![1])
        .await
        .unwrap_err();
    assert!(matches!(err, TournamentError::Storage(_)));

    let t = arena
        .tournaments
        .upload_banner(&t.id, "host", "image/jpeg", vec![0xFF, 0xD8])
        .await
        .unwrap();
    let url = t.banner_url.unwrap();
    assert!(url.starts_with(&format!("http://files.test/banners/{}/", t.id)));
}
