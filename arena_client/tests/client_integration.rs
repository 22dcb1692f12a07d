//! Integration tests for arena_client against an in-process server.
//!
//! Network failure cases talk to closed ports; everything else runs the real
//! router on an ephemeral port with in-memory stores.

use arena::{
    Arena,
    auth::{LoginRequest, RegisterRequest},
    profile::ProfileUpdate,
    storage::MemoryObjectStore,
    store::MemoryStore,
    tournament::{NewTournament, PrizeShare, TournamentDraft, TournamentMode, TournamentStatus},
    wallet::{TransactionDetails, WalletConfig},
};
use arena_client::{api_client::ApiClient, session::SessionContext};
use arena_server::api::{AppState, create_router};
use chrono::{Duration, Utc};
use std::sync::Arc;

async fn start_server() -> String {
    let store = Arc::new(MemoryStore::new());
    let objects = Arc::new(MemoryObjectStore::new("http://localhost/files"));
    let arena = Arena::new(
        store.clone(),
        objects.clone(),
        WalletConfig::instant(),
        "test_pepper_for_testing_only".to_string(),
        "test_secret_key_for_testing_only_0123456789".to_string(),
    );
    let app = create_router(AppState::new(arena, store, objects));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn registered_client(base_url: &str, email: &str) -> ApiClient {
    let mut client = ApiClient::new(base_url.to_string());
    client
        .register(RegisterRequest {
            email: email.to_string(),
            password: "SecurePass123".to_string(),
            display_name: None,
        })
        .await
        .unwrap();
    client
}

fn new_tournament(entry_fee: i64) -> NewTournament {
    NewTournament {
        name: "Friday Scrims".to_string(),
        game: "Free Fire".to_string(),
        description: String::new(),
        rules: String::new(),
        mode: TournamentMode::Squad,
        max_participants: 8,
        entry_fee,
        prize_distribution: vec![PrizeShare::new("1st", 100)],
        start_time: Utc::now() + Duration::days(1),
        banner_url: None,
    }
}

// ============================================================================
// Network Error Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_connection_refused() {
    let mut client = ApiClient::new("http://localhost:19999".to_string());

    let result = client
        .login(LoginRequest {
            email: "ace@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await;

    let error_msg = result.unwrap_err().to_string();
    assert!(
        error_msg.contains("Failed to send login request"),
        "unexpected error: {error_msg}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_malformed_url() {
    let client = ApiClient::new("not-a-valid-url".to_string());
    assert!(client.list_tournaments(None).await.is_err());
}

#[tokio::test]
async fn test_protected_calls_need_session() {
    let client = ApiClient::new("http://localhost:19999".to_string());
    let err = client.wallet().await.unwrap_err();
    assert_eq!(err.to_string(), "Not signed in");
}

// ============================================================================
// Against a running server
// ============================================================================

#[tokio::test]
async fn test_server_errors_are_surfaced() {
    let base_url = start_server().await;
    let mut client = ApiClient::new(base_url);

    let err = client
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("login failed (401)"), "{err}");
}

#[tokio::test]
async fn test_session_refresh_and_logout() {
    let base_url = start_server().await;
    let mut client = registered_client(&base_url, "ace@example.com").await;
    assert!(client.is_authenticated());

    let user = client.refresh().await.unwrap();
    assert_eq!(user.email.as_deref(), Some("ace@example.com"));

    client.logout().await.unwrap();
    assert!(!client.is_authenticated());
    assert!(client.refresh().await.is_err());
}

#[tokio::test]
async fn test_tournament_flow() {
    let base_url = start_server().await;
    let host = registered_client(&base_url, "host@example.com").await;
    let player = registered_client(&base_url, "player@example.com").await;

    let created = host.create_tournament(&new_tournament(50)).await.unwrap();
    assert_eq!(created.status, TournamentStatus::Active);

    // Public listing works without a session
    let anonymous = ApiClient::new(base_url.clone());
    let active = anonymous
        .list_tournaments(Some(TournamentStatus::Active))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    // Joining without funds fails with the server's message
    let err = player.join_tournament(&created.id).await.unwrap_err();
    assert!(err.to_string().contains("join failed (400)"), "{err}");

    player
        .deposit(100, TransactionDetails::new())
        .await
        .unwrap();
    let joined = player.join_tournament(&created.id).await.unwrap();
    assert_eq!(joined.filled_spots, 1);
    assert_eq!(player.wallet().await.unwrap().balance, 50);
    assert_eq!(player.list_joined().await.unwrap().len(), 1);

    let ongoing = host
        .update_status(&created.id, TournamentStatus::Ongoing)
        .await
        .unwrap();
    assert_eq!(ongoing.status, TournamentStatus::Ongoing);
}

#[tokio::test]
async fn test_draft_round_trip() {
    let base_url = start_server().await;
    let client = registered_client(&base_url, "host@example.com").await;

    assert_eq!(client.get_draft().await.unwrap(), None);

    let draft = TournamentDraft {
        step: 2,
        name: Some("Sunday Cup".to_string()),
        ..TournamentDraft::default()
    };
    client.save_draft(&draft).await.unwrap();

    let saved = client.get_draft().await.unwrap().unwrap();
    assert_eq!(saved.name.as_deref(), Some("Sunday Cup"));
    assert_eq!(saved.step, 2);

    client.delete_draft().await.unwrap();
    assert_eq!(client.get_draft().await.unwrap(), None);
}

#[tokio::test]
async fn test_profile_update_and_availability() {
    let base_url = start_server().await;
    let first = registered_client(&base_url, "first@example.com").await;
    let second = registered_client(&base_url, "second@example.com").await;

    first
        .update_profile(&ProfileUpdate {
            ign: Some("SniperKing".to_string()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();

    let availability = second
        .check_availability(Some("sniperking"), None)
        .await
        .unwrap();
    assert_eq!(availability.ign_available, Some(false));
    assert_eq!(availability.game_id_available, None);
}

#[tokio::test]
async fn test_session_context_tracks_hosted() {
    let base_url = start_server().await;
    let mut client = ApiClient::new(base_url);
    let mut session = SessionContext::new();

    let user = client.sign_in_anonymously().await.unwrap();
    client.create_tournament(&new_tournament(0)).await.unwrap();

    session.set_user(&client, Some(user)).await.unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.hosted().len(), 1);

    client.logout().await.unwrap();
    session.set_user(&client, None).await.unwrap();
    assert!(session.hosted().is_empty());
}
