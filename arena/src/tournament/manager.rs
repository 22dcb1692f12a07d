//! Tournament manager for hosting, joining and settling tournaments.

use super::{
    errors::{TournamentError, TournamentResult},
    models::{
        NewTournament, RoomDetails, Tournament, TournamentDraft, TournamentResults,
        TournamentStatus,
    },
    payouts::calculate_payouts,
};
use crate::{
    storage::{ObjectStore, UploadKind, object_path, validate_upload},
    store::{DocumentStore, Filter, collections, decode_all, encode, modify},
    wallet::WalletManager,
};
use chrono::Utc;
use std::sync::Arc;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn DocumentStore>,
    wallets: WalletManager,
    objects: Arc<dyn ObjectStore>,
}

impl TournamentManager {
    /// Create a new tournament manager
    ///
    /// # Arguments
    ///
    /// * `store` - Document store holding tournaments and drafts
    /// * `wallets` - Wallet manager used for entry fees, refunds and prizes
    /// * `objects` - Object store receiving banner images
    pub fn new(
        store: Arc<dyn DocumentStore>,
        wallets: WalletManager,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            wallets,
            objects,
        }
    }

    /// Create a new tournament hosted by `host_id`
    ///
    /// # Arguments
    ///
    /// * `host_id` - Authenticated caller
    /// * `input` - Tournament configuration
    ///
    /// # Returns
    ///
    /// * `Tournament` - The stored tournament, open for registration
    ///
    /// # Errors
    ///
    /// * `TournamentError::Validation` - Input rejected (name, game, capacity, fee, date, prizes)
    pub async fn create_tournament(
        &self,
        host_id: &str,
        input: NewTournament,
    ) -> TournamentResult<Tournament> {
        let now = Utc::now();
        input.validate(now)?;

        let tournament = Tournament {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            game: input.game.trim().to_string(),
            description: input.description,
            rules: input.rules,
            mode: input.mode,
            max_participants: input.max_participants,
            entry_fee: input.entry_fee,
            prize_distribution: input
                .prize_distribution
                .into_iter()
                .map(|mut share| {
                    share.position = share.position.trim().to_string();
                    share
                })
                .collect(),
            start_time: input.start_time,
            room: None,
            status: TournamentStatus::Active,
            participants: Vec::new(),
            filled_spots: 0,
            host_id: host_id.to_string(),
            banner_url: input.banner_url,
            results: TournamentResults::new(),
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(collections::TOURNAMENTS, &tournament.id, encode(&tournament)?)
            .await?;

        log::info!(
            "User {} created tournament {} ({})",
            host_id,
            tournament.id,
            tournament.name
        );

        // The draft has served its purpose
        if let Err(e) = self.delete_draft(host_id).await {
            log::warn!("Failed to delete draft of {host_id}: {e}");
        }

        Ok(tournament)
    }

    /// Get a tournament by id
    pub async fn get_tournament(&self, tournament_id: &str) -> TournamentResult<Tournament> {
        let document = self
            .store
            .get(collections::TOURNAMENTS, tournament_id)
            .await?
            .ok_or_else(|| TournamentError::NotFound(tournament_id.to_string()))?;
        Ok(document.decode()?)
    }

    /// List tournaments, optionally by status, soonest start first
    pub async fn list_tournaments(
        &self,
        status: Option<TournamentStatus>,
    ) -> TournamentResult<Vec<Tournament>> {
        let filter = match status {
            Some(status) => Filter::new().eq("status", encode(&status)?),
            None => Filter::new(),
        };

        let mut tournaments = self.fetch(filter).await?;
        tournaments.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(tournaments)
    }

    /// Tournaments hosted by a user, newest first
    pub async fn list_hosted_by(&self, host_id: &str) -> TournamentResult<Vec<Tournament>> {
        let mut tournaments = self.fetch(Filter::new().eq("host_id", host_id)).await?;
        tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tournaments)
    }

    /// Tournaments a user has joined, soonest start first
    pub async fn list_joined_by(&self, user_id: &str) -> TournamentResult<Vec<Tournament>> {
        let mut tournaments = self
            .fetch(Filter::new().contains("participants", user_id))
            .await?;
        tournaments.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(tournaments)
    }

    async fn fetch(&self, filter: Filter) -> TournamentResult<Vec<Tournament>> {
        let documents = self.store.list(collections::TOURNAMENTS, &filter).await?;
        Ok(decode_all(&documents)?)
    }

    /// Join a tournament
    ///
    /// The entry fee is charged first; the participant append and spot
    /// increment are then one versioned write. If that write is rejected the
    /// fee is refunded.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotJoinable` - Tournament is not active
    /// * `TournamentError::HostCannotJoin` - Caller hosts the tournament
    /// * `TournamentError::AlreadyJoined` - Caller already joined
    /// * `TournamentError::TournamentFull` - No spots left
    /// * `TournamentError::Wallet` - Entry fee could not be charged
    pub async fn join_tournament(
        &self,
        tournament_id: &str,
        user_id: &str,
    ) -> TournamentResult<Tournament> {
        let tournament = self.get_tournament(tournament_id).await?;
        tournament.check_joinable(user_id)?;

        let fee = tournament.entry_fee;
        if fee > 0 {
            self.wallets
                .charge_entry_fee(user_id, tournament_id, fee)
                .await?;
        }

        let result = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                tournament.check_joinable(user_id)?;
                tournament.participants.push(user_id.to_string());
                tournament.filled_spots = tournament.participants.len() as u32;
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await;

        match result {
            Ok((tournament, ())) => {
                log::info!(
                    "User {} joined tournament {} ({}/{})",
                    user_id,
                    tournament_id,
                    tournament.filled_spots,
                    tournament.max_participants
                );
                Ok(tournament)
            }
            Err(e) => {
                if fee > 0 {
                    self.refund(user_id, tournament_id, fee).await;
                }
                Err(e)
            }
        }
    }

    /// Leave an active tournament, refunding the entry fee
    ///
    /// A refund that cannot be credited is logged and kept as a `failed`
    /// refund transaction; the caller has still left.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotJoinable` - Tournament is no longer active
    /// * `TournamentError::NotParticipant` - Caller has not joined
    pub async fn leave_tournament(
        &self,
        tournament_id: &str,
        user_id: &str,
    ) -> TournamentResult<Tournament> {
        let (tournament, ()) = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                if tournament.status != TournamentStatus::Active {
                    return Err(TournamentError::NotJoinable(tournament.status));
                }
                if !tournament.is_participant(user_id) {
                    return Err(TournamentError::NotParticipant);
                }
                tournament.participants.retain(|p| p != user_id);
                tournament.filled_spots = tournament.participants.len() as u32;
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        if tournament.entry_fee > 0 {
            self.refund(user_id, tournament_id, tournament.entry_fee)
                .await;
        }

        log::info!("User {user_id} left tournament {tournament_id}");
        Ok(tournament)
    }

    /// Set the game room credentials
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotHost` - Caller is not the host
    /// * `TournamentError::Validation` - Empty room id or password, or tournament finished
    pub async fn set_room_details(
        &self,
        tournament_id: &str,
        host_id: &str,
        room: RoomDetails,
    ) -> TournamentResult<Tournament> {
        let room = RoomDetails {
            room_id: room.room_id.trim().to_string(),
            password: room.password.trim().to_string(),
        };
        if room.room_id.is_empty() || room.password.is_empty() {
            return Err(TournamentError::Validation(
                "Room ID and password are required".to_string(),
            ));
        }

        let (tournament, ()) = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                if !tournament.is_host(host_id) {
                    return Err(TournamentError::NotHost);
                }
                if tournament.status.is_finished() {
                    return Err(TournamentError::Validation(format!(
                        "Cannot update room details of a {} tournament",
                        tournament.status
                    )));
                }
                tournament.room = Some(room.clone());
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        log::info!("Room details set for tournament {tournament_id}");
        Ok(tournament)
    }

    /// Move a tournament to a new status
    ///
    /// Cancelling refunds every participant's entry fee.
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotHost` - Caller is not the host
    /// * `TournamentError::InvalidTransition` - Transition not allowed
    pub async fn update_status(
        &self,
        tournament_id: &str,
        host_id: &str,
        status: TournamentStatus,
    ) -> TournamentResult<Tournament> {
        let (tournament, ()) = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                if !tournament.is_host(host_id) {
                    return Err(TournamentError::NotHost);
                }
                if !tournament.status.can_transition_to(status) {
                    return Err(TournamentError::InvalidTransition {
                        from: tournament.status,
                        to: status,
                    });
                }
                tournament.status = status;
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        log::info!("Tournament {tournament_id} is now {status}");

        if status == TournamentStatus::Cancelled && tournament.entry_fee > 0 {
            for participant in &tournament.participants {
                self.refund(participant, tournament_id, tournament.entry_fee)
                    .await;
            }
        }

        Ok(tournament)
    }

    /// Record results and pay out the prize pool
    ///
    /// # Arguments
    ///
    /// * `results` - Position label → winning participant
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotHost` - Caller is not the host
    /// * `TournamentError::InvalidTransition` - Tournament is not ongoing
    /// * `TournamentError::Validation` - Unknown or unfilled position, or winner is not a participant
    ///
    /// Prize credits run after the status is saved. A failed credit is logged
    /// and leaves a `failed` prize transaction; the remaining credits still run.
    pub async fn complete_tournament(
        &self,
        tournament_id: &str,
        host_id: &str,
        results: TournamentResults,
    ) -> TournamentResult<Tournament> {
        if results.is_empty() {
            return Err(TournamentError::Validation(
                "At least one result is required".to_string(),
            ));
        }

        let (tournament, ()) = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                if !tournament.is_host(host_id) {
                    return Err(TournamentError::NotHost);
                }
                if tournament.status != TournamentStatus::Ongoing {
                    return Err(TournamentError::InvalidTransition {
                        from: tournament.status,
                        to: TournamentStatus::Completed,
                    });
                }
                for (position, winner) in &results {
                    if !tournament
                        .prize_distribution
                        .iter()
                        .any(|share| &share.position == position)
                    {
                        return Err(TournamentError::Validation(format!(
                            "Unknown prize position: {position}"
                        )));
                    }
                    if !tournament.is_participant(winner) {
                        return Err(TournamentError::Validation(format!(
                            "Winner of {position} is not a participant"
                        )));
                    }
                }
                // Every share must have a recipient or part of the pool is never paid
                if let Some(share) = tournament
                    .prize_distribution
                    .iter()
                    .find(|share| !results.contains_key(&share.position))
                {
                    return Err(TournamentError::Validation(format!(
                        "No winner named for {}",
                        share.position
                    )));
                }
                tournament.results = results.clone();
                tournament.status = TournamentStatus::Completed;
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        let payouts = calculate_payouts(tournament.prize_pool(), &tournament.prize_distribution);
        for (position, amount) in payouts {
            let Some(winner) = tournament.results.get(&position) else {
                continue;
            };
            if amount > 0 {
                self.pay_prize(winner, tournament_id, &position, amount)
                    .await;
            }
        }

        log::info!(
            "Tournament {} completed, pool {} paid out",
            tournament_id,
            tournament.prize_pool()
        );
        Ok(tournament)
    }

    /// Upload a banner image and attach its URL
    ///
    /// # Errors
    ///
    /// * `TournamentError::NotHost` - Caller is not the host
    /// * `TournamentError::Storage` - Wrong type, too large or empty
    pub async fn upload_banner(
        &self,
        tournament_id: &str,
        host_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> TournamentResult<Tournament> {
        let extension = validate_upload(UploadKind::Banner, content_type, bytes.len())?;

        let tournament = self.get_tournament(tournament_id).await?;
        if !tournament.is_host(host_id) {
            return Err(TournamentError::NotHost);
        }

        let path = object_path(UploadKind::Banner, tournament_id, extension);
        let url = self.objects.put(&path, content_type, bytes).await?;

        let (tournament, ()) = modify(
            self.store.as_ref(),
            collections::TOURNAMENTS,
            tournament_id,
            |tournament: &mut Tournament| -> TournamentResult<()> {
                tournament.banner_url = Some(url.clone());
                tournament.updated_at = Utc::now();
                Ok(())
            },
        )
        .await?;

        Ok(tournament)
    }

    /// Save the host's in-progress configuration, replacing any previous draft
    pub async fn save_draft(
        &self,
        host_id: &str,
        mut draft: TournamentDraft,
    ) -> TournamentResult<TournamentDraft> {
        draft.host_id = host_id.to_string();
        draft.updated_at = Some(Utc::now());

        self.store
            .put(collections::TOURNAMENT_DRAFTS, host_id, encode(&draft)?)
            .await?;
        Ok(draft)
    }

    /// Get the host's draft, if any
    pub async fn get_draft(&self, host_id: &str) -> TournamentResult<Option<TournamentDraft>> {
        match self
            .store
            .get(collections::TOURNAMENT_DRAFTS, host_id)
            .await?
        {
            Some(document) => Ok(Some(document.decode()?)),
            None => Ok(None),
        }
    }

    /// Delete the host's draft, returning whether one existed
    pub async fn delete_draft(&self, host_id: &str) -> TournamentResult<bool> {
        Ok(self
            .store
            .delete(collections::TOURNAMENT_DRAFTS, host_id)
            .await?)
    }

    /// Credit a prize; failures are logged, the transaction stays `failed`
    async fn pay_prize(&self, winner: &str, tournament_id: &str, position: &str, amount: i64) {
        if let Err(e) = self
            .wallets
            .pay_prize(winner, tournament_id, position, amount)
            .await
        {
            log::error!(
                "Prize {position} ({amount}) to {winner} for tournament {tournament_id} failed: {e}"
            );
        }
    }

    /// Refund an entry fee; failures are logged, the transaction stays `failed`
    async fn refund(&self, user_id: &str, tournament_id: &str, fee: i64) {
        if let Err(e) = self
            .wallets
            .refund_entry_fee(user_id, tournament_id, fee)
            .await
        {
            log::error!("Refund of {fee} to {user_id} for tournament {tournament_id} failed: {e}");
        }
    }
}
