//! Command surface: create tournaments, apply admin actions, discard drafts.
//!
//! Every write to one tournament runs under that tournament's own lock as a
//! load -> mutate in memory -> save sequence. Different tournaments never wait on each other.

use crate::logic::{
    declare_winner, generate_bracket, set_match_result, start_match, EngineConfig, MatchResult,
    SeedingMode,
};
use crate::models::{
    BracketType, MatchId, Participant, ParticipantId, Tournament, TournamentError, TournamentId,
    TournamentStatus,
};
use crate::query::BracketQueryService;
use crate::roster::Roster;
use crate::store::{StoreError, TournamentRepository};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Payload is well-formed JSON but does not describe a valid request.
    #[error("{0}")]
    InvalidRequest(String),
}

/// Explicitly seeded roster entry.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedEntry {
    pub id: ParticipantId,
    pub seed: u32,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `POST /tournaments` body. Exactly one of `participantIds` / `participants` must be given.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTournament {
    pub name: String,
    #[serde(default)]
    pub participant_ids: Option<Vec<ParticipantId>>,
    #[serde(default)]
    pub participants: Option<Vec<SeedEntry>>,
    #[serde(default)]
    pub bracket_type: BracketType,
    #[serde(default)]
    pub seeding: SeedingMode,
}

impl CreateTournament {
    pub fn new(name: impl Into<String>, participant_ids: Vec<ParticipantId>, bracket_type: BracketType) -> Self {
        Self {
            name: name.into(),
            participant_ids: Some(participant_ids),
            participants: None,
            bracket_type,
            seeding: SeedingMode::Ordered,
        }
    }

    fn roster(self) -> Result<Vec<Participant>, ServiceError> {
        match (self.participant_ids, self.participants) {
            (Some(ids), None) => {
                let participants = ids.into_iter().map(|id| Participant::new(id, 0)).collect();
                Ok(self.seeding.apply(participants))
            }
            (None, Some(entries)) => {
                let participants: Vec<Participant> = entries
                    .into_iter()
                    .map(|e| Participant {
                        display_name: e.display_name,
                        ..Participant::new(e.id, e.seed)
                    })
                    .collect();
                Ok(match self.seeding {
                    SeedingMode::Ordered => participants,
                    SeedingMode::Random => SeedingMode::Random.apply(participants),
                })
            }
            _ => Err(ServiceError::InvalidRequest(
                "Provide either participantIds or participants".to_string(),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: TournamentStatus,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchRef {
    pub match_id: MatchId,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WinnerRef {
    pub winner_id: ParticipantId,
}

/// `PATCH /tournaments/{id}` body: `{ "action": ..., "data": { ... } }`.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase", deny_unknown_fields)]
pub enum TournamentCommand {
    /// Administrative overwrite; not bracket logic.
    UpdateStatus(StatusUpdate),
    SetMatchResult(MatchResult),
    StartMatch(MatchRef),
    /// Name the champion directly and complete the tournament.
    SetWinner(WinnerRef),
}

pub struct TournamentService {
    repo: Arc<dyn TournamentRepository>,
    engine: EngineConfig,
    roster: Option<Roster>,
    locks: Mutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl TournamentService {
    pub fn new(repo: Arc<dyn TournamentRepository>, engine: EngineConfig) -> Self {
        Self {
            repo,
            engine,
            roster: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn queries(&self) -> BracketQueryService<'_> {
        BracketQueryService::new(self.repo.as_ref())
    }

    fn lock_for(&self, id: TournamentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(id).or_default().clone()
    }

    fn forget_lock(&self, id: TournamentId) {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Run `f` under the tournament's lock. The lock entry is dropped again when the
    /// tournament does not exist.
    fn locked<T, F>(&self, id: TournamentId, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Result<T, ServiceError>,
    {
        let lock = self.lock_for(id);
        let outcome = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        if matches!(outcome, Err(ServiceError::Store(StoreError::NotFound(_)))) {
            self.forget_lock(id);
        }
        outcome
    }

    /// Run `f` on the stored tournament under its lock and persist the result.
    fn update<F>(&self, id: TournamentId, f: F) -> Result<Tournament, ServiceError>
    where
        F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
    {
        self.locked(id, || {
            let mut tournament = self.repo.load(id)?;
            f(&mut tournament)?;
            Ok(self.repo.save(&tournament)?)
        })
    }

    /// Build the bracket and store the new draft tournament.
    pub fn create(&self, request: CreateTournament) -> Result<Tournament, ServiceError> {
        let name = request.name.clone();
        let bracket_type = request.bracket_type;
        let mut participants = request.roster()?;
        if let Some(roster) = &self.roster {
            for p in participants.iter_mut().filter(|p| p.display_name.is_none()) {
                p.display_name = roster.display_name(&p.id).map(str::to_string);
            }
        }
        let tournament = generate_bracket(name, participants, bracket_type, &self.engine)
            .map_err(|e| {
                log::warn!("Rejected tournament creation: {e}");
                e
            })?;
        let saved = self.repo.save(&tournament)?;
        log::info!(
            "Created {:?} tournament {} ({}) with {} participants",
            saved.bracket_type,
            saved.id,
            saved.name,
            saved.participants.len()
        );
        Ok(saved)
    }

    /// Apply one admin command to a tournament.
    pub fn execute(&self, id: TournamentId, command: TournamentCommand) -> Result<Tournament, ServiceError> {
        let outcome = match &command {
            TournamentCommand::UpdateStatus(update) => self.update(id, |t| t.set_status(update.status)),
            TournamentCommand::SetMatchResult(result) => self.update(id, |t| set_match_result(t, result)),
            TournamentCommand::StartMatch(m) => self.update(id, |t| start_match(t, &m.match_id)),
            TournamentCommand::SetWinner(w) => self.update(id, |t| declare_winner(t, &w.winner_id)),
        };
        match &outcome {
            Ok(t) => {
                log::info!("Tournament {id}: applied {command:?} (version {})", t.version);
                match (&command, &t.winner_id) {
                    (TournamentCommand::SetWinner(_), Some(winner)) => {
                        log::info!("Tournament {id} completed by admin decision, champion {winner}");
                    }
                    (TournamentCommand::SetMatchResult(_), Some(winner)) if t.is_completed() => {
                        log::info!("Tournament {id} completed, champion {winner}");
                    }
                    _ => {}
                }
            }
            Err(e) => log::warn!("Tournament {id}: rejected {command:?}: {e}"),
        }
        outcome
    }

    pub fn set_match_result(&self, id: TournamentId, result: MatchResult) -> Result<Tournament, ServiceError> {
        self.execute(id, TournamentCommand::SetMatchResult(result))
    }

    pub fn update_status(&self, id: TournamentId, status: TournamentStatus) -> Result<Tournament, ServiceError> {
        self.execute(id, TournamentCommand::UpdateStatus(StatusUpdate { status }))
    }

    pub fn set_winner(&self, id: TournamentId, winner_id: impl Into<ParticipantId>) -> Result<Tournament, ServiceError> {
        self.execute(
            id,
            TournamentCommand::SetWinner(WinnerRef {
                winner_id: winner_id.into(),
            }),
        )
    }

    /// Discard a tournament that never left draft.
    pub fn delete(&self, id: TournamentId) -> Result<(), ServiceError> {
        self.locked(id, || {
            let tournament = self.repo.load(id)?;
            if tournament.status != TournamentStatus::Draft {
                return Err(TournamentError::NotDraft(tournament.status).into());
            }
            Ok(self.repo.delete(id)?)
        })?;
        self.forget_lock(id);
        log::info!("Discarded draft tournament {id}");
        Ok(())
    }
}
