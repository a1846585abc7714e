//! Tournament aggregate, its status, and the engine's error type.

use crate::models::game::{BracketSide, Match, MatchId, MatchStatus, Round};
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by bracket construction and result submission.
///
/// Every variant is raised before any mutation is applied.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Fewer than two participants.
    #[error("Need at least 2 participants (got {0})")]
    InvalidParticipantCount(usize),
    #[error("Seed {0} is used more than once")]
    DuplicateSeed(u32),
    /// Seeds are unique but do not form 1..N.
    #[error("Seed {seed} is outside 1..{count}")]
    InvalidSeed { seed: u32, count: usize },
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(ParticipantId),
    #[error("Participant ids must not be empty")]
    MissingParticipantId,
    #[error("{count} participants exceed the bracket maximum of {max}")]
    BracketSizeExceeded { count: usize, max: usize },
    #[error("Tournament name must not be empty")]
    EmptyName,
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Result for match {0} was already recorded")]
    MatchAlreadyCompleted(MatchId),
    /// A player slot is still empty.
    #[error("Match {0} does not have both players yet")]
    IncompleteMatch(MatchId),
    #[error("{winner_id} is not playing in match {match_id}")]
    InvalidWinner {
        match_id: MatchId,
        winner_id: ParticipantId,
    },
    #[error("Tournament is already completed")]
    TournamentCompleted,
    #[error("{0} is not a participant of this tournament")]
    UnknownParticipant(ParticipantId),
    /// `BYE` is reserved for walkovers resolved by the engine.
    #[error("Victory type BYE cannot be submitted for match {0}")]
    InvalidVictoryType(MatchId),
    #[error("Match {match_id} cannot move from {from} to {to}")]
    InvalidTransition {
        match_id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },
    #[error("Tournament cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
    #[error("Only draft tournaments can be discarded (status is {0})")]
    NotDraft(TournamentStatus),
    /// A match references a downstream match that does not exist.
    #[error("Bracket is inconsistent around match {0}")]
    BrokenBracket(MatchId),
}

impl TournamentError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            TournamentError::InvalidParticipantCount(_) => "invalid_participant_count",
            TournamentError::DuplicateSeed(_) => "duplicate_seed",
            TournamentError::InvalidSeed { .. } => "invalid_seed",
            TournamentError::DuplicateParticipant(_) => "duplicate_participant",
            TournamentError::MissingParticipantId => "missing_participant_id",
            TournamentError::BracketSizeExceeded { .. } => "bracket_size_exceeded",
            TournamentError::EmptyName => "empty_name",
            TournamentError::MatchNotFound(_) => "match_not_found",
            TournamentError::MatchAlreadyCompleted(_) => "match_already_completed",
            TournamentError::IncompleteMatch(_) => "incomplete_match",
            TournamentError::InvalidWinner { .. } => "invalid_winner",
            TournamentError::TournamentCompleted => "tournament_completed",
            TournamentError::UnknownParticipant(_) => "unknown_participant",
            TournamentError::InvalidVictoryType(_) => "invalid_victory_type",
            TournamentError::InvalidTransition { .. } => "invalid_transition",
            TournamentError::InvalidStatusTransition { .. } => "invalid_status_transition",
            TournamentError::NotDraft(_) => "not_draft",
            TournamentError::BrokenBracket(_) => "broken_bracket",
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Administrative status of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Bracket built, not yet opened by an admin.
    #[default]
    Draft,
    Active,
    Completed,
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Elimination format.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    #[default]
    Single,
    Double,
}

impl BracketType {
    /// Losses after which a participant is out.
    pub fn lives(self) -> u32 {
        match self {
            BracketType::Single => 1,
            BracketType::Double => 2,
        }
    }
}

/// Full tournament aggregate: participants, every round and match, and the outcome.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub bracket_type: BracketType,
    /// Ordered by seed.
    pub participants: Vec<Participant>,
    /// Winners rounds, followed by the grand final round(s) for double elimination.
    pub rounds: Vec<Round>,
    /// Empty for single elimination.
    pub losers_rounds: Vec<Round>,
    pub winner_id: Option<ParticipantId>,
    /// The champion was named by an admin instead of being decided by the bracket.
    #[serde(default)]
    pub admin_override: bool,
    /// Match whose completion decides the tournament (unless a reset is pending).
    pub final_match_id: MatchId,
    /// Double elimination: dormant second grand final.
    pub reset_match_id: Option<MatchId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Bumped by the repository on every save.
    pub version: u64,
}

impl Tournament {
    /// Empty draft aggregate; the bracket builder fills rounds and participants.
    pub fn new(name: impl Into<String>, bracket_type: BracketType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Draft,
            bracket_type,
            participants: Vec::new(),
            rounds: Vec::new(),
            losers_rounds: Vec::new(),
            winner_id: None,
            admin_override: false,
            final_match_id: MatchId::new(),
            reset_match_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            version: 0,
        }
    }

    /// Every round, winners side first, then losers.
    pub fn all_rounds(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter().chain(self.losers_rounds.iter())
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.all_rounds().flat_map(|r| r.matches.iter())
    }

    pub(crate) fn matches_mut(&mut self) -> impl Iterator<Item = &mut Match> {
        self.rounds
            .iter_mut()
            .chain(self.losers_rounds.iter_mut())
            .flat_map(|r| r.matches.iter_mut())
    }

    pub fn find_match(&self, match_id: &str) -> Option<&Match> {
        self.matches().find(|m| m.match_id == match_id)
    }

    pub(crate) fn find_match_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches_mut().find(|m| m.match_id == match_id)
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Rounds of one side of the bracket, in order.
    pub fn side_rounds(&self, side: BracketSide) -> impl Iterator<Item = &Round> {
        self.all_rounds().filter(move |r| r.bracket_side == side)
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    /// Administrative status overwrite. Completed is terminal and an opened tournament cannot go back to draft.
    pub fn set_status(&mut self, status: TournamentStatus) -> Result<(), TournamentError> {
        use TournamentStatus::*;
        let allowed = match (self.status, status) {
            (from, to) if from == to => true,
            (Completed, _) => false,
            (Active, Draft) => false,
            _ => true,
        };
        if !allowed {
            return Err(TournamentError::InvalidStatusTransition {
                from: self.status,
                to: status,
            });
        }
        if status == Completed && self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
        self.status = status;
        self.touch();
        Ok(())
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
