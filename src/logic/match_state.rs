//! Per-match lifecycle: pending -> (active) -> completed, and result validation.
//!
//! Bye matches never pass through here; they are resolved when the bracket is built.

use crate::models::{
    Match, MatchId, MatchStatus, ParticipantId, Tournament, TournamentError, VictoryType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Result submitted by an admin for one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub winner_id: ParticipantId,
    #[serde(default)]
    pub player1_score: u32,
    #[serde(default)]
    pub player2_score: u32,
    /// Defaults to KO.
    #[serde(default)]
    pub victory_type: Option<VictoryType>,
}

impl MatchResult {
    pub fn new(match_id: impl Into<MatchId>, winner_id: impl Into<ParticipantId>) -> Self {
        Self {
            match_id: match_id.into(),
            winner_id: winner_id.into(),
            player1_score: 0,
            player2_score: 0,
            victory_type: None,
        }
    }

    pub fn with_scores(mut self, player1_score: u32, player2_score: u32) -> Self {
        self.player1_score = player1_score;
        self.player2_score = player2_score;
        self
    }

    pub fn with_victory_type(mut self, victory_type: VictoryType) -> Self {
        self.victory_type = Some(victory_type);
        self
    }
}

/// Check every precondition of a result without touching the tournament.
pub fn validate_result<'a>(
    tournament: &'a Tournament,
    result: &MatchResult,
) -> Result<&'a Match, TournamentError> {
    let m = tournament
        .find_match(&result.match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(result.match_id.clone()))?;
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(m.match_id.clone()));
    }
    if tournament.is_completed() {
        return Err(TournamentError::TournamentCompleted);
    }
    if !m.has_both_players() {
        return Err(TournamentError::IncompleteMatch(m.match_id.clone()));
    }
    if !m.involves(&result.winner_id) {
        return Err(TournamentError::InvalidWinner {
            match_id: m.match_id.clone(),
            winner_id: result.winner_id.clone(),
        });
    }
    if result.victory_type == Some(VictoryType::Bye) {
        return Err(TournamentError::InvalidVictoryType(m.match_id.clone()));
    }
    Ok(m)
}

/// Record a validated result on its match only. Downstream routing is the advancement step's job.
pub(crate) fn record_result(
    tournament: &mut Tournament,
    result: &MatchResult,
) -> Result<(), TournamentError> {
    validate_result(tournament, result)?;
    let m = tournament
        .find_match_mut(&result.match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(result.match_id.clone()))?;
    m.player1_score = result.player1_score;
    m.player2_score = result.player2_score;
    m.winner_id = Some(result.winner_id.clone());
    let victory_type = result.victory_type.unwrap_or_default();
    m.victory_type = Some(victory_type);
    m.admin_override = victory_type == VictoryType::AdminDecision;
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    Ok(())
}

/// Mark a ready match as being played (pending -> active). Informational only.
pub fn start_match(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    if tournament.is_completed() {
        return Err(TournamentError::TournamentCompleted);
    }
    let m = tournament
        .find_match_mut(match_id)
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.to_string()))?;
    if m.is_completed() {
        return Err(TournamentError::MatchAlreadyCompleted(m.match_id.clone()));
    }
    if !m.has_both_players() {
        return Err(TournamentError::IncompleteMatch(m.match_id.clone()));
    }
    if !m.status.can_transition_to(MatchStatus::Active) {
        return Err(TournamentError::InvalidTransition {
            match_id: m.match_id.clone(),
            from: m.status,
            to: MatchStatus::Active,
        });
    }
    m.status = MatchStatus::Active;
    tournament.touch();
    Ok(())
}
