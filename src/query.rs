//! Read side: assembles display-ready bracket views straight from the repository.

use crate::models::{
    BracketSide, BracketType, Match, Participant, ParticipantId, Round, Tournament, TournamentId,
    TournamentStatus,
};
use crate::store::{StoreError, TournamentFilter, TournamentRepository};
use serde::Serialize;

/// A match plus the names the bracket page shows.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub game: Match,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
    pub winner_name: Option<String>,
    /// Both players known and no result yet.
    pub ready: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_number: u32,
    pub name: String,
    pub is_complete: bool,
    pub matches: Vec<MatchView>,
}

/// Whole bracket, split by side.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub bracket_type: BracketType,
    pub rounds: Vec<RoundView>,
    pub losers_rounds: Vec<RoundView>,
    pub grand_final_rounds: Vec<RoundView>,
    /// Earliest winners round that still has a match to play.
    pub current_round: Option<u32>,
    pub total_rounds: u32,
    pub winner_id: Option<ParticipantId>,
    pub winner_name: Option<String>,
    /// The second grand final has players and must be played.
    pub reset_active: bool,
}

/// One line of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: usize,
    #[serde(flatten)]
    pub participant: Participant,
    pub champion: bool,
}

fn name_of(tournament: &Tournament, id: Option<&ParticipantId>) -> Option<String> {
    let id = id?;
    Some(
        tournament
            .participant(id)
            .map_or_else(|| id.clone(), |p| p.label().to_string()),
    )
}

fn round_view(tournament: &Tournament, round: &Round) -> RoundView {
    RoundView {
        round_number: round.round_number,
        name: round.name.clone(),
        is_complete: round.is_complete(),
        matches: round
            .matches
            .iter()
            .map(|m| MatchView {
                player1_name: name_of(tournament, m.player1_id.as_ref()),
                player2_name: name_of(tournament, m.player2_id.as_ref()),
                winner_name: name_of(tournament, m.winner_id.as_ref()),
                ready: m.is_ready(),
                game: m.clone(),
            })
            .collect(),
    }
}

fn views(tournament: &Tournament, side: BracketSide) -> Vec<RoundView> {
    tournament
        .side_rounds(side)
        .map(|r| round_view(tournament, r))
        .collect()
}

/// Display view of a tournament's bracket.
pub fn bracket_view(tournament: &Tournament) -> BracketView {
    let winners: Vec<&Round> = tournament.side_rounds(BracketSide::Winners).collect();
    let current_round = winners
        .iter()
        .find(|r| !r.is_complete())
        .map(|r| r.round_number);
    let reset_active = tournament
        .reset_match_id
        .as_deref()
        .and_then(|id| tournament.find_match(id))
        .is_some_and(Match::is_ready);
    BracketView {
        tournament_id: tournament.id,
        name: tournament.name.clone(),
        status: tournament.status,
        bracket_type: tournament.bracket_type,
        rounds: views(tournament, BracketSide::Winners),
        losers_rounds: views(tournament, BracketSide::Losers),
        grand_final_rounds: views(tournament, BracketSide::GrandFinal),
        current_round,
        total_rounds: winners.len() as u32,
        winner_id: tournament.winner_id.clone(),
        winner_name: name_of(tournament, tournament.winner_id.as_ref()),
        reset_active,
    }
}

/// Participants still alive first, then by wins (desc), losses (asc) and seed.
pub fn standings(tournament: &Tournament) -> Vec<Standing> {
    let mut participants = tournament.participants.clone();
    participants.sort_by_key(|p| (p.eliminated, std::cmp::Reverse(p.wins), p.losses, p.seed));
    participants
        .into_iter()
        .enumerate()
        .map(|(i, p)| Standing {
            rank: i + 1,
            champion: tournament.winner_id.as_ref() == Some(&p.id),
            participant: p,
        })
        .collect()
}

/// Read-only service over a repository. Reads are not serialized with in-flight writes.
pub struct BracketQueryService<'a> {
    repo: &'a dyn TournamentRepository,
}

impl<'a> BracketQueryService<'a> {
    pub fn new(repo: &'a dyn TournamentRepository) -> Self {
        Self { repo }
    }

    /// Full aggregate as stored.
    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.repo.load(id)
    }

    pub fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, StoreError> {
        self.repo.list(filter)
    }

    pub fn bracket(&self, id: TournamentId) -> Result<BracketView, StoreError> {
        Ok(bracket_view(&self.repo.load(id)?))
    }

    pub fn standings(&self, id: TournamentId) -> Result<Vec<Standing>, StoreError> {
        Ok(standings(&self.repo.load(id)?))
    }
}
