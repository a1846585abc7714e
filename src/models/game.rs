//! Match, Round, and the small enums that describe where a match sits in the bracket.

use crate::models::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a match, unique within its tournament (e.g. `w1-m0`, `l2-m1`, `gf-1`).
pub type MatchId = String;

/// Which player slot of a match a participant occupies or is routed into.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    #[default]
    Player1,
    Player2,
}

impl Slot {
    /// Slot fed by the match at `position` in the previous round: even positions feed player 1.
    pub fn from_position(position: usize) -> Self {
        if position % 2 == 0 {
            Slot::Player1
        } else {
            Slot::Player2
        }
    }
}

/// Lifecycle of a single match. Only moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    /// Informational only; may be skipped.
    Active,
    Completed,
}

impl MatchStatus {
    fn rank(self) -> u8 {
        match self {
            MatchStatus::Pending => 0,
            MatchStatus::Active => 1,
            MatchStatus::Completed => 2,
        }
    }

    /// True if moving from `self` to `next` goes strictly forward.
    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Active => "active",
            MatchStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Part of the bracket a match or round belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BracketSide {
    #[default]
    Winners,
    Losers,
    GrandFinal,
}

/// How a match was decided.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VictoryType {
    #[default]
    Ko,
    Forfeit,
    Timeout,
    /// Played to a draw; the admin still names who advances.
    Draw,
    AdminDecision,
    /// Walkover. Set by the engine only.
    Bye,
}

/// A single one-versus-one match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub match_id: MatchId,
    pub round_number: u32,
    /// 0-based index within its round. Topology only.
    pub position: usize,
    pub player1_id: Option<ParticipantId>,
    pub player2_id: Option<ParticipantId>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner_id: Option<ParticipantId>,
    /// Walkover: exactly one player, completed without being played.
    pub is_bye: bool,
    /// No player can ever reach this match. Completed, no players, no winner.
    #[serde(default)]
    pub is_void: bool,
    /// Set once the match is completed with a winner.
    #[serde(default)]
    pub victory_type: Option<VictoryType>,
    /// The outcome was decided by an admin rather than played.
    #[serde(default)]
    pub admin_override: bool,
    pub status: MatchStatus,
    pub bracket_side: BracketSide,
    /// Match the winner advances into; `None` for the final.
    pub next_match_id: Option<MatchId>,
    /// Slot of `next_match_id` the winner lands in.
    pub next_slot: Option<Slot>,
    /// Double elimination: match the loser drops into.
    pub next_loser_match_id: Option<MatchId>,
    pub next_loser_slot: Option<Slot>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Empty shell with no players, waiting to be fed.
    pub fn new(
        match_id: impl Into<MatchId>,
        round_number: u32,
        position: usize,
        bracket_side: BracketSide,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            round_number,
            position,
            player1_id: None,
            player2_id: None,
            player1_score: 0,
            player2_score: 0,
            winner_id: None,
            is_bye: false,
            is_void: false,
            victory_type: None,
            admin_override: false,
            status: MatchStatus::Pending,
            bracket_side,
            next_match_id: None,
            next_slot: None,
            next_loser_match_id: None,
            next_loser_slot: None,
            completed_at: None,
        }
    }

    pub fn player(&self, slot: Slot) -> Option<&ParticipantId> {
        match slot {
            Slot::Player1 => self.player1_id.as_ref(),
            Slot::Player2 => self.player2_id.as_ref(),
        }
    }

    pub fn set_player(&mut self, slot: Slot, id: ParticipantId) {
        match slot {
            Slot::Player1 => self.player1_id = Some(id),
            Slot::Player2 => self.player2_id = Some(id),
        }
    }

    pub fn has_both_players(&self) -> bool {
        self.player1_id.is_some() && self.player2_id.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Both slots filled and no result yet.
    pub fn is_ready(&self) -> bool {
        self.has_both_players() && !self.is_completed()
    }

    /// Completed between two players, as opposed to a bye or a void slot.
    pub fn was_played(&self) -> bool {
        self.is_completed() && !self.is_bye && !self.is_void
    }

    /// Resolve as a walkover for `player`.
    pub(crate) fn resolve_bye(&mut self, player: ParticipantId, at: DateTime<Utc>) {
        self.is_bye = true;
        self.winner_id = Some(player);
        self.victory_type = Some(VictoryType::Bye);
        self.status = MatchStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Close a match that will never receive a player.
    pub(crate) fn resolve_void(&mut self, at: DateTime<Utc>) {
        self.is_void = true;
        self.status = MatchStatus::Completed;
        self.completed_at = Some(at);
    }

    /// The non-winner of a completed, played match.
    pub fn loser_id(&self) -> Option<&ParticipantId> {
        if !self.was_played() {
            return None;
        }
        let winner = self.winner_id.as_ref()?;
        [self.player1_id.as_ref(), self.player2_id.as_ref()]
            .into_iter()
            .flatten()
            .find(|p| *p != winner)
    }

    pub fn involves(&self, id: &str) -> bool {
        self.player1_id.as_deref() == Some(id) || self.player2_id.as_deref() == Some(id)
    }
}

/// One horizontal layer of a bracket side.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_number: u32,
    pub name: String,
    pub bracket_side: BracketSide,
    pub matches: Vec<Match>,
}

impl Round {
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_completed)
    }
}
