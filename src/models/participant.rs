//! Participant entry and its derived standing.

use crate::models::game::MatchId;
use serde::{Deserialize, Serialize};

/// Opaque participant identifier supplied by the roster (never validated by the engine).
pub type ParticipantId = String;

/// A seeded participant of a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    /// 1 = strongest. Dense 1..N within a tournament.
    pub seed: u32,
    /// Display only.
    pub display_name: Option<String>,
    /// Derived from completed matches; recomputed after every result.
    pub wins: u32,
    pub losses: u32,
    pub eliminated: bool,
    /// Match in which the participant was knocked out.
    pub eliminated_in: Option<MatchId>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, seed: u32) -> Self {
        Self {
            id: id.into(),
            seed,
            display_name: None,
            wins: 0,
            losses: 0,
            eliminated: false,
            eliminated_in: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name if known, otherwise the raw id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    pub(crate) fn reset_standing(&mut self) {
        self.wins = 0;
        self.losses = 0;
        self.eliminated = false;
        self.eliminated_in = None;
    }
}
