//! Data structures for the bracket engine: participants, matches, rounds, tournament.

mod game;
mod participant;
mod tournament;

pub use game::{BracketSide, Match, MatchId, MatchStatus, Round, Slot, VictoryType};
pub use participant::{Participant, ParticipantId};
pub use tournament::{BracketType, Tournament, TournamentError, TournamentId, TournamentStatus};
