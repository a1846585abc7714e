//! Cobblemon tournament bracket engine: models, bracket logic, storage, and the REST surface.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod query;
pub mod roster;
pub mod service;
pub mod store;

pub use config::ServerConfig;
pub use logic::{
    declare_winner, generate_bracket, set_match_result, start_match, validate_result, EngineConfig,
    MatchResult, SeedingMode,
};
pub use models::{
    BracketSide, BracketType, Match, MatchId, MatchStatus, Participant, ParticipantId, Round, Slot,
    Tournament, TournamentError, TournamentId, TournamentStatus, VictoryType,
};
pub use query::{bracket_view, standings, BracketQueryService, BracketView, Standing};
pub use roster::{Roster, RosterEntry, RosterError};
pub use service::{CreateTournament, ServiceError, TournamentCommand, TournamentService};
pub use store::{
    JsonFileRepository, MemoryRepository, StoreError, TournamentFilter, TournamentRepository,
};
