//! Durable storage contract for tournament aggregates, plus two implementations.
//!
//! The engine never writes fields piecemeal: it mutates an in-memory [`Tournament`] and hands the
//! whole aggregate back to [`TournamentRepository::save`].

mod json_file;
mod memory;

pub use json_file::JsonFileRepository;
pub use memory::MemoryRepository;

use crate::models::{BracketType, Tournament, TournamentId, TournamentStatus};
use serde::Deserialize;
use thiserror::Error;

/// Errors from a repository implementation. Passed through to callers untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Tournament {0} not found")]
    NotFound(TournamentId),
    /// Someone else saved the tournament since it was loaded.
    #[error("Tournament was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict { expected: u64, found: u64 },
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored tournament is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Optional narrowing for [`TournamentRepository::list`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TournamentFilter {
    pub status: Option<TournamentStatus>,
    pub bracket_type: Option<BracketType>,
}

impl TournamentFilter {
    pub fn with_status(status: TournamentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, tournament: &Tournament) -> bool {
        self.status.map_or(true, |s| tournament.status == s)
            && self.bracket_type.map_or(true, |b| tournament.bracket_type == b)
    }
}

/// Whole-aggregate storage of tournaments.
pub trait TournamentRepository: Send + Sync {
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    /// Replace the stored aggregate (or insert it). The stored version must equal
    /// `tournament.version`; the returned copy carries the bumped version.
    fn save(&self, tournament: &Tournament) -> Result<Tournament, StoreError>;

    /// Matching tournaments, newest first.
    fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, StoreError>;

    fn delete(&self, id: TournamentId) -> Result<(), StoreError>;
}

/// Version check shared by the implementations: `stored` is the current version, if any.
fn check_version(stored: Option<u64>, incoming: &Tournament) -> Result<Tournament, StoreError> {
    let found = stored.unwrap_or(0);
    if found != incoming.version {
        return Err(StoreError::VersionConflict {
            expected: incoming.version,
            found,
        });
    }
    let mut saved = incoming.clone();
    saved.version = found + 1;
    Ok(saved)
}

fn newest_first(tournaments: &mut [Tournament]) {
    tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
