//! In-memory repository: tournaments by id behind a `RwLock`.

use crate::models::{Tournament, TournamentId};
use crate::store::{check_version, newest_first, StoreError, TournamentFilter, TournamentRepository};
use std::collections::HashMap;
use std::sync::RwLock;

/// Non-durable store, lost on restart. Default when no data directory is configured.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentRepository for MemoryRepository {
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        let g = self.tournaments.read().map_err(|_| StoreError::Poisoned)?;
        g.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn save(&self, tournament: &Tournament) -> Result<Tournament, StoreError> {
        let mut g = self.tournaments.write().map_err(|_| StoreError::Poisoned)?;
        let saved = check_version(g.get(&tournament.id).map(|t| t.version), tournament)?;
        g.insert(saved.id, saved.clone());
        Ok(saved)
    }

    fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, StoreError> {
        let g = self.tournaments.read().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<Tournament> = g.values().filter(|t| filter.matches(t)).cloned().collect();
        newest_first(&mut out);
        Ok(out)
    }

    fn delete(&self, id: TournamentId) -> Result<(), StoreError> {
        let mut g = self.tournaments.write().map_err(|_| StoreError::Poisoned)?;
        g.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }
}
