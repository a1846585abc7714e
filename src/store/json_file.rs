//! JSON-file repository: one `<id>.json` document per tournament in a directory.

use crate::models::{Tournament, TournamentId};
use crate::store::{check_version, newest_first, StoreError, TournamentFilter, TournamentRepository};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable store. Writes go to a temp file that is renamed over the old document,
/// so a save either lands completely or not at all.
#[derive(Debug)]
pub struct JsonFileRepository {
    dir: PathBuf,
    /// Serializes version check + write.
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    /// Use `dir` as the data directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        log::info!("Storing tournaments as JSON in {}", dir.display());
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, id: TournamentId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        match fs::read(self.path_for(id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl TournamentRepository for JsonFileRepository {
    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        log::debug!("Loading tournament {id}");
        self.read(id)?.ok_or(StoreError::NotFound(id))
    }

    fn save(&self, tournament: &Tournament) -> Result<Tournament, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let stored = self.read(tournament.id)?;
        let saved = check_version(stored.map(|t| t.version), tournament)?;

        let path = self.path_for(saved.id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&saved)?)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Saved tournament {} at version {}", saved.id, saved.version);
        Ok(saved)
    }

    fn list(&self, filter: &TournamentFilter) -> Result<Vec<Tournament>, StoreError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let tournament: Tournament = serde_json::from_slice(&fs::read(&path)?)?;
            if filter.matches(&tournament) {
                out.push(tournament);
            }
        }
        newest_first(&mut out);
        Ok(out)
    }

    fn delete(&self, id: TournamentId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}
