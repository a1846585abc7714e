//! Player roster: display data for participant ids, loaded from a CSV export.
//!
//! The engine never checks participant ids against the roster; it is only used to fill in
//! display names when a tournament is created.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("could not read roster: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster lists player {0} more than once")]
    DuplicatePlayer(String),
}

/// One community member. Header row: `id,nickname,discordUsername,minecraftUsername`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub discord_username: Option<String>,
    #[serde(default)]
    pub minecraft_username: Option<String>,
}

impl RosterEntry {
    /// Nickname, then Minecraft name, then Discord name.
    pub fn display_name(&self) -> Option<&str> {
        [&self.nickname, &self.minecraft_username, &self.discord_username]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    by_id: HashMap<String, usize>,
}

impl Roster {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RosterError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, RosterError> {
        let mut roster = Roster::default();
        for record in reader.deserialize() {
            let entry: RosterEntry = record?;
            if roster.by_id.contains_key(&entry.id) {
                return Err(RosterError::DuplicatePlayer(entry.id));
            }
            roster.by_id.insert(entry.id.clone(), roster.entries.len());
            roster.entries.push(entry);
        }
        Ok(roster)
    }

    pub fn get(&self, id: &str) -> Option<&RosterEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(RosterEntry::display_name)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
