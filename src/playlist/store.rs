//! JSON persistence for [`PlaylistBook`].
//!
//! The whole book is one document:
//! `{"playlists":[{"id":1,"name":"x"}],"songsByPlaylist":{"1":[...]}}`.
//! Anything that does not validate is discarded wholesale.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::library::TrackId;

use super::model::{Playlist, PlaylistBook, PlaylistId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed playlist data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid playlist data: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    playlists: Vec<Entry>,
    #[serde(default)]
    songs_by_playlist: BTreeMap<String, Vec<TrackId>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    id: u64,
    name: String,
}

impl From<&PlaylistBook> for Document {
    fn from(book: &PlaylistBook) -> Self {
        Self {
            playlists: book
                .iter()
                .map(|p| Entry {
                    id: p.id.0,
                    name: p.name.clone(),
                })
                .collect(),
            songs_by_playlist: book
                .iter()
                .map(|p| (p.id.to_string(), p.tracks().to_vec()))
                .collect(),
        }
    }
}

impl TryFrom<Document> for PlaylistBook {
    type Error = StoreError;

    fn try_from(mut doc: Document) -> Result<Self, Self::Error> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        let mut playlists = Vec::with_capacity(doc.playlists.len());

        for entry in doc.playlists {
            let name = entry.name.trim();
            if entry.id == 0 || name.is_empty() {
                return Err(StoreError::Invalid(format!(
                    "bad playlist entry (id {}, name {:?})",
                    entry.id, entry.name
                )));
            }
            if !ids.insert(entry.id) || !names.insert(name.to_lowercase()) {
                return Err(StoreError::Invalid(format!(
                    "duplicate playlist {} {:?}",
                    entry.id, name
                )));
            }

            let tracks = doc
                .songs_by_playlist
                .remove(&entry.id.to_string())
                .unwrap_or_default();
            let mut seen = HashSet::new();
            if !tracks.iter().all(|t| seen.insert(*t)) {
                return Err(StoreError::Invalid(format!(
                    "playlist {} lists a track twice",
                    entry.id
                )));
            }

            playlists.push(Playlist::new(PlaylistId(entry.id), name.to_string(), tracks));
        }

        Ok(PlaylistBook::from_playlists(playlists))
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
}

impl PlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: absent, unreadable or invalid data means no playlists.
    pub fn load(&self) -> PlaylistBook {
        match self.try_load() {
            Ok(Some(book)) => book,
            Ok(None) => {
                debug!(path = %self.path.display(), "no playlist data yet");
                PlaylistBook::default()
            }
            Err(err) => {
                warn!(error = %err, "discarding playlist data");
                PlaylistBook::default()
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<PlaylistBook>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let doc: Document = serde_json::from_str(&raw)?;
        PlaylistBook::try_from(doc).map(Some)
    }

    /// Write the whole book, replacing the previous document atomically.
    pub fn save(&self, book: &PlaylistBook) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(&Document::from(book))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        debug!(path = %self.path.display(), count = book.len(), "playlists saved");
        Ok(())
    }
}
