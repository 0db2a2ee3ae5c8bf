use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::{Track, TrackCatalog, TrackId};

use super::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub u64);

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist name is empty")]
    EmptyName,
    #[error("playlist \"{0}\" already exists")]
    Duplicate(String),
    #[error("no playlist with id {0}")]
    Unknown(PlaylistId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    tracks: Vec<TrackId>,
}

impl Playlist {
    pub(super) fn new(id: PlaylistId, name: String, tracks: Vec<TrackId>) -> Self {
        Self { id, name, tracks }
    }

    /// Member ids in insertion order, without duplicates.
    pub fn tracks(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// All playlists in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistBook {
    playlists: Vec<Playlist>,
}

impl PlaylistBook {
    pub(super) fn from_playlists(playlists: Vec<Playlist>) -> Self {
        Self { playlists }
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Playlist> {
        self.playlists.iter()
    }

    pub fn get(&self, id: PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Playlist> {
        self.playlists
            .iter()
            .find(|p| p.name.to_lowercase() == name.to_lowercase())
    }

    /// Ids start at 1 and are one past the highest existing id.
    fn next_id(&self) -> PlaylistId {
        PlaylistId(self.playlists.iter().map(|p| p.id.0).max().unwrap_or(0) + 1)
    }

    pub fn create(&mut self, name: &str) -> Result<PlaylistId, PlaylistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaylistError::EmptyName);
        }
        if self.find_by_name(name).is_some() {
            return Err(PlaylistError::Duplicate(name.to_string()));
        }

        let id = self.next_id();
        self.playlists
            .push(Playlist::new(id, name.to_string(), Vec::new()));
        Ok(id)
    }

    /// Idempotent: a track already in the playlist is left where it is.
    pub fn add_track(&mut self, id: PlaylistId, track: TrackId) -> Result<AddOutcome, PlaylistError> {
        let playlist = self
            .playlists
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PlaylistError::Unknown(id))?;

        if playlist.tracks.contains(&track) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        playlist.tracks.push(track);
        Ok(AddOutcome::Added)
    }

    /// Member tracks that the catalog still knows about, in playlist order.
    pub fn resolve<C: TrackCatalog + ?Sized>(&self, id: PlaylistId, catalog: &C) -> Vec<Track> {
        let Some(playlist) = self.get(id) else {
            return Vec::new();
        };
        playlist
            .tracks
            .iter()
            .filter_map(|tid| catalog.find_by_id(*tid).cloned())
            .collect()
    }
}
