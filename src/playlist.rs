//! Named playlists and their persistence.

mod model;
mod store;

pub use model::{AddOutcome, Playlist, PlaylistBook, PlaylistError, PlaylistId};
pub use store::{PlaylistStore, StoreError};

use tracing::info;

use crate::library::{Track, TrackCatalog, TrackId};

/// Playlists plus the store they are written back to after every change.
#[derive(Debug)]
pub struct Playlists {
    book: PlaylistBook,
    store: PlaylistStore,
}

impl Playlists {
    /// Load once at startup. Missing or unusable data yields no playlists.
    pub fn open(store: PlaylistStore) -> Self {
        let book = store.load();
        info!(count = book.len(), path = %store.path().display(), "playlists loaded");
        Self { book, store }
    }

    pub fn book(&self) -> &PlaylistBook {
        &self.book
    }

    /// Every mutation is applied to a copy that only replaces the live book
    /// once it is on disk.
    pub fn create(&mut self, name: &str) -> Result<PlaylistId, PlaylistError> {
        let mut next = self.book.clone();
        let id = next.create(name)?;
        self.store.save(&next)?;
        self.book = next;
        Ok(id)
    }

    pub fn add_track(&mut self, id: PlaylistId, track: TrackId) -> Result<AddOutcome, PlaylistError> {
        let mut next = self.book.clone();
        let outcome = next.add_track(id, track)?;
        if outcome == AddOutcome::Added {
            self.store.save(&next)?;
            self.book = next;
        }
        Ok(outcome)
    }

    pub fn resolve<C: TrackCatalog + ?Sized>(&self, id: PlaylistId, catalog: &C) -> Vec<Track> {
        self.book.resolve(id, catalog)
    }
}

#[cfg(test)]
mod tests;
