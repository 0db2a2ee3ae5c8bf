//! Track catalog: scanning a music directory into an ordered, read-only
//! library view.
//!
//! The catalog is refreshed wholesale; nothing downstream mutates it.

mod model;
mod scan;

pub use model::*;
pub use scan::scan;

/// Read-only source of tracks, newest first, with point lookups by id.
pub trait TrackCatalog {
    /// All known tracks, newest-added first, without duplicates.
    fn list_tracks(&self) -> &[Track];

    fn find_by_id(&self, id: TrackId) -> Option<&Track> {
        self.list_tracks().iter().find(|t| t.id == id)
    }
}

impl TrackCatalog for [Track] {
    fn list_tracks(&self) -> &[Track] {
        self
    }
}

impl TrackCatalog for Vec<Track> {
    fn list_tracks(&self) -> &[Track] {
        self
    }
}
