use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh64::xxh64;

/// Stable identifier of a track.
///
/// Derived from the file path so it survives restarts, which is what lets
/// playlists refer to tracks by id alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl TrackId {
    pub fn from_path(path: &Path) -> Self {
        Self(xxh64(path.as_os_str().as_encoded_bytes(), 0))
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A single playable item. Immutable once the catalog has produced it.
///
/// Equality is by id only.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub display_name: String,
    /// Where the decoding engine reads the audio from.
    pub locator: PathBuf,
    pub added_at: SystemTime,
}

impl Track {
    pub fn new(locator: PathBuf, display_name: String, added_at: SystemTime) -> Self {
        Self {
            id: TrackId::from_path(&locator),
            display_name,
            locator,
            added_at,
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}
