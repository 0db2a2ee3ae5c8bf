//! The play queue and its mutation protocol.
//!
//! Index 0 of a non-empty queue is the *active* track. Explicit edits
//! (`remove_at`, `move_item`, `insert_after_active`) never touch it; it only
//! changes through `advance`, `rewind` or a full replace.
//!
//! The queue also keeps the library view, which is the fallback sequence once
//! the queue runs dry, and the library position of the active track.

use tracing::trace;

use crate::library::{Track, TrackId};

/// What a successful mutation did, so a presentation layer can animate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueChange {
    Inserted(usize),
    Removed(usize),
    /// A single reorder, reported as one move rather than remove + insert.
    Moved { from: usize, to: usize },
    /// The whole queue was rebuilt (replace, advance, rewind).
    Replaced,
}

#[derive(Debug, Default, Clone)]
pub struct PlayQueue {
    items: Vec<Track>,
    library: Vec<Track>,
    /// Library index of the active track, if it is in the library at all.
    library_pos: Option<usize>,
}

impl PlayQueue {
    pub fn new(library: Vec<Track>) -> Self {
        Self {
            items: Vec::new(),
            library,
            library_pos: None,
        }
    }

    /// The active track.
    pub fn current(&self) -> Option<&Track> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A copy of the queue; the live list never leaves this struct.
    pub fn snapshot(&self) -> Vec<Track> {
        self.items.clone()
    }

    pub fn library(&self) -> &[Track] {
        &self.library
    }

    pub fn library_position(&self) -> Option<usize> {
        self.library_pos
    }

    pub fn find_in_library(&self, id: TrackId) -> Option<&Track> {
        self.library.iter().find(|t| t.id == id)
    }

    /// Swap in a freshly scanned library and re-find the active track in it.
    pub fn set_library(&mut self, tracks: Vec<Track>) {
        self.library = tracks;
        self.library_pos = None;
        self.sync_library_pos();
    }

    pub fn append_to_end(&mut self, track: Track) -> Option<QueueChange> {
        self.items.push(track);
        let index = self.items.len() - 1;
        if index == 0 {
            self.sync_library_pos();
        }
        Some(QueueChange::Inserted(index))
    }

    /// Insert somewhere after the active track. `desired` is clamped to
    /// `1..=len`; into an empty queue the track lands at 0 and becomes active.
    pub fn insert_after_active(&mut self, track: Track, desired: usize) -> Option<QueueChange> {
        if self.items.is_empty() {
            self.items.push(track);
            self.sync_library_pos();
            return Some(QueueChange::Inserted(0));
        }

        let index = desired.clamp(1, self.items.len());
        self.items.insert(index, track);
        Some(QueueChange::Inserted(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<QueueChange> {
        if index == 0 || index >= self.items.len() {
            trace!(index, len = self.items.len(), "ignoring queue removal");
            return None;
        }
        self.items.remove(index);
        Some(QueueChange::Removed(index))
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Option<QueueChange> {
        let len = self.items.len();
        if from == 0 || from >= len {
            trace!(from, to, len, "ignoring queue move");
            return None;
        }

        // from >= 1 implies len >= 2, so the range is never empty.
        let to = to.clamp(1, len - 1);
        if to == from {
            return None;
        }

        let track = self.items.remove(from);
        self.items.insert(to, track);
        Some(QueueChange::Moved { from, to })
    }

    /// Replace the queue with `source` rotated so that `source[start]` is
    /// active, followed by the rest and then the items before `start`.
    pub fn replace_all_starting_at(&mut self, source: &[Track], start: usize) -> Option<QueueChange> {
        if start >= source.len() {
            return None;
        }

        let mut items = Vec::with_capacity(source.len());
        items.extend_from_slice(&source[start..]);
        items.extend_from_slice(&source[..start]);
        self.items = items;
        self.sync_library_pos();
        Some(QueueChange::Replaced)
    }

    pub fn replace_with_single(&mut self, track: Track) -> Option<QueueChange> {
        self.items.clear();
        self.items.push(track);
        self.sync_library_pos();
        Some(QueueChange::Replaced)
    }

    /// Move on to the next track.
    ///
    /// With more than one item the head is popped. Otherwise the library
    /// position steps forward (wrapping) and that single track becomes the
    /// queue. Returns `None` when there is nothing to move to.
    pub fn advance(&mut self) -> Option<QueueChange> {
        if self.items.len() > 1 {
            self.items.remove(0);
            self.sync_library_pos();
            return Some(QueueChange::Replaced);
        }

        let n = self.library.len();
        if n == 0 {
            return None;
        }
        self.sync_library_pos();
        let next = self.library_pos.map_or(0, |i| (i + 1) % n);
        self.jump_to_library(next)
    }

    /// Step back in *library* order, whatever the queue holds.
    ///
    /// "Previous" has no queue history to consult, so the queue is discarded
    /// and replaced by the library track before the current position.
    pub fn rewind(&mut self) -> Option<QueueChange> {
        let n = self.library.len();
        if n == 0 {
            return None;
        }
        let prev = self.library_pos.map_or(n - 1, |i| (i + n - 1) % n);
        self.jump_to_library(prev)
    }

    fn jump_to_library(&mut self, index: usize) -> Option<QueueChange> {
        let track = self.library.get(index)?.clone();
        self.items.clear();
        self.items.push(track);
        self.library_pos = Some(index);
        Some(QueueChange::Replaced)
    }

    /// Point the library position at the active track, if the library has it.
    /// A head that is not in the library leaves the old position alone.
    fn sync_library_pos(&mut self) {
        let Some(head) = self.items.first() else {
            return;
        };
        if let Some(i) = self.library.iter().position(|t| t.id == head.id) {
            self.library_pos = Some(i);
        }
    }
}

#[cfg(test)]
mod tests;
