//! Turning a gesture on a list item into a session command.
//!
//! Every list the UI shows (library, playlist detail, queue) hands out the
//! same [`SelectableItem`]; which commands a gesture produces depends only on
//! the item's [`ItemSource`].

use crate::library::Track;
use crate::playlist::PlaylistId;
use crate::session::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    Library,
    Playlist(PlaylistId),
    Queue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectableItem {
    pub source: ItemSource,
    /// Index within the list the item was picked from.
    pub position: usize,
    pub track: Track,
}

impl SelectableItem {
    pub fn new(source: ItemSource, position: usize, track: Track) -> Self {
        Self {
            source,
            position,
            track,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Tap / enter.
    Activate,
    /// "Add to queue" from a context menu.
    AddToQueue,
    /// Dropped onto the queue, at `position` if it landed on a row.
    DropOnQueue { position: Option<usize> },
    /// Dropped anywhere outside the queue.
    DropOutside,
}

/// `context` is the full list the item came from; it is only consulted when
/// activating a playlist entry, which queues the whole playlist.
pub fn interpret(item: &SelectableItem, gesture: Gesture, context: &[Track]) -> Option<Command> {
    use Gesture::*;
    use ItemSource::*;

    match (item.source, gesture) {
        (Library, Activate) => Some(Command::PlayTrack(item.track.id)),
        (Playlist(_), Activate) => Some(Command::ReplaceQueue {
            tracks: context.to_vec(),
            start: item.position,
            play: true,
        }),
        (Library | Playlist(_), AddToQueue) => Some(Command::AppendToQueue(item.track.clone())),
        (Library | Playlist(_), DropOnQueue { position }) => Some(Command::InsertAfterActive {
            track: item.track.clone(),
            index: position.unwrap_or(usize::MAX),
        }),
        (Queue, DropOnQueue { position: Some(to) }) => Some(Command::MoveInQueue {
            from: item.position,
            to,
        }),
        (Queue, DropOutside) => Some(Command::RemoveFromQueue(item.position)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn t(name: &str) -> Track {
        Track::new(
            PathBuf::from(format!("/m/{name}.wav")),
            name.into(),
            SystemTime::UNIX_EPOCH,
        )
    }

    fn item(source: ItemSource, position: usize, name: &str) -> SelectableItem {
        SelectableItem::new(source, position, t(name))
    }

    #[test]
    fn activating_library_item_plays_it() {
        let it = item(ItemSource::Library, 4, "A");
        assert_eq!(
            interpret(&it, Gesture::Activate, &[]),
            Some(Command::PlayTrack(t("A").id))
        );
    }

    #[test]
    fn activating_playlist_item_queues_playlist_from_there() {
        let list = vec![t("A"), t("B"), t("C")];
        let it = item(ItemSource::Playlist(PlaylistId(1)), 1, "B");
        assert_eq!(
            interpret(&it, Gesture::Activate, &list),
            Some(Command::ReplaceQueue {
                tracks: list.clone(),
                start: 1,
                play: true
            })
        );
    }

    #[test]
    fn add_and_drop_from_lists_enqueue() {
        for source in [ItemSource::Library, ItemSource::Playlist(PlaylistId(2))] {
            let it = item(source, 0, "A");
            assert_eq!(
                interpret(&it, Gesture::AddToQueue, &[]),
                Some(Command::AppendToQueue(t("A")))
            );
            assert_eq!(
                interpret(&it, Gesture::DropOnQueue { position: Some(2) }, &[]),
                Some(Command::InsertAfterActive {
                    track: t("A"),
                    index: 2
                })
            );
            assert_eq!(
                interpret(&it, Gesture::DropOnQueue { position: None }, &[]),
                Some(Command::InsertAfterActive {
                    track: t("A"),
                    index: usize::MAX
                })
            );
            assert_eq!(interpret(&it, Gesture::DropOutside, &[]), None);
        }
    }

    #[test]
    fn queue_items_move_or_leave() {
        let it = item(ItemSource::Queue, 3, "A");
        assert_eq!(
            interpret(&it, Gesture::DropOnQueue { position: Some(1) }, &[]),
            Some(Command::MoveInQueue { from: 3, to: 1 })
        );
        assert_eq!(
            interpret(&it, Gesture::DropOutside, &[]),
            Some(Command::RemoveFromQueue(3))
        );
        assert_eq!(interpret(&it, Gesture::Activate, &[]), None);
        assert_eq!(interpret(&it, Gesture::AddToQueue, &[]), None);
        assert_eq!(
            interpret(&it, Gesture::DropOnQueue { position: None }, &[]),
            None
        );
    }
}
