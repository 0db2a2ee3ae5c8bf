use super::*;
use std::path::PathBuf;
use std::time::SystemTime;

fn t(name: &str) -> Track {
    Track::new(
        PathBuf::from(format!("/music/{name}.mp3")),
        name.into(),
        SystemTime::UNIX_EPOCH,
    )
}

fn names(q: &PlayQueue) -> Vec<String> {
    q.snapshot().into_iter().map(|t| t.display_name).collect()
}

fn queue_of(items: &[&str], library: &[&str]) -> PlayQueue {
    let mut q = PlayQueue::new(library.iter().map(|n| t(n)).collect());
    let items: Vec<Track> = items.iter().map(|n| t(n)).collect();
    if !items.is_empty() {
        q.replace_all_starting_at(&items, 0);
    }
    q
}

#[test]
fn append_reports_tail_index() {
    let mut q = queue_of(&["A", "B"], &[]);
    assert_eq!(q.append_to_end(t("C")), Some(QueueChange::Inserted(2)));
    assert_eq!(names(&q), vec!["A", "B", "C"]);
}

#[test]
fn append_to_empty_makes_it_active() {
    let mut q = queue_of(&[], &["X", "A"]);
    assert_eq!(q.append_to_end(t("A")), Some(QueueChange::Inserted(0)));
    assert_eq!(q.current().map(|t| t.display_name.as_str()), Some("A"));
    assert_eq!(q.library_position(), Some(1));
}

#[test]
fn insert_after_active_into_empty_queue_goes_to_head() {
    let mut q = queue_of(&[], &[]);
    assert_eq!(
        q.insert_after_active(t("A"), 5),
        Some(QueueChange::Inserted(0))
    );
    assert_eq!(names(&q), vec!["A"]);
}

#[test]
fn insert_after_active_never_targets_index_zero() {
    let mut q = queue_of(&["A", "B"], &[]);
    assert_eq!(
        q.insert_after_active(t("X"), 0),
        Some(QueueChange::Inserted(1))
    );
    assert_eq!(names(&q), vec!["A", "X", "B"]);
}

#[test]
fn insert_after_active_clamps_to_tail() {
    let mut q = queue_of(&["A", "B"], &[]);
    assert_eq!(
        q.insert_after_active(t("X"), 99),
        Some(QueueChange::Inserted(2))
    );
    assert_eq!(names(&q), vec!["A", "B", "X"]);
}

#[test]
fn queue_allows_duplicates() {
    let mut q = queue_of(&["A"], &[]);
    q.append_to_end(t("A"));
    q.append_to_end(t("A"));
    assert_eq!(q.len(), 3);
}

#[test]
fn remove_at_ignores_head_and_out_of_bounds() {
    let mut q = queue_of(&["A", "B", "C"], &[]);
    assert_eq!(q.remove_at(0), None);
    assert_eq!(q.remove_at(3), None);
    assert_eq!(names(&q), vec!["A", "B", "C"]);

    assert_eq!(q.remove_at(1), Some(QueueChange::Removed(1)));
    assert_eq!(names(&q), vec!["A", "C"]);
}

#[test]
fn move_from_head_is_a_noop() {
    let mut q = queue_of(&["A", "B", "C", "D"], &[]);
    assert_eq!(q.move_item(0, 2), None);
    assert_eq!(names(&q), vec!["A", "B", "C", "D"]);
}

#[test]
fn move_clamps_target_away_from_head() {
    let mut q = queue_of(&["A", "B", "C", "D"], &[]);
    assert_eq!(q.move_item(3, 0), Some(QueueChange::Moved { from: 3, to: 1 }));
    assert_eq!(names(&q), vec!["A", "D", "B", "C"]);
}

#[test]
fn move_clamps_target_to_last_index() {
    let mut q = queue_of(&["A", "B", "C", "D"], &[]);
    assert_eq!(
        q.move_item(1, 42),
        Some(QueueChange::Moved { from: 1, to: 3 })
    );
    assert_eq!(names(&q), vec!["A", "C", "D", "B"]);
}

#[test]
fn move_to_same_slot_after_clamping_is_a_noop() {
    let mut q = queue_of(&["A", "B"], &[]);
    assert_eq!(q.move_item(1, 0), None);
    assert_eq!(q.move_item(1, 7), None);
    assert_eq!(q.move_item(5, 1), None);
    assert_eq!(names(&q), vec!["A", "B"]);
}

#[test]
fn replace_all_starting_at_rotates() {
    let mut q = queue_of(&["Z"], &[]);
    let src = vec![t("A"), t("B"), t("C"), t("D")];
    assert_eq!(q.replace_all_starting_at(&src, 2), Some(QueueChange::Replaced));
    assert_eq!(names(&q), vec!["C", "D", "A", "B"]);
}

#[test]
fn replace_all_with_bad_start_keeps_queue() {
    let mut q = queue_of(&["Z"], &[]);
    assert_eq!(q.replace_all_starting_at(&[t("A")], 1), None);
    assert_eq!(q.replace_all_starting_at(&[], 0), None);
    assert_eq!(names(&q), vec!["Z"]);
}

#[test]
fn advance_pops_head_when_more_than_one() {
    let mut q = queue_of(&["A", "B", "C"], &["L1", "L2"]);
    assert_eq!(q.advance(), Some(QueueChange::Replaced));
    assert_eq!(names(&q), vec!["B", "C"]);
}

#[test]
fn advance_single_item_falls_back_to_next_library_track() {
    let mut q = queue_of(&["B"], &["A", "B", "C"]);
    q.advance();
    assert_eq!(names(&q), vec!["C"]);
    assert_eq!(q.library_position(), Some(2));

    // wraps
    q.advance();
    assert_eq!(names(&q), vec!["A"]);
}

#[test]
fn advance_with_empty_library_is_a_noop() {
    let mut q = queue_of(&["A"], &[]);
    assert_eq!(q.advance(), None);
    assert_eq!(names(&q), vec!["A"]);

    let mut empty = queue_of(&[], &[]);
    assert_eq!(empty.advance(), None);
    assert!(empty.is_empty());
}

#[test]
fn advance_on_empty_queue_starts_library_from_top() {
    let mut q = queue_of(&[], &["A", "B"]);
    q.advance();
    assert_eq!(names(&q), vec!["A"]);
}

#[test]
fn advance_from_track_outside_library_starts_from_top() {
    let mut q = queue_of(&["Stranger"], &["A", "B"]);
    q.advance();
    assert_eq!(names(&q), vec!["A"]);
}

#[test]
fn rewind_uses_library_order_and_drops_queue() {
    let mut q = queue_of(&["B", "X", "Y"], &["A", "B", "C"]);
    assert_eq!(q.rewind(), Some(QueueChange::Replaced));
    assert_eq!(names(&q), vec!["A"]);

    // wraps backwards
    q.rewind();
    assert_eq!(names(&q), vec!["C"]);
}

#[test]
fn rewind_with_no_position_lands_on_last_library_track() {
    let mut q = queue_of(&[], &["A", "B", "C"]);
    q.rewind();
    assert_eq!(names(&q), vec!["C"]);
}

#[test]
fn rewind_with_empty_library_is_a_noop() {
    let mut q = queue_of(&["A", "B"], &[]);
    assert_eq!(q.rewind(), None);
    assert_eq!(names(&q), vec!["A", "B"]);
}

#[test]
fn set_library_resyncs_position_to_head() {
    let mut q = queue_of(&["B"], &["A", "B"]);
    assert_eq!(q.library_position(), Some(1));
    q.set_library(vec![t("B"), t("C"), t("A")]);
    assert_eq!(q.library_position(), Some(0));
    q.set_library(vec![t("C")]);
    assert_eq!(q.library_position(), None);
}

#[test]
fn snapshot_is_detached_from_live_queue() {
    let mut q = queue_of(&["A", "B"], &[]);
    let snap = q.snapshot();
    q.append_to_end(t("C"));
    assert_eq!(snap.len(), 2);
    assert_eq!(q.len(), 3);
}
