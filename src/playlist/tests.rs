use super::*;
use crate::library::Track;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::tempdir;

fn t(name: &str) -> Track {
    Track::new(
        PathBuf::from(format!("/music/{name}.mp3")),
        name.into(),
        SystemTime::UNIX_EPOCH,
    )
}

#[test]
fn ids_start_at_one_and_follow_the_maximum() {
    let mut book = PlaylistBook::default();
    assert_eq!(book.create("Road").unwrap(), PlaylistId(1));
    assert_eq!(book.create("Gym").unwrap(), PlaylistId(2));
}

#[test]
fn names_are_trimmed_and_must_be_non_empty() {
    let mut book = PlaylistBook::default();
    assert!(matches!(book.create("   "), Err(PlaylistError::EmptyName)));
    let id = book.create("  Chill  ").unwrap();
    assert_eq!(book.get(id).unwrap().name, "Chill");
}

#[test]
fn names_are_unique_ignoring_case() {
    let mut book = PlaylistBook::default();
    book.create("Chill").unwrap();
    assert!(matches!(
        book.create("CHILL"),
        Err(PlaylistError::Duplicate(name)) if name == "CHILL"
    ));
    assert_eq!(book.len(), 1);
}

#[test]
fn adding_a_track_twice_keeps_one_entry() {
    let mut book = PlaylistBook::default();
    let id = book.create("Mix").unwrap();
    let a = t("A").id;
    assert_eq!(book.add_track(id, a).unwrap(), AddOutcome::Added);
    assert_eq!(book.add_track(id, a).unwrap(), AddOutcome::AlreadyPresent);
    assert_eq!(book.get(id).unwrap().tracks(), &[a]);
}

#[test]
fn adding_to_unknown_playlist_fails() {
    let mut book = PlaylistBook::default();
    assert!(matches!(
        book.add_track(PlaylistId(9), t("A").id),
        Err(PlaylistError::Unknown(PlaylistId(9)))
    ));
}

#[test]
fn resolve_skips_tracks_missing_from_catalog() {
    let mut book = PlaylistBook::default();
    let id = book.create("Mix").unwrap();
    book.add_track(id, t("B").id).unwrap();
    book.add_track(id, t("gone").id).unwrap();
    book.add_track(id, t("A").id).unwrap();

    let catalog = vec![t("A"), t("B")];
    let names: Vec<_> = book
        .resolve(id, &catalog)
        .into_iter()
        .map(|t| t.display_name)
        .collect();
    assert_eq!(names, vec!["B", "A"]);
}

#[test]
fn store_round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("nested/playlists.json"));

    let mut book = PlaylistBook::default();
    let id = book.create("Mix").unwrap();
    book.add_track(id, t("A").id).unwrap();
    book.create("Empty").unwrap();
    store.save(&book).unwrap();

    assert_eq!(store.load(), book);
}

#[test]
fn store_writes_the_documented_layout() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("playlists.json"));
    let mut book = PlaylistBook::default();
    let id = book.create("Mix").unwrap();
    book.add_track(id, crate::library::TrackId(42)).unwrap();
    store.save(&book).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "playlists": [{"id": 1, "name": "Mix"}],
            "songsByPlaylist": {"1": [42]}
        })
    );
}

#[test]
fn missing_file_means_no_playlists() {
    let dir = tempdir().unwrap();
    let store = PlaylistStore::new(dir.path().join("playlists.json"));
    assert!(store.load().is_empty());
    assert!(store.try_load().unwrap().is_none());
}

#[test]
fn corrupt_data_is_discarded_wholesale() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlists.json");
    let store = PlaylistStore::new(&path);

    for bad in [
        "{not json",
        r#"{"playlists":[{"id":1,"name":"A"},{"id":2,"name":""}]}"#,
        r#"{"playlists":[{"id":1,"name":"A"},{"id":1,"name":"B"}]}"#,
        r#"{"playlists":[{"id":1,"name":"A"},{"id":2,"name":"a"}]}"#,
        r#"{"playlists":[{"id":1,"name":"A"}],"songsByPlaylist":{"1":[5,5]}}"#,
    ] {
        fs::write(&path, bad).unwrap();
        assert!(store.load().is_empty(), "accepted: {bad}");
    }
}

#[test]
fn playlists_without_member_lists_load_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlists.json");
    fs::write(&path, r#"{"playlists":[{"id":3,"name":"Later"}]}"#).unwrap();

    let book = PlaylistStore::new(&path).load();
    let p = book.get(PlaylistId(3)).unwrap();
    assert!(p.is_empty());
}

#[test]
fn manager_persists_every_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlists.json");

    let mut playlists = Playlists::open(PlaylistStore::new(&path));
    let id = playlists.create("Mix").unwrap();
    playlists.add_track(id, t("A").id).unwrap();

    let reopened = Playlists::open(PlaylistStore::new(&path));
    assert_eq!(reopened.book().get(id).unwrap().tracks(), &[t("A").id]);
    assert_eq!(reopened.resolve(id, &vec![t("A")]).len(), 1);
}

#[test]
fn failed_save_leaves_book_untouched() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    let path = sub.join("playlists.json");

    let mut playlists = Playlists::open(PlaylistStore::new(&path));
    let id = playlists.create("Mix").unwrap();

    // A plain file where the directory was makes every later save fail.
    fs::remove_dir_all(&sub).unwrap();
    fs::write(&sub, b"not a directory").unwrap();

    assert!(matches!(
        playlists.add_track(id, t("A").id),
        Err(PlaylistError::Store(_))
    ));
    assert!(playlists.book().get(id).unwrap().is_empty());

    assert!(matches!(
        playlists.create("Road"),
        Err(PlaylistError::Store(_))
    ));
    assert!(playlists.book().find_by_name("Road").is_none());
    // Retrying reports the same store error, not a duplicate name.
    assert!(matches!(
        playlists.create("Road"),
        Err(PlaylistError::Store(_))
    ));
    assert_eq!(playlists.book().len(), 1);
}
