use super::*;
use std::{
    fs::{create_dir_all, write},
    time::{Duration, UNIX_EPOCH},
};

#[test]
fn insert_keeps_last_record_for_duplicate_key() {
    let mut snapshot = Snapshot::new("/src");
    let t = UNIX_EPOCH + Duration::from_secs(10);

    snapshot.insert(FileRecord::new("a.txt", "/src/a.txt", 1, t));
    snapshot.insert(FileRecord::new("a.txt", "/src/a.txt", 2, t));

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("a.txt").map(|r| r.size), Some(2));
}

#[test]
fn build_snapshot_maps_keys_to_metadata() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let root = tmp.path();

    create_dir_all(root.join("docs").join("img")).expect("create dirs");
    write(root.join("readme.md"), b"hello").expect("write readme");
    write(root.join("docs").join("img").join("logo.png"), vec![0u8; 300]).expect("write logo");

    let snapshot = build_snapshot(root, 3).expect("snapshot");

    assert_eq!(snapshot.root(), root);
    assert_eq!(snapshot.len(), 2);

    let logo = snapshot.get("docs/img/logo.png").expect("nested key present");
    assert_eq!(logo.size, 300);
    assert_eq!(logo.full_path, root.join("docs").join("img").join("logo.png"));
    assert!(snapshot.contains("readme.md"));
    assert!(!snapshot.contains("docs"));
}

#[test]
fn build_snapshot_of_empty_dir_is_empty() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let snapshot = build_snapshot(tmp.path(), 2).expect("snapshot");
    assert!(snapshot.is_empty());
}

#[test]
fn build_snapshot_propagates_enumeration_failure() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let missing = tmp.path().join("missing");

    assert!(build_snapshot(&missing, 2).is_err());
}
