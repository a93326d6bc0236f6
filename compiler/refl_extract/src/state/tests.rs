use super::*;
use crate::fs::DiskFileSystem;
use pretty_assertions::assert_eq;

#[test]
fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = IncrementalState::load(&DiskFileSystem, &dir.path().join("state.json"));
    assert!(state.is_empty());
}

#[test]
fn test_malformed_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        IncrementalState::try_load(&DiskFileSystem, &path),
        Err(StateError::Malformed { .. })
    ));
    assert!(IncrementalState::load(&DiskFileSystem, &path).is_empty());
}

#[test]
fn test_save_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/state.json");
    let mut state = IncrementalState::new();
    state.stamp("b.h", 20);
    state.stamp("a.h", 10);
    state.save(&DiskFileSystem, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "{\n    \"a.h\": 10,\n    \"b.h\": 20\n}\n");

    let loaded = IncrementalState::load(&DiskFileSystem, &path);
    assert_eq!(loaded, state);
}

#[test]
fn test_is_current() {
    let mut state = IncrementalState::new();
    state.stamp("a.h", 100);
    assert!(state.is_current("a.h", 100));
    assert!(state.is_current("a.h", 99));
    assert!(!state.is_current("a.h", 101));
    assert!(!state.is_current("b.h", 0));
}

#[test]
fn test_retain_drops_unkept_keys() {
    let mut state = IncrementalState::new();
    state.stamp("kept.h", 1);
    state.stamp("gone.h", 2);
    assert_eq!(state.retain(|key| key == "kept.h"), 1);
    assert_eq!(state.iter().collect::<Vec<_>>(), vec![("kept.h", 1)]);
}
