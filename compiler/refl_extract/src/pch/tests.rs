use super::*;
use crate::fs::DiskFileSystem;
use pretty_assertions::assert_eq;

fn args() -> FrontendArgs {
    FrontendArgs::extraction(Vec::<PathBuf>::new())
}

/// Move a file's modification time a minute into the past.
fn backdate(path: &Path) {
    let past = std::time::SystemTime::now() - std::time::Duration::from_secs(60);
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(past)
        .unwrap();
}

#[test]
fn test_output_path() {
    let manager = PchManager::new(&DiskFileSystem, "gen");
    assert_eq!(
        manager.output_path(Path::new("src/engine/prelude.hpp")),
        PathBuf::from("gen/pch/prelude.pch")
    );
}

#[test]
fn test_missing_header() {
    let dir = tempfile::tempdir().unwrap();
    let manager = PchManager::new(&DiskFileSystem, dir.path());
    let result = manager.prepare(&dir.path().join("absent.h"), &args());
    assert!(matches!(result, Err(PchError::MissingHeader { .. })));
}

#[test]
fn test_build_then_reuse() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("prelude.h");
    std::fs::write(&header, "#define LIMIT 4\nstruct Base { int id; };\n").unwrap();
    backdate(&header);
    let manager = PchManager::new(&DiskFileSystem, dir.path().join("gen"));

    let artifact = manager.prepare(&header, &args()).unwrap();
    assert_eq!(artifact, dir.path().join("gen/pch/prelude.pch"));
    let unit = TranslationUnit::load(&artifact).unwrap();
    assert!(unit.macros.contains_key("LIMIT"));
    assert_eq!(unit.root.children.len(), 1);

    assert!(manager.is_fresh(&header, &artifact));
    let built = std::fs::metadata(&artifact).unwrap().modified().unwrap();
    manager.prepare(&header, &args()).unwrap();
    let reused = std::fs::metadata(&artifact).unwrap().modified().unwrap();
    assert_eq!(built, reused);
}

#[test]
fn test_unbalanced_header_fails() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("broken.h");
    std::fs::write(&header, "#ifdef X\n").unwrap();
    let manager = PchManager::new(&DiskFileSystem, dir.path());
    assert!(matches!(
        manager.prepare(&header, &args()),
        Err(PchError::Parse(_))
    ));
}

#[test]
fn test_same_second_artifact_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("prelude.h");
    std::fs::write(&header, "struct Base {};\n").unwrap();
    let manager = PchManager::new(&DiskFileSystem, dir.path().join("gen"));
    let artifact = manager.prepare(&header, &args()).unwrap();

    let stamp = std::fs::metadata(&header).unwrap().modified().unwrap();
    std::fs::File::options()
        .write(true)
        .open(&artifact)
        .unwrap()
        .set_modified(stamp)
        .unwrap();
    assert!(!manager.is_fresh(&header, &artifact));
}

#[test]
fn test_unreadable_artifact_is_rebuilt() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("prelude.h");
    std::fs::write(&header, "#define LIMIT 4\n").unwrap();
    backdate(&header);
    let manager = PchManager::new(&DiskFileSystem, dir.path().join("gen"));

    let artifact = manager.output_path(&header);
    std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    std::fs::write(&artifact, b"garbage-not-a-pch").unwrap();
    assert!(manager.is_fresh(&header, &artifact));
    assert!(!manager.is_loadable(&artifact));

    assert_eq!(manager.prepare(&header, &args()).unwrap(), artifact);
    assert!(manager.is_loadable(&artifact));
    let unit = TranslationUnit::load(&artifact).unwrap();
    assert!(unit.macros.contains_key("LIMIT"));
}
