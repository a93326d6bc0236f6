// Test code uses unwrap for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used)]

//! End-to-end front-end tests: files on disk, include paths and saved
//! preamble units.

use std::path::Path;

use pretty_assertions::assert_eq;
use refl_parse::{parse_file, CursorKind, FrontendArgs, ParseMode, TranslationUnit};

const COMMON: &str = r#"
#pragma once
#define GAME_API 1
enum META() Layer { Background = 4, Foreground };
"#;

const DOOR: &str = r#"
#include "common/types.h"
#if defined(GAME_API) && GAME_API
class META(Serializable) Door {
public:
    META() Layer layer;
    META(Callable) bool Open(const std::string& who);
};
#else
class Broken {};
#endif
"#;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_saved_preamble_primes_later_parses() {
    let dir = tempfile::tempdir().unwrap();
    let include = dir.path().join("include");
    let common = write(&include, "common/types.h", COMMON);
    let door = write(dir.path(), "src/door.h", DOOR);

    let args = FrontendArgs::extraction([&include]);
    let preamble = parse_file(&common, &args, ParseMode::ForSerialization).unwrap();
    let pch = dir.path().join("common.pch");
    preamble.save(&pch).unwrap();
    assert_eq!(TranslationUnit::load(&pch).unwrap(), preamble);

    let unit = parse_file(&door, &args.with_pch(&pch), ParseMode::Normal).unwrap();
    assert_eq!(unit.error_count(), 0);
    assert_eq!(unit.includes.len(), 1);

    let names: Vec<(CursorKind, &str, bool)> = unit
        .declarations()
        .map(|c| (c.kind, c.spelling.as_str(), c.location.in_main_file))
        .collect();
    assert_eq!(
        names,
        vec![
            (CursorKind::EnumDecl, "Layer", false),
            (CursorKind::ClassDecl, "Door", true),
        ]
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = parse_file(
        &dir.path().join("absent.h"),
        &FrontendArgs::new(),
        ParseMode::Normal,
    );
    assert!(result.is_err());
}

#[test]
fn test_corrupt_preamble_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let header = write(dir.path(), "a.h", "struct META() A {};\n");
    let pch = write(dir.path(), "bad.pch", "definitely not a unit");
    let args = FrontendArgs::extraction(Vec::<&Path>::new()).with_pch(&pch);
    assert!(parse_file(&header, &args, ParseMode::Normal).is_err());
}
