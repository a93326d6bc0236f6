// Test code uses unwrap for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used)]

//! Runs the `reflc` binary against headers in a temporary directory.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

const INVENTORY: &str = r#"
#pragma once

namespace game {

enum class META(Flags) Slot : uint8_t { Head = 1, Body = 2, Feet = 4 };

struct META(Serializable) Item {
    META(DisplayName="Item Name") std::string name;
    META(Min="0") int count;
    META() Slot slot;
};

class META() Inventory : public Item {
public:
    META(ReadOnly) unsigned int capacity;
    META(Callable) bool Add(const Item& item, int amount);
    META(Callable) static Inventory* Create();
};

} // namespace game
"#;

const BROKEN: &str = "struct META() Unterminated { /* never closed\n";

fn reflc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reflc"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project(dir: &Path) {
    let src = dir.join("src");
    std::fs::create_dir_all(src.join("items")).unwrap();
    std::fs::write(src.join("items/inventory.h"), INVENTORY).unwrap();
    std::fs::write(src.join("broken.h"), BROKEN).unwrap();
    std::fs::write(
        dir.join("refl.json"),
        r#"{ "content_root": "src", "generated_dir": "gen", "output_dir": "out", "parallel": false }"#,
    )
    .unwrap();
}

#[test]
fn test_extract_reports_partial_success() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let config = format!("--config={}", dir.path().join("refl.json").display());

    let first = reflc(&["extract", &config, "--stamp-on-success", "--register"]);
    assert_eq!(first.status.code(), Some(0), "stderr: {}", stderr(&first));
    let out = stdout(&first);
    assert!(out.contains("2 scanned, 1 parsed, 0 skipped, 1 failed"), "{out}");
    assert!(out.contains("registered 2 classes, 1 enums"), "{out}");
    assert!(stderr(&first).contains("broken.h"));
    assert!(dir.path().join("out/items_inventory.h.json").is_file());
    assert!(dir.path().join("gen/refl_state.json").is_file());

    // The unchanged header is skipped, the failed one is retried
    let second = reflc(&["extract", &config, "--stamp-on-success"]);
    assert_eq!(second.status.code(), Some(0));
    assert!(stdout(&second).contains("2 scanned, 0 parsed, 1 skipped, 1 failed"));
}

#[test]
fn test_dump_prints_extracted_types() {
    let dir = tempfile::tempdir().unwrap();
    project(dir.path());
    let config = format!("--config={}", dir.path().join("refl.json").display());
    assert_eq!(reflc(&["extract", &config]).status.code(), Some(0));

    let output = reflc(&["dump", &dir.path().join("out").display().to_string()]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("class Inventory : Item"), "{text}");
    assert!(text.contains("struct Item"), "{text}");
    assert!(text.contains("    string name [DisplayName=\"Item Name\"]"), "{text}");
    assert!(text.contains("    enum Slot slot"), "{text}");
    assert!(text.contains("    fn Add(object Item, int32) -> bool [Callable]"), "{text}");
    assert!(text.contains("enum Slot : uint8 [Flags]"), "{text}");
    assert!(text.contains("    Feet = 4"), "{text}");
    // Returns a pointer, so it cannot be mirrored
    assert!(!text.contains("Create"), "{text}");
    assert!(stderr(&output).contains("Inventory::Create"));
}

#[test]
fn test_exit_codes() {
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(reflc(&["frobnicate"]).status.code(), Some(2));
    assert_eq!(reflc(&["extract", "--nope"]).status.code(), Some(2));
    assert_eq!(reflc(&["dump"]).status.code(), Some(2));
    assert_eq!(reflc(&["help"]).status.code(), Some(0));
    assert_eq!(reflc(&["extract", "--help"]).status.code(), Some(0));

    let missing = dir.path().join("missing");
    let generated = format!("--generated={}", dir.path().join("gen").display());
    let output = reflc(&["extract", &missing.display().to_string(), &generated]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot enumerate content root"));
}

#[test]
fn test_version() {
    let output = reflc(&["version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).starts_with("reflc "));
}
