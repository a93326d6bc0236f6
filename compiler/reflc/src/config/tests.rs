use super::*;
use pretty_assertions::assert_eq;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn test_parse_flags() {
    let options = ExtractOptions::parse(&args(&[
        "src",
        "--out=gen/desc",
        "-Iinclude",
        "-I",
        "third_party",
        "--pch=src/pch.h",
        "--no-parallel",
        "--stamp-on-success",
        "-v",
    ]))
    .unwrap();

    assert_eq!(options.root, Some(PathBuf::from("src")));
    assert_eq!(options.output_dir, Some(PathBuf::from("gen/desc")));
    assert_eq!(
        options.include_dirs,
        vec![PathBuf::from("include"), PathBuf::from("third_party")]
    );
    assert_eq!(options.pch_header, Some(PathBuf::from("src/pch.h")));
    assert!(options.no_parallel && options.stamp_on_success && options.verbose);
    assert!(!options.register);
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        ExtractOptions::parse(&args(&["--bogus"])),
        Err(ConfigError::UnknownOption(option)) if option == "--bogus"
    ));
    assert!(matches!(
        ExtractOptions::parse(&args(&["-I"])),
        Err(ConfigError::MissingValue(_))
    ));
    assert!(matches!(
        ExtractOptions::parse(&args(&["--out="])),
        Err(ConfigError::MissingValue(_))
    ));
    assert!(matches!(
        ExtractOptions::parse(&args(&["a", "b"])),
        Err(ConfigError::UnexpectedArgument(arg)) if arg == "b"
    ));
}

#[test]
fn test_resolve_without_file_uses_defaults() {
    let options = ExtractOptions::parse(&args(&["headers", "--stamp-on-success"])).unwrap();
    let config = options.resolve().unwrap();
    assert_eq!(config.content_root, PathBuf::from("headers"));
    assert_eq!(config.stamp_policy, StampPolicy::OnSuccess);
    assert!(config.parallel);
    assert_eq!(config.generated_dir, ExtractorConfig::default().generated_dir);
}

#[test]
fn test_config_file_paths_are_anchored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refl.json");
    std::fs::write(
        &path,
        r#"{ "content_root": "src", "include_dirs": ["inc"], "parallel": false }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.content_root, dir.path().join("src"));
    assert_eq!(config.include_dirs, vec![dir.path().join("inc")]);
    assert!(!config.parallel);
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refl.json");
    std::fs::write(&path, r#"{ "content_root": "src", "include_dirs": ["inc"] }"#).unwrap();

    let options = ExtractOptions {
        root: Some(PathBuf::from("/elsewhere")),
        config: Some(path),
        include_dirs: vec![PathBuf::from("extra")],
        no_parallel: true,
        ..ExtractOptions::default()
    };
    let config = options.resolve().unwrap();
    assert_eq!(config.content_root, PathBuf::from("/elsewhere"));
    assert_eq!(
        config.include_dirs,
        vec![dir.path().join("inc"), PathBuf::from("extra")]
    );
    assert!(!config.parallel);
}

#[test]
fn test_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refl.json");
    std::fs::write(&path, r#"{ "content_rot": "src" }"#).unwrap();
    assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_config(&missing), Err(ConfigError::Read { .. })));
}
