use std::path::{Path, PathBuf};

use super::*;
use crate::config::ExtractorConfig;
use crate::context::ExtractContext;
use crate::walk::extract_units;
use pretty_assertions::assert_eq;
use refl_parse::{parse_source, FrontendArgs, ParseMode};

fn describe(source: &str) -> FileDescriptor {
    let ctx = ExtractContext::new(ExtractorConfig::default());
    let args = FrontendArgs::extraction(Vec::<PathBuf>::new());
    let path = Path::new("door.h");
    let unit = parse_source(path, source, &args, ParseMode::Normal).unwrap();
    let units = FileUnits {
        path: path.to_path_buf(),
        units: extract_units(&ctx, path, &unit),
    };
    Describer::new(&ctx.interner).file("door.h", &units)
}

#[test]
fn test_record_descriptor() {
    let descriptor = describe(
        r#"struct META(Serializable) Door {
    META(ReadOnly, DisplayName="Width") float width;
    META(Callable) void Open(int force);
};"#,
    );
    assert_eq!(descriptor.source, "door.h");
    let UnitDescriptor::Struct(door) = &descriptor.units[0] else {
        panic!("expected a struct descriptor, got {:?}", descriptor.units[0]);
    };
    assert_eq!(door.name, "Door");
    assert_eq!(door.metadata.flags, vec!["Serializable".to_string()]);
    assert_eq!(door.properties[0].name, "width");
    assert_eq!(door.properties[0].ty, "float");
    assert_eq!(
        door.properties[0].metadata.attributes,
        vec![("DisplayName".to_string(), "Width".to_string())]
    );
    assert_eq!(door.methods[0].arguments[0].ty.text, "int");
}

#[test]
fn test_json_shape() {
    let descriptor = describe("enum class META() Mode { Off, On };");
    let json: serde_json::Value = serde_json::from_str(&to_json(&descriptor).unwrap()).unwrap();
    assert_eq!(json["units"][0]["kind"], "enum");
    assert_eq!(json["units"][0]["name"], "Mode");
    assert_eq!(json["units"][0]["fields"][1]["value"], 1);
    assert!(json["units"][0].get("flags").is_none());

    let back: FileDescriptor = serde_json::from_value(json).unwrap();
    assert_eq!(back, descriptor);
}

#[test]
fn test_relative_key_and_descriptor_path() {
    let key = relative_key(Path::new("/src"), Path::new("/src/engine/core/actor.h"));
    assert_eq!(key, "engine/core/actor.h");
    assert_eq!(
        descriptor_path(Path::new("out"), &key),
        PathBuf::from("out/engine_core_actor.h.json")
    );
    assert_eq!(relative_key(Path::new("/other"), Path::new("a/b.h")), "a/b.h");
}
