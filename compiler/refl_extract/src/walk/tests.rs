use std::path::PathBuf;

use super::*;
use crate::config::ExtractorConfig;
use pretty_assertions::assert_eq;
use refl_parse::{parse_source, FrontendArgs, ParseMode};

fn extract(source: &str) -> (ExtractContext, Vec<Unit>) {
    let ctx = ExtractContext::new(ExtractorConfig::default());
    let args = FrontendArgs::extraction(Vec::<PathBuf>::new());
    let path = Path::new("game/player.h");
    let unit = parse_source(path, source, &args, ParseMode::Normal).unwrap();
    let units = extract_units(&ctx, path, &unit);
    (ctx, units)
}

#[test]
fn test_annotated_property() {
    let (ctx, units) = extract(
        r#"
class META() Player {
public:
    META(ReadOnly, DisplayName="Foo")
    int health;
};
"#,
    );
    assert_eq!(units.len(), 1);
    let record = units[0].as_record().unwrap();
    assert_eq!(record.kind, RecordKind::Class);
    assert_eq!(ctx.interner.to_string(record.unit.name), "Player");
    assert_eq!(record.unit.file_path, Path::new("game/player.h"));

    assert_eq!(record.properties.len(), 1);
    let health = &record.properties[0];
    assert_eq!(ctx.interner.to_string(health.unit.name), "health");
    assert_eq!(health.ty, "int");
    let metadata = &health.unit.metadata;
    assert_eq!(metadata.flags.len(), 1);
    assert!(metadata.has_flag(ctx.interner.intern("ReadOnly")));
    assert_eq!(metadata.attributes.len(), 1);
    assert_eq!(
        metadata.attribute(ctx.interner.intern("DisplayName")),
        Some("Foo")
    );
}

#[test]
fn test_enum_constants_in_order() {
    let (ctx, units) = extract("enum class META(Flags) Direction { Left, Right, Up };");
    let enumeration = units[0].as_enum().unwrap();
    let fields: Vec<_> = enumeration
        .fields
        .iter()
        .map(|f| (ctx.interner.to_string(f.name), f.value))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("Left".to_string(), 0),
            ("Right".to_string(), 1),
            ("Up".to_string(), 2),
        ]
    );
    assert!(enumeration.scoped);
    assert_eq!(enumeration.underlying_type, "int");
    assert!(enumeration.unit.metadata.has_flag(ctx.interner.intern("Flags")));
}

#[test]
fn test_unannotated_and_unsupported_members_are_ignored() {
    let (ctx, units) = extract(
        r"
struct META() Inventory {
    META() int count;
    int untracked;
    META() Item* first;
    META() std::vector<int> ids;
    META() std::string label;
    META() Inventory* parent;
};
struct Plain { META() int ignored; };
",
    );
    assert_eq!(units.len(), 1);
    let record = units[0].as_record().unwrap();
    assert_eq!(record.kind, RecordKind::Struct);
    let names: Vec<_> = record
        .properties
        .iter()
        .map(|p| ctx.interner.to_string(p.unit.name))
        .collect();
    assert_eq!(names, vec!["count", "label"]);
    assert_eq!(record.properties[1].byte_offset, 24);
}

#[test]
fn test_property_offsets_and_record_size() {
    let (_, units) = extract(
        "struct Hidden { double d; };\nclass META() Actor : public Hidden { char tag; META() float speed; META() Hidden h; };",
    );
    let record = units[0].as_record().unwrap();
    assert_eq!(record.super_types, vec!["Hidden".to_string()]);
    let offsets: Vec<_> = record.properties.iter().map(|p| p.byte_offset).collect();
    assert_eq!(offsets, vec![12, 16]);
    assert_eq!((record.size, record.align), (24, 8));
}

#[test]
fn test_method_units() {
    let (ctx, units) = extract(
        r"
class META() Door {
public:
    META(Callable) bool Open(const std::string& who, int&& force);
    META() static Door* Create();
    META(Pure) int Width() const;
    void NotReflected();
};
",
    );
    let record = units[0].as_record().unwrap();
    assert_eq!(record.methods.len(), 3);

    let open = record.method(ctx.interner.intern("Open")).unwrap();
    assert_eq!(open.return_type.text, "bool");
    assert!(open.unit.metadata.has_flag(ctx.interner.intern("Callable")));
    assert_eq!(open.arguments.len(), 2);
    assert_eq!(open.arguments[0].name, "who");
    assert!(open.arguments[0].ty.is_const && open.arguments[0].ty.is_lvalue_ref);
    assert!(open.arguments[1].ty.is_rvalue_ref);

    let create = record.method(ctx.interner.intern("Create")).unwrap();
    assert!(create.is_static);
    assert_eq!(create.return_type.text, "Door*");

    let width = record.method(ctx.interner.intern("width")).unwrap();
    assert!(width.is_const);
}

#[test]
fn test_walk_stops_at_invalid_declaration() {
    let (ctx, units) = extract(
        "struct META() First { META() int a; };\nint 42 nonsense;\nstruct META() Second {};\n",
    );
    let names: Vec<_> = units
        .iter()
        .map(|u| ctx.interner.to_string(u.name()))
        .collect();
    assert_eq!(names, vec!["First"]);
}

#[test]
fn test_namespaces_are_descended() {
    let (ctx, units) = extract(
        "namespace game { namespace detail { enum class META() Mode : uint8_t { Off = 1 }; } }",
    );
    let enumeration = units[0].as_enum().unwrap();
    assert_eq!(ctx.interner.to_string(enumeration.unit.name), "Mode");
    assert_eq!(enumeration.underlying_type, "uint8_t");
    assert_eq!(enumeration.fields[0].value, 1);
}
