use super::*;
use pretty_assertions::assert_eq;
use refl_runtime::{ArgBlock, EnumValue, ReflectContext, Variant};

const ACTOR_HEADER: &str = r#"{
    "source": "game/actor.h",
    "units": [
        {
            "kind": "class",
            "name": "Entity",
            "super_types": [],
            "size": 4,
            "align": 4,
            "properties": [
                { "name": "id", "type": "int", "offset": 0, "line": 3 }
            ],
            "methods": [],
            "line": 2
        },
        {
            "kind": "class",
            "name": "Actor",
            "super_types": ["IRenderable", "Entity"],
            "size": 48,
            "align": 8,
            "properties": [
                {
                    "name": "health",
                    "type": "int",
                    "offset": 4,
                    "line": 9,
                    "flags": ["ReadOnly"],
                    "attributes": [["DisplayName", "Health Points"]]
                },
                { "name": "name", "type": "std::string", "offset": 8, "line": 10 },
                { "name": "team", "type": "Team", "offset": 40, "line": 11 },
                { "name": "slots", "type": "int", "offset": 44, "array_len": 4, "line": 12 }
            ],
            "methods": [
                {
                    "name": "Heal",
                    "return_type": { "text": "int" },
                    "arguments": [{ "name": "amount", "type": { "text": "const int&", "is_const": true, "is_lvalue_ref": true } }],
                    "line": 14
                },
                {
                    "name": "Owner",
                    "return_type": { "text": "Entity*" },
                    "arguments": [],
                    "line": 15
                },
                {
                    "name": "Count",
                    "is_static": true,
                    "return_type": { "text": "unsigned int" },
                    "arguments": [],
                    "line": 16
                }
            ],
            "line": 8
        },
        {
            "kind": "enum",
            "name": "Team",
            "underlying_type": "uint8_t",
            "scoped": true,
            "fields": [
                { "name": "Red", "value": 0 },
                { "name": "Blue", "value": 1 },
                { "name": "Green", "value": 2 }
            ],
            "line": 20
        }
    ]
}"#;

fn descriptor(json: &str) -> FileDescriptor {
    serde_json::from_str(json).unwrap()
}

fn mirror(files: &[FileDescriptor]) -> (ReflectContext, MirrorReport) {
    let (registry, report) = build_registry(SharedInterner::new(), files).unwrap();
    (ReflectContext::new(registry), report)
}

#[test]
fn test_scalar_types() {
    assert_eq!(scalar_type("int"), Some(VariantType::I32));
    assert_eq!(scalar_type("std::int64_t"), Some(VariantType::I64));
    assert_eq!(scalar_type("unsigned char"), Some(VariantType::U8));
    assert_eq!(scalar_type("long double"), Some(VariantType::F64));
    assert_eq!(scalar_type("std::string"), Some(VariantType::String));
    assert_eq!(scalar_type("Vec3"), None);
}

#[test]
fn test_strip_type() {
    assert_eq!(strip_type("const std::string&"), Some("std::string"));
    assert_eq!(strip_type("int const &&"), Some("int"));
    assert_eq!(strip_type("volatile const unsigned int"), Some("unsigned int"));
    assert_eq!(strip_type("const Actor*"), None);
}

#[test]
fn test_mirror_counts_and_skips() {
    let (_, report) = mirror(&[descriptor(ACTOR_HEADER)]);
    assert_eq!(report.classes, 2);
    assert_eq!(report.enums, 1);
    assert_eq!(report.properties, 4);
    assert_eq!(report.methods, 2);
    assert_eq!(
        report.skipped,
        vec![
            "Actor::slots: array properties are not mirrored".to_owned(),
            "Actor::Owner: unsupported return type 'Entity*'".to_owned(),
        ]
    );
}

#[test]
fn test_first_reflected_base_is_super_type() {
    let (ctx, _) = mirror(&[descriptor(ACTOR_HEADER)]);
    assert!(ctx.is_child_of("Actor", "Entity"));
    assert!(!ctx.is_child_of("Entity", "Actor"));
    let actor = ctx.class("Actor").unwrap();
    assert_eq!(actor.meta().size(), Some(48));
}

#[test]
fn test_dynamic_instances_read_and_write() {
    let (ctx, _) = mirror(&[descriptor(ACTOR_HEADER)]);
    let actor = ctx.instantiate("Actor").unwrap();

    assert_eq!(ctx.get_value(&actor, "health"), Variant::I32(0));
    assert!(ctx.set_value(&actor, "health", &Variant::I32(42)));
    assert_eq!(ctx.get_value(&actor, "health"), Variant::I32(42));

    // Declared on the base class
    assert!(ctx.set_value(&actor, "id", &Variant::I32(7)));
    assert_eq!(ctx.get_value(&actor, "id"), Variant::I32(7));

    assert!(ctx.set_value(&actor, "name", &Variant::from("hero")));
    assert_eq!(ctx.get_value(&actor, "name").as_str(), Some("hero"));

    assert!(!ctx.set_value(&actor, "health", &Variant::I64(1)));
    assert_eq!(ctx.get_value(&actor, "health"), Variant::I32(42));
}

#[test]
fn test_enum_properties_use_the_enum_tag() {
    let (ctx, _) = mirror(&[descriptor(ACTOR_HEADER)]);
    let team = ctx.name("Team").unwrap();
    let meta = ctx.registry.enumeration(team).unwrap();
    assert_eq!(meta.underlying(), VariantType::U8);
    let values: Vec<i64> = meta.constants().iter().map(|c| c.value).collect();
    assert_eq!(values, vec![0, 1, 2]);

    let actor = ctx.instantiate("Actor").unwrap();
    assert_eq!(
        ctx.get_value(&actor, "team"),
        Variant::Enum(EnumValue { ty: team, value: 0 })
    );
    let blue = meta.make_value(ctx.name("Blue").unwrap()).unwrap();
    assert!(ctx.set_value(&actor, "team", &Variant::Enum(blue)));
    assert_eq!(ctx.get_value(&actor, "team").as_enum(), Some(blue));
}

#[test]
fn test_metadata_is_carried() {
    let (ctx, _) = mirror(&[descriptor(ACTOR_HEADER)]);
    let actor = ctx.class("Actor").unwrap();
    let health = actor.find_property(ctx.name("health").unwrap()).unwrap();
    let metadata = health.meta().metadata();
    assert!(metadata.has_flag(ctx.name("ReadOnly").unwrap()));
    assert_eq!(
        metadata.attribute(ctx.name("DisplayName").unwrap()),
        Some("Health Points")
    );
    assert_eq!(health.meta().offset(), Some(4));
}

#[test]
fn test_methods_validate_then_report_missing_binding() {
    let (ctx, _) = mirror(&[descriptor(ACTOR_HEADER)]);
    let actor = ctx.instantiate("Actor").unwrap();

    assert!(matches!(
        ctx.invoke(&actor, "Heal", &ArgBlock::new()),
        Err(ReflectError::ArgumentCount { expected: 1, found: 0, .. })
    ));
    assert!(matches!(
        ctx.invoke(&actor, "Heal", &ArgBlock::new().with(5i32)),
        Err(ReflectError::Call { .. })
    ));
    assert!(matches!(
        ctx.invoke_static("Actor", "Count", &ArgBlock::new()),
        Err(ReflectError::Call { .. })
    ));
    assert!(matches!(
        ctx.invoke(&actor, "Owner", &ArgBlock::new()),
        Err(ReflectError::UnknownMethod { .. })
    ));
}

#[test]
fn test_duplicate_declarations_keep_the_first() {
    let first = descriptor(ACTOR_HEADER);
    let second = descriptor(
        r#"{
            "source": "other/entity.h",
            "units": [{
                "kind": "struct",
                "name": "Entity",
                "super_types": [],
                "size": 8,
                "align": 8,
                "properties": [],
                "methods": [],
                "line": 1
            }]
        }"#,
    );
    let (ctx, report) = mirror(&[first, second]);
    assert_eq!(report.classes, 2);
    assert_eq!(
        report.skipped.first().map(String::as_str),
        Some("Entity: duplicate declaration in other/entity.h")
    );
    let entity = ctx.class("Entity").unwrap();
    assert!(!entity.meta().is_struct());
    assert_eq!(entity.meta().size(), Some(4));
}

#[test]
fn test_inheritance_cycle_is_an_error() {
    let cyclic = descriptor(
        r#"{
            "source": "cycle.h",
            "units": [
                { "kind": "class", "name": "A", "super_types": ["B"], "size": 1, "align": 1,
                  "properties": [], "methods": [], "line": 1 },
                { "kind": "class", "name": "B", "super_types": ["A"], "size": 1, "align": 1,
                  "properties": [], "methods": [], "line": 2 }
            ]
        }"#,
    );
    let result = build_registry(SharedInterner::new(), &[cyclic]);
    assert!(matches!(result, Err(ReflectError::InheritanceCycle(_))));
}
