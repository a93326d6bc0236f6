use super::*;
use crate::schema::Schemas;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn property(annotation: &str) -> (StringInterner, Metadata) {
    let interner = StringInterner::new();
    let schemas = Schemas::builtin(&interner);
    let metadata = parse_annotation(
        annotation,
        UnitKind::Property,
        schemas.get(UnitKind::Property),
        &interner,
    );
    (interner, metadata)
}

#[test]
fn test_flag_and_quoted_attribute() {
    let (interner, metadata) = property(r#"ReadOnly, DisplayName="Foo""#);
    assert_eq!(metadata.flags.len(), 1);
    assert!(metadata.has_flag(interner.intern("ReadOnly")));
    assert_eq!(metadata.attribute(interner.intern("DisplayName")), Some("Foo"));
}

#[test]
fn test_unsupported_entries_are_dropped() {
    let (interner, metadata) = property(r#"Bogus, Weird="x", ReadOnly, 3d"#);
    let flags: Vec<_> = metadata.flags.iter().map(|f| interner.to_string(*f)).collect();
    assert_eq!(flags, vec!["ReadOnly"]);
    assert!(metadata.attributes.is_empty());
}

#[test]
fn test_lookup_is_case_insensitive_and_keeps_schema_spelling() {
    let (interner, metadata) = property("readonly, displayname=Bar");
    let flag = *metadata.flags.iter().next().unwrap();
    assert_eq!(interner.to_string(flag), "ReadOnly");
    assert_eq!(interner.to_string(metadata.attributes[0].0), "DisplayName");
    assert_eq!(metadata.attributes[0].1, "Bar");
}

#[test]
fn test_repeated_key_keeps_last_value() {
    let (interner, metadata) = property("Min=1, Max=5, Min=2");
    assert_eq!(metadata.attributes.len(), 2);
    assert_eq!(metadata.attribute(interner.intern("Min")), Some("2"));
}

#[test]
fn test_split_respects_quotes_and_brackets() {
    let entries = split_entries(r#"A, B="x, y", C=[1, 2], D=f(a, b), , E"#);
    assert_eq!(
        entries.as_slice(),
        &["A", r#"B="x, y""#, "C=[1, 2]", "D=f(a, b)", "E"]
    );
}

#[test]
fn test_value_keeps_inner_equals() {
    let (interner, metadata) = property(r#"Tooltip="a=b""#);
    assert_eq!(metadata.attribute(interner.intern("Tooltip")), Some("a=b"));
}

#[test]
fn test_empty_annotation() {
    let (_, metadata) = property("");
    assert!(metadata.flags.is_empty());
    assert!(metadata.attributes.is_empty());
}

proptest! {
    #[test]
    fn prop_split_never_yields_empty_entries(text in r#"[a-z=," \[\]]{0,40}"#) {
        for entry in split_entries(&text) {
            prop_assert!(!entry.is_empty());
            prop_assert_eq!(entry, entry.trim());
        }
    }
}
