use std::path::{Path, PathBuf};

use super::*;
use pretty_assertions::assert_eq;
use refl_parse::{parse_source, FrontendArgs, ParseMode};

fn unit(source: &str) -> TranslationUnit {
    let args = FrontendArgs::extraction(Vec::<PathBuf>::new());
    parse_source(Path::new("layout.h"), source, &args, ParseMode::Normal).unwrap()
}

fn offsets(layout: &RecordLayout) -> Vec<(&str, u64)> {
    layout
        .offsets
        .iter()
        .map(|(name, offset)| (name.as_str(), *offset))
        .collect()
}

#[test]
fn test_scalar_padding() {
    let tu = unit("struct A { char c; int i; double d; bool b; };");
    let layout = LayoutTable::new(&tu).record_layout("A").unwrap();
    assert_eq!(offsets(&layout), vec![("c", 0), ("i", 4), ("d", 8), ("b", 16)]);
    assert_eq!((layout.size, layout.align), (24, 8));
}

#[test]
fn test_empty_record_and_empty_base() {
    let tu = unit("struct Empty {};\nstruct E : Empty { int x; };");
    let mut table = LayoutTable::new(&tu);
    let empty = table.record_layout("Empty").unwrap();
    assert_eq!(empty.size, 1);
    assert!(empty.empty);

    let e = table.record_layout("E").unwrap();
    assert_eq!(e.offset_of("x"), Some(0));
    assert_eq!(e.size, 4);
}

#[test]
fn test_base_fields_come_first() {
    let tu = unit("struct Base { double d; };\nstruct Derived : public Base { int i; };");
    let layout = LayoutTable::new(&tu).record_layout("Derived").unwrap();
    assert_eq!(layout.offset_of("i"), Some(8));
    assert_eq!(layout.size, 16);
}

#[test]
fn test_vtable_pointer() {
    let tu = unit("class V { public: virtual ~V(); int x; };");
    let layout = LayoutTable::new(&tu).record_layout("V").unwrap();
    assert!(layout.polymorphic);
    assert_eq!(layout.offset_of("x"), Some(8));
    assert_eq!(layout.size, 16);
}

#[test]
fn test_bit_fields_share_storage() {
    let tu = unit("struct B { unsigned a : 3; unsigned b : 5; unsigned c; };");
    let layout = LayoutTable::new(&tu).record_layout("B").unwrap();
    assert_eq!(offsets(&layout), vec![("a", 0), ("b", 0), ("c", 4)]);
    assert_eq!(layout.size, 8);
}

#[test]
fn test_arrays_strings_enums_and_pointers() {
    let tu = unit(
        "enum class Mode : uint8_t { A };\nstruct S { char name[10]; int n; Mode m; std::string s; int* p; const S& self; };",
    );
    let layout = LayoutTable::new(&tu).record_layout("S").unwrap();
    assert_eq!(
        offsets(&layout),
        vec![("name", 0), ("n", 12), ("m", 16), ("s", 24), ("p", 56), ("self", 64)]
    );
    assert_eq!((layout.size, layout.align), (72, 8));
}

#[test]
fn test_union_overlaps_members() {
    let tu = unit("union U { int i; double d; char c[12]; };");
    let layout = LayoutTable::new(&tu).record_layout("U").unwrap();
    assert_eq!(offsets(&layout), vec![("i", 0), ("d", 0), ("c", 0)]);
    assert_eq!(layout.size, 16);
}

#[test]
fn test_unknown_type_is_pointer_sized() {
    let tu = unit("struct Q { Foo f; char c; };");
    let layout = LayoutTable::new(&tu).record_layout("Q").unwrap();
    assert_eq!(offsets(&layout), vec![("f", 0), ("c", 8)]);
    assert_eq!(layout.size, 16);
}

#[test]
fn test_known_types_include_nested_and_namespaced() {
    let tu = unit("namespace game { struct Outer { struct Inner { int v; } inner; }; enum Color { Red }; }");
    let mut table = LayoutTable::new(&tu);
    assert!(table.is_known_type("game::Outer"));
    assert!(table.is_known_type("Inner"));
    assert!(table.is_known_type("Color"));
    assert!(!table.is_known_type("Missing"));
    assert_eq!(table.record_layout("Outer").unwrap().size, 4);
    assert_eq!(table.type_layout(&TypeRef::named("game::Color")), (4, 4));
}

#[test]
fn test_self_containing_record_terminates() {
    let tu = unit("struct Loop { Loop inner; int x; };");
    let layout = LayoutTable::new(&tu).record_layout("Loop").unwrap();
    assert_eq!(layout.offset_of("x"), Some(8));
}
