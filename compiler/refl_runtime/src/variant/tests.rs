use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use refl_ir::StringInterner;

#[test]
fn test_typed_access_checks_tag() {
    let value = Variant::from(42i32);
    assert_eq!(value.get::<i32>(), Some(42));
    assert_eq!(value.get::<i64>(), None);
    assert_eq!(value.get::<u32>(), None);
    assert_eq!(value.get::<String>(), None);
}

#[test]
fn test_invalid_is_default() {
    let value = Variant::default();
    assert!(!value.is_valid());
    assert_eq!(value.ty(), VariantType::Invalid);
    assert_eq!(value.get::<bool>(), None);
}

#[test]
fn test_string_access() {
    let value = Variant::from("hero");
    assert_eq!(value.as_str(), Some("hero"));
    assert_eq!(value.get::<String>(), Some("hero".to_owned()));
    assert_eq!(value.ty(), VariantType::String);
}

#[test]
fn test_enum_tag_carries_type() {
    let interner = StringInterner::new();
    let color = interner.intern("Color");
    let shape = interner.intern("Shape");

    let value = Variant::from(EnumValue { ty: color, value: 2 });
    assert_eq!(value.ty(), VariantType::Enum(color));
    assert_ne!(value.ty(), VariantType::Enum(shape));
    assert_eq!(value.as_enum().map(|v| v.value), Some(2));
}

#[test]
fn test_object_equality_is_identity() {
    let interner = StringInterner::new();
    let class = interner.intern("Actor");
    let a = ObjectRef::new(class, 5u32);
    let b = ObjectRef::new(class, 5u32);

    assert_eq!(Variant::Object(a.clone()), Variant::Object(a.clone()));
    assert_ne!(Variant::Object(a), Variant::Object(b));
}

#[test]
fn test_default_values() {
    let interner = StringInterner::new();
    let color = interner.intern("Color");

    assert_eq!(VariantType::I32.default_value(), Variant::I32(0));
    assert_eq!(VariantType::String.default_value(), Variant::String(String::new()));
    assert_eq!(
        VariantType::Enum(color).default_value(),
        Variant::Enum(EnumValue { ty: color, value: 0 })
    );
    assert!(!VariantType::Object(color).default_value().is_valid());
}

#[test]
fn test_describe_resolves_names() {
    let interner = StringInterner::new();
    let actor = interner.intern("Actor");
    assert_eq!(VariantType::F32.describe(&interner), "float");
    assert_eq!(VariantType::Object(actor).describe(&interner), "object Actor");
}

proptest! {
    #[test]
    fn prop_i64_roundtrip(v in any::<i64>()) {
        let value = v.into_variant();
        prop_assert_eq!(value.ty(), i64::TYPE);
        prop_assert_eq!(value.get::<i64>(), Some(v));
        prop_assert_eq!(value.get::<i32>(), None);
    }
}
