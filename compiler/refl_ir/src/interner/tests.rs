#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use proptest::prelude::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let hello = interner.intern("hello");
    let world = interner.intern("world");
    let hello2 = interner.intern("hello");

    assert_eq!(hello, hello2);
    assert_ne!(hello, world);

    assert_eq!(interner.to_string(hello), "hello");
    assert_eq!(interner.to_string(world), "world");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    let empty = interner.intern("");
    assert_eq!(empty, Name::NONE);
    assert_eq!(interner.to_string(Name::NONE), "");
}

#[test]
fn test_case_insensitive_by_default() {
    let interner = StringInterner::new();
    let upper = interner.intern("Foo");
    let lower = interner.intern("foo");
    assert_eq!(upper, lower);
    // display keeps the spelling each caller used
    assert_eq!(interner.to_string(upper), "Foo");
    assert_eq!(interner.to_string(lower), "foo");
}

#[test]
fn test_case_sensitive_mode() {
    let interner = StringInterner::with_case(CaseMode::Sensitive);
    assert_ne!(interner.intern("Foo"), interner.intern("foo"));
    let name = interner.intern("Foo");
    assert_eq!(name.entry(), name.display_entry());
}

#[test]
fn test_numeric_suffix() {
    let interner = StringInterner::new();
    let actor = interner.intern("Actor");
    let actor3 = interner.intern("Actor_3");

    assert_ne!(actor, actor3);
    assert!(actor.same_base(actor3));
    assert_eq!(actor3.number(), Some(3));
    assert_eq!(interner.to_string(actor3), "Actor_3");
}

#[test]
fn test_split_trailing_number_rules() {
    assert_eq!(split_trailing_number("Node_12"), ("Node", Some(12)));
    assert_eq!(split_trailing_number("Node_0"), ("Node", Some(0)));
    assert_eq!(split_trailing_number("Node_012"), ("Node_012", None));
    assert_eq!(split_trailing_number("Node_"), ("Node_", None));
    assert_eq!(split_trailing_number("_12"), ("_12", None));
    assert_eq!(split_trailing_number("Node12"), ("Node12", None));
    assert_eq!(split_trailing_number("a_b_7"), ("a_b", Some(7)));
    assert_eq!(
        split_trailing_number("Big_99999999999"),
        ("Big_99999999999", None)
    );
}

#[test]
fn test_find_does_not_store() {
    let interner = StringInterner::new();
    let before = interner.len();
    assert!(interner.find("NeverSeen").is_none());
    assert_eq!(interner.len(), before);

    let stored = interner.intern("Seen_4");
    assert_eq!(interner.find("seen_4"), Some(stored));
    assert_eq!(interner.find("SEEN_4"), Some(stored));
    assert!(interner.find("Unseen_4").is_none());
}

#[test]
fn test_display_adaptor() {
    let interner = StringInterner::new();
    let name = interner.intern("Widget_21");
    assert_eq!(format!("{}", name.display(&interner)), "Widget_21");
}

#[test]
fn test_shared_interner() {
    let interner = SharedInterner::new();
    let interner2 = interner.clone();

    let name1 = interner.intern("shared");
    let name2 = interner2.intern("SHARED");

    assert_eq!(name1, name2);
}

#[test]
fn test_concurrent_store_yields_one_entry() {
    let interner = SharedInterner::new();
    let names: Vec<Name> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let interner = interner.clone();
                scope.spawn(move || interner.intern("RacedName"))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(names.windows(2).all(|w| w[0] == w[1]));
    assert!(names
        .iter()
        .all(|n| n.display_entry() == names[0].display_entry()));
}

proptest! {
    #[test]
    fn prop_intern_is_idempotent(text in "[A-Za-z_][A-Za-z0-9_]{0,20}") {
        let interner = StringInterner::new();
        prop_assert_eq!(interner.intern(&text), interner.intern(&text));
        prop_assert_eq!(interner.intern(&text), interner.intern(&text.to_lowercase()));
    }

    #[test]
    fn prop_suffix_round_trips(base in "[A-Za-z][A-Za-z0-9_]{0,12}", n in any::<u32>()) {
        let interner = StringInterner::new();
        let text = format!("{base}_{n}");
        let name = interner.intern(&text);
        prop_assert_eq!(name.number(), Some(n));
        prop_assert_eq!(interner.to_string(name), text);
    }

    #[test]
    fn prop_plain_names_round_trip(base in "[A-Za-z][A-Za-z]{0,12}") {
        let interner = StringInterner::new();
        let name = interner.intern(&base);
        prop_assert_eq!(name.number(), None);
        prop_assert_eq!(interner.to_string(name), base);
    }
}
