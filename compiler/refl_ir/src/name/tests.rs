use super::*;

#[test]
fn test_entry_layout() {
    let entry = EntryId::new(5, 1000);
    assert_eq!(entry.shard(), 5);
    assert_eq!(entry.local(), 1000);
}

#[test]
fn test_name_none() {
    assert!(Name::NONE.is_none());
    assert_eq!(Name::NONE.entry().local(), 0);
    assert_eq!(Name::default(), Name::NONE);
}

#[test]
fn test_equality_ignores_display() {
    let a = Name::from_parts(EntryId::new(1, 4), EntryId::new(2, 9), None);
    let b = Name::from_parts(EntryId::new(1, 4), EntryId::new(3, 1), None);
    assert_eq!(a, b);
}

#[test]
fn test_number_distinguishes() {
    let a = Name::from_parts(EntryId::new(1, 4), EntryId::new(1, 4), Some(1));
    let b = a.with_number(Some(2));
    assert_ne!(a, b);
    assert!(a.same_base(b));
    assert!(a < b);
}

#[test]
fn test_name_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(Name::from_parts(EntryId::new(0, 1), EntryId::new(0, 1), None));
    set.insert(Name::from_parts(EntryId::new(0, 1), EntryId::new(0, 2), None)); // same entry
    set.insert(Name::from_parts(EntryId::new(0, 1), EntryId::new(0, 1), Some(0)));
    assert_eq!(set.len(), 2);
}
