use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

/// Key funcs that send every key to the same bucket.
struct CollidingKeyFuncs;

impl KeyFuncs<(u32, &'static str)> for CollidingKeyFuncs {
    type Key = u32;

    fn key<'a>(element: &'a (u32, &'static str)) -> &'a u32 {
        &element.0
    }

    fn matches(a: &u32, b: &u32) -> bool {
        a == b
    }

    fn hash(_key: &u32) -> u32 {
        7
    }
}

#[test]
fn test_find_on_fresh_set() {
    let set: AssocSet<u32> = AssocSet::new();
    assert_eq!(set.bucket_count(), 0);
    assert!(set.find(&3).is_none());
    assert!(!set.contains(&3));
}

#[test]
fn test_remove_on_empty_set() {
    let mut set: AssocSet<u32> = AssocSet::new();
    assert!(!set.remove(&1));
    set.add(1);
    assert!(set.remove(&1));
    assert!(!set.remove(&1));
}

#[test]
fn test_add_replaces_in_place() {
    let mut map: AssocMap<&str, i32> = AssocMap::new();
    let (first, replaced) = map.add(("hp", 10));
    assert!(!replaced);
    map.add(("mp", 5));

    let (second, replaced) = map.add(("hp", 20));
    assert!(replaced);
    assert_eq!(first, second);
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&"hp"), Some(&20));
}

#[test]
fn test_small_sets_use_one_bucket() {
    let mut set = AssocSet::<u32>::new();
    for i in 0..3 {
        set.add(i);
    }
    assert_eq!(set.bucket_count(), 1);

    set.add(3);
    assert_eq!(set.bucket_count(), 16); // next_pow2(4 / 2 + 8)
}

#[test]
fn test_bucket_growth_is_power_of_two() {
    let mut set = AssocSet::<u32>::new();
    for i in 0..1000 {
        set.add(i);
        assert!(set.bucket_count().is_power_of_two());
    }
    assert_eq!(set.bucket_count(), 512); // next_pow2(1000 / 2 + 8)
}

#[test]
fn test_rehash_keeps_indices() {
    let mut set = AssocSet::<u64>::new();
    let indices: Vec<_> = (0..64u64).map(|i| (i, set.add(i * 3).0)).collect();
    for (i, index) in indices {
        assert_eq!(set.at(index), Some(&(i * 3)));
    }
}

#[test]
fn test_colliding_chain_remove_middle() {
    let mut set: AssocSet<(u32, &'static str), CollidingKeyFuncs> = AssocSet::new();
    for (i, label) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
        set.add((u32::try_from(i).unwrap_or(0), label));
    }

    assert!(set.remove(&2));
    assert!(set.remove(&0));
    assert!(set.remove(&5));
    assert_eq!(set.len(), 3);
    for key in [1, 3, 4] {
        assert!(set.contains(&key), "key {key} lost after splice");
    }
    for key in [0, 2, 5] {
        assert!(!set.contains(&key));
    }
}

#[test]
fn test_reserve_then_fill() {
    let mut set = AssocSet::<u32>::new();
    set.reserve(100);
    let buckets = set.bucket_count();
    assert_eq!(buckets, 64); // next_pow2(100 / 2 + 8)
    for i in 0..100 {
        set.add(i);
    }
    assert_eq!(set.bucket_count(), buckets);
    assert!((0..100).all(|i| set.contains(&i)));
}

#[test]
fn test_clear_with_slack() {
    let mut set: AssocSet<u32> = (0..50).collect();
    set.clear(10);
    assert!(set.is_empty());
    assert!(!set.contains(&1));
    set.add(1);
    assert!(set.contains(&1));

    set.clear(0);
    assert_eq!(set.bucket_count(), 0);
    assert!(set.find(&1).is_none());
}

#[test]
fn test_freed_slots_are_reused() {
    let mut set = AssocSet::<u32>::new();
    let (a, _) = set.add(1);
    set.add(2);
    set.remove(&1);
    let (c, _) = set.add(3);
    assert_eq!(a, c);
    assert!(set.contains(&2) && set.contains(&3));
}

#[derive(Clone, Debug)]
enum Op {
    Add(u8),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![any::<u8>().prop_map(Op::Add), any::<u8>().prop_map(Op::Remove)]
}

proptest! {
    #[test]
    fn prop_matches_model_set(ops in prop::collection::vec(op_strategy(), 0..400)) {
        let mut set = AssocSet::<u8>::new();
        let mut model = HashSet::new();
        for op in ops {
            match op {
                Op::Add(k) => {
                    set.add(k);
                    model.insert(k);
                }
                Op::Remove(k) => {
                    prop_assert_eq!(set.remove(&k), model.remove(&k));
                }
            }
        }
        prop_assert_eq!(set.len(), model.len());
        for k in 0..=u8::MAX {
            prop_assert_eq!(set.contains(&k), model.contains(&k));
        }
    }

    #[test]
    fn prop_all_inserted_keys_found(keys in prop::collection::hash_set(any::<u64>(), 0..500)) {
        let mut set = AssocSet::<u64>::new();
        for &k in &keys {
            set.add(k);
        }
        prop_assert_eq!(set.len(), keys.len());
        for k in &keys {
            prop_assert_eq!(set.find(k), Some(k));
        }
    }
}
