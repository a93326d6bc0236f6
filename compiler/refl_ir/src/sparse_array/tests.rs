use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_add_and_get() {
    let mut array = SparseArray::new();
    let a = array.add("a");
    let b = array.add("b");

    assert_eq!(array.len(), 2);
    assert_eq!(array.get(a), Some(&"a"));
    assert_eq!(array[b], "b");
}

#[test]
fn test_remove_recycles_slot() {
    let mut array = SparseArray::new();
    let a = array.add(1);
    let b = array.add(2);
    let c = array.add(3);

    assert_eq!(array.remove(b), Some(2));
    assert!(!array.contains(b));
    assert_eq!(array.len(), 2);

    // Other indices are untouched by the erase
    assert_eq!(array[a], 1);
    assert_eq!(array[c], 3);

    let d = array.add(4);
    assert_eq!(d, b);
    assert_eq!(array.max_index(), 3);
}

#[test]
fn test_free_list_is_lifo() {
    let mut array = SparseArray::new();
    let ids: Vec<_> = (0..4).map(|i| array.add(i)).collect();
    array.remove(ids[0]);
    array.remove(ids[2]);

    assert_eq!(array.add(10), ids[2]);
    assert_eq!(array.add(11), ids[0]);
    assert_eq!(array.add(12), SparseIndex::from_raw(4));
}

#[test]
fn test_double_remove_is_none() {
    let mut array = SparseArray::new();
    let a = array.add('x');
    assert_eq!(array.remove(a), Some('x'));
    assert_eq!(array.remove(a), None);
    assert_eq!(array.remove(SparseIndex::from_raw(99)), None);
    assert!(array.is_empty());
}

#[test]
fn test_iter_skips_free_slots() {
    let mut array = SparseArray::new();
    let ids: Vec<_> = (0..5).map(|i| array.add(i * 10)).collect();
    array.remove(ids[1]);
    array.remove(ids[3]);

    let live: Vec<_> = array.values().copied().collect();
    assert_eq!(live, vec![0, 20, 40]);

    for (_, value) in array.iter_mut() {
        *value += 1;
    }
    assert_eq!(array[ids[4]], 41);
}

#[test]
fn test_clear_with_slack() {
    let mut array = SparseArray::new();
    for i in 0..16 {
        array.add(i);
    }
    array.clear(8);
    assert!(array.is_empty());
    assert_eq!(array.max_index(), 0);
    assert!(array.capacity() >= 8);
    assert_eq!(array.add(99), SparseIndex::from_raw(0));
}
