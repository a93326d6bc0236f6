//! Hash-indexed set over a [`SparseArray`].
//!
//! Elements live in a sparse array and carry their own bucket-chain link.
//! The bucket array holds chain heads and is the only thing a rehash
//! reallocates; element storage never moves.
//!
//! # Bucket policy
//!
//! ```text
//! live < 4        → 1 bucket (lookup is a short linear scan)
//! live >= 4       → next_pow2(live / 2 + 8) buckets
//! ```
//!
//! A rehash happens only when the desired bucket count exceeds the current
//! one, so buckets grow but never shrink outside of `clear`.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use rustc_hash::FxBuildHasher;

use crate::sparse_array::{SparseArray, SparseIndex};

const MIN_HASHED_ELEMENTS: usize = 4;
const ELEMENTS_PER_BUCKET: usize = 2;
const BASE_BUCKETS: usize = 8;

/// Key extraction, hashing and matching for [`AssocSet`] elements.
pub trait KeyFuncs<T> {
    /// Key type used for lookup.
    type Key: ?Sized;

    /// Key of a stored element.
    fn key(element: &T) -> &Self::Key;

    /// Structural key equality.
    fn matches(a: &Self::Key, b: &Self::Key) -> bool;

    /// Hash of a key.
    fn hash(key: &Self::Key) -> u32;
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "hash is folded to 32 bits on purpose"
)]
fn fx_hash<K: Hash + ?Sized>(key: &K) -> u32 {
    let hash = FxBuildHasher.hash_one(key);
    (hash ^ (hash >> 32)) as u32
}

/// Whole element is the key.
pub struct DefaultKeyFuncs;

impl<T: Hash + Eq> KeyFuncs<T> for DefaultKeyFuncs {
    type Key = T;

    #[inline]
    fn key(element: &T) -> &T {
        element
    }

    #[inline]
    fn matches(a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn hash(key: &T) -> u32 {
        fx_hash(key)
    }
}

/// First component of a pair is the key.
pub struct PairKeyFuncs;

impl<K: Hash + Eq, V> KeyFuncs<(K, V)> for PairKeyFuncs {
    type Key = K;

    #[inline]
    fn key(element: &(K, V)) -> &K {
        &element.0
    }

    #[inline]
    fn matches(a: &K, b: &K) -> bool {
        a == b
    }

    #[inline]
    fn hash(key: &K) -> u32 {
        fx_hash(key)
    }
}

#[derive(Clone)]
struct SetElement<T> {
    value: T,
    /// Next element in the same bucket chain.
    next: Option<SparseIndex>,
    /// Cached key hash, reused on rehash.
    hash: u32,
}

/// Hash set with stable element indices.
///
/// Adding a key that is already present replaces the stored element in place
/// and keeps its index.
pub struct AssocSet<T, F = DefaultKeyFuncs> {
    elements: SparseArray<SetElement<T>>,
    buckets: Vec<Option<SparseIndex>>,
    funcs: PhantomData<fn() -> F>,
}

/// Map built on [`AssocSet`] keyed by the first pair component.
pub type AssocMap<K, V> = AssocSet<(K, V), PairKeyFuncs>;

/// Bucket count the policy wants for `count` live elements.
fn desired_buckets(count: usize) -> usize {
    if count >= MIN_HASHED_ELEMENTS {
        (count / ELEMENTS_PER_BUCKET + BASE_BUCKETS).next_power_of_two()
    } else {
        1
    }
}

impl<T, F: KeyFuncs<T>> AssocSet<T, F> {
    /// Create an empty set without allocating.
    pub const fn new() -> Self {
        Self {
            elements: SparseArray::new(),
            buckets: Vec::new(),
            funcs: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the set holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current bucket count (0 before the first insertion).
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        debug_assert!(self.buckets.len().is_power_of_two());
        (hash as usize) & (self.buckets.len() - 1)
    }

    fn find_with_hash(&self, key: &F::Key, hash: u32) -> Option<SparseIndex> {
        // Guard: the bucket array may be unallocated
        if self.elements.is_empty() {
            return None;
        }
        let mut cursor = self.buckets[self.bucket_of(hash)];
        while let Some(index) = cursor {
            let element = &self.elements[index];
            if element.hash == hash && F::matches(F::key(&element.value), key) {
                return Some(index);
            }
            cursor = element.next;
        }
        None
    }

    /// Index of the element matching `key`.
    pub fn find_index(&self, key: &F::Key) -> Option<SparseIndex> {
        if self.elements.is_empty() {
            return None;
        }
        self.find_with_hash(key, F::hash(key))
    }

    /// Element matching `key`.
    pub fn find(&self, key: &F::Key) -> Option<&T> {
        self.find_index(key).map(|index| &self.elements[index].value)
    }

    /// Mutable element matching `key`.
    ///
    /// The caller must not change the element's key through this reference.
    pub fn find_mut(&mut self, key: &F::Key) -> Option<&mut T> {
        let index = self.find_index(key)?;
        Some(&mut self.elements[index].value)
    }

    /// Returns `true` if an element matches `key`.
    #[inline]
    pub fn contains(&self, key: &F::Key) -> bool {
        self.find_index(key).is_some()
    }

    /// Element at a stable index.
    pub fn at(&self, index: SparseIndex) -> Option<&T> {
        self.elements.get(index).map(|element| &element.value)
    }

    /// Add an element, replacing a structurally equal one in place.
    ///
    /// Returns the element's index and whether an existing element was
    /// replaced.
    pub fn add(&mut self, value: T) -> (SparseIndex, bool) {
        let hash = F::hash(F::key(&value));
        if let Some(index) = self.find_with_hash(F::key(&value), hash) {
            self.elements[index].value = value;
            return (index, true);
        }

        let index = self.elements.add(SetElement {
            value,
            next: None,
            hash,
        });
        if !self.conditional_rehash(self.elements.len()) {
            self.link(index);
        }
        (index, false)
    }

    /// Remove the element matching `key` and return it.
    pub fn take(&mut self, key: &F::Key) -> Option<T> {
        if self.elements.is_empty() {
            return None;
        }
        let hash = F::hash(key);
        let bucket = self.bucket_of(hash);

        let mut prev: Option<SparseIndex> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(index) = cursor {
            let element = &self.elements[index];
            let next = element.next;
            if element.hash == hash && F::matches(F::key(&element.value), key) {
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(prev) => self.elements[prev].next = next,
                }
                return self.elements.remove(index).map(|element| element.value);
            }
            prev = cursor;
            cursor = next;
        }
        None
    }

    /// Remove the element matching `key`.
    ///
    /// Returns `false` if nothing matched (including on an empty set).
    pub fn remove(&mut self, key: &F::Key) -> bool {
        self.take(key).is_some()
    }

    /// Make room for `count` elements, rehashing once if needed.
    pub fn reserve(&mut self, count: usize) {
        if count > self.elements.len() {
            self.elements.reserve(count - self.elements.len());
        }
        self.conditional_rehash(count.max(self.elements.len()));
    }

    /// Remove everything, keeping storage for `slack` elements.
    pub fn clear(&mut self, slack: usize) {
        self.elements.clear(slack);
        self.buckets.clear();
        if slack > 0 {
            self.buckets.resize(desired_buckets(slack), None);
        } else {
            self.buckets.shrink_to_fit();
        }
    }

    /// Iterate elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.elements.values().map(|element| &element.value)
    }

    /// Iterate elements with their stable indices.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (SparseIndex, &T)> + '_ {
        self.elements
            .iter()
            .map(|(index, element)| (index, &element.value))
    }

    /// Push an element onto the head of its bucket chain.
    fn link(&mut self, index: SparseIndex) {
        let bucket = self.bucket_of(self.elements[index].hash);
        self.elements[index].next = self.buckets[bucket];
        self.buckets[bucket] = Some(index);
    }

    /// Grow the bucket array if `count` elements call for more buckets.
    ///
    /// Returns `true` if every live element was relinked.
    fn conditional_rehash(&mut self, count: usize) -> bool {
        let desired = desired_buckets(count);
        if desired > self.buckets.len() {
            self.rehash(desired);
            true
        } else {
            false
        }
    }

    fn rehash(&mut self, bucket_count: usize) {
        debug_assert!(bucket_count.is_power_of_two());
        self.buckets.clear();
        self.buckets.resize(bucket_count, None);
        let mask = bucket_count - 1;
        for (index, element) in self.elements.iter_mut() {
            let bucket = (element.hash as usize) & mask;
            element.next = self.buckets[bucket];
            self.buckets[bucket] = Some(index);
        }
    }
}

impl<K: Hash + Eq, V> AssocSet<(K, V), PairKeyFuncs> {
    /// Insert or replace the value for `key`.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.add((key, value)).1
    }

    /// Value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, value)| value)
    }

    /// Mutable value for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_mut(key).map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.contains(key)
    }

    /// Iterate values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }
}

impl<T, F: KeyFuncs<T>> Default for AssocSet<T, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, F> Clone for AssocSet<T, F> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            buckets: self.buckets.clone(),
            funcs: PhantomData,
        }
    }
}

impl<T, F: KeyFuncs<T>> Extend<T> for AssocSet<T, F> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T, F: KeyFuncs<T>> FromIterator<T> for AssocSet<T, F> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: fmt::Debug, F: KeyFuncs<T>> fmt::Debug for AssocSet<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
