//! Index-stable element storage with O(1) erase.
//!
//! Removed slots are threaded onto a free list and recycled by later
//! insertions, so live elements never move and their indices stay valid
//! until they are removed.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable index of an element in a [`SparseArray`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SparseIndex(u32);

impl SparseIndex {
    /// Create from a raw slot number.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SparseIndex(raw)
    }

    /// Slot number as `usize`.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SparseIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SparseIndex({})", self.0)
    }
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(T),
    Free { next: Option<SparseIndex> },
}

/// Contiguous storage with free-list recycling.
#[derive(Clone)]
pub struct SparseArray<T> {
    slots: Vec<Slot<T>>,
    first_free: Option<SparseIndex>,
    num_free: usize,
}

impl<T> SparseArray<T> {
    /// Create an empty array without allocating.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            first_free: None,
            num_free: 0,
        }
    }

    /// Create an empty array with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            first_free: None,
            num_free: 0,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len() - self.num_free
    }

    /// Returns `true` if no element is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the highest slot ever handed out.
    #[inline]
    pub fn max_index(&self) -> usize {
        self.slots.len()
    }

    /// Allocated slot capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserve room for `additional` more elements beyond the free slots.
    pub fn reserve(&mut self, additional: usize) {
        self.slots
            .reserve(additional.saturating_sub(self.num_free));
    }

    /// Insert an element, reusing the most recently freed slot if any.
    pub fn add(&mut self, value: T) -> SparseIndex {
        if let Some(index) = self.first_free {
            let slot = &mut self.slots[index.index()];
            let Slot::Free { next } = *slot else {
                panic!("sparse array free list points at live slot {index:?}");
            };
            *slot = Slot::Occupied(value);
            self.first_free = next;
            self.num_free -= 1;
            return index;
        }

        let raw = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("sparse array exceeded u32::MAX slots"));
        self.slots.push(Slot::Occupied(value));
        SparseIndex(raw)
    }

    /// Remove the element at `index`, returning it.
    ///
    /// Returns `None` if the slot is out of range or already free.
    pub fn remove(&mut self, index: SparseIndex) -> Option<T> {
        let slot = self.slots.get_mut(index.index())?;
        if matches!(slot, Slot::Free { .. }) {
            return None;
        }
        let old = std::mem::replace(
            slot,
            Slot::Free {
                next: self.first_free,
            },
        );
        self.first_free = Some(index);
        self.num_free += 1;
        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Returns `true` if `index` refers to a live element.
    #[inline]
    pub fn contains(&self, index: SparseIndex) -> bool {
        matches!(self.slots.get(index.index()), Some(Slot::Occupied(_)))
    }

    /// Shared access to a live element.
    #[inline]
    pub fn get(&self, index: SparseIndex) -> Option<&T> {
        match self.slots.get(index.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Mutable access to a live element.
    #[inline]
    pub fn get_mut(&mut self, index: SparseIndex) -> Option<&mut T> {
        match self.slots.get_mut(index.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Drop all elements, keeping room for `slack` elements.
    pub fn clear(&mut self, slack: usize) {
        self.slots.clear();
        if slack == 0 {
            self.slots.shrink_to_fit();
        } else {
            self.slots.shrink_to(slack);
            self.slots.reserve(slack);
        }
        self.first_free = None;
        self.num_free = 0;
    }

    /// Iterate live elements with their indices, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SparseIndex, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied(value) => Some((Self::index_of(i), value)),
                Slot::Free { .. } => None,
            })
    }

    /// Iterate live elements mutably with their indices, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SparseIndex, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Slot::Occupied(value) => Some((Self::index_of(i), value)),
                Slot::Free { .. } => None,
            })
    }

    /// Iterate live elements in slot order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by u32::MAX in add()"
    )]
    fn index_of(i: usize) -> SparseIndex {
        SparseIndex(i as u32)
    }
}

impl<T> Default for SparseArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<SparseIndex> for SparseArray<T> {
    type Output = T;

    fn index(&self, index: SparseIndex) -> &T {
        self.get(index)
            .unwrap_or_else(|| panic!("no live element at {index:?}"))
    }
}

impl<T> IndexMut<SparseIndex> for SparseArray<T> {
    fn index_mut(&mut self, index: SparseIndex) -> &mut T {
        self.get_mut(index)
            .unwrap_or_else(|| panic!("no live element at {index:?}"))
    }
}

impl<T: fmt::Debug> fmt::Debug for SparseArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests;
