//! Interned name identifiers.
//!
//! A `Name` pairs a case-insensitive comparison entry with a case-preserving
//! display entry and an optional trailing number, so `"Actor_3"` and
//! `"actor_3"` compare equal while still rendering as written.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::interner::StringLookup;

/// Identifier of one entry in the string pool.
///
/// Layout: 32-bit index split into shard (4 bits) + local index (28 bits)
/// - Bits 31-28: Shard index (0-15)
/// - Bits 27-0: Local index within shard
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct EntryId(u32);

impl EntryId {
    /// Entry of the pre-stored empty string.
    pub const EMPTY: EntryId = EntryId(0);

    /// Maximum local index per shard.
    pub const MAX_LOCAL: u32 = 0x0FFF_FFFF;

    /// Number of pool shards.
    pub const NUM_SHARDS: usize = 16;

    /// Create from shard and local index.
    #[inline]
    pub const fn new(shard: u32, local: u32) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(local <= Self::MAX_LOCAL);
        EntryId((shard << 28) | local)
    }

    /// Extract shard index.
    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> 28) as usize
    }

    /// Extract local index.
    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId(shard={}, local={})", self.shard(), self.local())
    }
}

/// Interned identifier.
///
/// Equality, ordering and hashing use the comparison entry and the numeric
/// suffix only. The display entry is carried for rendering.
#[derive(Copy, Clone)]
pub struct Name {
    entry: EntryId,
    display: EntryId,
    number: Option<u32>,
}

impl Name {
    /// The empty name.
    pub const NONE: Name = Name {
        entry: EntryId::EMPTY,
        display: EntryId::EMPTY,
        number: None,
    };

    #[inline]
    pub(crate) const fn from_parts(entry: EntryId, display: EntryId, number: Option<u32>) -> Self {
        Name {
            entry,
            display,
            number,
        }
    }

    /// Case-insensitive comparison entry.
    #[inline]
    pub const fn entry(self) -> EntryId {
        self.entry
    }

    /// Case-preserving display entry.
    #[inline]
    pub const fn display_entry(self) -> EntryId {
        self.display
    }

    /// Trailing number parsed from the source text, if any.
    #[inline]
    pub const fn number(self) -> Option<u32> {
        self.number
    }

    /// Same base name, ignoring the numeric suffix.
    ///
    /// `"Node_1"` and `"Node_7"` share a base; comparing them costs one
    /// integer comparison.
    #[inline]
    pub fn same_base(self, other: Name) -> bool {
        self.entry == other.entry
    }

    /// Copy of this name with a different numeric suffix.
    #[inline]
    #[must_use]
    pub const fn with_number(self, number: Option<u32>) -> Self {
        Name { number, ..self }
    }

    /// Returns `true` for the empty name.
    #[inline]
    pub fn is_none(self) -> bool {
        self.entry == EntryId::EMPTY && self.number.is_none()
    }

    /// Render through an interner.
    pub fn display<L: StringLookup + ?Sized>(self, lookup: &L) -> NameDisplay<'_, L> {
        NameDisplay { name: self, lookup }
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry && self.number == other.number
    }
}

impl Eq for Name {}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry.hash(state);
        self.number.hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .cmp(&other.entry)
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "Name({:?}, display={:?}, #{n})", self.entry, self.display),
            None => write!(f, "Name({:?}, display={:?})", self.entry, self.display),
        }
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::NONE
    }
}

/// `Display` adaptor returned by [`Name::display`].
pub struct NameDisplay<'a, L: StringLookup + ?Sized> {
    name: Name,
    lookup: &'a L,
}

impl<L: StringLookup + ?Sized> fmt::Display for NameDisplay<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lookup.resolve_entry(self.name.display))?;
        if let Some(n) = self.name.number {
            write!(f, "_{n}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
