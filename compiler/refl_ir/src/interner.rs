//! Sharded string pool backing [`Name`].
//!
//! Text is canonicalized into pool entries with O(1) lookup and thread-safe
//! concurrent access via per-shard locking. Entries are append-only for the
//! lifetime of the process.

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::name::{EntryId, Name};

/// Per-shard storage for pooled strings.
struct PoolShard {
    /// Map from string content to local index.
    map: FxHashMap<&'static str, u32>,
    /// Storage for string contents.
    strings: Vec<&'static str>,
}

impl PoolShard {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        }
    }

    fn with_empty() -> Self {
        let mut shard = Self::new();
        // Pre-store empty string at index 0
        let empty: &'static str = "";
        shard.map.insert(empty, 0);
        shard.strings.push(empty);
        shard
    }
}

/// Error when storing a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// Shard exceeded its local index range.
    #[error("string pool shard {shard_idx} exceeded capacity: {count} entries, max is {max}", max = EntryId::MAX_LOCAL)]
    ShardOverflow { shard_idx: usize, count: usize },
}

/// How the pool compares names.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CaseMode {
    /// `"Foo"` and `"foo"` intern to the same comparison entry.
    #[default]
    Insensitive,
    /// Comparison entry and display entry are always the same.
    Sensitive,
}

/// Split a trailing `_<digits>` suffix off a name.
///
/// The suffix is only split when the digit run is non-empty, has no leading
/// zero (except `"0"` itself), fits in a `u32`, and leaves a non-empty base.
/// Anything else keeps the whole text as the base.
///
/// ```
/// use refl_ir::split_trailing_number;
///
/// assert_eq!(split_trailing_number("Node_12"), ("Node", Some(12)));
/// assert_eq!(split_trailing_number("Node_012"), ("Node_012", None));
/// assert_eq!(split_trailing_number("Node"), ("Node", None));
/// ```
pub fn split_trailing_number(text: &str) -> (&str, Option<u32>) {
    let Some(underscore) = text.rfind('_') else {
        return (text, None);
    };
    let (base, digits) = (&text[..underscore], &text[underscore + 1..]);
    if base.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (text, None);
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return (text, None);
    }
    match digits.parse::<u32>() {
        Ok(number) => (base, Some(number)),
        Err(_) => (text, None),
    }
}

/// Sharded string pool for concurrent access.
///
/// # Thread Safety
/// Uses `RwLock` per shard: lookups share the lock, stores take it
/// exclusively, and a second lookup under the exclusive lock prevents
/// duplicate entries when two threads race to store the same text.
pub struct StringInterner {
    shards: [RwLock<PoolShard>; EntryId::NUM_SHARDS],
    /// Total count of pooled strings across all shards (O(1) `len()`).
    total_count: AtomicUsize,
    case: CaseMode,
}

impl StringInterner {
    /// Create a case-insensitive interner.
    pub fn new() -> Self {
        Self::with_case(CaseMode::Insensitive)
    }

    /// Create an interner with an explicit case mode.
    pub fn with_case(case: CaseMode) -> Self {
        let shards = std::array::from_fn(|i| {
            if i == 0 {
                RwLock::new(PoolShard::with_empty())
            } else {
                RwLock::new(PoolShard::new())
            }
        });

        // Start with 1 for the empty string pre-stored in shard 0
        Self {
            shards,
            total_count: AtomicUsize::new(1),
            case,
        }
    }

    /// Case mode this interner was created with.
    pub fn case_mode(&self) -> CaseMode {
        self.case
    }

    /// Compute shard for a string based on its hash.
    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % EntryId::NUM_SHARDS
    }

    fn fold<'a>(&self, base: &'a str) -> Cow<'a, str> {
        match self.case {
            CaseMode::Sensitive => Cow::Borrowed(base),
            CaseMode::Insensitive if base.chars().any(char::is_uppercase) => {
                Cow::Owned(base.to_lowercase())
            }
            CaseMode::Insensitive => Cow::Borrowed(base),
        }
    }

    /// Find an existing pool entry without storing.
    fn find_entry(&self, s: &str) -> Option<EntryId> {
        let shard_idx = Self::shard_for(s);
        let guard = self.shards[shard_idx].read();
        guard.map.get(s).map(|&local| Self::entry_id(shard_idx, local))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "shard_idx is bounded by NUM_SHARDS (16)"
    )]
    fn entry_id(shard_idx: usize, local: u32) -> EntryId {
        EntryId::new(shard_idx as u32, local)
    }

    /// Find-or-store one pool entry (double-checked).
    fn store_entry(&self, s: &str) -> Result<EntryId, InternError> {
        let shard_idx = Self::shard_for(s);
        let shard = &self.shards[shard_idx];

        // Fast path: check if already stored
        {
            let guard = shard.read();
            if let Some(&local) = guard.map.get(s) {
                return Ok(Self::entry_id(shard_idx, local));
            }
        }

        // Slow path: need to insert
        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(&local) = guard.map.get(s) {
            return Ok(Self::entry_id(shard_idx, local));
        }

        let count = guard.strings.len();
        let local = u32::try_from(count)
            .ok()
            .filter(|&local| local <= EntryId::MAX_LOCAL)
            .ok_or(InternError::ShardOverflow { shard_idx, count })?;

        // Leak the string to get 'static lifetime; entries live for the process
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, local);

        self.total_count.fetch_add(1, Ordering::Relaxed);

        Ok(Self::entry_id(shard_idx, local))
    }

    /// Try to intern text, returning an error on pool overflow.
    pub fn try_find_or_store(&self, text: &str) -> Result<Name, InternError> {
        let (base, number) = split_trailing_number(text);
        let display = self.store_entry(base)?;
        let entry = match self.fold(base) {
            Cow::Borrowed(_) => display,
            Cow::Owned(folded) => self.store_entry(&folded)?,
        };
        Ok(Name::from_parts(entry, display, number))
    }

    /// Intern text, returning its `Name`.
    ///
    /// # Panics
    /// Panics if the pool exceeds capacity. Pool exhaustion is a process-level
    /// invariant violation; use `try_find_or_store` to observe it.
    #[inline]
    pub fn find_or_store(&self, text: &str) -> Name {
        self.try_find_or_store(text)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// Shorthand for [`find_or_store`](Self::find_or_store).
    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.find_or_store(text)
    }

    /// Look a name up without storing anything.
    ///
    /// Matches any casing of a stored name. A casing never stored renders
    /// with the folded spelling.
    pub fn find(&self, text: &str) -> Option<Name> {
        let (base, number) = split_trailing_number(text);
        let (entry, display) = match self.fold(base) {
            Cow::Borrowed(_) => {
                let entry = self.find_entry(base)?;
                (entry, entry)
            }
            Cow::Owned(folded) => {
                let entry = self.find_entry(&folded)?;
                (entry, self.find_entry(base).unwrap_or(entry))
            }
        };
        Some(Name::from_parts(entry, display, number))
    }

    /// Resolve a pool entry, or `None` if it was never stored here.
    pub fn try_resolve(&self, entry: EntryId) -> Option<&'static str> {
        let guard = self.shards[entry.shard()].read();
        guard.strings.get(entry.local()).copied()
    }

    /// Resolve a pool entry.
    ///
    /// # Panics
    /// Panics if the entry does not belong to this pool. Entries are never
    /// removed, so this only happens when mixing names from two interners.
    pub fn resolve(&self, entry: EntryId) -> &'static str {
        self.try_resolve(entry)
            .unwrap_or_else(|| panic!("string pool has no entry {entry:?}"))
    }

    /// Display text of a name without its numeric suffix.
    pub fn base_str(&self, name: Name) -> &'static str {
        self.resolve(name.display_entry())
    }

    /// Render a name as `base` or `base_number`.
    pub fn to_string(&self, name: Name) -> String {
        let base = self.base_str(name);
        match name.number() {
            Some(n) => format!("{base}_{n}"),
            None => base.to_owned(),
        }
    }

    /// Get the number of pooled strings (O(1)).
    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    /// Check if the pool holds only the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for resolving interned names.
///
/// Lets higher-level crates accept any resolver without depending on the
/// concrete pool type.
pub trait StringLookup {
    /// Resolve a pool entry to its text.
    fn resolve_entry(&self, entry: EntryId) -> &str;

    /// Render a full name including its numeric suffix.
    fn render(&self, name: Name) -> String {
        let base = self.resolve_entry(name.display_entry());
        match name.number() {
            Some(n) => format!("{base}_{n}"),
            None => base.to_owned(),
        }
    }
}

impl StringLookup for StringInterner {
    fn resolve_entry(&self, entry: EntryId) -> &str {
        self.resolve(entry)
    }
}

/// Shared interner for thread-safe interning across extraction tasks.
///
/// All `Name` values produced during one run must come from the same pool to
/// be comparable; parse tasks clone this handle instead of creating pools.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new case-insensitive shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }

    /// Create a shared interner with an explicit case mode.
    pub fn with_case(case: CaseMode) -> Self {
        SharedInterner(Arc::new(StringInterner::with_case(case)))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StringLookup for SharedInterner {
    fn resolve_entry(&self, entry: EntryId) -> &str {
        self.0.resolve(entry)
    }
}

#[cfg(test)]
mod tests;
