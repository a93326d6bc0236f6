//! Refl IR - Core identifiers and containers
//!
//! This crate contains the leaf data structures shared by the extractor and
//! the runtime reflection model:
//! - `Name` and `StringInterner` for interned, case-insensitive identifiers
//! - `SparseArray` for index-stable storage with O(1) erase
//! - `AssocSet`/`AssocMap` for name-keyed lookup on top of `SparseArray`
//! - `SourceLocation`/`Span` for positions inside the source model
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers become `Name` values compared by id
//! - **Indices, not addresses**: containers link elements by index so a
//!   reallocation never invalidates a chain

mod assoc_set;
mod interner;
mod location;
mod name;
mod sparse_array;

pub use assoc_set::{AssocMap, AssocSet, DefaultKeyFuncs, KeyFuncs, PairKeyFuncs};
pub use interner::{
    split_trailing_number, CaseMode, InternError, SharedInterner, StringInterner, StringLookup,
};
pub use location::{SourceLocation, Span};
pub use name::{EntryId, Name, NameDisplay};
pub use sparse_array::{SparseArray, SparseIndex};

/// Kind of an aggregate declaration.
///
/// Classes and structs share one descriptor shape; the kind is kept so the
/// runtime can distinguish `MetaClass` from `MetaStruct` nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordKind {
    #[default]
    Class,
    Struct,
}

impl RecordKind {
    /// Keyword used for this kind in source.
    pub const fn keyword(self) -> &'static str {
        match self {
            RecordKind::Class => "class",
            RecordKind::Struct => "struct",
        }
    }
}
