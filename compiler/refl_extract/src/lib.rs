//! Refl Extract - metadata extraction from annotated headers
//!
//! Walks every header under a content root, parses it with `refl_parse`,
//! and turns annotated declarations into metadata units:
//!
//! - annotated `class`/`struct` → [`RecordUnit`] with its annotated
//!   fields ([`PropertyUnit`]) and methods ([`MethodUnit`])
//! - annotated `enum` → [`EnumUnit`]
//!
//! Annotations are validated against per-kind [`Schemas`]; unsupported
//! flags and attributes are dropped. Unchanged files are skipped using an
//! [`IncrementalState`] file, and an optional precompiled header supplies
//! shared declarations and macros to every parse.

mod annotation;
mod config;
mod context;
mod emit;
mod error;
mod extractor;
mod fs;
mod layout;
mod pch;
mod schema;
mod state;
mod units;
mod walk;

pub use annotation::{parse_annotation, split_entries, Metadata};
pub use config::{ExtractorConfig, StampPolicy};
pub use context::ExtractContext;
pub use emit::{
    descriptor_path, relative_key, to_json, ArgumentDescriptor, Describer, EnumDescriptor,
    EnumFieldDescriptor, FileDescriptor, MetadataDescriptor, MethodDescriptor,
    PropertyDescriptor, RecordDescriptor, TypeDescriptor, UnitDescriptor,
};
pub use error::{ExtractError, FileError, PchError, StateError};
pub use extractor::{parse_file, ExtractPhase, ExtractReport, Extractor};
pub use fs::{now_seconds, DiskFileSystem, FileSystem};
pub use layout::{scalar_layout, LayoutTable, RecordLayout};
pub use pch::PchManager;
pub use schema::{Schemas, UnitKind, UnitSchema};
pub use state::IncrementalState;
pub use units::{
    Argument, EnumField, EnumUnit, FileUnits, MetadataUnit, MethodUnit, PropertyUnit, RecordUnit,
    TypeInfo, Unit,
};
pub use walk::{extract_units, is_supported_property_type};
