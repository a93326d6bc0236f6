//! Refl Runtime - runtime reflection model
//!
//! Lets code that only holds a type-erased [`Variant`] read, write and call
//! members of registered classes by name:
//!
//! - [`ClassBuilder`] / [`RegistryBuilder`] describe types, then `build()`
//!   freezes them into a read-only, thread-safe [`TypeRegistry`]
//! - [`MetaProperty`] wraps an accessor that reads or writes one field of a
//!   type-erased instance
//! - [`MetaMethod`] wraps a type-erased entry point with recorded parameter
//!   tags
//! - super types are names resolved through the registry; base members are
//!   reached from derived instances by projecting along [`Upcast`] links
//!
//! Failed lookups and type mismatches never panic: the plain accessors log
//! a warning and return a failure value, the `try_*` forms return
//! [`ReflectError`].

mod class;
mod context;
mod enumeration;
mod error;
mod metadata;
mod method;
mod object;
mod property;
mod registry;
mod variant;

pub use class::{Constructor, FieldUpcast, IdentityUpcast, MetaClass, Upcast};
pub use context::ReflectContext;
pub use enumeration::{EnumConstant, MetaEnum};
pub use error::ReflectError;
pub use metadata::DisplayMetadata;
pub use method::{ArgBlock, MetaMethod, MethodEntry};
pub use object::{DynamicObject, Instance, ObjectRef};
pub use property::{DynamicSlot, FieldAccess, MetaProperty, PropertyAccessor};
pub use registry::{ClassBuilder, ClassRef, MethodRef, PropertyRef, RegistryBuilder, TypeRegistry};
pub use variant::{EnumValue, Variant, VariantType, VariantValue};
pub use refl_ir::RecordKind;
