//! Reflected classes and structs.

use std::any::Any;
use std::fmt;

use refl_ir::{AssocMap, Name, RecordKind};

use crate::metadata::DisplayMetadata;
use crate::method::MetaMethod;
use crate::object::Instance;
use crate::property::MetaProperty;
use crate::registry::TypeRegistry;

/// Projection from a derived instance to its direct super type.
pub trait Upcast: Send + Sync {
    fn up<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any>;

    fn up_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

/// Upcast through an embedded base field of a Rust struct.
pub struct FieldUpcast<C, S> {
    up: fn(&C) -> &S,
    up_mut: fn(&mut C) -> &mut S,
}

impl<C, S> FieldUpcast<C, S> {
    pub const fn new(up: fn(&C) -> &S, up_mut: fn(&mut C) -> &mut S) -> Self {
        FieldUpcast { up, up_mut }
    }
}

impl<C: Any, S: Any> Upcast for FieldUpcast<C, S> {
    fn up<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        let derived = instance.downcast_ref::<C>()?;
        Some((self.up)(derived) as &dyn Any)
    }

    fn up_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        let derived = instance.downcast_mut::<C>()?;
        Some((self.up_mut)(derived) as &mut dyn Any)
    }
}

/// Upcast for instances that store base and derived state together,
/// such as [`DynamicObject`](crate::DynamicObject).
pub struct IdentityUpcast;

impl Upcast for IdentityUpcast {
    fn up<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Any> {
        Some(instance)
    }

    fn up_mut<'a>(&self, instance: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        Some(instance)
    }
}

/// Factory for fresh instances of a class.
pub type Constructor = Box<dyn Fn() -> Instance + Send + Sync>;

/// Reflected class or struct.
///
/// A struct is the same node with [`RecordKind::Struct`]. The super type is
/// a plain name resolved through the owning registry.
pub struct MetaClass {
    pub(crate) name: Name,
    pub(crate) kind: RecordKind,
    pub(crate) super_type: Option<Name>,
    pub(crate) upcast: Option<Box<dyn Upcast>>,
    pub(crate) properties: Vec<MetaProperty>,
    pub(crate) property_index: AssocMap<Name, usize>,
    pub(crate) methods: AssocMap<Name, MetaMethod>,
    pub(crate) metadata: DisplayMetadata,
    pub(crate) size: Option<u64>,
    pub(crate) constructor: Option<Constructor>,
}

impl MetaClass {
    pub(crate) fn new(name: Name, kind: RecordKind) -> Self {
        MetaClass {
            name,
            kind,
            super_type: None,
            upcast: None,
            properties: Vec::new(),
            property_index: AssocMap::new(),
            methods: AssocMap::new(),
            metadata: DisplayMetadata::default(),
            size: None,
            constructor: None,
        }
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_struct(&self) -> bool {
        self.kind == RecordKind::Struct
    }

    pub fn super_type(&self) -> Option<Name> {
        self.super_type
    }

    /// Returns `true` if this class derives from `ancestor` in `registry`.
    pub fn is_child_of(&self, registry: &TypeRegistry, ancestor: Name) -> bool {
        registry.is_child_of(self.name, ancestor)
    }

    /// Properties declared by this class, in registration order.
    pub fn properties(&self) -> &[MetaProperty] {
        &self.properties
    }

    /// Property declared by this class only.
    pub fn declared_property(&self, name: Name) -> Option<&MetaProperty> {
        self.property_index
            .get(&name)
            .and_then(|&slot| self.properties.get(slot))
    }

    /// Methods declared by this class.
    pub fn methods(&self) -> impl Iterator<Item = &MetaMethod> + '_ {
        self.methods.values()
    }

    pub fn declared_method(&self, name: Name) -> Option<&MetaMethod> {
        self.methods.get(&name)
    }

    pub fn metadata(&self) -> &DisplayMetadata {
        &self.metadata
    }

    /// Instance size in bytes, when known from layout.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }
}

impl fmt::Debug for MetaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaClass")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("super_type", &self.super_type)
            .field("properties", &self.properties)
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}
