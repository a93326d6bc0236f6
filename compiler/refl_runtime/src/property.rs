//! Reflected properties and their accessors.

use std::any::Any;
use std::fmt;

use refl_ir::Name;

use crate::metadata::DisplayMetadata;
use crate::object::DynamicObject;
use crate::variant::{Variant, VariantType, VariantValue};

/// Reads and writes one property on a type-erased instance.
///
/// `instance` is already projected to the declaring class. Both methods
/// return a failure value instead of panicking when the instance has an
/// unexpected concrete type.
pub trait PropertyAccessor: Send + Sync {
    fn get(&self, instance: &dyn Any) -> Option<Variant>;

    fn set(&self, instance: &mut dyn Any, value: &Variant) -> bool;
}

/// Accessor for a field of a Rust struct `C`.
pub struct FieldAccess<C, T> {
    get: fn(&C) -> &T,
    get_mut: fn(&mut C) -> &mut T,
}

impl<C, T> FieldAccess<C, T> {
    pub const fn new(get: fn(&C) -> &T, get_mut: fn(&mut C) -> &mut T) -> Self {
        FieldAccess { get, get_mut }
    }
}

impl<C: Any, T: VariantValue + Clone> PropertyAccessor for FieldAccess<C, T> {
    fn get(&self, instance: &dyn Any) -> Option<Variant> {
        let instance = instance.downcast_ref::<C>()?;
        Some((self.get)(instance).clone().into_variant())
    }

    fn set(&self, instance: &mut dyn Any, value: &Variant) -> bool {
        let (Some(instance), Some(value)) = (instance.downcast_mut::<C>(), T::from_variant(value))
        else {
            return false;
        };
        *(self.get_mut)(instance) = value;
        true
    }
}

/// Accessor for one slot of a [`DynamicObject`].
///
/// An unassigned slot reads as the zero value of its type.
pub struct DynamicSlot {
    slot: Name,
    ty: VariantType,
}

impl DynamicSlot {
    pub const fn new(slot: Name, ty: VariantType) -> Self {
        DynamicSlot { slot, ty }
    }
}

impl PropertyAccessor for DynamicSlot {
    fn get(&self, instance: &dyn Any) -> Option<Variant> {
        let object = instance.downcast_ref::<DynamicObject>()?;
        Some(
            object
                .get(self.slot)
                .cloned()
                .unwrap_or_else(|| self.ty.default_value()),
        )
    }

    fn set(&self, instance: &mut dyn Any, value: &Variant) -> bool {
        match instance.downcast_mut::<DynamicObject>() {
            Some(object) => {
                object.set(self.slot, value.clone());
                true
            }
            None => false,
        }
    }
}

/// Property of a reflected class.
pub struct MetaProperty {
    pub(crate) name: Name,
    pub(crate) ty: VariantType,
    pub(crate) owner: Name,
    pub(crate) metadata: DisplayMetadata,
    pub(crate) offset: Option<u64>,
    pub(crate) accessor: Box<dyn PropertyAccessor>,
}

impl MetaProperty {
    pub fn new(name: Name, ty: VariantType, accessor: impl PropertyAccessor + 'static) -> Self {
        MetaProperty {
            name,
            ty,
            owner: Name::NONE,
            metadata: DisplayMetadata::default(),
            offset: None,
            accessor: Box::new(accessor),
        }
    }

    /// Property stored in a [`DynamicObject`] slot of the same name.
    pub fn dynamic(name: Name, ty: VariantType) -> Self {
        Self::new(name, ty, DynamicSlot::new(name, ty))
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DisplayMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> Name {
        self.name
    }

    pub fn ty(&self) -> VariantType {
        self.ty
    }

    /// Class that declares this property.
    pub fn owner(&self) -> Name {
        self.owner
    }

    pub fn metadata(&self) -> &DisplayMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut DisplayMetadata {
        &mut self.metadata
    }

    /// Byte offset inside the declaring class, when known from layout.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
}

impl fmt::Debug for MetaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaProperty")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("owner", &self.owner)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
