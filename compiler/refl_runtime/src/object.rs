//! Instance handles.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use refl_ir::{AssocMap, Name};

use crate::variant::Variant;

/// Boxed instance storage behind an [`ObjectRef`].
pub type Instance = Box<dyn Any + Send + Sync>;

/// Shared, lockable handle to a reflected instance.
///
/// The handle records the concrete class it was created as. Clones share
/// the same instance; equality is identity.
#[derive(Clone)]
pub struct ObjectRef {
    class: Name,
    cell: Arc<RwLock<Instance>>,
}

impl ObjectRef {
    /// Wrap a value as an instance of `class`.
    pub fn new<T: Any + Send + Sync>(class: Name, value: T) -> Self {
        Self::from_boxed(class, Box::new(value))
    }

    pub fn from_boxed(class: Name, instance: Instance) -> Self {
        ObjectRef {
            class,
            cell: Arc::new(RwLock::new(instance)),
        }
    }

    /// Concrete class of the instance.
    #[inline]
    pub fn class(&self) -> Name {
        self.class
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Instance> {
        self.cell.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Instance> {
        self.cell.write()
    }

    /// Run `f` on the instance if it is a `T`.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.cell.read();
        (**guard).downcast_ref::<T>().map(f)
    }

    /// Run `f` on the instance mutably if it is a `T`.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.cell.write();
        (**guard).downcast_mut::<T>().map(f)
    }

    /// Returns `true` if both handles point at the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:?})", self.class)
    }
}

/// Instance whose fields live in a name-keyed slot map.
///
/// Used for classes registered from extracted metadata, where no Rust type
/// exists. Base-class slots share the same map.
#[derive(Clone, Debug, Default)]
pub struct DynamicObject {
    class: Name,
    slots: AssocMap<Name, Variant>,
}

impl DynamicObject {
    pub fn new(class: Name) -> Self {
        DynamicObject {
            class,
            slots: AssocMap::new(),
        }
    }

    pub fn class(&self) -> Name {
        self.class
    }

    /// Stored value of a slot, `None` if never assigned.
    pub fn get(&self, slot: Name) -> Option<&Variant> {
        self.slots.get(&slot)
    }

    pub fn set(&mut self, slot: Name, value: Variant) {
        self.slots.insert(slot, value);
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &Variant)> + '_ {
        self.slots.iter().map(|(name, value)| (*name, value))
    }
}
