//! Two-phase type registration.
//!
//! Types are described through [`ClassBuilder`] and collected by a
//! [`RegistryBuilder`]. [`RegistryBuilder::build`] validates the hierarchy
//! and freezes everything into a read-only [`TypeRegistry`]; adding members
//! afterwards is not expressible.
//!
//! ```text
//! ClassBuilder ─┐
//! ClassBuilder ─┼─► RegistryBuilder ──build()──► TypeRegistry (Send + Sync)
//! MetaEnum ─────┘                                   │
//!                                     ClassRef / PropertyRef / MethodRef
//! ```

use std::any::Any;

use refl_ir::{AssocMap, Name, RecordKind, SharedInterner};
use tracing::{debug, warn};

use crate::class::{FieldUpcast, MetaClass, Upcast};
use crate::enumeration::MetaEnum;
use crate::error::ReflectError;
use crate::metadata::DisplayMetadata;
use crate::method::{ArgBlock, MetaMethod};
use crate::object::{Instance, ObjectRef};
use crate::property::{FieldAccess, MetaProperty};
use crate::variant::{Variant, VariantType, VariantValue};

/// Describes one class before registration.
pub struct ClassBuilder {
    class: MetaClass,
}

impl ClassBuilder {
    pub fn new(name: Name, kind: RecordKind) -> Self {
        ClassBuilder {
            class: MetaClass::new(name, kind),
        }
    }

    pub fn name(&self) -> Name {
        self.class.name
    }

    /// Set the super type and the projection used to reach it.
    #[must_use]
    pub fn extends(mut self, super_type: Name, upcast: impl Upcast + 'static) -> Self {
        self.class.super_type = Some(super_type);
        self.class.upcast = Some(Box::new(upcast));
        self
    }

    /// Set the super type, reached through an embedded base field.
    #[must_use]
    pub fn extends_field<C: Any, S: Any>(
        self,
        super_type: Name,
        up: fn(&C) -> &S,
        up_mut: fn(&mut C) -> &mut S,
    ) -> Self {
        self.extends(super_type, FieldUpcast::new(up, up_mut))
    }

    /// Register a property backed by a Rust field.
    #[must_use]
    pub fn field<C: Any, T: VariantValue + Clone + 'static>(
        mut self,
        name: Name,
        get: fn(&C) -> &T,
        get_mut: fn(&mut C) -> &mut T,
    ) -> Self {
        self.add_property(MetaProperty::new(
            name,
            T::TYPE,
            FieldAccess::new(get, get_mut),
        ));
        self
    }

    /// Add a property, replacing one of the same name.
    pub fn add_property(&mut self, mut property: MetaProperty) -> &mut Self {
        property.owner = self.class.name;
        match self.class.property_index.get(&property.name).copied() {
            Some(slot) => self.class.properties[slot] = property,
            None => {
                let slot = self.class.properties.len();
                self.class.property_index.insert(property.name, slot);
                self.class.properties.push(property);
            }
        }
        self
    }

    #[must_use]
    pub fn property(mut self, property: MetaProperty) -> Self {
        self.add_property(property);
        self
    }

    /// Add a method, replacing one of the same name.
    pub fn add_method(&mut self, mut method: MetaMethod) -> &mut Self {
        method.owner = self.class.name;
        self.class.methods.insert(method.name, method);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MetaMethod) -> Self {
        self.add_method(method);
        self
    }

    /// Make the class instantiable through the registry.
    #[must_use]
    pub fn constructible<C: Any + Send + Sync>(mut self, make: fn() -> C) -> Self {
        self.class.constructor = Some(Box::new(move || -> Instance { Box::new(make()) }));
        self
    }

    #[must_use]
    pub fn constructor<F>(mut self, make: F) -> Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        self.class.constructor = Some(Box::new(make));
        self
    }

    #[must_use]
    pub fn size(mut self, size: u64) -> Self {
        self.class.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DisplayMetadata) -> Self {
        self.class.metadata = metadata;
        self
    }
}

/// Collects classes and enums, then validates them into a [`TypeRegistry`].
pub struct RegistryBuilder {
    interner: SharedInterner,
    classes: Vec<MetaClass>,
    enums: Vec<MetaEnum>,
}

impl RegistryBuilder {
    /// All type names must come from `interner`.
    pub fn new(interner: SharedInterner) -> Self {
        RegistryBuilder {
            interner,
            classes: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn add_class(&mut self, class: ClassBuilder) -> &mut Self {
        self.classes.push(class.class);
        self
    }

    pub fn add_enum(&mut self, meta: MetaEnum) -> &mut Self {
        self.enums.push(meta);
        self
    }

    /// Freeze the registry.
    ///
    /// Fails on a duplicate type name, a super type that was never
    /// registered, or an inheritance cycle.
    pub fn build(self) -> Result<TypeRegistry, ReflectError> {
        let RegistryBuilder {
            interner,
            classes: class_list,
            enums: enum_list,
        } = self;

        let mut classes: AssocMap<Name, MetaClass> = AssocMap::new();
        classes.reserve(class_list.len());
        for class in class_list {
            if classes.contains_key(&class.name) {
                return Err(ReflectError::DuplicateType(interner.to_string(class.name)));
            }
            classes.insert(class.name, class);
        }

        let mut enums: AssocMap<Name, MetaEnum> = AssocMap::new();
        for meta in enum_list {
            if enums.contains_key(&meta.name()) || classes.contains_key(&meta.name()) {
                return Err(ReflectError::DuplicateType(interner.to_string(meta.name())));
            }
            enums.insert(meta.name(), meta);
        }

        for class in classes.values() {
            if let Some(super_type) = class.super_type {
                if !classes.contains_key(&super_type) {
                    return Err(ReflectError::UnknownSuperType {
                        class: interner.to_string(class.name),
                        super_type: interner.to_string(super_type),
                    });
                }
            }
        }

        // A chain longer than the class count must revisit a class
        let limit = classes.len();
        for class in classes.values() {
            let mut current = class.super_type;
            let mut steps = 0;
            while let Some(name) = current {
                if name == class.name || steps > limit {
                    return Err(ReflectError::InheritanceCycle(interner.to_string(class.name)));
                }
                steps += 1;
                current = classes.get(&name).and_then(|parent| parent.super_type);
            }
        }

        debug!(
            classes = classes.len(),
            enums = enums.len(),
            "type registry built"
        );
        Ok(TypeRegistry {
            interner,
            classes,
            enums,
        })
    }
}

/// Frozen, read-only set of reflected types.
pub struct TypeRegistry {
    interner: SharedInterner,
    classes: AssocMap<Name, MetaClass>,
    enums: AssocMap<Name, MetaEnum>,
}

impl TypeRegistry {
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn class(&self, name: Name) -> Option<ClassRef<'_>> {
        self.classes.get(&name).map(|class| ClassRef {
            registry: self,
            class,
        })
    }

    pub fn meta_class(&self, name: Name) -> Option<&MetaClass> {
        self.classes.get(&name)
    }

    pub fn enumeration(&self, name: Name) -> Option<&MetaEnum> {
        self.enums.get(&name)
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassRef<'_>> + '_ {
        self.classes.values().map(move |class| ClassRef {
            registry: self,
            class,
        })
    }

    pub fn enums(&self) -> impl Iterator<Item = &MetaEnum> + '_ {
        self.enums.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if `class` derives from `ancestor`, directly or not.
    ///
    /// A class is not its own child; an unknown class has no ancestors.
    pub fn is_child_of(&self, class: Name, ancestor: Name) -> bool {
        if class == ancestor {
            return false;
        }
        let mut current = self.classes.get(&class).and_then(|c| c.super_type);
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.classes.get(&name).and_then(|c| c.super_type);
        }
        false
    }

    /// `class` is `ancestor` or one of its children.
    pub fn is_a(&self, class: Name, ancestor: Name) -> bool {
        class == ancestor || self.is_child_of(class, ancestor)
    }

    /// Project an instance of `from` to its `to` part.
    pub fn project<'a>(&self, instance: &'a dyn Any, from: Name, to: Name) -> Option<&'a dyn Any> {
        let mut current = from;
        let mut value = instance;
        while current != to {
            let class = self.classes.get(&current)?;
            value = class.upcast.as_deref()?.up(value)?;
            current = class.super_type?;
        }
        Some(value)
    }

    pub fn project_mut<'a>(
        &self,
        instance: &'a mut dyn Any,
        from: Name,
        to: Name,
    ) -> Option<&'a mut dyn Any> {
        let mut current = from;
        let mut value = instance;
        while current != to {
            let class = self.classes.get(&current)?;
            value = class.upcast.as_deref()?.up_mut(value)?;
            current = class.super_type?;
        }
        Some(value)
    }

    /// Create a fresh instance of a constructible class.
    pub fn instantiate(&self, name: Name) -> Result<ObjectRef, ReflectError> {
        let class = self
            .classes
            .get(&name)
            .ok_or_else(|| ReflectError::UnknownClass(self.interner.to_string(name)))?;
        let constructor = class
            .constructor
            .as_ref()
            .ok_or_else(|| ReflectError::NotConstructible(self.interner.to_string(name)))?;
        Ok(ObjectRef::from_boxed(name, constructor()))
    }

    /// Resolve the object behind `instance` and check it is a `owner`.
    pub fn check_instance<'v>(
        &self,
        instance: &'v Variant,
        owner: Name,
    ) -> Result<&'v ObjectRef, ReflectError> {
        match instance {
            Variant::Invalid => Err(ReflectError::InvalidInstance),
            Variant::Object(object) if self.is_a(object.class(), owner) => Ok(object),
            Variant::Object(object) => Err(ReflectError::NotASubclass {
                expected: self.interner.to_string(owner),
                found: self.interner.to_string(object.class()),
            }),
            other => Err(ReflectError::NotAnObject {
                found: other.ty().describe(&self.interner),
            }),
        }
    }

    /// Whether `value` may be stored where `expected` is declared.
    ///
    /// Tags must match exactly, except that an object of a derived class
    /// fits an object slot of its ancestor.
    fn accepts(&self, expected: VariantType, value: &Variant) -> bool {
        match (expected, value.ty()) {
            (VariantType::Object(slot), VariantType::Object(class)) => self.is_a(class, slot),
            (expected, found) => expected == found,
        }
    }
}

/// Class handle resolved through its registry.
#[derive(Copy, Clone)]
pub struct ClassRef<'r> {
    registry: &'r TypeRegistry,
    class: &'r MetaClass,
}

impl<'r> ClassRef<'r> {
    pub fn meta(&self) -> &'r MetaClass {
        self.class
    }

    pub fn name(&self) -> Name {
        self.class.name
    }

    pub fn super_class(&self) -> Option<ClassRef<'r>> {
        self.class
            .super_type
            .and_then(|name| self.registry.class(name))
    }

    pub fn is_child_of(&self, ancestor: Name) -> bool {
        self.registry.is_child_of(self.class.name, ancestor)
    }

    /// This class followed by its ancestors, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = ClassRef<'r>> {
        std::iter::successors(Some(*self), ClassRef::super_class)
    }

    /// Property declared here or on an ancestor.
    pub fn find_property(&self, name: Name) -> Option<PropertyRef<'r>> {
        let registry = self.registry;
        self.lineage().find_map(|class| {
            class
                .class
                .declared_property(name)
                .map(|property| PropertyRef { registry, property })
        })
    }

    /// Method declared here or on an ancestor.
    pub fn find_method(&self, name: Name) -> Option<MethodRef<'r>> {
        let registry = self.registry;
        self.lineage().find_map(|class| {
            class
                .class
                .declared_method(name)
                .map(|method| MethodRef { registry, method })
        })
    }

    /// Every reachable property, base classes first.
    pub fn all_properties(&self) -> Vec<PropertyRef<'r>> {
        let registry = self.registry;
        let mut chain: Vec<_> = self.lineage().collect();
        chain.reverse();
        chain
            .into_iter()
            .flat_map(|class| class.class.properties.iter())
            .map(|property| PropertyRef { registry, property })
            .collect()
    }

    pub fn instantiate(&self) -> Result<ObjectRef, ReflectError> {
        self.registry.instantiate(self.class.name)
    }
}

/// Property handle resolved through its registry.
#[derive(Copy, Clone)]
pub struct PropertyRef<'r> {
    registry: &'r TypeRegistry,
    property: &'r MetaProperty,
}

impl<'r> PropertyRef<'r> {
    pub fn meta(&self) -> &'r MetaProperty {
        self.property
    }

    pub fn name(&self) -> Name {
        self.property.name
    }

    pub fn ty(&self) -> VariantType {
        self.property.ty
    }

    fn render_name(&self) -> String {
        self.registry.interner.to_string(self.property.name)
    }

    /// Read the property from `instance`.
    pub fn try_get_value(&self, instance: &Variant) -> Result<Variant, ReflectError> {
        let owner = self.property.owner;
        let object = self.registry.check_instance(instance, owner)?;
        let guard = object.read();
        let erased: &dyn Any = &**guard;
        self.registry
            .project(erased, object.class(), owner)
            .and_then(|target| self.property.accessor.get(target))
            .ok_or_else(|| ReflectError::AccessFailed {
                member: self.render_name(),
            })
    }

    /// Read the property, logging failures and yielding an invalid variant.
    pub fn get_value(&self, instance: &Variant) -> Variant {
        self.try_get_value(instance).unwrap_or_else(|e| {
            warn!("get_value failed: {e}");
            Variant::Invalid
        })
    }

    /// Assign `value` in place.
    ///
    /// The value must be valid and carry the property's type tag.
    pub fn try_set_value(&self, instance: &Variant, value: &Variant) -> Result<(), ReflectError> {
        let owner = self.property.owner;
        let object = self.registry.check_instance(instance, owner)?;
        if !value.is_valid() {
            return Err(ReflectError::InvalidValue {
                property: self.render_name(),
            });
        }
        if !self.registry.accepts(self.property.ty, value) {
            let lookup = &self.registry.interner;
            return Err(ReflectError::ValueType {
                property: self.render_name(),
                expected: self.property.ty.describe(lookup),
                found: value.ty().describe(lookup),
            });
        }

        let mut guard = object.write();
        let erased: &mut dyn Any = &mut **guard;
        let assigned = self
            .registry
            .project_mut(erased, object.class(), owner)
            .is_some_and(|target| self.property.accessor.set(target, value));
        if assigned {
            Ok(())
        } else {
            Err(ReflectError::AccessFailed {
                member: self.render_name(),
            })
        }
    }

    /// Assign `value`, logging failures.
    pub fn set_value(&self, instance: &Variant, value: &Variant) -> bool {
        match self.try_set_value(instance, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("set_value failed: {e}");
                false
            }
        }
    }
}

/// Method handle resolved through its registry.
#[derive(Copy, Clone)]
pub struct MethodRef<'r> {
    registry: &'r TypeRegistry,
    method: &'r MetaMethod,
}

impl<'r> MethodRef<'r> {
    pub fn meta(&self) -> &'r MetaMethod {
        self.method
    }

    pub fn name(&self) -> Name {
        self.method.name
    }

    /// Validate the arguments and call the method.
    ///
    /// Static methods ignore `instance`; instance methods project it to
    /// the declaring class first. Passing the instance itself as an
    /// argument is rejected.
    pub fn invoke(&self, instance: Option<&Variant>, args: &ArgBlock) -> Result<Variant, ReflectError> {
        let lookup = &self.registry.interner;
        self.method.validate(lookup, args)?;
        if self.method.is_static {
            return self.method.invoke_unchecked(None, args);
        }

        let owner = self.method.owner;
        let instance = instance.ok_or_else(|| ReflectError::MissingInstance {
            method: lookup.to_string(self.method.name),
        })?;
        let object = self.registry.check_instance(instance, owner)?;
        // The instance stays write-locked while the entry point runs
        let aliased = args
            .iter()
            .any(|arg| matches!(arg, Variant::Object(other) if other.ptr_eq(object)));
        if aliased {
            return Err(ReflectError::InstanceAsArgument {
                method: lookup.to_string(self.method.name),
            });
        }
        let mut guard = object.write();
        let erased: &mut dyn Any = &mut **guard;
        let target = self
            .registry
            .project_mut(erased, object.class(), owner)
            .ok_or_else(|| ReflectError::AccessFailed {
                member: lookup.to_string(self.method.name),
            })?;
        self.method.invoke_unchecked(Some(target), args)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
