//! String-keyed entry point for reflective access.

use refl_ir::{Name, SharedInterner};

use crate::error::ReflectError;
use crate::method::ArgBlock;
use crate::registry::{ClassRef, PropertyRef, TypeRegistry};
use crate::variant::Variant;

/// Interner plus frozen registry, passed explicitly to code that works
/// with type-erased handles.
pub struct ReflectContext {
    pub interner: SharedInterner,
    pub registry: TypeRegistry,
}

impl ReflectContext {
    pub fn new(registry: TypeRegistry) -> Self {
        ReflectContext {
            interner: registry.interner().clone(),
            registry,
        }
    }

    /// Look up an already interned name, in any casing.
    pub fn name(&self, text: &str) -> Option<Name> {
        self.interner.find(text)
    }

    pub fn class(&self, name: &str) -> Option<ClassRef<'_>> {
        self.name(name).and_then(|name| self.registry.class(name))
    }

    pub fn is_child_of(&self, class: &str, ancestor: &str) -> bool {
        match (self.name(class), self.name(ancestor)) {
            (Some(class), Some(ancestor)) => self.registry.is_child_of(class, ancestor),
            _ => false,
        }
    }

    pub fn instantiate(&self, class: &str) -> Result<Variant, ReflectError> {
        let name = self
            .name(class)
            .ok_or_else(|| ReflectError::UnknownClass(class.to_owned()))?;
        self.registry.instantiate(name).map(Variant::Object)
    }

    fn instance_class(&self, instance: &Variant) -> Result<ClassRef<'_>, ReflectError> {
        match instance {
            Variant::Invalid => Err(ReflectError::InvalidInstance),
            Variant::Object(object) => self
                .registry
                .class(object.class())
                .ok_or_else(|| ReflectError::UnknownClass(self.interner.to_string(object.class()))),
            other => Err(ReflectError::NotAnObject {
                found: other.ty().describe(&self.interner),
            }),
        }
    }

    fn property_of(&self, instance: &Variant, property: &str) -> Result<PropertyRef<'_>, ReflectError> {
        let class = self.instance_class(instance)?;
        self.name(property)
            .and_then(|name| class.find_property(name))
            .ok_or_else(|| ReflectError::UnknownProperty {
                class: self.interner.to_string(class.name()),
                property: property.to_owned(),
            })
    }

    pub fn try_get_value(&self, instance: &Variant, property: &str) -> Result<Variant, ReflectError> {
        self.property_of(instance, property)?.try_get_value(instance)
    }

    /// Read a property by name; failures are logged and yield an invalid
    /// variant.
    pub fn get_value(&self, instance: &Variant, property: &str) -> Variant {
        self.try_get_value(instance, property).unwrap_or_else(|e| {
            tracing::warn!(property, "get_value failed: {e}");
            Variant::Invalid
        })
    }

    pub fn try_set_value(
        &self,
        instance: &Variant,
        property: &str,
        value: &Variant,
    ) -> Result<(), ReflectError> {
        self.property_of(instance, property)?
            .try_set_value(instance, value)
    }

    pub fn set_value(&self, instance: &Variant, property: &str, value: &Variant) -> bool {
        match self.try_set_value(instance, property, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(property, "set_value failed: {e}");
                false
            }
        }
    }

    /// Call an instance method by name.
    pub fn invoke(
        &self,
        instance: &Variant,
        method: &str,
        args: &ArgBlock,
    ) -> Result<Variant, ReflectError> {
        let class = self.instance_class(instance)?;
        let found = self
            .name(method)
            .and_then(|name| class.find_method(name))
            .ok_or_else(|| ReflectError::UnknownMethod {
                class: self.interner.to_string(class.name()),
                method: method.to_owned(),
            })?;
        found.invoke(Some(instance), args)
    }

    /// Call a static method of `class` by name.
    pub fn invoke_static(
        &self,
        class: &str,
        method: &str,
        args: &ArgBlock,
    ) -> Result<Variant, ReflectError> {
        let class_ref = self
            .class(class)
            .ok_or_else(|| ReflectError::UnknownClass(class.to_owned()))?;
        let found = self
            .name(method)
            .and_then(|name| class_ref.find_method(name))
            .ok_or_else(|| ReflectError::UnknownMethod {
                class: class.to_owned(),
                method: method.to_owned(),
            })?;
        found.invoke(None, args)
    }
}
