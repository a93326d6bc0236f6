//! Registers extracted descriptors as runtime types.
//!
//! Every record becomes a class whose instances are [`DynamicObject`]s, so
//! headers can be instantiated and mutated through the reflection API
//! without generated code. Methods are registered with their signatures but
//! have no native binding; calling one fails with [`ReflectError::Call`].

use refl_extract::{
    EnumDescriptor, FileDescriptor, MetadataDescriptor, MethodDescriptor, RecordDescriptor,
    TypeDescriptor, UnitDescriptor,
};
use refl_ir::{AssocMap, Name, RecordKind, SharedInterner};
use refl_runtime::{
    ClassBuilder, DisplayMetadata, DynamicObject, EnumConstant, IdentityUpcast, Instance, MetaEnum,
    MetaMethod, MetaProperty, ReflectError, RegistryBuilder, TypeRegistry, VariantType,
};
use tracing::{debug, warn};

/// Runtime tag of a scalar or string type spelling.
pub fn scalar_type(base: &str) -> Option<VariantType> {
    let base = base.strip_prefix("std::").unwrap_or(base);
    let ty = match base {
        "bool" => VariantType::Bool,
        "char" | "signed char" | "int8_t" | "char8_t" => VariantType::I8,
        "unsigned char" | "uint8_t" | "byte" => VariantType::U8,
        "short" | "int16_t" => VariantType::I16,
        "unsigned short" | "uint16_t" | "char16_t" => VariantType::U16,
        "int" | "int32_t" | "wchar_t" => VariantType::I32,
        "unsigned" | "unsigned int" | "uint32_t" | "char32_t" => VariantType::U32,
        "long" | "long long" | "int64_t" | "ptrdiff_t" | "intptr_t" => VariantType::I64,
        "unsigned long" | "unsigned long long" | "uint64_t" | "size_t" | "uintptr_t" => {
            VariantType::U64
        }
        "float" => VariantType::F32,
        "double" | "long double" => VariantType::F64,
        "string" => VariantType::String,
        _ => return None,
    };
    Some(ty)
}

/// Base spelling of a parameter or return type: qualifiers and references
/// removed. Pointers have no runtime tag.
fn strip_type(text: &str) -> Option<&str> {
    if text.contains('*') {
        return None;
    }
    let mut base = text.trim().trim_end_matches('&').trim_end();
    loop {
        let before = base;
        for qualifier in ["const ", "volatile "] {
            base = base.strip_prefix(qualifier).unwrap_or(base).trim_start();
        }
        for qualifier in [" const", " volatile"] {
            base = base.strip_suffix(qualifier).unwrap_or(base).trim_end();
        }
        if base == before {
            return Some(base);
        }
    }
}

fn last_segment(qualified: &str) -> &str {
    let without_args = qualified.split('<').next().unwrap_or(qualified);
    without_args.rsplit("::").next().unwrap_or(without_args)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Declared {
    Record,
    Enum,
}

/// Counts of what was registered and what had to be left out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub classes: usize,
    pub enums: usize,
    pub properties: usize,
    pub methods: usize,
    /// One line per dropped member or type, with the reason.
    pub skipped: Vec<String>,
}

struct Mirror<'a> {
    interner: &'a SharedInterner,
    declared: AssocMap<Name, Declared>,
    report: MirrorReport,
}

impl Mirror<'_> {
    fn name(&self, text: &str) -> Name {
        self.interner.intern(last_segment(text))
    }

    fn metadata(&self, descriptor: &MetadataDescriptor) -> DisplayMetadata {
        let mut metadata = DisplayMetadata::new();
        for flag in &descriptor.flags {
            metadata.add_flag(self.interner.intern(flag));
        }
        for (key, value) in &descriptor.attributes {
            metadata.set_attribute(self.interner.intern(key), value.as_str());
        }
        metadata
    }

    /// Runtime tag of a property or parameter base type.
    fn value_type(&self, base: &str) -> Option<VariantType> {
        if let Some(ty) = scalar_type(base) {
            return Some(ty);
        }
        let name = self.name(base);
        match self.declared.get(&name) {
            Some(Declared::Enum) => Some(VariantType::Enum(name)),
            Some(Declared::Record) => Some(VariantType::Object(name)),
            None => None,
        }
    }

    fn parameter_type(&self, ty: &TypeDescriptor) -> Option<VariantType> {
        strip_type(&ty.text).and_then(|base| self.value_type(base))
    }

    fn return_type(&self, ty: &TypeDescriptor) -> Option<VariantType> {
        match strip_type(&ty.text) {
            Some("void") => Some(VariantType::Invalid),
            Some(base) => self.value_type(base),
            None => None,
        }
    }

    fn skip(&mut self, owner: &str, member: &str, reason: &str) {
        debug!(owner, member, reason, "not mirrored");
        self.report.skipped.push(format!("{owner}::{member}: {reason}"));
    }

    fn method(&mut self, owner: &str, descriptor: &MethodDescriptor) -> Option<MetaMethod> {
        let mut params = Vec::with_capacity(descriptor.arguments.len());
        for argument in &descriptor.arguments {
            match self.parameter_type(&argument.ty) {
                Some(ty) => params.push(ty),
                None => {
                    let reason = format!("unsupported parameter type '{}'", argument.ty.text);
                    self.skip(owner, &descriptor.name, &reason);
                    return None;
                }
            }
        }
        let Some(ret) = self.return_type(&descriptor.return_type) else {
            let reason = format!(
                "unsupported return type '{}'",
                descriptor.return_type.text
            );
            self.skip(owner, &descriptor.name, &reason);
            return None;
        };

        let name = self.interner.intern(&descriptor.name);
        let label = format!("{owner}::{}", descriptor.name);
        let unbound = move || ReflectError::Call {
            method: label.clone(),
            message: "no native binding".to_owned(),
        };
        let method = if descriptor.is_static {
            MetaMethod::static_fn(name, params, ret, move |_| Err(unbound()))
        } else {
            MetaMethod::new(name, params, ret, move |_, _| Err(unbound()))
        };
        Some(
            method
                .with_const(descriptor.is_const)
                .with_metadata(self.metadata(&descriptor.metadata)),
        )
    }

    fn record(&mut self, descriptor: &RecordDescriptor, kind: RecordKind) -> ClassBuilder {
        let name = self.name(&descriptor.name);
        let mut class = ClassBuilder::new(name, kind)
            .size(descriptor.size)
            .with_metadata(self.metadata(&descriptor.metadata))
            .constructor(move || -> Instance { Box::new(DynamicObject::new(name)) });

        // Single inheritance: the first base that is itself reflected
        let super_type = descriptor
            .super_types
            .iter()
            .map(|spelling| self.name(spelling))
            .find(|base| self.declared.get(base) == Some(&Declared::Record));
        if let Some(super_type) = super_type {
            class = class.extends(super_type, IdentityUpcast);
        }

        for property in &descriptor.properties {
            if property.array_len.is_some() {
                self.skip(&descriptor.name, &property.name, "array properties are not mirrored");
                continue;
            }
            let Some(ty) = self.value_type(&property.ty) else {
                let reason = format!("unsupported type '{}'", property.ty);
                self.skip(&descriptor.name, &property.name, &reason);
                continue;
            };
            class.add_property(
                MetaProperty::dynamic(self.interner.intern(&property.name), ty)
                    .with_offset(property.offset)
                    .with_metadata(self.metadata(&property.metadata)),
            );
            self.report.properties += 1;
        }

        for method in &descriptor.methods {
            if let Some(meta) = self.method(&descriptor.name, method) {
                class.add_method(meta);
                self.report.methods += 1;
            }
        }
        class
    }

    fn enumeration(&mut self, descriptor: &EnumDescriptor) -> MetaEnum {
        let underlying = scalar_type(&descriptor.underlying_type).unwrap_or(VariantType::I32);
        let mut meta = MetaEnum::new(self.name(&descriptor.name), underlying)
            .with_metadata(self.metadata(&descriptor.metadata));
        for field in &descriptor.fields {
            meta.push_constant(EnumConstant {
                name: self.interner.intern(&field.name),
                value: field.value,
                metadata: self.metadata(&field.metadata),
            });
        }
        meta
    }
}

/// Build a registry from descriptors.
///
/// A type declared in more than one file is registered once, from the first
/// file; later declarations are reported as skipped. Fails only when the
/// resulting hierarchy is inconsistent.
pub fn build_registry(
    interner: SharedInterner,
    files: &[FileDescriptor],
) -> Result<(TypeRegistry, MirrorReport), ReflectError> {
    let mut mirror = Mirror {
        interner: &interner,
        declared: AssocMap::new(),
        report: MirrorReport::default(),
    };

    // Types first, so members can refer to types declared later
    let mut units = Vec::new();
    for file in files {
        for unit in &file.units {
            let name = mirror.name(unit.name());
            let kind = match unit {
                UnitDescriptor::Enum(_) => Declared::Enum,
                UnitDescriptor::Class(_) | UnitDescriptor::Struct(_) => Declared::Record,
            };
            if mirror.declared.contains_key(&name) {
                warn!(
                    source = %file.source,
                    "type '{}' declared more than once; keeping the first",
                    unit.name()
                );
                mirror
                    .report
                    .skipped
                    .push(format!("{}: duplicate declaration in {}", unit.name(), file.source));
                continue;
            }
            mirror.declared.insert(name, kind);
            units.push(unit);
        }
    }

    let mut builder = RegistryBuilder::new(interner.clone());
    for unit in units {
        match unit {
            UnitDescriptor::Class(record) => {
                builder.add_class(mirror.record(record, RecordKind::Class));
                mirror.report.classes += 1;
            }
            UnitDescriptor::Struct(record) => {
                builder.add_class(mirror.record(record, RecordKind::Struct));
                mirror.report.classes += 1;
            }
            UnitDescriptor::Enum(enumeration) => {
                builder.add_enum(mirror.enumeration(enumeration));
                mirror.report.enums += 1;
            }
        }
    }

    let report = mirror.report;
    let registry = builder.build()?;
    debug!(
        classes = report.classes,
        enums = report.enums,
        skipped = report.skipped.len(),
        "descriptors mirrored"
    );
    Ok((registry, report))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
