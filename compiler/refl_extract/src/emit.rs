//! JSON descriptors for extracted units.
//!
//! Descriptors carry names as text so they can be read without the
//! interner that produced them.

use std::path::{Component, Path, PathBuf};

use refl_ir::{RecordKind, StringInterner};
use serde::{Deserialize, Serialize};

use crate::annotation::Metadata;
use crate::units::{EnumUnit, FileUnits, MethodUnit, PropertyUnit, RecordUnit, TypeInfo, Unit};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDescriptor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub text: String,
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub is_lvalue_ref: bool,
    #[serde(default)]
    pub is_rvalue_ref: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_len: Option<u64>,
    pub line: u32,
    #[serde(flatten)]
    pub metadata: MetadataDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_const: bool,
    pub return_type: TypeDescriptor,
    pub arguments: Vec<ArgumentDescriptor>,
    pub line: u32,
    #[serde(flatten)]
    pub metadata: MetadataDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    pub name: String,
    pub super_types: Vec<String>,
    pub size: u64,
    pub align: u64,
    pub properties: Vec<PropertyDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub line: u32,
    #[serde(flatten)]
    pub metadata: MetadataDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumFieldDescriptor {
    pub name: String,
    pub value: i64,
    #[serde(flatten)]
    pub metadata: MetadataDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub underlying_type: String,
    #[serde(default)]
    pub scoped: bool,
    pub fields: Vec<EnumFieldDescriptor>,
    pub line: u32,
    #[serde(flatten)]
    pub metadata: MetadataDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitDescriptor {
    Class(RecordDescriptor),
    Struct(RecordDescriptor),
    Enum(EnumDescriptor),
}

impl UnitDescriptor {
    pub fn name(&self) -> &str {
        match self {
            UnitDescriptor::Class(record) | UnitDescriptor::Struct(record) => &record.name,
            UnitDescriptor::Enum(enumeration) => &enumeration.name,
        }
    }
}

/// Every unit of one source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub source: String,
    pub units: Vec<UnitDescriptor>,
}

/// Converts units to descriptors through the interner that named them.
pub struct Describer<'a> {
    interner: &'a StringInterner,
}

impl<'a> Describer<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        Describer { interner }
    }

    fn metadata(&self, metadata: &Metadata) -> MetadataDescriptor {
        MetadataDescriptor {
            flags: metadata
                .flags
                .iter()
                .map(|flag| self.interner.to_string(*flag))
                .collect(),
            attributes: metadata
                .attributes
                .iter()
                .map(|(key, value)| (self.interner.to_string(*key), value.clone()))
                .collect(),
        }
    }

    fn ty(ty: &TypeInfo) -> TypeDescriptor {
        TypeDescriptor {
            text: ty.text.clone(),
            is_const: ty.is_const,
            is_lvalue_ref: ty.is_lvalue_ref,
            is_rvalue_ref: ty.is_rvalue_ref,
        }
    }

    fn property(&self, property: &PropertyUnit) -> PropertyDescriptor {
        PropertyDescriptor {
            name: self.interner.to_string(property.unit.name),
            ty: property.ty.clone(),
            offset: property.byte_offset,
            array_len: property.array_len,
            line: property.unit.location.line,
            metadata: self.metadata(&property.unit.metadata),
        }
    }

    fn method(&self, method: &MethodUnit) -> MethodDescriptor {
        MethodDescriptor {
            name: self.interner.to_string(method.unit.name),
            is_static: method.is_static,
            is_const: method.is_const,
            return_type: Self::ty(&method.return_type),
            arguments: method
                .arguments
                .iter()
                .map(|arg| ArgumentDescriptor {
                    name: arg.name.clone(),
                    ty: Self::ty(&arg.ty),
                })
                .collect(),
            line: method.unit.location.line,
            metadata: self.metadata(&method.unit.metadata),
        }
    }

    pub fn record(&self, record: &RecordUnit) -> UnitDescriptor {
        let descriptor = RecordDescriptor {
            name: self.interner.to_string(record.unit.name),
            super_types: record.super_types.clone(),
            size: record.size,
            align: record.align,
            properties: record.properties.iter().map(|p| self.property(p)).collect(),
            methods: record.methods.iter().map(|m| self.method(m)).collect(),
            line: record.unit.location.line,
            metadata: self.metadata(&record.unit.metadata),
        };
        match record.kind {
            RecordKind::Class => UnitDescriptor::Class(descriptor),
            RecordKind::Struct => UnitDescriptor::Struct(descriptor),
        }
    }

    pub fn enumeration(&self, enumeration: &EnumUnit) -> UnitDescriptor {
        UnitDescriptor::Enum(EnumDescriptor {
            name: self.interner.to_string(enumeration.unit.name),
            underlying_type: enumeration.underlying_type.clone(),
            scoped: enumeration.scoped,
            fields: enumeration
                .fields
                .iter()
                .map(|field| EnumFieldDescriptor {
                    name: self.interner.to_string(field.name),
                    value: field.value,
                    metadata: self.metadata(&field.metadata),
                })
                .collect(),
            line: enumeration.unit.location.line,
            metadata: self.metadata(&enumeration.unit.metadata),
        })
    }

    pub fn unit(&self, unit: &Unit) -> UnitDescriptor {
        match unit {
            Unit::Record(record) => self.record(record),
            Unit::Enum(enumeration) => self.enumeration(enumeration),
        }
    }

    /// Descriptor of a file; `source` is the content-relative path.
    pub fn file(&self, source: &str, units: &FileUnits) -> FileDescriptor {
        FileDescriptor {
            source: source.to_string(),
            units: units.units.iter().map(|u| self.unit(u)).collect(),
        }
    }
}

/// Content-relative key of `path`, with `/` separators.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// `<output>/<key with separators replaced by '_'>.json`.
pub fn descriptor_path(output_dir: &Path, key: &str) -> PathBuf {
    let flat: String = key
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    output_dir.join(format!("{flat}.json"))
}

/// Pretty JSON text of a descriptor.
pub fn to_json(descriptor: &FileDescriptor) -> serde_json::Result<String> {
    serde_json::to_string_pretty(descriptor)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
