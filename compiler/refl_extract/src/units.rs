//! Metadata units produced by walking one translation unit.
//!
//! Units are built once per annotated declaration and are not modified
//! after the walk that created them.

use std::path::PathBuf;

use refl_ir::{Name, RecordKind, SourceLocation};

use crate::annotation::Metadata;

/// Fields shared by every unit.
#[derive(Clone, Debug)]
pub struct MetadataUnit {
    pub location: SourceLocation,
    pub file_path: PathBuf,
    pub name: Name,
    pub metadata: Metadata,
}

/// Type as written on a method signature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub text: String,
    pub is_const: bool,
    pub is_lvalue_ref: bool,
    pub is_rvalue_ref: bool,
}

impl TypeInfo {
    pub(crate) fn from_type(ty: &refl_parse::TypeRef) -> Self {
        TypeInfo {
            text: ty.spelling.clone(),
            is_const: ty.is_const,
            is_lvalue_ref: ty.is_lvalue_ref,
            is_rvalue_ref: ty.is_rvalue_ref,
        }
    }
}

/// Method argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub ty: TypeInfo,
}

/// Annotated data member.
#[derive(Clone, Debug)]
pub struct PropertyUnit {
    pub unit: MetadataUnit,
    /// Base type spelling without qualifiers.
    pub ty: String,
    pub byte_offset: u64,
    /// Element count for array members.
    pub array_len: Option<u64>,
}

/// Annotated member function.
#[derive(Clone, Debug)]
pub struct MethodUnit {
    pub unit: MetadataUnit,
    pub is_static: bool,
    pub is_const: bool,
    pub return_type: TypeInfo,
    pub arguments: Vec<Argument>,
}

/// Annotated class or struct.
#[derive(Clone, Debug)]
pub struct RecordUnit {
    pub unit: MetadataUnit,
    pub kind: RecordKind,
    /// Base-class spellings in declaration order.
    pub super_types: Vec<String>,
    pub properties: Vec<PropertyUnit>,
    pub methods: Vec<MethodUnit>,
    pub size: u64,
    pub align: u64,
}

impl RecordUnit {
    pub fn property(&self, name: Name) -> Option<&PropertyUnit> {
        self.properties.iter().find(|p| p.unit.name == name)
    }

    pub fn method(&self, name: Name) -> Option<&MethodUnit> {
        self.methods.iter().find(|m| m.unit.name == name)
    }
}

/// One enumerator.
#[derive(Clone, Debug)]
pub struct EnumField {
    pub name: Name,
    pub value: i64,
    pub metadata: Metadata,
}

/// Annotated enumeration.
#[derive(Clone, Debug)]
pub struct EnumUnit {
    pub unit: MetadataUnit,
    pub underlying_type: String,
    pub scoped: bool,
    pub fields: Vec<EnumField>,
}

/// Top-level unit of a file.
#[derive(Clone, Debug)]
pub enum Unit {
    Record(RecordUnit),
    Enum(EnumUnit),
}

impl Unit {
    pub fn unit(&self) -> &MetadataUnit {
        match self {
            Unit::Record(record) => &record.unit,
            Unit::Enum(enumeration) => &enumeration.unit,
        }
    }

    pub fn name(&self) -> Name {
        self.unit().name
    }

    pub fn as_record(&self) -> Option<&RecordUnit> {
        match self {
            Unit::Record(record) => Some(record),
            Unit::Enum(_) => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumUnit> {
        match self {
            Unit::Enum(enumeration) => Some(enumeration),
            Unit::Record(_) => None,
        }
    }
}

/// Units extracted from one file, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FileUnits {
    pub path: PathBuf,
    pub units: Vec<Unit>,
}

impl FileUnits {
    pub fn find(&self, name: Name) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.name() == name)
    }
}
