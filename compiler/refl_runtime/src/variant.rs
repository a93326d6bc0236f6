//! Type-erased values.
//!
//! A [`Variant`] carries its own type tag. Every typed read checks the tag
//! and yields `None` on mismatch; nothing is ever reinterpreted.

use std::fmt;

use refl_ir::{Name, StringLookup};

use crate::object::ObjectRef;

/// Value of a reflected enum: the enum's name plus the constant's value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: Name,
    pub value: i64,
}

/// Type tag of a [`Variant`].
///
/// Enum and object tags carry the declared type name, so two tags match
/// only for the same enum or class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum VariantType {
    #[default]
    Invalid,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Name,
    Enum(Name),
    Object(Name),
}

impl VariantType {
    /// Zero value of this type.
    ///
    /// Object types have no zero value and yield an invalid variant.
    pub fn default_value(self) -> Variant {
        match self {
            VariantType::Invalid | VariantType::Object(_) => Variant::Invalid,
            VariantType::Bool => Variant::Bool(false),
            VariantType::I8 => Variant::I8(0),
            VariantType::I16 => Variant::I16(0),
            VariantType::I32 => Variant::I32(0),
            VariantType::I64 => Variant::I64(0),
            VariantType::U8 => Variant::U8(0),
            VariantType::U16 => Variant::U16(0),
            VariantType::U32 => Variant::U32(0),
            VariantType::U64 => Variant::U64(0),
            VariantType::F32 => Variant::F32(0.0),
            VariantType::F64 => Variant::F64(0.0),
            VariantType::String => Variant::String(String::new()),
            VariantType::Name => Variant::Name(Name::NONE),
            VariantType::Enum(ty) => Variant::Enum(EnumValue { ty, value: 0 }),
        }
    }

    /// Keyword for scalar tags.
    pub const fn keyword(self) -> &'static str {
        match self {
            VariantType::Invalid => "invalid",
            VariantType::Bool => "bool",
            VariantType::I8 => "int8",
            VariantType::I16 => "int16",
            VariantType::I32 => "int32",
            VariantType::I64 => "int64",
            VariantType::U8 => "uint8",
            VariantType::U16 => "uint16",
            VariantType::U32 => "uint32",
            VariantType::U64 => "uint64",
            VariantType::F32 => "float",
            VariantType::F64 => "double",
            VariantType::String => "string",
            VariantType::Name => "name",
            VariantType::Enum(_) => "enum",
            VariantType::Object(_) => "object",
        }
    }

    /// Human-readable rendering, resolving enum and class names.
    pub fn describe<L: StringLookup + ?Sized>(self, lookup: &L) -> String {
        match self {
            VariantType::Enum(name) => format!("enum {}", name.display(lookup)),
            VariantType::Object(name) => format!("object {}", name.display(lookup)),
            scalar => scalar.keyword().to_owned(),
        }
    }
}

/// Tagged, type-erased value.
#[derive(Clone, Debug, Default)]
pub enum Variant {
    #[default]
    Invalid,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Name(Name),
    Enum(EnumValue),
    /// Handle to a live instance; clones share the instance.
    Object(ObjectRef),
}

impl Variant {
    /// Returns `true` for anything but [`Variant::Invalid`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Variant::Invalid)
    }

    /// Type tag of the held value.
    pub fn ty(&self) -> VariantType {
        match self {
            Variant::Invalid => VariantType::Invalid,
            Variant::Bool(_) => VariantType::Bool,
            Variant::I8(_) => VariantType::I8,
            Variant::I16(_) => VariantType::I16,
            Variant::I32(_) => VariantType::I32,
            Variant::I64(_) => VariantType::I64,
            Variant::U8(_) => VariantType::U8,
            Variant::U16(_) => VariantType::U16,
            Variant::U32(_) => VariantType::U32,
            Variant::U64(_) => VariantType::U64,
            Variant::F32(_) => VariantType::F32,
            Variant::F64(_) => VariantType::F64,
            Variant::String(_) => VariantType::String,
            Variant::Name(_) => VariantType::Name,
            Variant::Enum(value) => VariantType::Enum(value.ty),
            Variant::Object(object) => VariantType::Object(object.class()),
        }
    }

    /// Typed copy of the value, or `None` if the tag differs.
    #[inline]
    pub fn get<T: VariantValue>(&self) -> Option<T> {
        T::from_variant(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Variant::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            Variant::Enum(value) => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Invalid, Variant::Invalid) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::I8(a), Variant::I8(b)) => a == b,
            (Variant::I16(a), Variant::I16(b)) => a == b,
            (Variant::I32(a), Variant::I32(b)) => a == b,
            (Variant::I64(a), Variant::I64(b)) => a == b,
            (Variant::U8(a), Variant::U8(b)) => a == b,
            (Variant::U16(a), Variant::U16(b)) => a == b,
            (Variant::U32(a), Variant::U32(b)) => a == b,
            (Variant::U64(a), Variant::U64(b)) => a == b,
            (Variant::F32(a), Variant::F32(b)) => a == b,
            (Variant::F64(a), Variant::F64(b)) => a == b,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Name(a), Variant::Name(b)) => a == b,
            (Variant::Enum(a), Variant::Enum(b)) => a == b,
            // Identity, not structural equality
            (Variant::Object(a), Variant::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Invalid => f.write_str("<invalid>"),
            Variant::Bool(v) => write!(f, "{v}"),
            Variant::I8(v) => write!(f, "{v}"),
            Variant::I16(v) => write!(f, "{v}"),
            Variant::I32(v) => write!(f, "{v}"),
            Variant::I64(v) => write!(f, "{v}"),
            Variant::U8(v) => write!(f, "{v}"),
            Variant::U16(v) => write!(f, "{v}"),
            Variant::U32(v) => write!(f, "{v}"),
            Variant::U64(v) => write!(f, "{v}"),
            Variant::F32(v) => write!(f, "{v}"),
            Variant::F64(v) => write!(f, "{v}"),
            Variant::String(v) => write!(f, "{v:?}"),
            Variant::Name(v) => write!(f, "{v:?}"),
            Variant::Enum(v) => write!(f, "{}", v.value),
            Variant::Object(v) => write!(f, "{v:?}"),
        }
    }
}

/// Rust types with a fixed [`VariantType`] tag.
pub trait VariantValue: Sized {
    const TYPE: VariantType;

    fn into_variant(self) -> Variant;

    fn from_variant(value: &Variant) -> Option<Self>;
}

macro_rules! copy_variant_value {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl VariantValue for $ty {
                const TYPE: VariantType = VariantType::$tag;

                #[inline]
                fn into_variant(self) -> Variant {
                    Variant::$tag(self)
                }

                #[inline]
                fn from_variant(value: &Variant) -> Option<Self> {
                    match value {
                        Variant::$tag(v) => Some(*v),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Variant {
                #[inline]
                fn from(value: $ty) -> Self {
                    Variant::$tag(value)
                }
            }
        )*
    };
}

copy_variant_value! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Name => Name,
}

impl VariantValue for String {
    const TYPE: VariantType = VariantType::String;

    fn into_variant(self) -> Variant {
        Variant::String(self)
    }

    fn from_variant(value: &Variant) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl From<EnumValue> for Variant {
    fn from(value: EnumValue) -> Self {
        Variant::Enum(value)
    }
}

impl From<ObjectRef> for Variant {
    fn from(value: ObjectRef) -> Self {
        Variant::Object(value)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
