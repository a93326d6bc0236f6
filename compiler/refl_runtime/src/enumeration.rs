use refl_ir::Name;

use crate::metadata::DisplayMetadata;
use crate::variant::{EnumValue, VariantType};

/// One named constant of a [`MetaEnum`].
#[derive(Clone, Debug)]
pub struct EnumConstant {
    pub name: Name,
    pub value: i64,
    pub metadata: DisplayMetadata,
}

/// Reflected enum. Constants keep declaration order.
#[derive(Clone, Debug)]
pub struct MetaEnum {
    name: Name,
    underlying: VariantType,
    constants: Vec<EnumConstant>,
    metadata: DisplayMetadata,
}

impl MetaEnum {
    pub fn new(name: Name, underlying: VariantType) -> Self {
        MetaEnum {
            name,
            underlying,
            constants: Vec::new(),
            metadata: DisplayMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_constant(mut self, name: Name, value: i64) -> Self {
        self.push_constant(EnumConstant {
            name,
            value,
            metadata: DisplayMetadata::default(),
        });
        self
    }

    pub fn push_constant(&mut self, constant: EnumConstant) {
        self.constants.push(constant);
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: DisplayMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn name(&self) -> Name {
        self.name
    }

    /// Integer type the constants are stored as.
    pub fn underlying(&self) -> VariantType {
        self.underlying
    }

    pub fn constants(&self) -> &[EnumConstant] {
        &self.constants
    }

    pub fn metadata(&self) -> &DisplayMetadata {
        &self.metadata
    }

    pub fn value_of(&self, name: Name) -> Option<i64> {
        self.constants
            .iter()
            .find(|constant| constant.name == name)
            .map(|constant| constant.value)
    }

    /// First constant declared with `value`.
    pub fn name_of(&self, value: i64) -> Option<Name> {
        self.constants
            .iter()
            .find(|constant| constant.value == value)
            .map(|constant| constant.name)
    }

    /// Enum value of the named constant.
    pub fn make_value(&self, name: Name) -> Option<EnumValue> {
        self.value_of(name).map(|value| EnumValue {
            ty: self.name,
            value,
        })
    }
}
