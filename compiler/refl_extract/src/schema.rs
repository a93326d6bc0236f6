//! Flags and attribute keys each kind of unit accepts.

use std::fmt;

use refl_ir::{AssocSet, Name, StringInterner};

/// Kind of metadata unit an annotation is attached to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Class,
    Struct,
    Enum,
    EnumField,
    Property,
    Method,
}

impl UnitKind {
    pub const ALL: [UnitKind; 6] = [
        UnitKind::Class,
        UnitKind::Struct,
        UnitKind::Enum,
        UnitKind::EnumField,
        UnitKind::Property,
        UnitKind::Method,
    ];

    const fn slot(self) -> usize {
        match self {
            UnitKind::Class => 0,
            UnitKind::Struct => 1,
            UnitKind::Enum => 2,
            UnitKind::EnumField => 3,
            UnitKind::Property => 4,
            UnitKind::Method => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UnitKind::Class => "class",
            UnitKind::Struct => "struct",
            UnitKind::Enum => "enum",
            UnitKind::EnumField => "enum field",
            UnitKind::Property => "property",
            UnitKind::Method => "method",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DESCRIPTIVE: &[&str] = &["DisplayName", "Category", "Tooltip"];

/// Supported flags and attribute keys of one unit kind.
#[derive(Clone, Debug, Default)]
pub struct UnitSchema {
    flags: AssocSet<Name>,
    attributes: AssocSet<Name>,
}

impl UnitSchema {
    pub fn new(interner: &StringInterner, flags: &[&str], attributes: &[&str]) -> Self {
        let mut schema = UnitSchema::default();
        for flag in flags {
            schema.add_flag(interner.intern(flag));
        }
        for key in attributes {
            schema.add_attribute(interner.intern(key));
        }
        schema
    }

    pub fn add_flag(&mut self, flag: Name) {
        self.flags.add(flag);
    }

    pub fn add_attribute(&mut self, key: Name) {
        self.attributes.add(key);
    }

    /// Schema's own spelling of `flag`, if supported.
    pub fn flag(&self, flag: Name) -> Option<Name> {
        self.flags.find(&flag).copied()
    }

    /// Schema's own spelling of attribute `key`, if supported.
    pub fn attribute(&self, key: Name) -> Option<Name> {
        self.attributes.find(&key).copied()
    }

    pub fn flags(&self) -> impl Iterator<Item = Name> + '_ {
        self.flags.iter().copied()
    }

    pub fn attributes(&self) -> impl Iterator<Item = Name> + '_ {
        self.attributes.iter().copied()
    }
}

/// One [`UnitSchema`] per [`UnitKind`].
#[derive(Clone, Debug)]
pub struct Schemas {
    kinds: [UnitSchema; 6],
}

impl Schemas {
    /// Built-in flag and attribute sets.
    pub fn builtin(interner: &StringInterner) -> Self {
        let with = |extra: &[&'static str]| -> Vec<&'static str> {
            DESCRIPTIVE.iter().chain(extra).copied().collect()
        };
        let schema = |flags: &[&str], attributes: &[&str]| UnitSchema::new(interner, flags, attributes);
        Schemas {
            kinds: [
                schema(&["Abstract", "Hidden", "Serializable", "Placeable"], &with(&["Icon"])),
                schema(&["Hidden", "Serializable", "Atomic"], &with(&[])),
                schema(&["Flags", "Hidden"], &with(&[])),
                schema(&["Hidden"], &["DisplayName", "Tooltip"]),
                schema(
                    &["ReadOnly", "Hidden", "Transient", "Serializable"],
                    &with(&["Min", "Max", "Step"]),
                ),
                schema(&["Callable", "Pure", "Hidden"], &with(&[])),
            ],
        }
    }

    pub fn get(&self, kind: UnitKind) -> &UnitSchema {
        &self.kinds[kind.slot()]
    }

    pub fn get_mut(&mut self, kind: UnitKind) -> &mut UnitSchema {
        &mut self.kinds[kind.slot()]
    }

    /// Accept `flags` and attribute `keys` on every unit kind.
    pub fn extend_all(&mut self, interner: &StringInterner, flags: &[String], keys: &[String]) {
        for schema in &mut self.kinds {
            for flag in flags {
                schema.add_flag(interner.intern(flag));
            }
            for key in keys {
                schema.add_attribute(interner.intern(key));
            }
        }
    }
}
