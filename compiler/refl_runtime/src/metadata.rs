use refl_ir::{AssocSet, Name};

/// Display flags and attributes attached to a reflected type or member.
#[derive(Clone, Debug, Default)]
pub struct DisplayMetadata {
    flags: AssocSet<Name>,
    attributes: Vec<(Name, String)>,
}

impl DisplayMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_flag(&self, flag: Name) -> bool {
        self.flags.contains(&flag)
    }

    pub fn add_flag(&mut self, flag: Name) {
        self.flags.add(flag);
    }

    pub fn attribute(&self, key: Name) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute; an existing key keeps its position.
    pub fn set_attribute(&mut self, key: Name, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn flags(&self) -> impl Iterator<Item = Name> + '_ {
        self.flags.iter().copied()
    }

    pub fn attributes(&self) -> &[(Name, String)] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.attributes.is_empty()
    }
}
