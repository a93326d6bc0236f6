//! Annotation text → validated flags and attributes.
//!
//! ```text
//! ReadOnly, DisplayName="Foo", Range=[0, 10]
//! ^flag     ^attribute          ^attribute (brackets keep the comma)
//! ```

use refl_ir::{AssocSet, Name, StringInterner};
use smallvec::SmallVec;

use crate::schema::{UnitKind, UnitSchema};

/// Flags and attributes kept from one annotation.
#[derive(Clone, Debug, Default)]
pub struct Metadata {
    pub flags: AssocSet<Name>,
    /// Attributes in annotation order; a repeated key keeps the last value.
    pub attributes: Vec<(Name, String)>,
}

impl Metadata {
    pub fn has_flag(&self, flag: Name) -> bool {
        self.flags.contains(&flag)
    }

    pub fn attribute(&self, key: Name) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value.as_str())
    }

    fn set_attribute(&mut self, key: Name, value: String) {
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }
}

/// Split at commas that are outside quotes and brackets.
pub fn split_entries(text: &str) -> SmallVec<[&str; 4]> {
    let mut entries = SmallVec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(text[start..].trim());
    entries.retain(|entry: &mut &str| !entry.is_empty());
    entries
}

/// Value text with one pair of surrounding quotes removed.
fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `annotation` against the schema of `kind`.
///
/// Entries the schema does not support are dropped.
pub fn parse_annotation(
    annotation: &str,
    kind: UnitKind,
    schema: &UnitSchema,
    interner: &StringInterner,
) -> Metadata {
    let mut metadata = Metadata::default();
    for entry in split_entries(annotation) {
        let (key, value) = match entry.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value)),
            None => (entry, None),
        };
        if !is_identifier(key) {
            tracing::trace!(%kind, entry, "dropped malformed annotation entry");
            continue;
        }

        let name = interner.intern(key);
        match value {
            None => match schema.flag(name) {
                Some(flag) => {
                    metadata.flags.add(flag);
                }
                None => tracing::trace!(%kind, flag = key, "dropped unsupported flag"),
            },
            Some(value) => match schema.attribute(name) {
                Some(key) => metadata.set_attribute(key, strip_quotes(value).to_string()),
                None => tracing::trace!(%kind, attribute = key, "dropped unsupported attribute"),
            },
        }
    }
    metadata
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
