//! Incremental-state file: when each header was last submitted.
//!
//! ```json
//! {
//!     "engine/actor.h": 1718000000,
//!     "engine/world.h": 1718000042
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::StateError;
use crate::fs::FileSystem;

/// Recorded timestamps keyed by content-relative path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncrementalState {
    entries: BTreeMap<String, u64>,
}

impl IncrementalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the state file.
    ///
    /// A missing file is an empty state. A malformed file is logged and
    /// also treated as empty, so every file is parsed again.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Self {
        match Self::try_load(fs, path) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!("{err}; starting from an empty state");
                Self::default()
            }
        }
    }

    /// Load the state file, reporting malformed content.
    pub fn try_load(fs: &dyn FileSystem, path: &Path) -> Result<Self, StateError> {
        if !fs.file_exists(path) {
            return Ok(Self::default());
        }
        let bytes = fs.read_file_binary(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = serde_json::from_slice(&bytes).map_err(|source| StateError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(IncrementalState { entries })
    }

    /// Write the state pretty-printed with 4-space indentation and sorted
    /// keys.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<(), StateError> {
        let write_error = |source| StateError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs.make_directory_tree(parent).map_err(write_error)?;
        }
        fs.write_file_binary(path, &self.to_json())
            .map_err(write_error)
    }

    /// Serialized form written by [`save`](Self::save).
    pub fn to_json(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        // A string-keyed map of integers always serializes
        if self.entries.serialize(&mut serializer).is_err() {
            out.clear();
        }
        out.push(b'\n');
        out
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries.get(key).copied()
    }

    pub fn stamp(&mut self, key: impl Into<String>, seconds: u64) {
        self.entries.insert(key.into(), seconds);
    }

    /// Whether a file modified at `modified` is already up to date.
    pub fn is_current(&self, key: &str, modified: u64) -> bool {
        self.get(key).is_some_and(|recorded| recorded >= modified)
    }

    /// Drop entries whose key fails `keep`; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| keep(key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
