//! Extractor configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// When a changed file's timestamp is recorded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampPolicy {
    /// When the file is queued; a failed parse is not retried next run.
    #[default]
    OnSubmit,
    /// After a successful parse; failed files are retried next run.
    OnSuccess,
}

/// Settings for one extraction run.
///
/// Every field has a default, so a configuration file only needs the
/// entries it changes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Directory scanned for headers.
    pub content_root: PathBuf,
    /// Directory for generated artifacts (precompiled header, state).
    pub generated_dir: PathBuf,
    /// Directory for JSON descriptors; no descriptors when unset.
    pub output_dir: Option<PathBuf>,
    /// Incremental-state file; `<generated_dir>/refl_state.json` when unset.
    pub state_file: Option<PathBuf>,
    /// Header precompiled once and included before every file.
    pub pch_header: Option<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    /// Header extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub parallel: bool,
    pub stamp_policy: StampPolicy,
    /// Flags accepted on every unit kind in addition to the built-in ones.
    pub extra_flags: Vec<String>,
    /// Attribute keys accepted on every unit kind.
    pub extra_attributes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            content_root: PathBuf::from("."),
            generated_dir: PathBuf::from("generated"),
            output_dir: None,
            state_file: None,
            pch_header: None,
            include_dirs: Vec::new(),
            extensions: ["h", "hh", "hpp", "hxx"].map(String::from).to_vec(),
            recursive: true,
            parallel: true,
            stamp_policy: StampPolicy::OnSubmit,
            extra_flags: Vec::new(),
            extra_attributes: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| self.generated_dir.join("refl_state.json"))
    }

    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
