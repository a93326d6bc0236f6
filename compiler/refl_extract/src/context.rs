//! State shared by every parse task of a run.

use std::path::Path;

use refl_ir::{AssocSet, Name, SharedInterner};

use crate::config::ExtractorConfig;
use crate::schema::Schemas;

/// Interner, schemas and configuration for one extraction run.
///
/// Parse tasks borrow the context; all names they produce come from the
/// same interner and compare across files.
pub struct ExtractContext {
    pub interner: SharedInterner,
    pub schemas: Schemas,
    pub config: ExtractorConfig,
    extensions: AssocSet<Name>,
}

impl ExtractContext {
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_interner(config, SharedInterner::new())
    }

    pub fn with_interner(config: ExtractorConfig, interner: SharedInterner) -> Self {
        let mut schemas = Schemas::builtin(&interner);
        schemas.extend_all(&interner, &config.extra_flags, &config.extra_attributes);
        let extensions = config
            .extensions
            .iter()
            .map(|ext| interner.intern(ext.trim_start_matches('.')))
            .collect();
        ExtractContext {
            interner,
            schemas,
            config,
            extensions,
        }
    }

    /// Whether `path` has one of the declared header extensions.
    pub fn is_header(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.interner.find(ext))
            .is_some_and(|ext| self.extensions.contains(&ext))
    }
}
