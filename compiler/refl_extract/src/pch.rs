//! Precompiled-header artifact management.

use std::path::{Path, PathBuf};

use refl_parse::{parse_source, FrontendArgs, ParseMode, TranslationUnit};

use crate::error::PchError;
use crate::fs::FileSystem;

/// Builds and reuses `<generated>/pch/<stem>.pch`.
pub struct PchManager<'a> {
    fs: &'a dyn FileSystem,
    generated_dir: PathBuf,
}

impl<'a> PchManager<'a> {
    pub fn new(fs: &'a dyn FileSystem, generated_dir: impl Into<PathBuf>) -> Self {
        PchManager {
            fs,
            generated_dir: generated_dir.into(),
        }
    }

    /// Artifact path for `header`.
    pub fn output_path(&self, header: &Path) -> PathBuf {
        let stem = header
            .file_stem()
            .map_or_else(|| "prelude".into(), |s| s.to_string_lossy());
        self.generated_dir.join("pch").join(format!("{stem}.pch"))
    }

    /// Artifact is present and strictly newer than the header.
    pub fn is_fresh(&self, header: &Path, artifact: &Path) -> bool {
        if !self.fs.file_exists(artifact) {
            return false;
        }
        match (self.fs.modify_time(artifact), self.fs.modify_time(header)) {
            (Ok(built), Ok(source)) => built > source,
            _ => false,
        }
    }

    /// Artifact reads back as a precompiled header of the current format.
    pub fn is_loadable(&self, artifact: &Path) -> bool {
        let loaded = self
            .fs
            .read_file_binary(artifact)
            .map_err(|err| err.to_string())
            .and_then(|bytes| {
                TranslationUnit::from_bytes(artifact, &bytes).map_err(|err| err.to_string())
            });
        match loaded {
            Ok(_) => true,
            Err(reason) => {
                tracing::debug!(
                    artifact = %artifact.display(),
                    "unreadable precompiled header: {reason}"
                );
                false
            }
        }
    }

    /// Path of an up-to-date artifact for `header`, building it if needed.
    ///
    /// `args` are the front-end arguments every file is parsed with.
    #[tracing::instrument(level = "debug", skip_all, fields(header = %header.display()))]
    pub fn prepare(&self, header: &Path, args: &FrontendArgs) -> Result<PathBuf, PchError> {
        if !self.fs.file_exists(header) {
            return Err(PchError::MissingHeader {
                path: header.to_path_buf(),
            });
        }
        let artifact = self.output_path(header);
        if self.is_fresh(header, &artifact) && self.is_loadable(&artifact) {
            tracing::debug!(artifact = %artifact.display(), "reusing precompiled header");
            return Ok(artifact);
        }

        if let Some(dir) = artifact.parent() {
            self.fs
                .make_directory_tree(dir)
                .map_err(|source| PchError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
        let bytes = self
            .fs
            .read_file_binary(header)
            .map_err(|source| PchError::Read {
                path: header.to_path_buf(),
                source,
            })?;
        let unit = parse_source(
            header,
            &String::from_utf8_lossy(&bytes),
            args,
            ParseMode::ForSerialization,
        )?;
        let blob = unit
            .to_bytes()
            .map_err(|err| PchError::Serialize(err.to_string()))?;
        self.fs
            .write_file_binary(&artifact, &blob)
            .map_err(|source| PchError::Write {
                path: artifact.clone(),
                source,
            })?;
        tracing::debug!(
            artifact = %artifact.display(),
            declarations = unit.root.children.len(),
            "built precompiled header"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
