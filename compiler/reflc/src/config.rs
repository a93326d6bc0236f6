//! Command-line options and configuration files for `reflc extract`.

use std::path::{Path, PathBuf};

use refl_extract::{ExtractorConfig, StampPolicy};

use crate::error::ConfigError;

/// Options of one `extract` invocation.
///
/// Anything left unset falls back to the configuration file, then to
/// [`ExtractorConfig::default`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Content root given as a positional argument.
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub generated_dir: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub pch_header: Option<PathBuf>,
    pub include_dirs: Vec<PathBuf>,
    pub no_parallel: bool,
    pub stamp_on_success: bool,
    /// Mirror the parsed units into a runtime registry after the run.
    pub register: bool,
    pub verbose: bool,
}

fn path_value(option: &str, value: &str) -> Result<PathBuf, ConfigError> {
    if value.is_empty() {
        Err(ConfigError::MissingValue(option.to_owned()))
    } else {
        Ok(PathBuf::from(value))
    }
}

impl ExtractOptions {
    /// Parse the arguments following `extract`.
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let mut options = ExtractOptions::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if let Some(value) = arg.strip_prefix("--config=") {
                options.config = Some(path_value("--config", value)?);
            } else if let Some(value) = arg.strip_prefix("--out=") {
                options.output_dir = Some(path_value("--out", value)?);
            } else if let Some(value) = arg.strip_prefix("--generated=") {
                options.generated_dir = Some(path_value("--generated", value)?);
            } else if let Some(value) = arg.strip_prefix("--state=") {
                options.state_file = Some(path_value("--state", value)?);
            } else if let Some(value) = arg.strip_prefix("--pch=") {
                options.pch_header = Some(path_value("--pch", value)?);
            } else if arg == "-I" {
                let dir = iter
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue("-I".to_owned()))?;
                options.include_dirs.push(PathBuf::from(dir));
            } else if let Some(dir) = arg.strip_prefix("-I") {
                options.include_dirs.push(PathBuf::from(dir));
            } else if arg == "--no-parallel" {
                options.no_parallel = true;
            } else if arg == "--stamp-on-success" {
                options.stamp_on_success = true;
            } else if arg == "--register" {
                options.register = true;
            } else if arg == "-v" || arg == "--verbose" {
                options.verbose = true;
            } else if arg.starts_with('-') {
                return Err(ConfigError::UnknownOption(arg.clone()));
            } else if options.root.is_none() {
                options.root = Some(PathBuf::from(arg));
            } else {
                return Err(ConfigError::UnexpectedArgument(arg.clone()));
            }
        }
        Ok(options)
    }

    /// Configuration file (or defaults) with these options applied on top.
    pub fn resolve(&self) -> Result<ExtractorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ExtractorConfig::default(),
        };

        if let Some(root) = &self.root {
            config.content_root.clone_from(root);
        }
        if let Some(dir) = &self.generated_dir {
            config.generated_dir.clone_from(dir);
        }
        if self.output_dir.is_some() {
            config.output_dir.clone_from(&self.output_dir);
        }
        if self.state_file.is_some() {
            config.state_file.clone_from(&self.state_file);
        }
        if self.pch_header.is_some() {
            config.pch_header.clone_from(&self.pch_header);
        }
        config.include_dirs.extend(self.include_dirs.iter().cloned());
        if self.no_parallel {
            config.parallel = false;
        }
        if self.stamp_on_success {
            config.stamp_policy = StampPolicy::OnSuccess;
        }
        Ok(config)
    }
}

/// Load a JSON configuration file.
///
/// Relative paths inside the file are taken relative to the file's own
/// directory.
pub fn load_config(path: &Path) -> Result<ExtractorConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = ExtractorConfig::from_json(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or(Path::new(""));
    let anchor = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };
    anchor(&mut config.content_root);
    anchor(&mut config.generated_dir);
    config.output_dir.iter_mut().for_each(anchor);
    config.state_file.iter_mut().for_each(anchor);
    config.pch_header.iter_mut().for_each(anchor);
    config.include_dirs.iter_mut().for_each(anchor);

    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
