//! The extraction pipeline.
//!
//! ```text
//! Idle → Scanning → Parsing (skip or parse per file) → Aggregating → Done
//! ```
//!
//! Scanning lists headers under the content root and consults the
//! incremental state; changed files are parsed in parallel; results are
//! merged by path, descriptors are written and the state is saved.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use refl_parse::{parse_source, FrontendArgs, ParseMode, Severity};

use crate::config::{ExtractorConfig, StampPolicy};
use crate::context::ExtractContext;
use crate::emit::{descriptor_path, relative_key, to_json, Describer};
use crate::error::{ExtractError, FileError};
use crate::fs::{now_seconds, DiskFileSystem, FileSystem};
use crate::pch::PchManager;
use crate::state::IncrementalState;
use crate::units::FileUnits;
use crate::walk::extract_units;

/// Where a run currently is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExtractPhase {
    #[default]
    Idle,
    Scanning,
    Parsing,
    Aggregating,
    Done,
}

impl fmt::Display for ExtractPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractPhase::Idle => "idle",
            ExtractPhase::Scanning => "scanning",
            ExtractPhase::Parsing => "parsing",
            ExtractPhase::Aggregating => "aggregating",
            ExtractPhase::Done => "done",
        })
    }
}

fn enter(phase: &mut ExtractPhase, next: ExtractPhase) {
    tracing::debug!(from = %phase, to = %next, "extract phase");
    *phase = next;
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Headers found under the content root.
    pub scanned: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Top-level units across all parsed files.
    pub units: usize,
    pub descriptors_written: usize,
    pub descriptor_failures: usize,
    /// Precompiled header used for the run.
    pub pch: Option<PathBuf>,
    /// Units of every successfully parsed file, by path.
    pub files: BTreeMap<PathBuf, FileUnits>,
    /// Files that produced no units, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl ExtractReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.descriptor_failures > 0
    }
}

impl fmt::Display for ExtractReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} scanned, {} parsed, {} skipped, {} failed, {} units",
            self.scanned, self.parsed, self.skipped, self.failed, self.units
        )
    }
}

struct Task {
    path: PathBuf,
    key: String,
}

/// Runs extraction over a content root.
pub struct Extractor<F: FileSystem = DiskFileSystem> {
    ctx: ExtractContext,
    fs: F,
    phase: ExtractPhase,
}

impl Extractor<DiskFileSystem> {
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_fs(ExtractContext::new(config), DiskFileSystem)
    }
}

impl<F: FileSystem> Extractor<F> {
    pub fn with_fs(ctx: ExtractContext, fs: F) -> Self {
        Extractor {
            ctx,
            fs,
            phase: ExtractPhase::Idle,
        }
    }

    pub fn context(&self) -> &ExtractContext {
        &self.ctx
    }

    pub fn phase(&self) -> ExtractPhase {
        self.phase
    }

    /// Run the whole pipeline once.
    ///
    /// Only a content root that cannot be listed is an error; per-file
    /// failures, precompiled-header problems and write failures are logged
    /// and reported.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(root = %self.ctx.config.content_root.display())
    )]
    pub fn run(&mut self) -> Result<ExtractReport, ExtractError> {
        let Extractor { ctx, fs, phase } = self;
        let ctx: &ExtractContext = ctx;
        let fs: &dyn FileSystem = &*fs;
        let config = &ctx.config;
        let mut report = ExtractReport::default();

        enter(phase, ExtractPhase::Scanning);
        let root = &config.content_root;
        let files = fs
            .enumerate_files(root, &|path: &Path| ctx.is_header(path), config.recursive)
            .map_err(|source| ExtractError::Enumerate {
                root: root.clone(),
                source,
            })?;
        report.scanned = files.len();

        let state_path = config.state_path();
        let mut state = IncrementalState::load(fs, &state_path);

        let mut args = FrontendArgs::extraction(&config.include_dirs);
        if let Some(header) = &config.pch_header {
            let manager = PchManager::new(fs, &config.generated_dir);
            match manager.prepare(header, &args) {
                Ok(artifact) if manager.is_loadable(&artifact) => {
                    args = args.with_pch(&artifact);
                    report.pch = Some(artifact);
                }
                Ok(artifact) => {
                    tracing::error!(
                        "precompiled header disabled: '{}' cannot be loaded",
                        artifact.display()
                    );
                }
                Err(err) => {
                    tracing::error!("precompiled header disabled: {err}");
                }
            }
        }

        let now = now_seconds();
        let mut queue = Vec::new();
        let mut scanned = BTreeSet::new();
        for path in files {
            let key = relative_key(root, &path);
            scanned.insert(key.clone());
            let modified = fs.modify_time(&path).ok();
            if modified.is_some_and(|modified| state.is_current(&key, modified)) {
                tracing::debug!(file = %key, "skip: unchanged");
                report.skipped += 1;
                continue;
            }
            tracing::debug!(file = %key, "parse");
            if config.stamp_policy == StampPolicy::OnSubmit {
                state.stamp(key.as_str(), now);
            }
            queue.push(Task { path, key });
        }

        enter(phase, ExtractPhase::Parsing);
        let results = parse_all(ctx, fs, &args, &queue);

        enter(phase, ExtractPhase::Aggregating);
        let output_dir = config
            .output_dir
            .as_deref()
            .filter(|dir| match fs.make_directory_tree(dir) {
                Ok(()) => true,
                Err(err) => {
                    tracing::error!(
                        "cannot create output directory '{}': {err}; descriptors disabled",
                        dir.display()
                    );
                    false
                }
            });
        let describer = Describer::new(&ctx.interner);

        for (task, result) in queue.iter().zip(results) {
            match result {
                Ok(units) => {
                    report.parsed += 1;
                    report.units += units.units.len();
                    if config.stamp_policy == StampPolicy::OnSuccess {
                        state.stamp(task.key.as_str(), now);
                    }
                    if let Some(dir) = output_dir {
                        let descriptor = describer.file(&task.key, &units);
                        match write_descriptor(fs, &descriptor_path(dir, &task.key), &descriptor) {
                            Ok(()) => report.descriptors_written += 1,
                            Err(err) => {
                                tracing::warn!(file = %task.key, "cannot write descriptor: {err}");
                                report.descriptor_failures += 1;
                            }
                        }
                    }
                    report.files.insert(task.path.clone(), units);
                }
                Err(err) => {
                    tracing::warn!(file = %task.key, "{err}");
                    report.failed += 1;
                    report.failures.push((task.path.clone(), err.to_string()));
                }
            }
        }

        let removed = state.retain(|key| scanned.contains(key));
        if removed > 0 {
            tracing::debug!(removed, "dropped state entries for deleted headers");
        }
        if let Err(err) = state.save(fs, &state_path) {
            tracing::error!("{err}");
        }
        enter(phase, ExtractPhase::Done);
        tracing::debug!(%report, "extraction finished");
        Ok(report)
    }
}

fn write_descriptor(
    fs: &dyn FileSystem,
    path: &Path,
    descriptor: &crate::emit::FileDescriptor,
) -> Result<(), String> {
    let json = to_json(descriptor).map_err(|err| err.to_string())?;
    fs.write_file_binary(path, json.as_bytes())
        .map_err(|err| err.to_string())
}

/// Parse every queued file, in parallel unless disabled.
///
/// Results are in queue order regardless of completion order.
fn parse_all(
    ctx: &ExtractContext,
    fs: &dyn FileSystem,
    args: &FrontendArgs,
    queue: &[Task],
) -> Vec<Result<FileUnits, FileError>> {
    let parse = |task: &Task| parse_file(ctx, fs, args, &task.path);
    if !ctx.config.parallel || queue.len() <= 1 {
        return queue.iter().map(parse).collect();
    }

    rayon::ThreadPoolBuilder::new()
        .build_scoped(rayon::ThreadBuilder::run, |pool| {
            pool.install(|| queue.par_iter().map(parse).collect::<Vec<_>>())
        })
        .unwrap_or_else(|err| {
            tracing::warn!("failed to create thread pool ({err}), parsing sequentially");
            queue.iter().map(parse).collect()
        })
}

/// Parse one header and extract its units.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn parse_file(
    ctx: &ExtractContext,
    fs: &dyn FileSystem,
    args: &FrontendArgs,
    path: &Path,
) -> Result<FileUnits, FileError> {
    let bytes = fs.read_file_binary(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let unit = parse_source(
        path,
        &String::from_utf8_lossy(&bytes),
        args,
        ParseMode::Normal,
    )?;
    for diagnostic in &unit.diagnostics {
        if diagnostic.severity == Severity::Error {
            tracing::warn!(file = %path.display(), "{diagnostic}");
        }
    }
    Ok(FileUnits {
        path: path.to_path_buf(),
        units: extract_units(ctx, path, &unit),
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
