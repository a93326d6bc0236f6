//! Error types for the extraction pipeline.

use std::io;
use std::path::PathBuf;

use refl_parse::FrontendError;

/// Failure to prepare the precompiled header.
///
/// Never fatal: the run continues without a precompiled header.
#[derive(Debug, thiserror::Error)]
pub enum PchError {
    #[error("precompiled header source '{}' does not exist", path.display())]
    MissingHeader { path: PathBuf },

    #[error("cannot create directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] FrontendError),

    #[error("cannot serialize precompiled header: {0}")]
    Serialize(String),

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to read or write the incremental-state file.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cannot read state file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed state file '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write state file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fatal extraction failure.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("cannot enumerate content root '{}': {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single file produced no units.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Frontend(#[from] FrontendError),
}
