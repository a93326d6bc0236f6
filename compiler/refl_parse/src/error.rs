//! Fatal front-end errors.
//!
//! Anything reported here means no translation unit was produced.
//! Recoverable problems become [`Diagnostic`](crate::Diagnostic)s on the
//! unit instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that prevent a translation unit from being built.
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: unterminated block comment", path.display())]
    UnterminatedComment { path: PathBuf, line: u32 },

    #[error("{}:{line}: unterminated {what} literal", path.display())]
    UnterminatedLiteral {
        path: PathBuf,
        line: u32,
        what: &'static str,
    },

    #[error("{}:{line}: {message}", path.display())]
    UnbalancedConditional {
        path: PathBuf,
        line: u32,
        message: &'static str,
    },

    #[error("precompiled header '{}' is unusable: {reason}", path.display())]
    Pch { path: PathBuf, reason: String },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FrontendError {
    /// Path of the file the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FrontendError::Read { path, .. }
            | FrontendError::UnterminatedComment { path, .. }
            | FrontendError::UnterminatedLiteral { path, .. }
            | FrontendError::UnbalancedConditional { path, .. }
            | FrontendError::Pch { path, .. }
            | FrontendError::Write { path, .. } => path,
        }
    }
}
