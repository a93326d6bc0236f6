//! Reflc - driver for the reflection metadata pipeline
//!
//! Library side of the `reflc` binary:
//!
//! - [`config`]: command-line options and JSON configuration files
//! - [`commands`]: `extract` and `dump` handlers returning exit codes
//! - [`mirror`]: turns extracted descriptors into a runtime
//!   [`TypeRegistry`](refl_runtime::TypeRegistry) backed by dynamic objects
//! - [`logging`]: tracing subscriber setup

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod mirror;

pub use config::{load_config, ExtractOptions};
pub use error::{ConfigError, DescriptorError};
pub use mirror::{build_registry, MirrorReport};
