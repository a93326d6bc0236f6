//! Front-end argument vectors.
//!
//! Arguments are kept as the plain strings a compiler driver would see, so
//! they can be logged and compared verbatim. [`FrontendArgs::options`]
//! interprets them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Macro name defined for every extraction parse.
pub const PARSER_MACRO: &str = "__REFLECTION_PARSER__";

/// Ordered list of front-end arguments.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FrontendArgs {
    args: Vec<String>,
}

impl FrontendArgs {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments used for every extraction parse:
    /// `-x c++ -std=c++20 -D__REFLECTION_PARSER__ -I<dir>…`.
    pub fn extraction<I, P>(include_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut args = vec![
            "-x".to_string(),
            "c++".to_string(),
            "-std=c++20".to_string(),
            format!("-D{PARSER_MACRO}"),
        ];
        args.extend(
            include_dirs
                .into_iter()
                .map(|dir| format!("-I{}", dir.as_ref().display())),
        );
        FrontendArgs { args }
    }

    /// Same arguments with `-include-pch <path>` appended.
    #[must_use]
    pub fn with_pch(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push("-include-pch".to_string());
        self.args.push(path.as_ref().display().to_string());
        self
    }

    /// Append one raw argument.
    pub fn push(&mut self, arg: impl Into<String>) {
        self.args.push(arg.into());
    }

    /// Raw argument strings.
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Interpret the argument vector.
    pub fn options(&self) -> FrontendOptions {
        let mut options = FrontendOptions::default();
        let mut iter = self.args.iter();

        while let Some(arg) = iter.next() {
            if arg == "-x" {
                if let Some(lang) = iter.next() {
                    options.language.clone_from(lang);
                }
            } else if let Some(lang) = arg.strip_prefix("-x") {
                options.language = lang.to_string();
            } else if let Some(std) = arg.strip_prefix("-std=") {
                options.dialect = std.to_string();
            } else if arg == "-include-pch" {
                options.pch = iter.next().map(PathBuf::from);
            } else if arg == "-D" {
                if let Some(def) = iter.next() {
                    options.macros.push(MacroOp::parse_define(def));
                }
            } else if let Some(def) = arg.strip_prefix("-D") {
                options.macros.push(MacroOp::parse_define(def));
            } else if arg == "-U" {
                if let Some(name) = iter.next() {
                    options.macros.push(MacroOp::Undef(name.clone()));
                }
            } else if let Some(name) = arg.strip_prefix("-U") {
                options.macros.push(MacroOp::Undef(name.to_string()));
            } else if arg == "-I" {
                if let Some(dir) = iter.next() {
                    options.include_dirs.push(PathBuf::from(dir));
                }
            } else if let Some(dir) = arg.strip_prefix("-I") {
                options.include_dirs.push(PathBuf::from(dir));
            } else {
                options.ignored.push(arg.clone());
            }
        }

        options
    }
}

impl fmt::Debug for FrontendArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.args).finish()
    }
}

impl fmt::Display for FrontendArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.args.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for FrontendArgs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FrontendArgs {
            args: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Command-line macro definition or removal, applied in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MacroOp {
    Define { name: String, value: String },
    Undef(String),
}

impl MacroOp {
    /// `NAME` defines `NAME` as `1`; `NAME=value` as `value`.
    fn parse_define(def: &str) -> Self {
        match def.split_once('=') {
            Some((name, value)) => MacroOp::Define {
                name: name.to_string(),
                value: value.to_string(),
            },
            None => MacroOp::Define {
                name: def.to_string(),
                value: "1".to_string(),
            },
        }
    }
}

/// Interpreted front-end arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendOptions {
    pub language: String,
    pub dialect: String,
    pub macros: Vec<MacroOp>,
    pub include_dirs: Vec<PathBuf>,
    pub pch: Option<PathBuf>,
    /// Arguments the front-end does not understand.
    pub ignored: Vec<String>,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        FrontendOptions {
            language: "c++".to_string(),
            dialect: "c++20".to_string(),
            macros: Vec::new(),
            include_dirs: Vec::new(),
            pch: None,
            ignored: Vec::new(),
        }
    }
}
