//! Source-model front-end for annotated C++ headers.
//!
//! Turns one header into a [`TranslationUnit`]: a tree of declaration
//! [`Cursor`]s with their annotations, types and locations. The pipeline is
//!
//! ```text
//! text → Preprocessor (conditionals, object-like macros) → tokens
//!      → Parser (declarations) → TranslationUnit
//! ```
//!
//! A unit can be saved and loaded again; a saved header unit primes later
//! parses the way a precompiled header does (`-include-pch`).

mod args;
mod error;
mod eval;
mod lexer;
mod model;
mod parser;
mod preprocess;
mod traverse;

use std::path::Path;

use refl_ir::{SourceLocation, Span};

pub use args::{FrontendArgs, FrontendOptions, MacroOp, PARSER_MACRO};
pub use error::FrontendError;
pub use eval::{evaluate, parse_int_literal, EvalError};
pub use lexer::{spell, tokenize, unquote, LexError, LineIndex, Token, TokenKind};
pub use model::{
    Access, BaseSpecifier, Cursor, CursorKind, DeclFlags, Diagnostic, IncludeDirective, MacroDef,
    ParamDecl, Severity, TranslationUnit, TypeRef,
};
pub use parser::Parser;
pub use preprocess::{Preprocessed, Preprocessor};
pub use traverse::Declarations;

/// What a unit is built for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Reflection walk: namespace-scope functions and variables are dropped.
    #[default]
    Normal,
    /// Unit will be saved as a precompiled header; everything is kept.
    ForSerialization,
}

/// Value of `__cplusplus` for a `-std=` dialect.
fn cplusplus_value(dialect: &str) -> &'static str {
    match dialect.trim_start_matches("gnu").trim_start_matches("c") {
        "++98" | "++03" => "199711L",
        "++11" | "++0x" => "201103L",
        "++14" | "++1y" => "201402L",
        "++17" | "++1z" => "201703L",
        "++23" | "++2b" => "202302L",
        _ => "202002L",
    }
}

/// Read and parse a file.
pub fn parse_file(
    path: &Path,
    args: &FrontendArgs,
    mode: ParseMode,
) -> Result<TranslationUnit, FrontendError> {
    let bytes = std::fs::read(path).map_err(|source| FrontendError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source(path, &String::from_utf8_lossy(&bytes), args, mode)
}

/// Parse `source` as the contents of `path`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn parse_source(
    path: &Path,
    source: &str,
    args: &FrontendArgs,
    mode: ParseMode,
) -> Result<TranslationUnit, FrontendError> {
    let options = args.options();
    let mut diagnostics = Vec::new();
    let command_line = |message: String| Diagnostic {
        severity: Severity::Warning,
        message,
        line: 0,
        column: 0,
    };
    for arg in &options.ignored {
        diagnostics.push(command_line(format!(
            "argument unused during compilation: '{arg}'"
        )));
    }
    if options.language != "c++" {
        diagnostics.push(command_line(format!(
            "language '{}' is parsed as C++",
            options.language
        )));
    }

    let preamble = options
        .pch
        .as_deref()
        .map(TranslationUnit::load)
        .transpose()?;

    let mut pp = Preprocessor::new(path, &options.include_dirs);
    pp.define("__cplusplus", MacroDef::object(cplusplus_value(&options.dialect)));
    if let Some(preamble) = &preamble {
        for (name, def) in &preamble.macros {
            pp.define(name.clone(), def.clone());
        }
    }
    for op in &options.macros {
        match op {
            MacroOp::Define { name, value } => pp.define(name.clone(), MacroDef::object(value.clone())),
            MacroOp::Undef(name) => pp.undef(name),
        }
    }
    let pre = pp.run(source)?;

    let index = LineIndex::new(source);
    let mut parser = Parser::new(&pre.tokens, &index);
    if mode == ParseMode::Normal {
        parser = parser.without_free_declarations();
    }
    if let Some(preamble) = &preamble {
        let constants = Declarations::new(&preamble.root)
            .flat_map(|decl| decl.children_of_kind(CursorKind::EnumConstant));
        for constant in constants {
            parser.add_enum_constant(constant.spelling.clone(), constant.value.unwrap_or(0));
        }
    }
    let (decls, parse_diagnostics) = parser.parse();

    let mut root = Cursor::new(
        CursorKind::TranslationUnit,
        path.display().to_string(),
        SourceLocation::new(1, 1, Span::DUMMY),
    );
    if let Some(preamble) = preamble {
        let mut preamble_root = preamble.root;
        preamble_root.mark_external();
        root.children = preamble_root.children;
    }
    root.children.extend(decls);

    diagnostics.extend(pre.diagnostics);
    diagnostics.extend(parse_diagnostics);
    tracing::debug!(
        declarations = root.children.len(),
        diagnostics = diagnostics.len(),
        "parsed translation unit"
    );

    Ok(TranslationUnit {
        path: path.to_path_buf(),
        root,
        includes: pre.includes,
        macros: pre.macros,
        diagnostics,
    })
}
