//! Translation-unit model produced by the parser.
//!
//! A [`TranslationUnit`] owns a tree of [`Cursor`]s, one per declaration.
//! The tree is plain data: it can be cloned, compared and serialized, which
//! is how precompiled headers are stored.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use refl_ir::SourceLocation;
use serde::{Deserialize, Serialize};

use crate::error::FrontendError;

/// Kind of a declaration node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    /// `extern "C" { … }`
    LinkageSpec,
    ClassDecl,
    StructDecl,
    UnionDecl,
    EnumDecl,
    EnumConstant,
    FieldDecl,
    Method,
    Constructor,
    Destructor,
    FunctionDecl,
    VarDecl,
    TypeAlias,
    /// Declaration the parser could not make sense of.
    Invalid,
}

impl CursorKind {
    /// Class, struct or union.
    pub fn is_record(self) -> bool {
        matches!(
            self,
            CursorKind::ClassDecl | CursorKind::StructDecl | CursorKind::UnionDecl
        )
    }

    /// Nodes whose children belong to the enclosing scope's traversal.
    pub fn is_transparent_scope(self) -> bool {
        matches!(
            self,
            CursorKind::TranslationUnit | CursorKind::Namespace | CursorKind::LinkageSpec
        )
    }
}

/// Member access level.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    #[default]
    Public,
    Protected,
    Private,
}

impl Access {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "public" => Some(Access::Public),
            "protected" => Some(Access::Protected),
            "private" => Some(Access::Private),
            _ => None,
        }
    }
}

bitflags! {
    /// Declaration specifiers and qualifiers.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DeclFlags: u32 {
        /// Has a body (records, enums) rather than being a forward declaration.
        const DEFINITION = 1 << 0;
        const STATIC = 1 << 1;
        /// `const`-qualified member function, or `const` variable.
        const CONST = 1 << 2;
        const VIRTUAL = 1 << 3;
        /// `= 0`
        const PURE = 1 << 4;
        const INLINE = 1 << 5;
        const CONSTEXPR = 1 << 6;
        const MUTABLE = 1 << 7;
        /// `enum class` / `enum struct`
        const SCOPED = 1 << 8;
        /// Trailing `...` parameter.
        const VARIADIC = 1 << 9;
        const NOEXCEPT = 1 << 10;
        const OVERRIDE = 1 << 11;
        const FINAL = 1 << 12;
        /// `= default`
        const DEFAULTED = 1 << 13;
        /// `= delete`
        const DELETED = 1 << 14;
        const EXPLICIT = 1 << 15;
        /// Anonymous record or enum.
        const ANONYMOUS = 1 << 16;
    }
}

/// A spelled type with the qualifiers the extractor cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Full spelling, e.g. `const std::string&`.
    pub spelling: String,
    /// Spelling without cv-qualifiers, pointers or references,
    /// e.g. `std::string`. Fundamental types are canonicalised
    /// (`unsigned int`, `long long`).
    pub base: String,
    /// `const` applies to the referenced or outermost object.
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_lvalue_ref: bool,
    pub is_rvalue_ref: bool,
    pub pointer_depth: u8,
}

impl TypeRef {
    /// Plain, unqualified type.
    pub fn named(base: impl Into<String>) -> Self {
        let base = base.into();
        TypeRef {
            spelling: base.clone(),
            base,
            ..TypeRef::default()
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    pub fn is_reference(&self) -> bool {
        self.is_lvalue_ref || self.is_rvalue_ref
    }

    /// Value type: no pointer, no reference.
    pub fn is_value(&self) -> bool {
        !self.is_pointer() && !self.is_reference()
    }

    /// `void` without indirection.
    pub fn is_void(&self) -> bool {
        self.base == "void" && self.is_value()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spelling)
    }
}

/// Function or method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    /// Empty for unnamed parameters.
    pub name: String,
    pub ty: TypeRef,
    pub has_default: bool,
}

/// One entry of a class base clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseSpecifier {
    pub spelling: String,
    pub access: Access,
    pub is_virtual: bool,
}

/// A declaration node.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub kind: CursorKind,
    /// Declared name; empty for anonymous declarations.
    pub spelling: String,
    pub location: SourceLocation,
    /// Raw annotation text attached to the declaration, verbatim.
    pub annotation: Option<String>,
    /// Field type, return type, alias target or enum underlying type.
    pub ty: Option<TypeRef>,
    pub params: Vec<ParamDecl>,
    pub bases: Vec<BaseSpecifier>,
    pub flags: DeclFlags,
    pub access: Access,
    /// Enum constant value.
    pub value: Option<i64>,
    /// Total element count of an array field (`int m[2][3]` is 6).
    pub array_len: Option<u64>,
    pub bit_width: Option<u32>,
    pub children: Vec<Cursor>,
}

impl Cursor {
    pub fn new(kind: CursorKind, spelling: impl Into<String>, location: SourceLocation) -> Self {
        Cursor {
            kind,
            spelling: spelling.into(),
            location,
            annotation: None,
            ty: None,
            params: Vec::new(),
            bases: Vec::new(),
            flags: DeclFlags::empty(),
            access: Access::Public,
            value: None,
            array_len: None,
            bit_width: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn is_definition(&self) -> bool {
        self.flags.contains(DeclFlags::DEFINITION)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(DeclFlags::STATIC)
    }

    /// Direct children of the given kind.
    pub fn children_of_kind(&self, kind: CursorKind) -> impl Iterator<Item = &Cursor> + '_ {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Mark this subtree as coming from outside the main file.
    pub(crate) fn mark_external(&mut self) {
        self.location = self.location.external();
        for child in &mut self.children {
            child.mark_external();
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{:?} '{}'", "", self.kind, self.spelling, indent = depth * 2)?;
        if let Some(ty) = &self.ty {
            write!(f, " : {ty}")?;
        }
        if let Some(value) = self.value {
            write!(f, " = {value}")?;
        }
        if let Some(annotation) = &self.annotation {
            write!(f, " [{annotation}]")?;
        }
        writeln!(f, " @ {:?}", self.location)?;
        for child in &self.children {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// `#include` directive seen in an active region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// Path as written between the delimiters.
    pub spelled: String,
    /// `<…>` rather than `"…"`.
    pub angled: bool,
    /// First existing candidate on the search path.
    pub resolved: Option<PathBuf>,
    pub line: u32,
}

/// Macro definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDef {
    /// Parameter names of a function-like macro; `None` for object-like.
    pub params: Option<Vec<String>>,
    /// Replacement text.
    pub body: String,
}

impl MacroDef {
    pub fn object(body: impl Into<String>) -> Self {
        MacroDef {
            params: None,
            body: body.into(),
        }
    }

    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }
}

/// Diagnostic severity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

/// Recoverable problem found while building a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}:{}: {severity}: {}", self.line, self.column, self.message)
    }
}

/// Parsed source file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub path: PathBuf,
    /// Root node of kind [`CursorKind::TranslationUnit`].
    pub root: Cursor,
    pub includes: Vec<IncludeDirective>,
    /// Macros defined at the end of the file.
    pub macros: BTreeMap<String, MacroDef>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Leading bytes of a serialized unit.
const PCH_MAGIC: [u8; 8] = *b"REFLPCH\0";
/// Bumped whenever the serialized model changes shape.
const PCH_VERSION: u32 = 1;
/// `PCH_MAGIC` plus a fixed-width `u32`.
const PCH_HEADER_LEN: usize = 12;

impl TranslationUnit {
    /// Number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Serialize into a precompiled-header blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        let mut bytes = bincode::serialize(&(PCH_MAGIC, PCH_VERSION))?;
        bytes.extend(bincode::serialize(self)?);
        Ok(bytes)
    }

    /// Deserialize a precompiled-header blob. `path` is only used in errors.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, FrontendError> {
        let corrupt = |reason: String| FrontendError::Pch {
            path: path.to_path_buf(),
            reason,
        };
        let (magic, version): ([u8; 8], u32) =
            bincode::deserialize(bytes).map_err(|e| corrupt(e.to_string()))?;
        if magic != PCH_MAGIC {
            return Err(corrupt("not a precompiled header".to_string()));
        }
        if version != PCH_VERSION {
            return Err(corrupt(format!(
                "format version {version}, expected {PCH_VERSION}"
            )));
        }
        bincode::deserialize(&bytes[PCH_HEADER_LEN..]).map_err(|e| corrupt(e.to_string()))
    }

    /// Write the unit to `path`.
    pub fn save(&self, path: &Path) -> Result<(), FrontendError> {
        let bytes = self.to_bytes().map_err(|e| FrontendError::Pch {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, bytes).map_err(|source| FrontendError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a unit written by [`TranslationUnit::save`].
    pub fn load(path: &Path) -> Result<Self, FrontendError> {
        let bytes = std::fs::read(path).map_err(|source| FrontendError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, &bytes)
    }
}
