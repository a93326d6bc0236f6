//! Translation unit → metadata units.

use std::path::Path;

use refl_ir::RecordKind;
use refl_parse::{Cursor, CursorKind, DeclFlags, TranslationUnit, TypeRef};

use crate::annotation::{parse_annotation, Metadata};
use crate::context::ExtractContext;
use crate::layout::{scalar_layout, LayoutTable};
use crate::schema::UnitKind;
use crate::units::{
    Argument, EnumField, EnumUnit, MetadataUnit, MethodUnit, PropertyUnit, RecordUnit, TypeInfo,
    Unit,
};

/// Value types a property may have: arithmetic types, `std::string`, and
/// records or enums defined in the unit or its preamble.
pub fn is_supported_property_type(ty: &TypeRef, layouts: &LayoutTable<'_>) -> bool {
    ty.is_value()
        && !ty.is_void()
        && (scalar_layout(&ty.base).is_some()
            || ty.base == "std::string"
            || layouts.is_known_type(&ty.base))
}

struct Walker<'a, 'tu> {
    ctx: &'a ExtractContext,
    path: &'a Path,
    layouts: LayoutTable<'tu>,
}

impl Walker<'_, '_> {
    fn metadata(&self, annotation: Option<&str>, kind: UnitKind) -> Metadata {
        match annotation {
            Some(text) => parse_annotation(
                text,
                kind,
                self.ctx.schemas.get(kind),
                &self.ctx.interner,
            ),
            None => Metadata::default(),
        }
    }

    fn unit(&self, cursor: &Cursor, annotation: &str, kind: UnitKind) -> MetadataUnit {
        MetadataUnit {
            location: cursor.location,
            file_path: self.path.to_path_buf(),
            name: self.ctx.interner.intern(&cursor.spelling),
            metadata: self.metadata(Some(annotation), kind),
        }
    }

    fn enumeration(&self, cursor: &Cursor, annotation: &str) -> EnumUnit {
        let fields = cursor
            .children_of_kind(CursorKind::EnumConstant)
            .map(|constant| EnumField {
                name: self.ctx.interner.intern(&constant.spelling),
                value: constant.value.unwrap_or(0),
                metadata: self.metadata(constant.annotation.as_deref(), UnitKind::EnumField),
            })
            .collect();
        EnumUnit {
            unit: self.unit(cursor, annotation, UnitKind::Enum),
            underlying_type: cursor
                .ty
                .as_ref()
                .map_or_else(|| "int".to_string(), |ty| ty.base.clone()),
            scoped: cursor.flags.contains(DeclFlags::SCOPED),
            fields,
        }
    }

    fn record(&mut self, cursor: &Cursor, annotation: &str, kind: RecordKind) -> RecordUnit {
        let layout = self.layouts.record_layout(&cursor.spelling).unwrap_or_default();
        let mut properties = Vec::new();
        let mut methods = Vec::new();

        for member in &cursor.children {
            let Some(member_annotation) = member.annotation.as_deref() else {
                continue;
            };
            match member.kind {
                CursorKind::FieldDecl => {
                    let Some(ty) = member.ty.as_ref() else { continue };
                    if !is_supported_property_type(ty, &self.layouts) {
                        tracing::debug!(
                            record = %cursor.spelling,
                            field = %member.spelling,
                            ty = %ty,
                            "unsupported property type"
                        );
                        continue;
                    }
                    properties.push(PropertyUnit {
                        unit: self.unit(member, member_annotation, UnitKind::Property),
                        ty: ty.base.clone(),
                        byte_offset: layout.offset_of(&member.spelling).unwrap_or(0),
                        array_len: member.array_len,
                    });
                }
                CursorKind::Method => {
                    let return_type = member
                        .ty
                        .as_ref()
                        .map(TypeInfo::from_type)
                        .unwrap_or_default();
                    methods.push(MethodUnit {
                        unit: self.unit(member, member_annotation, UnitKind::Method),
                        is_static: member.is_static(),
                        is_const: member.flags.contains(DeclFlags::CONST),
                        return_type,
                        arguments: member
                            .params
                            .iter()
                            .map(|param| Argument {
                                name: param.name.clone(),
                                ty: TypeInfo::from_type(&param.ty),
                            })
                            .collect(),
                    });
                }
                _ => {}
            }
        }

        let schema_kind = match kind {
            RecordKind::Class => UnitKind::Class,
            RecordKind::Struct => UnitKind::Struct,
        };
        RecordUnit {
            unit: self.unit(cursor, annotation, schema_kind),
            kind,
            super_types: cursor.bases.iter().map(|b| b.spelling.clone()).collect(),
            properties,
            methods,
            size: layout.size,
            align: layout.align,
        }
    }
}

/// Units for the annotated declarations of `unit` that live in the file
/// itself. The walk ends at the first invalid declaration.
pub fn extract_units(ctx: &ExtractContext, path: &Path, unit: &TranslationUnit) -> Vec<Unit> {
    let mut walker = Walker {
        ctx,
        path,
        layouts: LayoutTable::new(unit),
    };
    let mut units = Vec::new();
    let mut declarations = unit.declarations();

    for decl in declarations.by_ref() {
        if !decl.location.in_main_file || !decl.is_definition() || decl.spelling.is_empty() {
            continue;
        }
        let Some(annotation) = decl.annotation.as_deref() else {
            continue;
        };
        let extracted = match decl.kind {
            CursorKind::EnumDecl => Unit::Enum(walker.enumeration(decl, annotation)),
            CursorKind::ClassDecl => Unit::Record(walker.record(decl, annotation, RecordKind::Class)),
            CursorKind::StructDecl => {
                Unit::Record(walker.record(decl, annotation, RecordKind::Struct))
            }
            _ => continue,
        };
        tracing::debug!(name = %decl.spelling, kind = ?decl.kind, "extracted unit");
        units.push(extracted);
    }

    if declarations.stopped_at_sentinel() {
        tracing::debug!(path = %path.display(), "walk stopped at an invalid declaration");
    }
    units
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
