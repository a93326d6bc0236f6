//! Natural field layout of records declared in a translation unit.
//!
//! Follows the common 64-bit C++ ABI closely enough for reflection
//! offsets: scalars are aligned to their size, pointers and references
//! take 8 bytes, bases are laid out before fields, an empty base takes no
//! space, a polymorphic record without a polymorphic primary base starts
//! with a vtable pointer, and sizes are rounded up to the alignment.

use refl_parse::{Cursor, CursorKind, DeclFlags, TranslationUnit, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};

const POINTER: (u64, u64) = (8, 8);
const STD_STRING: (u64, u64) = (32, 8);

/// Size and alignment of a fundamental or fixed-width type.
pub fn scalar_layout(base: &str) -> Option<(u64, u64)> {
    let base = base.strip_prefix("std::").unwrap_or(base);
    let size = match base {
        "bool" | "char" | "signed char" | "unsigned char" | "char8_t" | "int8_t" | "uint8_t"
        | "byte" => 1,
        "short" | "unsigned short" | "char16_t" | "int16_t" | "uint16_t" => 2,
        "int" | "unsigned int" | "float" | "char32_t" | "wchar_t" | "int32_t" | "uint32_t" => 4,
        "long" | "unsigned long" | "long long" | "unsigned long long" | "double" | "int64_t"
        | "uint64_t" | "size_t" | "ptrdiff_t" | "intptr_t" | "uintptr_t" => 8,
        "long double" => 16,
        _ => return None,
    };
    Some((size, size))
}

fn round_up(offset: u64, align: u64) -> u64 {
    offset.div_ceil(align.max(1)) * align.max(1)
}

fn last_segment(qualified: &str) -> &str {
    let without_args = qualified.split('<').next().unwrap_or(qualified);
    without_args.rsplit("::").next().unwrap_or(without_args)
}

/// Computed layout of one record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordLayout {
    pub size: u64,
    pub align: u64,
    /// Byte offset of each data member, in declaration order.
    pub offsets: Vec<(String, u64)>,
    /// Has a vtable pointer, inherited or its own.
    pub polymorphic: bool,
    /// No data members, no bases with data and no vtable.
    pub empty: bool,
}

impl RecordLayout {
    pub fn offset_of(&self, field: &str) -> Option<u64> {
        self.offsets
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, offset)| *offset)
    }
}

/// Bit-field storage unit being filled.
struct BitUnit {
    offset: u64,
    size: u64,
    used: u64,
}

/// Lazily computed layouts for every record of a unit.
pub struct LayoutTable<'tu> {
    records: FxHashMap<&'tu str, &'tu Cursor>,
    enums: FxHashMap<&'tu str, &'tu TypeRef>,
    cache: FxHashMap<&'tu str, RecordLayout>,
    in_progress: FxHashSet<&'tu str>,
}

impl<'tu> LayoutTable<'tu> {
    /// Index every record and enum definition in `unit`, nested ones
    /// included. The first definition of a name wins.
    pub fn new(unit: &'tu TranslationUnit) -> Self {
        let mut table = LayoutTable {
            records: FxHashMap::default(),
            enums: FxHashMap::default(),
            cache: FxHashMap::default(),
            in_progress: FxHashSet::default(),
        };
        table.index(&unit.root);
        table
    }

    fn index(&mut self, cursor: &'tu Cursor) {
        for child in &cursor.children {
            if child.is_definition() && !child.spelling.is_empty() {
                match child.kind {
                    kind if kind.is_record() => {
                        self.records.entry(&child.spelling).or_insert(child);
                    }
                    CursorKind::EnumDecl => {
                        if let Some(ty) = &child.ty {
                            self.enums.entry(&child.spelling).or_insert(ty);
                        }
                    }
                    _ => {}
                }
            }
            if child.kind.is_transparent_scope() || child.kind.is_record() {
                self.index(child);
            }
        }
    }

    /// Whether `name` names a record or enum defined in the unit.
    pub fn is_known_type(&self, name: &str) -> bool {
        let name = last_segment(name);
        self.records.contains_key(name) || self.enums.contains_key(name)
    }

    /// Size and alignment of a value of type `ty`.
    pub fn type_layout(&mut self, ty: &TypeRef) -> (u64, u64) {
        if ty.is_pointer() || ty.is_reference() {
            return POINTER;
        }
        self.base_layout(&ty.base)
    }

    fn base_layout(&mut self, base: &str) -> (u64, u64) {
        if let Some(scalar) = scalar_layout(base) {
            return scalar;
        }
        if base == "std::string" || base == "string" {
            return STD_STRING;
        }
        let name = last_segment(base);
        if let Some(underlying) = self.enums.get(name).map(|ty| ty.base.clone()) {
            return self.base_layout(&underlying);
        }
        if let Some(layout) = self.record_layout(name) {
            return (layout.size, layout.align);
        }
        tracing::debug!(ty = base, "unknown type, assuming pointer size");
        POINTER
    }

    /// Layout of record `name`, or `None` if it is not defined in the unit
    /// or refers to itself by value.
    pub fn record_layout(&mut self, name: &str) -> Option<RecordLayout> {
        let name = last_segment(name);
        if let Some(layout) = self.cache.get(name) {
            return Some(layout.clone());
        }
        let (&key, &cursor) = self.records.get_key_value(name)?;
        if !self.in_progress.insert(key) {
            return None;
        }
        let layout = self.compute(cursor);
        self.in_progress.remove(key);
        self.cache.insert(key, layout.clone());
        Some(layout)
    }

    fn compute(&mut self, record: &'tu Cursor) -> RecordLayout {
        let bases: Vec<(u64, u64, bool, bool)> = record
            .bases
            .iter()
            .map(|base| match self.record_layout(&base.spelling) {
                Some(layout) => (layout.size, layout.align, layout.polymorphic, layout.empty),
                None => {
                    tracing::debug!(base = %base.spelling, "unknown base, assuming pointer size");
                    (POINTER.0, POINTER.1, false, false)
                }
            })
            .collect();

        let declares_virtual = record.children.iter().any(|child| {
            matches!(child.kind, CursorKind::Method | CursorKind::Destructor)
                && child.flags.contains(DeclFlags::VIRTUAL)
        });
        let primary_polymorphic = bases
            .iter()
            .find(|(.., empty)| !empty)
            .is_some_and(|&(_, _, polymorphic, _)| polymorphic);
        let polymorphic = declares_virtual || bases.iter().any(|&(_, _, p, _)| p);

        let mut offset = 0u64;
        let mut align = 1u64;
        if polymorphic && !primary_polymorphic {
            offset = POINTER.0;
            align = POINTER.1;
        }
        for &(size, base_align, _, empty) in &bases {
            if empty {
                continue;
            }
            offset = round_up(offset, base_align) + size;
            align = align.max(base_align);
        }

        let is_union = record.kind == CursorKind::UnionDecl;
        let mut offsets = Vec::new();
        let mut bit_unit: Option<BitUnit> = None;
        let mut union_size = 0u64;

        for field in record.children_of_kind(CursorKind::FieldDecl) {
            let Some(ty) = &field.ty else { continue };
            let (elem_size, field_align) = self.type_layout(ty);
            let size = elem_size.saturating_mul(field.array_len.unwrap_or(1));
            align = align.max(field_align);

            if is_union {
                offsets.push((field.spelling.clone(), 0));
                union_size = union_size.max(size);
                continue;
            }

            if let Some(width) = field.bit_width.map(u64::from) {
                if let Some(unit) = bit_unit
                    .as_mut()
                    .filter(|unit| unit.size == elem_size && unit.used + width <= unit.size * 8)
                {
                    unit.used += width;
                    offsets.push((field.spelling.clone(), unit.offset));
                    continue;
                }
                let start = round_up(offset, field_align);
                bit_unit = Some(BitUnit {
                    offset: start,
                    size: elem_size,
                    used: width,
                });
                offsets.push((field.spelling.clone(), start));
                offset = start + elem_size;
                continue;
            }

            bit_unit = None;
            let start = round_up(offset, field_align);
            offsets.push((field.spelling.clone(), start));
            offset = start + size;
        }

        if is_union {
            offset = offset.max(union_size);
        }
        let empty = offset == 0;
        let size = match round_up(offset, align) {
            0 => 1,
            size => size,
        };
        RecordLayout {
            size,
            align,
            offsets,
            polymorphic,
            empty,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
