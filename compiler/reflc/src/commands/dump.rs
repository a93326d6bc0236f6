//! The `dump` command: load descriptors and print the registry they build.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use refl_extract::FileDescriptor;
use refl_ir::{SharedInterner, StringLookup};
use refl_runtime::{DisplayMetadata, TypeRegistry, VariantType};

use super::{EXIT_FAILURE, EXIT_USAGE};
use crate::error::DescriptorError;
use crate::mirror::build_registry;

fn read_descriptor(path: &Path) -> Result<FileDescriptor, DescriptorError> {
    let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DescriptorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load one descriptor file, or every `.json` file of a directory in name
/// order.
pub fn load_descriptors(path: &Path) -> Result<Vec<FileDescriptor>, DescriptorError> {
    if !path.is_dir() {
        return read_descriptor(path).map(|descriptor| vec![descriptor]);
    }

    let read_error = |source: std::io::Error| DescriptorError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(path).map_err(read_error)? {
        let entry_path = entry.map_err(read_error)?.path();
        let is_json = entry_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && entry_path.is_file() {
            paths.push(entry_path);
        }
    }
    paths.sort();
    paths.iter().map(|p| read_descriptor(p)).collect()
}

fn metadata_suffix(lookup: &impl StringLookup, metadata: &DisplayMetadata) -> String {
    if metadata.is_empty() {
        return String::new();
    }
    let mut entries: Vec<String> = metadata.flags().map(|flag| lookup.render(flag)).collect();
    entries.extend(
        metadata
            .attributes()
            .iter()
            .map(|(key, value)| format!("{}={value:?}", lookup.render(*key))),
    );
    format!(" [{}]", entries.join(", "))
}

fn type_text(lookup: &impl StringLookup, ty: VariantType) -> String {
    match ty {
        VariantType::Invalid => "void".to_owned(),
        other => other.describe(lookup),
    }
}

/// Human-readable listing of every type, sorted by name.
pub fn render_registry(registry: &TypeRegistry) -> String {
    let lookup = registry.interner();
    let mut out = String::new();

    let mut classes: Vec<_> = registry.classes().collect();
    classes.sort_by_cached_key(|class| lookup.render(class.name()));
    for class in classes {
        let meta = class.meta();
        let _ = write!(out, "{} {}", meta.kind().keyword(), lookup.render(class.name()));
        if let Some(super_type) = meta.super_type() {
            let _ = write!(out, " : {}", lookup.render(super_type));
        }
        if let Some(size) = meta.size() {
            let _ = write!(out, " ({size} bytes)");
        }
        let _ = writeln!(out, "{}", metadata_suffix(lookup, meta.metadata()));

        for property in meta.properties() {
            let _ = writeln!(
                out,
                "    {} {}{}",
                type_text(lookup, property.ty()),
                lookup.render(property.name()),
                metadata_suffix(lookup, property.metadata())
            );
        }

        let mut methods: Vec<_> = meta.methods().collect();
        methods.sort_by_cached_key(|method| lookup.render(method.name()));
        for method in methods {
            let params: Vec<String> = method
                .params()
                .iter()
                .map(|ty| type_text(lookup, *ty))
                .collect();
            let _ = writeln!(
                out,
                "    {}fn {}({}){} -> {}{}",
                if method.is_static() { "static " } else { "" },
                lookup.render(method.name()),
                params.join(", "),
                if method.is_const() { " const" } else { "" },
                type_text(lookup, method.return_type()),
                metadata_suffix(lookup, method.metadata())
            );
        }
    }

    let mut enums: Vec<_> = registry.enums().collect();
    enums.sort_by_cached_key(|meta| lookup.render(meta.name()));
    for meta in enums {
        let _ = writeln!(
            out,
            "enum {} : {}{}",
            lookup.render(meta.name()),
            meta.underlying().keyword(),
            metadata_suffix(lookup, meta.metadata())
        );
        for constant in meta.constants() {
            let _ = writeln!(
                out,
                "    {} = {}{}",
                lookup.render(constant.name),
                constant.value,
                metadata_suffix(lookup, &constant.metadata)
            );
        }
    }
    out
}

/// `reflc dump <descriptor file or directory>`.
pub fn run_dump(args: &[String]) -> i32 {
    let [path] = args else {
        eprintln!("Usage: reflc dump <descriptor.json | descriptor-dir>");
        return EXIT_USAGE;
    };

    let files = match load_descriptors(Path::new(path)) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_FAILURE;
        }
    };
    match build_registry(SharedInterner::new(), &files) {
        Ok((registry, mirror)) => {
            print!("{}", render_registry(&registry));
            for line in &mirror.skipped {
                eprintln!("skipped: {line}");
            }
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            EXIT_FAILURE
        }
    }
}
