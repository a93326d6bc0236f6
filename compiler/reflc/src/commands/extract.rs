//! The `extract` command: scan a content root and write descriptors.

use refl_extract::{
    relative_key, Describer, ExtractError, ExtractReport, Extractor, ExtractorConfig,
    FileDescriptor,
};
use refl_runtime::{ReflectError, TypeRegistry};

use super::{EXIT_FAILURE, EXIT_USAGE};
use crate::config::ExtractOptions;
use crate::mirror::{build_registry, MirrorReport};

/// What one `extract` run produced.
pub struct ExtractOutcome {
    pub report: ExtractReport,
    /// Present when registration was requested.
    pub registry: Option<Result<(TypeRegistry, MirrorReport), ReflectError>>,
}

/// Run the extractor once, optionally mirroring the parsed units into a
/// runtime registry built on the extractor's own interner.
pub fn extract(config: ExtractorConfig, register: bool) -> Result<ExtractOutcome, ExtractError> {
    let mut extractor = Extractor::new(config);
    let report = extractor.run()?;

    let registry = register.then(|| {
        let ctx = extractor.context();
        let describer = Describer::new(&ctx.interner);
        let files: Vec<FileDescriptor> = report
            .files
            .iter()
            .map(|(path, units)| {
                describer.file(&relative_key(&ctx.config.content_root, path), units)
            })
            .collect();
        build_registry(ctx.interner.clone(), &files)
    });

    Ok(ExtractOutcome { report, registry })
}

fn print_usage() {
    eprintln!("Usage: reflc extract [root] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config=<file>      JSON configuration (paths relative to the file)");
    eprintln!("  --out=<dir>          Write one JSON descriptor per header");
    eprintln!("  --generated=<dir>    Directory for the state file and precompiled header");
    eprintln!("  --state=<file>       Incremental state file");
    eprintln!("  --pch=<header>       Header to precompile and include everywhere");
    eprintln!("  -I <dir>, -I<dir>    Add an include directory");
    eprintln!("  --no-parallel        Parse files one at a time");
    eprintln!("  --stamp-on-success   Retry failed files on the next run");
    eprintln!("  --register           Build a runtime registry from the results");
    eprintln!("  -v, --verbose        Debug logging");
}

/// `reflc extract`. Per-file failures are reported but do not change the
/// exit code.
pub fn run_extract(args: &[String]) -> i32 {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return 0;
    }
    let options = match ExtractOptions::parse(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            return EXIT_USAGE;
        }
    };
    let config = match options.resolve() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_USAGE;
        }
    };

    let outcome = match extract(config, options.register) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_FAILURE;
        }
    };

    let report = &outcome.report;
    for (path, reason) in &report.failures {
        eprintln!("failed: {}: {reason}", path.display());
    }
    println!("{report}");
    if report.descriptors_written > 0 || report.descriptor_failures > 0 {
        println!(
            "{} descriptors written, {} failed",
            report.descriptors_written, report.descriptor_failures
        );
    }
    if let Some(pch) = &report.pch {
        println!("precompiled header: {}", pch.display());
    }

    match &outcome.registry {
        Some(Ok((registry, mirror))) => {
            println!(
                "registered {} classes, {} enums",
                registry.class_count(),
                mirror.enums
            );
            for line in &mirror.skipped {
                eprintln!("skipped: {line}");
            }
        }
        Some(Err(err)) => eprintln!("error: cannot register types: {err}"),
        None => {}
    }
    0
}
