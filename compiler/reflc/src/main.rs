//! Reflc CLI
//!
//! Extracts reflection metadata from annotated headers.

use reflc::commands::{run_dump, run_extract, EXIT_USAGE};
use reflc::logging::init_tracing;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let verbose = args[2..].iter().any(|arg| arg == "-v" || arg == "--verbose");
    init_tracing(verbose);

    let command = &args[1];
    let code = match command.as_str() {
        "extract" => run_extract(&args[2..]),
        "dump" => run_dump(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-V" => {
            println!("reflc {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            EXIT_USAGE
        }
    };
    std::process::exit(code);
}

fn print_usage() {
    println!("Reflc - reflection metadata extractor");
    println!();
    println!("Usage: reflc <command> [options]");
    println!();
    println!("Commands:");
    println!("  extract [root]     Extract metadata from headers under root (default: .)");
    println!("  dump <path>        Print the types described by a descriptor file or directory");
    println!("  help               Show this message");
    println!("  version            Show version");
    println!();
    println!("Run 'reflc extract --help' for extraction options.");
    println!();
    println!("Logging:");
    println!("  -v, --verbose      Debug output as a span tree");
    println!("  RUST_LOG=<filter>  Override the log filter, e.g. RUST_LOG=refl_extract=debug");
}
