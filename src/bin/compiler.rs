//! Circuit to FRACTRAN compiler CLI.
//!
//! Compiles a catalog circuit into a program file and reports the symbol
//! layout needed to encode its inputs.
//!
//! # Usage
//! ```text
//! compiler <circuit> [OPTIONS]
//! compiler --list
//! ```
//!
//! # Arguments
//! - `circuit`: Catalog name, e.g. `add`, `collatz`, `sqrt`
//!
//! # Options
//! - `-o, --output <file>`: Output file path (defaults to `<circuit>.frac`)
//! - `-l, --list`: List the catalog and exit
//!
//! # Examples
//! ```text
//! compiler sum
//! compiler collatz -o programs/collatz.frac
//! ```

use fractran::circuits::catalog::CircuitKind;
use fractran::circuits::symbol::Allocator;
use fractran::utils::log;
use fractran::{error, info};
use std::env;
use std::path::Path;
use std::process;

fn main() {
    log::configure_from_env();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    if args[1] == "--list" || args[1] == "-l" {
        print_catalog();
        return;
    }

    let kind: CircuitKind = args[1].parse().unwrap_or_else(|e| {
        error!("{e}; run with --list to see the catalog");
        process::exit(1);
    });
    let mut output_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--output" | "-o") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                output_path = Some(args[i].clone());
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let output_path = output_path.unwrap_or_else(|| format!("{}.frac", kind.name()));

    if let Some(parent) = Path::new(&output_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        error!("Output directory does not exist: {}", parent.display());
        process::exit(1);
    }

    let mut alloc = Allocator::new();
    let circuit = kind.build(&mut alloc).unwrap_or_else(|e| {
        error!("Compilation failed: {e}");
        process::exit(1);
    });

    if let Err(e) = circuit.program().write_file(&output_path) {
        error!("Failed to write output file: {e}");
        process::exit(1);
    }

    info!(
        "Compiled {} -> {} ({} rules, {} symbols)",
        kind,
        output_path,
        circuit.program().len(),
        alloc.issued()
    );
    for (label, symbol) in circuit.symbols() {
        info!("  {label} = {} ({symbol})", symbol.prime());
    }

    let example: Vec<String> = std::iter::once(circuit.begin().prime().to_string())
        .chain(circuit.registers().iter().map(|(name, var)| format!("{}^{name}", var.prime())))
        .collect();
    info!("Input: {}", example.join(" * "));
}

fn print_catalog() {
    let width = CircuitKind::ALL
        .iter()
        .map(|k| k.name().len())
        .max()
        .unwrap_or(0);
    println!("Circuits:");
    for kind in CircuitKind::ALL {
        println!(
            "  {:<width$}  [{}]  {}",
            kind.name(),
            kind.registers().join(", "),
            kind.summary(),
            width = width,
        );
    }
}

const USAGE: &str = "\
Circuit Compiler

USAGE:
    {program} <circuit> [OPTIONS]
    {program} --list

ARGS:
    <circuit>    Catalog circuit to compile (see --list)

OPTIONS:
    -o, --output <file>     Output file path (defaults to <circuit>.frac)
    -l, --list              List available circuits
    -h, --help              Print this help message

EXAMPLES:
    # Compile to default output name
    {program} sum

    # Compile with explicit output
    {program} collatz -o programs/collatz.frac
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
