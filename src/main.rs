//! FRACTRAN program runner.
//!
//! Loads a program file, reads an initial state in factored notation and
//! prints the configuration the program halts on.
//!
//! # Usage
//! ```text
//! fractran <program> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `program`: Program file, one `<numerator> / <denominator>` rule per line
//!
//! # Options
//! - `-i, --input <state>`: Initial state such as `2^3 * 5` (read from stdin if absent)
//! - `-O, --registers`: Evaluate in Register mode instead of Direct mode
//! - `-s, --steps <n>`: Step budget (defaults to `FRACTRAN_STEP_LIMIT`, else unbounded)
//! - `-D [name=prime ...]`: Print every step with the given register names
//!
//! # Exit codes
//! - `0`: the program halted
//! - `1`: bad arguments, unreadable program or malformed input
//! - `2`: the step budget ran out first; the configuration reached is printed

use fractran::machine::evaluator::{Evaluator, Mode, Outcome, Snapshot};
use fractran::machine::notation::{
    RegisterNames, parse_configuration, render_configuration, render_registers,
};
use fractran::machine::program::Program;
use fractran::primes::factorize;
use fractran::utils::log;
use fractran::{error, info, warn};
use num_bigint::BigUint;
use std::env;
use std::io::{self, BufRead, Write};
use std::process;

/// Default step budget when `--steps` is not given.
const STEP_LIMIT_ENV: &str = "FRACTRAN_STEP_LIMIT";

fn main() {
    log::configure_from_env();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let program_path = &args[1];
    let mut mode = Mode::Direct;
    let mut input: Option<String> = None;
    let mut step_limit: Option<u64> = None;
    let mut names: Option<RegisterNames> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--registers" | "-O" => {
                mode = Mode::Register;
                i += 1;
            }
            k @ ("--input" | "-i") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                input = Some(args[i].clone());
                i += 1;
            }
            k @ ("--steps" | "-s") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                step_limit = Some(args[i].parse::<u64>().unwrap_or_else(|_| {
                    error!("Invalid step budget: '{}' is not a valid number", args[i]);
                    process::exit(1);
                }));
                i += 1;
            }
            "-D" => {
                let named = names.get_or_insert_with(RegisterNames::new);
                i += 1;
                while i < args.len() && !args[i].starts_with('-') {
                    if let Err(e) = named.bind(&args[i]) {
                        error!("Invalid register name: {e} (expected name=prime)");
                        process::exit(1);
                    }
                    i += 1;
                }
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    if step_limit.is_none()
        && let Ok(raw) = env::var(STEP_LIMIT_ENV)
    {
        match raw.trim().parse::<u64>() {
            Ok(limit) => step_limit = Some(limit),
            Err(_) => warn!("Ignoring {STEP_LIMIT_ENV}={raw}: not a valid number"),
        }
    }

    let program = Program::from_file(program_path).unwrap_or_else(|e| {
        error!("Failed to load {program_path}: {e}");
        process::exit(1);
    });

    let input = input.unwrap_or_else(|| read_input().unwrap_or_else(|e| {
        error!("Failed to read input: {e}");
        process::exit(1);
    }));
    let initial = parse_configuration(&input).unwrap_or_else(|e| {
        error!("Invalid input: {e}");
        process::exit(1);
    });

    let evaluator = Evaluator::new(&program)
        .with_mode(mode)
        .with_step_limit(step_limit);
    let outcome = match &names {
        Some(names) => {
            let mut print_step = |snap: Snapshot<'_>| println!("{}", describe(snap, names));
            evaluator.run_traced(&initial, &mut print_step)
        }
        None => evaluator.run(&initial),
    };
    let outcome = outcome.unwrap_or_else(|e| {
        error!("Evaluation failed: {e}");
        process::exit(1);
    });

    println!("{}", render(outcome.state()));
    match outcome {
        Outcome::Halted { steps, .. } => {
            info!(
                "Halted after {steps} steps ({} mode, {} rules)",
                mode.as_str(),
                program.len()
            );
        }
        Outcome::Inconclusive { steps, .. } => {
            warn!("Step budget exhausted after {steps} steps; the program may not terminate");
            process::exit(2);
        }
    }
}

/// Prompts for the initial state and reads one line from stdin.
fn read_input() -> io::Result<String> {
    println!("Input:");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn render(state: &BigUint) -> String {
    render_configuration(state).unwrap_or_else(|e| {
        warn!("Cannot factor the final configuration: {e}");
        state.to_string()
    })
}

fn describe(snap: Snapshot<'_>, names: &RegisterNames) -> String {
    match snap {
        Snapshot::Direct(n) => match factorize(n) {
            Ok(factors) => render_registers(factors.iter(), names, true),
            Err(e) => format!("[?] <{e}>"),
        },
        Snapshot::Registers(regs) => render_registers(regs.iter(), names, true),
    }
}

const USAGE: &str = "\
FRACTRAN Runner

USAGE:
    {program} <program> [OPTIONS]

ARGS:
    <program>    Program file, one `<numerator> / <denominator>` rule per line

OPTIONS:
    -i, --input <state>      Initial state, e.g. \"2^3 * 5\" (read from stdin if absent)
    -O, --registers          Evaluate in Register mode (factored once, exponent arithmetic)
    -s, --steps <n>          Step budget; exit code 2 when it runs out
    -D [name=prime ...]      Trace every step, labelling the given primes
    -h, --help               Print this help message

ENVIRONMENT:
    FRACTRAN_STEP_LIMIT      Step budget when --steps is absent
    FRACTRAN_LOG_TIMESTAMPS  Set to 0 to hide log timestamps
    FRACTRAN_LOG             Minimum log level: info, warn or error

EXAMPLES:
    # Add two registers: 2^3 * 3^4 halts on 3^7
    {program} adder.frac -i \"2^3 * 3^4\"

    # Run a compiled circuit in Register mode with a budget
    {program} collatz.frac -O -s 1000000

    # Trace with named registers
    {program} sum.frac -i \"2 * 5^4\" -D Begin=2 End=3 i=5 o=7
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
