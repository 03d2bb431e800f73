//! Evaluator benchmark binary.
//!
//! Times Direct and Register mode on catalog automata.
//! Run with: `cargo run --release --bin bench`

use std::process;
use std::time::{Duration, Instant};

use fractran::circuits::catalog::{Circuit, CircuitKind};
use fractran::circuits::symbol::Allocator;
use fractran::error;
use fractran::machine::evaluator::{Evaluator, Mode};
use num_bigint::BigUint;

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

struct BenchResult {
    name: String,
    mode: Mode,
    iterations: u64,
    total: Duration,
    steps: u64,
}

impl BenchResult {
    fn avg(&self) -> Duration {
        self.total / self.iterations.max(1) as u32
    }

    fn print(&self) {
        let ns_per_op = self.avg().as_nanos();
        let ns_per_step = if self.steps > 0 {
            format!("{:>8.1}", ns_per_op as f64 / self.steps as f64)
        } else {
            "       -".to_string()
        };
        println!(
            "  {:<18} {:<9} {:>7} iters {:>12.3} us/iter {:>10} steps  {} ns/step",
            self.name,
            self.mode.as_str(),
            self.iterations,
            ns_per_op as f64 / 1000.0,
            self.steps,
            ns_per_step,
        );
    }
}

/// Runs `f` for at least `min_duration`, returning aggregated results.
/// `f` returns the number of steps of one run.
fn bench<F>(name: String, mode: Mode, min_duration: Duration, mut f: F) -> BenchResult
where
    F: FnMut() -> u64,
{
    // Warmup
    for _ in 0..2 {
        f();
    }

    let mut iterations = 0u64;
    let mut steps = 0u64;
    let start = Instant::now();
    while start.elapsed() < min_duration {
        steps = f();
        iterations += 1;
    }

    BenchResult {
        name,
        mode,
        iterations,
        total: start.elapsed(),
        steps,
    }
}

fn run_once(circuit: &Circuit, mode: Mode, input: &BigUint) -> u64 {
    match Evaluator::new(circuit.program()).with_mode(mode).run(input) {
        Ok(outcome) => outcome.steps(),
        Err(e) => {
            error!("{} failed in {} mode: {e}", circuit.kind(), mode.as_str());
            process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Benchmark definitions
// ---------------------------------------------------------------------------

const CASES: &[(CircuitKind, &[u64])] = &[
    (CircuitKind::Sum, &[100]),
    (CircuitKind::Fibonacci, &[15]),
    (CircuitKind::Collatz, &[7]),
    (CircuitKind::Sqrt, &[400]),
    (CircuitKind::Factorial, &[6]),
    (CircuitKind::Multiply, &[60, 60]),
];

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let min = Duration::from_secs(1);

    println!("Evaluator Benchmarks (each runs for >= 1s)\n");
    println!(
        "  {:<18} {:<9} {:>7}       {:>16} {:>10}         {:>10}",
        "benchmark", "mode", "iters", "avg time", "steps", "ns/step"
    );
    println!("  {}", "-".repeat(92));

    for &(kind, values) in CASES {
        // Compilation is excluded from the timings.
        let circuit = kind.build(&mut Allocator::new()).unwrap_or_else(|e| {
            error!("Failed to build {kind}: {e}");
            process::exit(1);
        });
        let input = circuit.configuration(values).unwrap_or_else(|e| {
            error!("Bad input for {kind}: {e}");
            process::exit(1);
        });
        let args: Vec<String> = values.iter().map(u64::to_string).collect();
        let name = format!("{kind}({})", args.join(", "));

        for mode in [Mode::Direct, Mode::Register] {
            bench(name.clone(), mode, min, || run_once(&circuit, mode, &input)).print();
        }
    }

    println!();
}
