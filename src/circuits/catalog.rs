//! Named, ready-to-run circuits.
//!
//! The [`for_each_circuit!`](crate::for_each_circuit) macro holds the catalog
//! and hands it to a callback macro, the same way the entries are expanded
//! into [`CircuitKind`] and its builder here. Each entry names the circuit,
//! lists its caller-visible registers in input order, and gives the body
//! that wires the fragment between a fresh begin and end state.
//!
//! A built [`Circuit`] is terminated (its end state is destroyed), so a run
//! that halts leaves exactly the register values behind.

use crate::circuits::automata::{self, terminate};
use crate::circuits::gates;
use crate::circuits::symbol::{Allocator, State, Symbol, Var};
use crate::machine::errors::FractranError;
use crate::machine::notation::RegisterNames;
use crate::machine::program::Program;
use crate::primes::multiplicity;
use num_bigint::BigUint;
use num_traits::Pow;
use std::fmt;
use std::str::FromStr;

/// Invokes a callback macro with the complete circuit catalog.
#[macro_export]
macro_rules! for_each_circuit {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Gates
            // =========================
            /// dst += src
            Accumulate = "accumulate", "dst += src" => [dst, src],
                |alloc, b, e| gates::accumulate(alloc, b, e, dst, src),
            /// dst += src, src = 0
            AccumulateAndDestroy = "accumulate_and_destroy", "dst += src, src = 0" => [dst, src],
                |alloc, b, e| gates::accumulate_and_destroy(alloc, b, e, dst, src),
            /// dst = x + y
            Add = "add", "dst = x + y" => [dst, x, y],
                |alloc, b, e| gates::add(alloc, b, e, dst, x, y),
            /// dst = src
            Copy = "copy", "dst = src" => [dst, src],
                |alloc, b, e| gates::copy(alloc, b, e, dst, src),
            /// x += 1
            Increment = "increment", "x += 1" => [x],
                |_alloc, b, e| Ok(gates::increment(b, e, x)),
            /// x += 2
            Increment2 = "increment_2", "x += 2" => [x],
                |_alloc, b, e| Ok(gates::increment_times(b, e, x, 2)),
            /// x += 5
            Increment5 = "increment_5", "x += 5" => [x],
                |_alloc, b, e| Ok(gates::increment_times(b, e, x, 5)),
            /// x = max(0, x - 1)
            Decrement = "decrement", "x = max(0, x - 1)" => [x],
                |_alloc, b, e| Ok(gates::decrement(b, e, x)),
            /// jump from begin to end
            Goto = "goto", "jump from begin to end" => [],
                |_alloc, b, e| Ok(gates::goto(b, e)),
            /// x = 0
            Clear = "clear", "x = 0" => [x],
                |alloc, b, e| gates::clear(alloc, b, e, x),
            /// q = n / d, r = n % d
            EuclideanDivision = "euclidean_division", "q = n / d, r = n % d (d > 0)" => [n, d, q, r],
                |alloc, b, e| gates::euclidean_division(alloc, b, e, n, d, q, r),
            /// o = x * y
            Multiply = "multiply", "o = x * y" => [x, y, o],
                |alloc, b, e| gates::multiply(alloc, b, e, x, y, o),
            /// dst = dst * src
            MultiplyOn = "multiply_on", "dst = dst * src" => [dst, src],
                |alloc, b, e| gates::multiply_on(alloc, b, e, dst, src),
            // =========================
            // Automata
            // =========================
            /// o = 1 + 2 + ... + i
            Sum = "sum", "o = 1 + 2 + ... + i" => [i, o],
                |alloc, b, e| automata::sum(alloc, b, e, i, o),
            /// o = fib(n + 1)
            Fibonacci = "fibonacci", "o = fib(n + 1)" => [n, o],
                |alloc, b, e| automata::fibonacci(alloc, b, e, n, o),
            /// o = Collatz steps from n to 1
            Collatz = "collatz", "o = Collatz steps from n to 1" => [n, o],
                |alloc, b, e| automata::collatz(alloc, b, e, n, o),
            /// o = floor(sqrt(n))
            Sqrt = "sqrt", "o = floor(sqrt(n))" => [n, o],
                |alloc, b, e| automata::sqrt(alloc, b, e, n, o),
            /// n = n!
            Factorial = "factorial", "n = n! (n >= 1)" => [n],
                |alloc, b, e| automata::factorial(alloc, b, e, n),
        }
    };
}

#[macro_export]
macro_rules! define_circuits {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $label:literal, $summary:literal => [ $( $reg:ident ),* $(,)? ],
                |$alloc:pat_param, $begin:pat_param, $end:pat_param| $body:expr
        ),* $(,)?
    ) => {
        /// Circuits available by name.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum CircuitKind {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl CircuitKind {
            /// Every circuit, in catalog order.
            pub const ALL: &'static [CircuitKind] = &[$( CircuitKind::$name ),*];

            pub const fn name(&self) -> &'static str {
                match self {
                    $( CircuitKind::$name => $label, )*
                }
            }

            /// One-line description of the register transformation.
            pub const fn summary(&self) -> &'static str {
                match self {
                    $( CircuitKind::$name => $summary, )*
                }
            }

            /// Register names in input order.
            pub const fn registers(&self) -> &'static [&'static str] {
                match self {
                    $( CircuitKind::$name => &[$( stringify!($reg) ),*], )*
                }
            }

            /// Compiles the circuit with symbols drawn from `alloc`.
            pub fn build(&self, alloc: &mut Allocator) -> Result<Circuit, FractranError> {
                let [begin, end] = alloc.next_states()?;
                match self {
                    $(
                        CircuitKind::$name => {
                            let [$( $reg ),*] = alloc.next_vars()?;
                            let fragment: Result<Program, FractranError> = {
                                let $alloc = &mut *alloc;
                                let $begin = begin;
                                let $end = end;
                                $body
                            };
                            Ok(Circuit {
                                kind: *self,
                                program: terminate(fragment?, end),
                                begin,
                                end,
                                registers: vec![$( (stringify!($reg), $reg) ),*],
                            })
                        }
                    )*
                }
            }
        }

        impl FromStr for CircuitKind {
            type Err = FractranError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok(CircuitKind::$name), )*
                    other => Err(FractranError::UnknownCircuit {
                        name: other.to_string(),
                    }),
                }
            }
        }
    };
}

for_each_circuit!(define_circuits);

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled catalog circuit together with its symbol layout.
#[derive(Clone, Debug)]
pub struct Circuit {
    kind: CircuitKind,
    program: Program,
    begin: State,
    end: State,
    registers: Vec<(&'static str, Var)>,
}

impl Circuit {
    pub fn kind(&self) -> CircuitKind {
        self.kind
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    pub fn begin(&self) -> State {
        self.begin
    }

    pub fn end(&self) -> State {
        self.end
    }

    /// Caller-visible registers in input order.
    pub fn registers(&self) -> &[(&'static str, Var)] {
        &self.registers
    }

    pub fn register(&self, name: &str) -> Option<Var> {
        self.registers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Encodes an initial configuration: the begin state times each register
    /// raised to its value. Missing trailing values are zero.
    pub fn configuration(&self, values: &[u64]) -> Result<BigUint, FractranError> {
        if values.len() > self.registers.len() {
            return Err(FractranError::ArityMismatch {
                circuit: self.kind.name(),
                expected: self.registers.len(),
                got: values.len(),
            });
        }
        let mut config = BigUint::from(self.begin.prime());
        for ((_, var), &value) in self.registers.iter().zip(values) {
            config *= Pow::pow(&BigUint::from(var.prime()), value);
        }
        Ok(config)
    }

    /// Value of register `name` in `config`.
    pub fn read(&self, config: &BigUint, name: &str) -> Option<u64> {
        self.register(name)
            .map(|var| multiplicity(config, var.prime()))
    }

    /// Every caller-visible register decoded from `config`.
    pub fn registers_of(&self, config: &BigUint) -> Vec<(&'static str, u64)> {
        self.registers
            .iter()
            .map(|&(name, var)| (name, multiplicity(config, var.prime())))
            .collect()
    }

    /// The symbol layout a caller needs: `Begin`, `End`, then the registers
    /// in input order.
    pub fn symbols(&self) -> Vec<(&'static str, Symbol)> {
        [("Begin", Symbol::from(self.begin)), ("End", Symbol::from(self.end))]
            .into_iter()
            .chain(self.registers.iter().map(|&(name, var)| (name, Symbol::from(var))))
            .collect()
    }

    /// Display labels for tracing, one per entry of [`Circuit::symbols`].
    pub fn names(&self) -> RegisterNames {
        let mut names = RegisterNames::new();
        for (label, symbol) in self.symbols() {
            names.insert(symbol.prime(), label);
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in CircuitKind::ALL {
            assert_eq!(kind.name().parse::<CircuitKind>().unwrap(), *kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert!(matches!(
            "nope".parse::<CircuitKind>(),
            Err(FractranError::UnknownCircuit { ref name }) if name == "nope"
        ));
    }

    #[test]
    fn catalog_is_complete() {
        assert_eq!(CircuitKind::ALL.len(), 18);
        assert_eq!(CircuitKind::Add.registers(), &["dst", "x", "y"]);
        assert!(CircuitKind::Goto.registers().is_empty());
        assert_eq!(CircuitKind::EuclideanDivision.summary(), "q = n / d, r = n % d (d > 0)");
    }

    #[test]
    fn layout_starts_with_begin_and_end() {
        let mut alloc = Allocator::new();
        let circuit = CircuitKind::Copy.build(&mut alloc).unwrap();
        assert_eq!(circuit.begin().prime(), 2);
        assert_eq!(circuit.end().prime(), 3);
        assert_eq!(circuit.register("dst").map(Var::prime), Some(5));
        assert_eq!(circuit.register("src").map(Var::prime), Some(7));
        assert_eq!(circuit.register("tmp"), None);
        assert_eq!(circuit.kind(), CircuitKind::Copy);
        // seven gate rules and the terminating rule
        assert_eq!(circuit.program().len(), 8);
    }

    #[test]
    fn configuration_encoding() {
        let mut alloc = Allocator::new();
        let circuit = CircuitKind::Add.build(&mut alloc).unwrap();
        // begin = 2, dst = 5, x = 7, y = 11
        let config = circuit.configuration(&[1, 2]).unwrap();
        assert_eq!(config, BigUint::from(2u32 * 5 * 49));
        assert_eq!(circuit.read(&config, "x"), Some(2));
        assert_eq!(circuit.read(&config, "y"), Some(0));
        assert_eq!(circuit.read(&config, "q"), None);
        assert_eq!(
            circuit.registers_of(&config),
            vec![("dst", 1), ("x", 2), ("y", 0)]
        );
        assert!(matches!(
            circuit.configuration(&[0, 0, 0, 0]),
            Err(FractranError::ArityMismatch {
                circuit: "add",
                expected: 3,
                got: 4
            })
        ));
    }

    #[test]
    fn trace_names_cover_layout() {
        let mut alloc = Allocator::new();
        let circuit = CircuitKind::Sum.build(&mut alloc).unwrap();
        let names = circuit.names();
        assert_eq!(names.get(&BigUint::from(2u32)), Some("Begin"));
        assert_eq!(names.get(&BigUint::from(3u32)), Some("End"));
        assert_eq!(names.get(&BigUint::from(5u32)), Some("i"));
        assert_eq!(names.get(&BigUint::from(7u32)), Some("o"));
    }

    #[test]
    fn symbols_tag_roles() {
        let mut alloc = Allocator::new();
        let circuit = CircuitKind::Add.build(&mut alloc).unwrap();
        let layout: Vec<String> = circuit
            .symbols()
            .iter()
            .map(|(label, symbol)| format!("{label}={symbol}"))
            .collect();
        assert_eq!(layout, ["Begin=E2", "End=E3", "dst=x5", "x=x7", "y=x11"]);
        assert!(matches!(circuit.symbols()[1].1, Symbol::Control(s) if s == circuit.end()));
    }
}
