//! Compiler from register-machine circuits to FRACTRAN programs.
//!
//! # Model
//!
//! - **Symbols**: every control state and register is a distinct prime,
//!   issued by an [`symbol::Allocator`] owned by one compilation
//! - **Gates**: fragments between a begin and an end state performing one
//!   register operation (copy, add, branch, divide, multiply, ...)
//! - **Automata**: whole algorithms threaded together from gates
//! - **Catalog**: every gate and automaton by name, compiled with its
//!   register layout so inputs can be encoded and results decoded
//!
//! # Modules
//!
//! - [`symbol`]: States, registers, rule terms and the prime allocator
//! - [`gates`]: Gate library
//! - [`automata`]: Summation, Fibonacci, Collatz, square root, factorial
//! - [`catalog`]: [`catalog::CircuitKind`] and compiled [`catalog::Circuit`]s

pub mod automata;
pub mod catalog;
pub mod gates;
pub mod symbol;
