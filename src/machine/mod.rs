//! FRACTRAN machine: program format, state notation and evaluation.
//!
//! A program is an ordered list of positive fractions. A configuration is a
//! single positive integer whose prime exponents act as registers and
//! control states. One step multiplies the configuration by the first
//! fraction that keeps it an integer; the machine halts when none does.
//!
//! # Modules
//!
//! - [`errors`]: Error type shared by loading, compilation and evaluation
//! - [`program`]: Rules, programs and the one-rule-per-line text format
//! - [`notation`]: Factored `p^e * q` notation and named register listings
//! - [`evaluator`]: Direct and Register evaluation with step budgets and tracing

pub mod errors;
pub mod evaluator;
pub mod notation;
pub mod program;
