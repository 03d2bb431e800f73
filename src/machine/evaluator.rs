//! Rewrite evaluator.
//!
//! Runs a [`Program`] from an initial configuration until no rule applies.
//! Two strategies are available and always agree on the result:
//!
//! - [`Mode::Direct`] keeps the configuration as one [`BigUint`] and tests
//!   each rule by divisibility. Per-step cost grows with the bit length of
//!   the configuration.
//! - [`Mode::Register`] factors the input and every rule once, then works on
//!   a [`RegisterFile`] of exponents. Per-step cost depends only on the
//!   number of primes a rule mentions.
//!
//! Evaluation is bounded by an optional step budget. Running out of budget
//! while a rule still applies is reported as [`Outcome::Inconclusive`], not
//! as an error.

mod registers;
#[cfg(test)]
mod tests;

pub use registers::RegisterFile;

use crate::machine::errors::FractranError;
use crate::machine::program::Program;
use num_bigint::BigUint;
use num_traits::Zero;
use std::str::FromStr;

/// Evaluation strategy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    /// One big integer, divisibility test per rule.
    #[default]
    Direct,
    /// Factored once, exponent arithmetic per rule.
    Register,
}

impl Mode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::Direct => "direct",
            Mode::Register => "register",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Mode::Direct),
            "register" | "registers" => Ok(Mode::Register),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

/// Result of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// No rule applies to `state`.
    Halted { state: BigUint, steps: u64 },
    /// The step budget ran out while a rule still applied to `state`.
    Inconclusive { state: BigUint, steps: u64 },
}

impl Outcome {
    pub fn state(&self) -> &BigUint {
        match self {
            Outcome::Halted { state, .. } | Outcome::Inconclusive { state, .. } => state,
        }
    }

    pub fn into_state(self) -> BigUint {
        match self {
            Outcome::Halted { state, .. } | Outcome::Inconclusive { state, .. } => state,
        }
    }

    /// Number of rules fired.
    pub fn steps(&self) -> u64 {
        match self {
            Outcome::Halted { steps, .. } | Outcome::Inconclusive { steps, .. } => *steps,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Outcome::Halted { .. })
    }
}

/// View of the machine handed to an observer before each step.
#[derive(Clone, Copy, Debug)]
pub enum Snapshot<'a> {
    Direct(&'a BigUint),
    Registers(&'a RegisterFile),
}

impl Snapshot<'_> {
    /// The configuration as an integer, whatever the mode.
    pub fn configuration(&self) -> BigUint {
        match self {
            Snapshot::Direct(n) => (*n).clone(),
            Snapshot::Registers(regs) => regs.product(),
        }
    }
}

/// Per-step callback. Observers only see the machine; they cannot change it.
pub type Observer<'o> = &'o mut dyn FnMut(Snapshot<'_>);

/// Runs programs with a fixed mode and step budget.
#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'p> {
    program: &'p Program,
    mode: Mode,
    step_limit: Option<u64>,
}

impl<'p> Evaluator<'p> {
    /// Direct mode, no step budget.
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            mode: Mode::default(),
            step_limit: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Caps the number of rules fired. `None` runs until halt.
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run(&self, input: &BigUint) -> Result<Outcome, FractranError> {
        self.execute(input, None)
    }

    /// Like [`Evaluator::run`], calling `observer` before every step,
    /// including the final check that finds no applicable rule.
    pub fn run_traced(
        &self,
        input: &BigUint,
        observer: Observer<'_>,
    ) -> Result<Outcome, FractranError> {
        self.execute(input, Some(observer))
    }

    fn execute(
        &self,
        input: &BigUint,
        observer: Option<Observer<'_>>,
    ) -> Result<Outcome, FractranError> {
        if input.is_zero() {
            return Err(FractranError::ZeroConfiguration);
        }
        match self.mode {
            Mode::Direct => Ok(self.run_direct(input.clone(), observer)),
            Mode::Register => self.run_registers(input, observer),
        }
    }

    fn budget_spent(&self, steps: u64) -> bool {
        self.step_limit.is_some_and(|limit| steps >= limit)
    }

    fn run_direct(&self, mut state: BigUint, mut observer: Option<Observer<'_>>) -> Outcome {
        let mut steps = 0u64;
        loop {
            if let Some(observe) = observer.as_deref_mut() {
                observe(Snapshot::Direct(&state));
            }

            let mut next = None;
            for rule in self.program {
                let product = &state * rule.numerator();
                if (&product % rule.denominator()).is_zero() {
                    next = Some(product / rule.denominator());
                    break;
                }
            }

            let Some(next) = next else {
                return Outcome::Halted { state, steps };
            };
            if self.budget_spent(steps) {
                return Outcome::Inconclusive { state, steps };
            }
            state = next;
            steps += 1;
        }
    }

    fn run_registers(
        &self,
        input: &BigUint,
        mut observer: Option<Observer<'_>>,
    ) -> Result<Outcome, FractranError> {
        let (rules, mut regs) = registers::compile(self.program, input)?;
        let mut steps = 0u64;
        loop {
            if let Some(observe) = observer.as_deref_mut() {
                observe(Snapshot::Registers(&regs));
            }

            let Some(rule) = rules.iter().find(|rule| rule.applies(&regs)) else {
                return Ok(Outcome::Halted {
                    state: regs.product(),
                    steps,
                });
            };
            if self.budget_spent(steps) {
                return Ok(Outcome::Inconclusive {
                    state: regs.product(),
                    steps,
                });
            }
            rule.apply(&mut regs)?;
            steps += 1;
        }
    }
}

/// Runs `program` on `input` to completion in `mode` and returns the final
/// configuration.
///
/// Does not return if the program never halts; use [`Evaluator`] with a
/// step budget for programs not known to terminate.
pub fn evaluate(program: &Program, input: &BigUint, mode: Mode) -> Result<BigUint, FractranError> {
    Evaluator::new(program)
        .with_mode(mode)
        .run(input)
        .map(Outcome::into_state)
}
