//! Symbols and the allocator that issues them.
//!
//! Every control state and every register of a compiled program is named by
//! a distinct prime. [`State`] and [`Var`] wrap those primes and can only be
//! minted by an [`Allocator`], so two roles can never share a prime and no
//! prime is handed out twice by the same allocator.
//!
//! Products of symbols are written with `*` and produce a [`Term`], which is
//! what rule numerators and denominators are built from:
//!
//! ```
//! use fractran::circuits::symbol::Allocator;
//! use fractran::machine::program::Fraction;
//!
//! let mut alloc = Allocator::new();
//! let [begin, end] = alloc.next_states().unwrap();
//! let x = alloc.next_var().unwrap();
//! let rule = Fraction::new(end, x * begin);
//! assert_eq!(rule.to_string(), "3 / 10");
//! ```

use crate::machine::errors::FractranError;
use crate::primes::PrimeTable;
use num_bigint::BigUint;
use num_traits::{One, Pow};
use std::fmt;
use std::ops::Mul;

/// Prime used as a symbol name.
pub type Prime = u64;

/// Control symbol: present with exponent 1 while the program counter is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(Prime);

/// Register symbol: its exponent is the register's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(Prime);

impl State {
    pub fn prime(self) -> Prime {
        self.0
    }
}

impl Var {
    pub fn prime(self) -> Prime {
        self.0
    }

    /// `self^exponent`, used to add a constant to a register in one rule.
    pub fn pow(self, exponent: u32) -> Term {
        Term(Pow::pow(BigUint::from(self.0), exponent))
    }
}

/// A symbol in either role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Control(State),
    Register(Var),
}

impl Symbol {
    pub fn prime(self) -> Prime {
        match self {
            Symbol::Control(s) => s.prime(),
            Symbol::Register(v) => v.prime(),
        }
    }
}

impl From<State> for Symbol {
    fn from(s: State) -> Self {
        Symbol::Control(s)
    }
}

impl From<Var> for Symbol {
    fn from(v: Var) -> Self {
        Symbol::Register(v)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Control(s) => write!(f, "E{}", s.prime()),
            Symbol::Register(v) => write!(f, "x{}", v.prime()),
        }
    }
}

/// Product of symbols (or 1), the building block of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term(BigUint);

impl Term {
    /// The empty product.
    pub fn one() -> Self {
        Term(BigUint::one())
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl From<State> for Term {
    fn from(s: State) -> Self {
        Term(BigUint::from(s.0))
    }
}

impl From<Var> for Term {
    fn from(v: Var) -> Self {
        Term(BigUint::from(v.0))
    }
}

impl From<Term> for BigUint {
    fn from(t: Term) -> Self {
        t.0
    }
}

impl<R: Into<Term>> Mul<R> for Term {
    type Output = Term;

    fn mul(self, rhs: R) -> Term {
        Term(self.0 * rhs.into().0)
    }
}

impl<R: Into<Term>> Mul<R> for State {
    type Output = Term;

    fn mul(self, rhs: R) -> Term {
        Term::from(self) * rhs
    }
}

impl<R: Into<Term>> Mul<R> for Var {
    type Output = Term;

    fn mul(self, rhs: R) -> Term {
        Term::from(self) * rhs
    }
}

/// Issues fresh primes in increasing order, starting at 2.
///
/// One allocator backs one compilation; everything wired into the same
/// program must come from the same allocator. By default the prime source
/// grows without bound. [`Allocator::bounded`] caps the number of symbols,
/// after which allocation fails with [`FractranError::SymbolExhausted`].
///
/// An allocator cannot be cloned, since a copy would issue the same primes
/// again:
///
/// ```compile_fail
/// use fractran::circuits::symbol::Allocator;
///
/// let alloc = Allocator::new();
/// let copy = alloc.clone();
/// ```
#[derive(Debug, Default)]
pub struct Allocator {
    table: PrimeTable,
    cursor: usize,
    capacity: Option<usize>,
}

impl Allocator {
    /// Creates an unbounded allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that refuses to issue more than `capacity` symbols.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Number of symbols issued so far.
    pub fn issued(&self) -> usize {
        self.cursor
    }

    fn next_prime(&mut self) -> Result<Prime, FractranError> {
        let exhausted = FractranError::SymbolExhausted {
            issued: self.cursor,
        };
        if self.capacity.is_some_and(|cap| self.cursor >= cap) {
            return Err(exhausted);
        }
        let p = self.table.nth(self.cursor).ok_or(exhausted)?;
        self.cursor += 1;
        Ok(p)
    }

    /// Issues a fresh control symbol.
    pub fn next_state(&mut self) -> Result<State, FractranError> {
        self.next_prime().map(State)
    }

    /// Issues a fresh register symbol.
    pub fn next_var(&mut self) -> Result<Var, FractranError> {
        self.next_prime().map(Var)
    }

    /// Issues `N` fresh control symbols.
    pub fn next_states<const N: usize>(&mut self) -> Result<[State; N], FractranError> {
        let mut out = [State(0); N];
        for slot in out.iter_mut() {
            *slot = self.next_state()?;
        }
        Ok(out)
    }

    /// Issues `N` fresh register symbols.
    pub fn next_vars<const N: usize>(&mut self) -> Result<[Var; N], FractranError> {
        let mut out = [Var(0); N];
        for slot in out.iter_mut() {
            *slot = self.next_var()?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_consecutive_primes() {
        let mut alloc = Allocator::new();
        let [a, b] = alloc.next_states().unwrap();
        let [x, y, z] = alloc.next_vars().unwrap();
        assert_eq!(
            [a.prime(), b.prime(), x.prime(), y.prime(), z.prime()],
            [2, 3, 5, 7, 11]
        );
        assert_eq!(alloc.issued(), 5);
    }

    #[test]
    fn deterministic_for_same_call_sequence() {
        let run = || {
            let mut alloc = Allocator::new();
            let s = alloc.next_state().unwrap();
            let v: [Var; 4] = alloc.next_vars().unwrap();
            (s, v)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn never_repeats_past_initial_table() {
        let mut alloc = Allocator::new();
        let mut last = 0;
        for _ in 0..2_000 {
            let p = alloc.next_var().unwrap().prime();
            assert!(p > last);
            last = p;
        }
        assert_eq!(last, 17_389);
    }

    #[test]
    fn bounded_allocator_fails_loudly() {
        let mut alloc = Allocator::bounded(3);
        assert!(alloc.next_states::<3>().is_ok());
        assert!(matches!(
            alloc.next_var(),
            Err(FractranError::SymbolExhausted { issued: 3 })
        ));
        assert!(matches!(
            alloc.next_states::<1>(),
            Err(FractranError::SymbolExhausted { .. })
        ));
    }

    #[test]
    fn independent_allocators_do_not_interfere() {
        let mut first = Allocator::new();
        let mut second = Allocator::new();
        first.next_vars::<10>().unwrap();
        assert_eq!(second.next_var().unwrap().prime(), 2);
    }

    #[test]
    fn terms_multiply_primes() {
        let mut alloc = Allocator::new();
        let [a] = alloc.next_states().unwrap();
        let [x, y] = alloc.next_vars().unwrap();
        assert_eq!(BigUint::from(x * y * a), BigUint::from(30u32));
        assert_eq!(BigUint::from(y.pow(3) * a), BigUint::from(250u32));
        assert_eq!(BigUint::from(Term::one() * x), BigUint::from(3u32));
    }

    #[test]
    fn symbol_roles_display() {
        let mut alloc = Allocator::new();
        let s = Symbol::from(alloc.next_state().unwrap());
        let v = Symbol::from(alloc.next_var().unwrap());
        assert_eq!(s.to_string(), "E2");
        assert_eq!(v.to_string(), "x3");
        assert_ne!(s.prime(), v.prime());
    }
}
