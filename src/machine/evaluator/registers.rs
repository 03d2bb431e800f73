use crate::machine::errors::FractranError;
use crate::machine::program::Program;
use crate::primes::{Factorization, factorize};
use num_bigint::BigUint;
use num_traits::{One, Pow};
use std::collections::BTreeMap;

/// Sparse register file of the Register mode evaluator.
///
/// Every prime the run can ever touch (those of the initial configuration
/// and of every rule) is interned up front, in increasing order, so a
/// register is addressed by a dense index and holds a plain exponent.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    primes: Vec<BigUint>,
    exponents: Vec<u64>,
}

impl RegisterFile {
    /// Current exponent of `prime`, zero when the prime is not interned.
    pub fn get(&self, prime: &BigUint) -> u64 {
        self.primes
            .binary_search(prime)
            .map(|idx| self.exponents[idx])
            .unwrap_or(0)
    }

    /// Nonzero registers in increasing prime order.
    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, u64)> {
        self.primes
            .iter()
            .zip(self.exponents.iter().copied())
            .filter(|(_, e)| *e > 0)
    }

    /// Number of interned primes, live or not.
    pub fn width(&self) -> usize {
        self.primes.len()
    }

    /// Rebuilds the configuration as the product of `prime^exponent`.
    pub fn product(&self) -> BigUint {
        self.iter()
            .fold(BigUint::one(), |acc, (p, e)| acc * Pow::pow(p, e))
    }
}

/// A rule in lowest terms over interned register indices.
///
/// `take` lists the exponents the rule needs and consumes, `give` those it
/// adds. A prime shared by numerator and denominator only contributes its
/// net change, which keeps the guard equal to the divisibility test on the
/// full integer.
#[derive(Clone, Debug, Default)]
pub(super) struct CompiledRule {
    take: Vec<(usize, u64)>,
    give: Vec<(usize, u64)>,
}

impl CompiledRule {
    #[inline]
    pub(super) fn applies(&self, regs: &RegisterFile) -> bool {
        self.take
            .iter()
            .all(|&(idx, need)| regs.exponents[idx] >= need)
    }

    /// Fires the rule. The caller has checked [`CompiledRule::applies`].
    #[inline]
    pub(super) fn apply(&self, regs: &mut RegisterFile) -> Result<(), FractranError> {
        for &(idx, need) in &self.take {
            regs.exponents[idx] -= need;
        }
        for &(idx, add) in &self.give {
            let slot = &mut regs.exponents[idx];
            *slot = slot
                .checked_add(add)
                .ok_or_else(|| FractranError::ExponentOverflow {
                    prime: regs.primes[idx].to_string(),
                })?;
        }
        Ok(())
    }
}

/// Factors `input` and every rule of `program`, interns their primes, and
/// returns the compiled rules with the initial register file.
pub(super) fn compile(
    program: &Program,
    input: &BigUint,
) -> Result<(Vec<CompiledRule>, RegisterFile), FractranError> {
    let initial = factorize(input)?;
    let mut factored: Vec<(Factorization, Factorization)> = Vec::with_capacity(program.len());
    for rule in program {
        factored.push((factorize(rule.numerator())?, factorize(rule.denominator())?));
    }

    let mut index: BTreeMap<BigUint, usize> = BTreeMap::new();
    let mentioned = factored
        .iter()
        .flat_map(|(num, den)| num.iter().chain(den.iter()))
        .chain(initial.iter());
    for (prime, _) in mentioned {
        index.entry(prime.clone()).or_insert(0);
    }
    for (slot, idx) in index.values_mut().enumerate() {
        *idx = slot;
    }

    let rules = factored
        .iter()
        .map(|(num, den)| {
            let mut rule = CompiledRule::default();
            let primes = num.iter().chain(den.iter()).map(|(p, _)| p);
            let mut seen: Vec<&BigUint> = primes.collect();
            seen.sort();
            seen.dedup();
            for prime in seen {
                let idx = index[prime];
                let (give, take) = (num.exponent(prime), den.exponent(prime));
                if take > give {
                    rule.take.push((idx, take - give));
                } else if give > take {
                    rule.give.push((idx, give - take));
                }
            }
            rule
        })
        .collect();

    let mut regs = RegisterFile {
        primes: index.into_keys().collect(),
        exponents: Vec::new(),
    };
    regs.exponents = vec![0; regs.primes.len()];
    for (prime, exponent) in initial.iter() {
        if let Ok(idx) = regs.primes.binary_search(prime) {
            regs.exponents[idx] = exponent;
        }
    }
    Ok((rules, regs))
}
