//! Prime sieving and factorization of arbitrary-precision naturals.
//!
//! Two services live here:
//!
//! - [`PrimeTable`]: a growable, owned sieve used by the symbol allocator to
//!   hand out fresh primes in increasing order.
//! - [`factorize`]: splits a [`BigUint`] into a [`Factorization`]. Trial division
//!   runs against a process-wide table of primes below [`SMALL_PRIME_LIMIT`]
//!   and drops to `u128` arithmetic as soon as the cofactor fits. Whatever
//!   cofactor survives is attacked by sieving, one segment at a time, the
//!   primes between the table limit and its square root.

use crate::machine::errors::FractranError;
use num_bigint::BigUint;
use num_traits::{One, Pow, ToPrimitive, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Upper bound of the shared trial-division table.
pub const SMALL_PRIME_LIMIT: u64 = 100_000;

/// Width of one segment when sieving past the shared table.
const SEGMENT_WIDTH: u64 = 1 << 16;

/// Initial sieve limit of a fresh [`PrimeTable`].
const INITIAL_TABLE_LIMIT: u64 = 1 << 10;

/// Returns every prime `p <= limit` in increasing order (sieve of Eratosthenes).
pub fn sieve(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let n = limit as usize;
    let mut is_prime = vec![true; n + 1];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut i = 2;
    while i * i <= n {
        if is_prime[i] {
            let mut j = i * i;
            while j <= n {
                is_prime[j] = false;
                j += i;
            }
        }
        i += 1;
    }

    is_prime
        .iter()
        .enumerate()
        .filter(|(_, p)| **p)
        .map(|(k, _)| k as u64)
        .collect()
}

/// Shared table of primes below [`SMALL_PRIME_LIMIT`], built on first use.
pub fn small_primes() -> &'static [u64] {
    static TABLE: OnceLock<Vec<u64>> = OnceLock::new();
    TABLE.get_or_init(|| sieve(SMALL_PRIME_LIMIT))
}

/// Primes in `[lo, hi)`, given every prime up to `sqrt(hi)` in `base`.
fn sieve_segment(lo: u64, hi: u64, base: &[u64]) -> Vec<u64> {
    let mut composite = vec![false; (hi - lo) as usize];
    for &p in base {
        if p.saturating_mul(p) >= hi {
            break;
        }
        let first = lo.div_ceil(p) * p;
        let mut m = first.max(p * p);
        while m < hi {
            composite[(m - lo) as usize] = true;
            m += p;
        }
    }
    (lo..hi)
        .zip(composite)
        .filter(|(_, c)| !c)
        .map(|(k, _)| k)
        .collect()
}

/// Floor of the square root of `n`.
fn isqrt_u64(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).is_none_or(|sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Growable table of consecutive primes.
///
/// Indexing past the current end re-sieves with a doubled limit, so the
/// table never runs dry before `u64` itself does.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    primes: Vec<u64>,
    limit: u64,
}

impl PrimeTable {
    /// Creates a table covering the primes up to a small initial limit.
    pub fn new() -> Self {
        Self::with_limit(INITIAL_TABLE_LIMIT)
    }

    /// Creates a table covering every prime `<= limit`.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            primes: sieve(limit),
            limit,
        }
    }

    /// Returns the `index`-th prime (0-based: `nth(0) == 2`), growing on demand.
    ///
    /// Returns `None` only when the sieve limit would overflow `u64`.
    pub fn nth(&mut self, index: usize) -> Option<u64> {
        while index >= self.primes.len() {
            let limit = self.limit.max(1).checked_mul(2)?;
            self.primes = sieve(limit);
            self.limit = limit;
        }
        Some(self.primes[index])
    }

    /// Number of primes currently sieved.
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    /// Returns `true` if the table holds no prime (limit below 2).
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }
}

impl Default for PrimeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Prime decomposition of a positive integer, ordered by prime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Factorization {
    powers: BTreeMap<BigUint, u64>,
}

impl Factorization {
    /// Exponent of `prime` (0 when absent).
    pub fn exponent(&self, prime: &BigUint) -> u64 {
        self.powers.get(prime).copied().unwrap_or(0)
    }

    /// Iterates `(prime, exponent)` pairs in increasing prime order.
    pub fn iter(&self) -> impl Iterator<Item = (&BigUint, u64)> {
        self.powers.iter().map(|(p, e)| (p, *e))
    }

    /// Number of distinct primes.
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    /// Returns `true` for the factorization of 1.
    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Multiplies the prime powers back together.
    pub fn product(&self) -> BigUint {
        self.powers
            .iter()
            .fold(BigUint::one(), |acc, (p, e)| acc * Pow::pow(p, *e))
    }

    fn push(&mut self, prime: BigUint, exponent: u64) {
        if exponent > 0 {
            *self.powers.entry(prime).or_insert(0) += exponent;
        }
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.powers.is_empty() {
            return write!(f, "1");
        }
        for (i, (p, e)) in self.powers.iter().enumerate() {
            if i > 0 {
                write!(f, " * ")?;
            }
            if *e == 1 {
                write!(f, "{p}")?;
            } else {
                write!(f, "{p}^{e}")?;
            }
        }
        Ok(())
    }
}

/// Divides every factor `p` out of `rest`, returning how many were removed.
fn divide_out(rest: &mut BigUint, p: u64) -> u64 {
    let mut exponent = 0;
    while (&*rest % p).is_zero() {
        *rest /= p;
        exponent += 1;
    }
    exponent
}

/// Exponent of the prime `p` in `n`. Zero for `n == 0` and for `p < 2`.
pub fn multiplicity(n: &BigUint, p: u64) -> u64 {
    if n.is_zero() || p < 2 {
        return 0;
    }
    let mut rest = n.clone();
    divide_out(&mut rest, p)
}

/// Splits `n` into its prime powers.
///
/// Returns [`FractranError::ZeroConfiguration`] for 0 and
/// [`FractranError::FactorizationOutOfRange`] when a cofactor without small
/// factors has a square root beyond `u64`.
pub fn factorize(n: &BigUint) -> Result<Factorization, FractranError> {
    if n.is_zero() {
        return Err(FractranError::ZeroConfiguration);
    }

    let mut factors = Factorization::default();
    let mut rest = n.clone();
    let table = small_primes();

    for (i, &p) in table.iter().enumerate() {
        if let Some(native) = rest.to_u128() {
            finish_native(native, &table[i..], &mut factors);
            return Ok(factors);
        }
        let e = divide_out(&mut rest, p);
        factors.push(BigUint::from(p), e);
    }

    // Past the table the sieve only reaches cofactors below 2^128.
    let native = rest
        .to_u128()
        .ok_or(FractranError::FactorizationOutOfRange {
            digits: rest.to_string().len(),
        })?;
    finish_native(native, &[], &mut factors);
    Ok(factors)
}

/// `true` once `p * p > rest`: whatever is left is 1 or a prime.
fn exhausted(rest: u128, p: u64) -> bool {
    u128::from(p) * u128::from(p) > rest
}

fn divide_out_native(rest: &mut u128, p: u64) -> u64 {
    let p = u128::from(p);
    let mut exponent = 0;
    while *rest % p == 0 {
        *rest /= p;
        exponent += 1;
    }
    exponent
}

/// Factors `rest` with the remaining `table` primes, then sieves past the
/// shared table. `table` is a suffix of [`small_primes`].
fn finish_native(mut rest: u128, table: &[u64], factors: &mut Factorization) {
    for &p in table {
        if exhausted(rest, p) {
            if rest != 1 {
                factors.push(BigUint::from(rest), 1);
            }
            return;
        }
        let e = divide_out_native(&mut rest, p);
        factors.push(BigUint::from(p), e);
    }

    // Every prime factor left is above the table limit.
    let limit = rest.isqrt() as u64;
    let extended;
    let base: &[u64] = if isqrt_u64(limit) <= SMALL_PRIME_LIMIT {
        small_primes()
    } else {
        extended = sieve(isqrt_u64(limit));
        &extended
    };

    let mut lo = SMALL_PRIME_LIMIT + 1;
    while lo <= limit {
        let hi = lo.saturating_add(SEGMENT_WIDTH).min(limit.saturating_add(1));
        for q in sieve_segment(lo, hi, base) {
            if exhausted(rest, q) {
                break;
            }
            let e = divide_out_native(&mut rest, q);
            factors.push(BigUint::from(q), e);
        }
        if exhausted(rest, hi) {
            break;
        }
        lo = hi;
    }

    if rest != 1 {
        factors.push(BigUint::from(rest), 1);
    }
}

/// Prime factors of `n` with multiplicity, in increasing order.
pub fn prime_factors(n: &BigUint) -> Result<Vec<BigUint>, FractranError> {
    let factors = factorize(n)?;
    let mut out = Vec::new();
    for (p, e) in factors.iter() {
        for _ in 0..e {
            out.push(p.clone());
        }
    }
    Ok(out)
}
