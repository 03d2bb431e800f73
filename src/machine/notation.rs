//! Human-readable forms of a configuration.
//!
//! - Factored notation `2^3 * 5 * 7^2` for initial states and results.
//! - A named register listing, `[State] {x = 3, y = 0}`, for tracing.
//!
//! Nothing here takes part in evaluation.

use crate::machine::errors::FractranError;
use crate::primes::factorize;
use num_bigint::BigUint;
use num_traits::{One, Pow, Zero};
use std::collections::BTreeMap;

/// Largest configuration, in bits, that factored notation may describe.
pub const MAX_CONFIGURATION_BITS: u64 = 1 << 28;

/// Parses `p1^e1 * p2^e2 * ...` (`^1` optional, whitespace ignored) and
/// multiplies the powers out.
///
/// Bases are not checked for primality; `4^2` simply contributes 16. A factor
/// that would push the product past [`MAX_CONFIGURATION_BITS`] is rejected as
/// [`FractranError::InvalidFactor`] before anything is computed.
pub fn parse_configuration(s: &str) -> Result<BigUint, FractranError> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(FractranError::EmptyNotation);
    }

    let mut out = BigUint::one();
    for factor in compact.split('*') {
        let invalid = || FractranError::InvalidFactor {
            token: factor.to_string(),
        };
        let (base, exponent) = match factor.split_once('^') {
            Some((b, e)) => (b, e),
            None => (factor, "1"),
        };
        if base.is_empty() || !base.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if exponent.is_empty() || !exponent.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let base: BigUint = base.parse().map_err(|_| invalid())?;
        let exponent: u64 = exponent.parse().map_err(|_| invalid())?;
        if base.is_zero() {
            return Err(invalid());
        }
        if base.is_one() {
            continue;
        }
        let bits = base
            .bits()
            .checked_mul(exponent)
            .and_then(|b| b.checked_add(out.bits()))
            .ok_or_else(invalid)?;
        if bits > MAX_CONFIGURATION_BITS {
            return Err(invalid());
        }
        out *= Pow::pow(&base, exponent);
    }
    Ok(out)
}

/// Renders `n` in factored notation, or `1` for the empty product.
pub fn render_configuration(n: &BigUint) -> Result<String, FractranError> {
    Ok(factorize(n)?.to_string())
}

/// Labels for primes, used only for display.
#[derive(Debug, Clone, Default)]
pub struct RegisterNames {
    names: BTreeMap<BigUint, String>,
}

impl RegisterNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prime: impl Into<BigUint>, name: impl Into<String>) {
        self.names.insert(prime.into(), name.into());
    }

    pub fn get(&self, prime: &BigUint) -> Option<&str> {
        self.names.get(prime).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parses a `name=prime` binding and records it.
    pub fn bind(&mut self, binding: &str) -> Result<(), FractranError> {
        let invalid = || FractranError::InvalidFactor {
            token: binding.to_string(),
        };
        let (name, prime) = binding.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        let prime = prime.trim();
        if name.is_empty() || prime.is_empty() || !prime.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let prime: BigUint = prime.parse().map_err(|_| invalid())?;
        self.insert(prime, name);
        Ok(())
    }
}

/// Starts with an uppercase letter: the naming convention for control states.
fn is_state_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Renders registers as `{name = value, ...}`, preceded by `[State]` when
/// `show_states` is set.
///
/// Named primes whose label starts with an uppercase letter and whose
/// exponent is 1 are listed as states. Without any such state, a single
/// unnamed prime at exponent 1 is taken to be the state (`E<p>`); otherwise
/// the state is shown as `?`. Unnamed registers print as `x<p>`.
pub fn render_registers<'a>(
    powers: impl IntoIterator<Item = (&'a BigUint, u64)>,
    names: &RegisterNames,
    show_states: bool,
) -> String {
    let mut states: Vec<String> = Vec::new();
    let mut variables: Vec<(String, u64)> = Vec::new();
    let mut unnamed_singles: Vec<&BigUint> = Vec::new();

    for (prime, exponent) in powers {
        match names.get(prime) {
            Some(name) if show_states && exponent == 1 && is_state_name(name) => {
                states.push(name.to_string());
            }
            Some(name) => variables.push((name.to_string(), exponent)),
            None => {
                if exponent == 1 {
                    unnamed_singles.push(prime);
                }
                variables.push((format!("x{prime}"), exponent));
            }
        }
    }

    if show_states && states.is_empty() {
        if let [prime] = unnamed_singles.as_slice() {
            let label = format!("x{prime}");
            variables.retain(|(name, _)| *name != label);
            states.push(format!("E{prime}"));
        } else {
            states.push("?".to_string());
        }
    }

    let vars = variables
        .iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join(", ");

    if show_states {
        format!("[{}] {{{}}}", states.join(", "), vars)
    } else {
        format!("{{{vars}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::Factorization;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn factors(n: u64) -> Factorization {
        factorize(&big(n)).unwrap()
    }

    #[test]
    fn parse_simple_products() {
        assert_eq!(parse_configuration("2^3 * 5").unwrap(), big(40));
        assert_eq!(parse_configuration(" 3 ").unwrap(), big(3));
        assert_eq!(parse_configuration("2^0*7").unwrap(), big(7));
        assert_eq!(parse_configuration("2 * 2 ^ 2").unwrap(), big(8));
        assert_eq!(parse_configuration("1").unwrap(), big(1));
    }

    #[test]
    fn parse_huge_exponent() {
        let n = parse_configuration("2^200").unwrap();
        assert_eq!(n.bits(), 201);
    }

    #[test]
    fn parse_rejects_oversized_powers() {
        assert!(matches!(
            parse_configuration("2^99999999999999"),
            Err(FractranError::InvalidFactor { ref token }) if token == "2^99999999999999"
        ));
        assert!(matches!(
            parse_configuration("3 * 7^18446744073709551615"),
            Err(FractranError::InvalidFactor { ref token }) if token == "7^18446744073709551615"
        ));
        // a power of one never grows
        assert_eq!(parse_configuration("1^99999999999999 * 5").unwrap(), big(5));
    }

    #[test]
    fn parse_rejects_malformed_factors() {
        assert!(matches!(
            parse_configuration(""),
            Err(FractranError::EmptyNotation)
        ));
        assert!(matches!(
            parse_configuration("2^x"),
            Err(FractranError::InvalidFactor { ref token }) if token == "2^x"
        ));
        assert!(parse_configuration("2**3").is_err());
        assert!(parse_configuration("^3").is_err());
        assert!(parse_configuration("0^2").is_err());
        assert!(parse_configuration("2^3^4").is_err());
        assert!(parse_configuration("a").is_err());
    }

    #[test]
    fn render_identity_and_products() {
        assert_eq!(render_configuration(&big(1)).unwrap(), "1");
        assert_eq!(render_configuration(&big(2)).unwrap(), "2");
        assert_eq!(render_configuration(&big(1_000)).unwrap(), "2^3 * 5^3");
    }

    #[test]
    fn round_trip_representative_values() {
        for n in [1u64, 2, 12, 97, 360, 1 << 40, 3_486_784_401, 999_999_937] {
            let text = render_configuration(&big(n)).unwrap();
            assert_eq!(parse_configuration(&text).unwrap(), big(n), "{text}");
        }
        let n: BigUint = Pow::pow(&big(3), 321u32) * big(11);
        let text = render_configuration(&n).unwrap();
        assert_eq!(text, "3^321 * 11");
        assert_eq!(parse_configuration(&text).unwrap(), n);
    }

    #[test]
    fn bind_names() {
        let mut names = RegisterNames::new();
        names.bind("n=2").unwrap();
        names.bind(" Begin = 5 ").unwrap();
        assert_eq!(names.get(&big(2)), Some("n"));
        assert_eq!(names.get(&big(5)), Some("Begin"));
        assert!(names.bind("n").is_err());
        assert!(names.bind("=3").is_err());
        assert!(names.bind("n=x").is_err());
    }

    #[test]
    fn registers_without_states() {
        let mut names = RegisterNames::new();
        names.insert(2u32, "n");
        // 2^3 * 3^2
        let out = render_registers(factors(72).iter(), &names, false);
        assert_eq!(out, "{n = 3, x3 = 2}");
    }

    #[test]
    fn registers_with_named_state() {
        let mut names = RegisterNames::new();
        names.insert(2u32, "n");
        names.insert(5u32, "A");
        // 2^3 * 5
        let out = render_registers(factors(40).iter(), &names, true);
        assert_eq!(out, "[A] {n = 3}");
    }

    #[test]
    fn registers_guess_single_unnamed_state() {
        let mut names = RegisterNames::new();
        names.insert(2u32, "n");
        // 2^3 * 7
        let out = render_registers(factors(56).iter(), &names, true);
        assert_eq!(out, "[E7] {n = 3}");
    }

    #[test]
    fn registers_ambiguous_state() {
        let names = RegisterNames::new();
        // 3 * 7: two unnamed singletons
        let out = render_registers(factors(21).iter(), &names, true);
        assert_eq!(out, "[?] {x3 = 1, x7 = 1}");
        assert_eq!(render_registers(factors(1).iter(), &names, true), "[?] {}");
    }
}
