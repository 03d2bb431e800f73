//! Rewrite rules, programs, and the program text format.
//!
//! A [`Program`] is an ordered list of [`Fraction`]s. The text format holds one
//! rule per line:
//!
//! ```text
//! <numerator> / <denominator>   # optional comment
//! ```
//!
//! - Both operands are positive decimal integers of any size
//! - Whitespace around operands is ignored
//! - Blank lines and `#` comments are skipped
//! - Line order is significant: the first applicable rule wins

use crate::circuits::symbol::Term;
use crate::machine::errors::FractranError;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt::{self, Write};
use std::fs;
use std::path::Path;
use std::str::FromStr;

const COMMENT_CHAR: char = '#';
const SEPARATOR: char = '/';

/// One rewrite rule `numerator / denominator`.
///
/// Applies to a configuration `n` when `n * numerator` is divisible by
/// `denominator`, rewriting it to `n * numerator / denominator`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: BigUint,
    denominator: BigUint,
}

impl Fraction {
    /// Builds a rule from symbol products.
    pub fn new(numerator: impl Into<Term>, denominator: impl Into<Term>) -> Self {
        Self {
            numerator: numerator.into().into_inner(),
            denominator: denominator.into().into_inner(),
        }
    }

    /// Builds a rule from raw integers, rejecting zero operands.
    pub fn try_new(numerator: BigUint, denominator: BigUint) -> Result<Self, FractranError> {
        if numerator.is_zero() {
            return Err(FractranError::ZeroTerm { part: "numerator" });
        }
        if denominator.is_zero() {
            return Err(FractranError::ZeroTerm {
                part: "denominator",
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {SEPARATOR} {}", self.numerator, self.denominator)
    }
}

impl FromStr for Fraction {
    type Err = FractranError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s).map_err(|(_, e)| e)
    }
}

/// Parse a decimal natural; rejects signs, separators and empty tokens.
fn parse_natural(tok: &str) -> Result<BigUint, FractranError> {
    let invalid = || FractranError::InvalidInteger {
        token: tok.to_string(),
    };
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    tok.parse::<BigUint>().map_err(|_| invalid())
}

/// Parse one rule line (comment already stripped).
///
/// On failure returns the 1-based column of the offending token with the error.
fn parse_rule(line: &str) -> Result<Fraction, (usize, FractranError)> {
    let first_col = line.len() - line.trim_start().len() + 1;
    let Some((lhs, rhs)) = line.split_once(SEPARATOR) else {
        return Err((first_col, FractranError::MissingSeparator));
    };

    let rhs_start = lhs.len() + SEPARATOR.len_utf8();
    if let Some(extra) = rhs.find(SEPARATOR) {
        return Err((rhs_start + extra + 1, FractranError::ExtraSeparator));
    }

    let num_col = lhs.len() - lhs.trim_start().len() + 1;
    let den_col = rhs_start + rhs.len() - rhs.trim_start().len() + 1;

    let numerator = parse_natural(lhs.trim()).map_err(|e| (num_col, e))?;
    let denominator = parse_natural(rhs.trim()).map_err(|e| (den_col, e))?;

    if numerator.is_zero() {
        return Err((num_col, FractranError::ZeroTerm { part: "numerator" }));
    }
    if denominator.is_zero() {
        return Err((
            den_col,
            FractranError::ZeroTerm {
                part: "denominator",
            },
        ));
    }

    Ok(Fraction {
        numerator,
        denominator,
    })
}

/// Formats a compiler-style diagnostic for program parse failures.
fn render_parse_diagnostic(
    file: &str,
    source: &str,
    line: usize,
    offset: usize,
    message: &str,
) -> String {
    let mut diag = String::new();
    let _ = writeln!(diag, "error: {message}");
    let _ = writeln!(diag, " --> {file}:{line}:{offset}");

    if let Some(raw_line) = source.lines().nth(line.saturating_sub(1)) {
        let line_text = raw_line.trim_end_matches('\r');
        let underline = " ".repeat(offset.saturating_sub(1));
        let _ = writeln!(diag, "  |");
        let _ = writeln!(diag, "{:>4} | {}", line, line_text);
        let _ = writeln!(diag, "  | {}^", underline);
    }

    diag
}

/// Ordered list of rewrite rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    rules: Vec<Fraction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenates program fragments in order.
    pub fn concat(parts: impl IntoIterator<Item = Program>) -> Program {
        let mut out = Program::new();
        for part in parts {
            out.append(part);
        }
        out
    }

    pub fn rules(&self) -> &[Fraction] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fraction> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn push(&mut self, rule: Fraction) {
        self.rules.push(rule);
    }

    /// Moves every rule of `other` to the end of this program.
    pub fn append(&mut self, mut other: Program) {
        self.rules.append(&mut other.rules);
    }

    /// Parses program text.
    ///
    /// Fails on the first malformed line with [`FractranError::ParseError`];
    /// no partial program is returned.
    pub fn parse(source: &str) -> Result<Program, FractranError> {
        let mut rules = Vec::new();
        for (line_no, raw) in source.lines().enumerate() {
            let line = match raw.find(COMMENT_CHAR) {
                Some(i) => &raw[..i],
                None => raw,
            };
            if line.trim().is_empty() {
                continue;
            }
            let rule = parse_rule(line).map_err(|(offset, e)| FractranError::ParseError {
                line: line_no + 1,
                offset,
                message: e.to_string(),
            })?;
            rules.push(rule);
        }
        Ok(Program { rules })
    }

    /// Reads and parses a program file.
    ///
    /// Parse failures are also reported to stderr as a diagnostic pointing at
    /// the offending line and column.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Program, FractranError> {
        let path_ref = path.as_ref();
        let source = fs::read_to_string(path_ref).map_err(|e| FractranError::IoError {
            path: path_ref.display().to_string(),
            reason: e.to_string(),
        })?;

        let result = Program::parse(&source);
        if let Err(FractranError::ParseError {
            line,
            offset,
            message,
        }) = &result
        {
            eprintln!(
                "{}",
                render_parse_diagnostic(
                    &path_ref.display().to_string(),
                    &source,
                    *line,
                    *offset,
                    message
                )
            );
        }
        result
    }

    /// Writes the program in text form, one rule per line.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FractranError> {
        let path_ref = path.as_ref();
        fs::write(path_ref, self.to_string()).map_err(|e| FractranError::IoError {
            path: path_ref.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = FractranError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

impl From<Vec<Fraction>> for Program {
    fn from(rules: Vec<Fraction>) -> Self {
        Self { rules }
    }
}

impl FromIterator<Fraction> for Program {
    fn from_iter<I: IntoIterator<Item = Fraction>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Fraction;
    type IntoIter = std::slice::Iter<'a, Fraction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
