use thiserror::Error;

/// Errors raised while loading, compiling or evaluating FRACTRAN programs.
#[derive(Debug, Error)]
pub enum FractranError {
    /// A rule line is missing its `/` separator.
    #[error("expected `<numerator> / <denominator>`")]
    MissingSeparator,
    /// A rule line contains more than one `/`.
    #[error("unexpected `/` after the denominator")]
    ExtraSeparator,
    /// A rule operand is not a decimal natural number.
    #[error("invalid integer '{token}'")]
    InvalidInteger { token: String },
    /// A rule has a zero numerator or denominator.
    #[error("{part} must be a positive integer")]
    ZeroTerm { part: &'static str },
    /// A rule line failed to parse; wraps one of the variants above with its position.
    #[error("line {line}: {message}")]
    ParseError {
        line: usize,
        offset: usize,
        message: String,
    },
    /// A factor of the `p^e * q` state notation could not be parsed.
    #[error("invalid factor '{token}'")]
    InvalidFactor { token: String },
    /// The state notation contained no factor at all.
    #[error("empty state notation")]
    EmptyNotation,
    /// A bounded allocator ran out of fresh primes.
    #[error("symbol table exhausted after {issued} symbols")]
    SymbolExhausted { issued: usize },
    /// No circuit in the catalog has this name.
    #[error("unknown circuit '{name}'")]
    UnknownCircuit { name: String },
    /// More input values were given than the circuit has registers.
    #[error("{circuit} takes at most {expected} register values, got {got}")]
    ArityMismatch {
        circuit: &'static str,
        expected: usize,
        got: usize,
    },
    /// The machine state must be a positive integer.
    #[error("configuration must be a positive integer")]
    ZeroConfiguration,
    /// A cofactor is too large to be split by sieving.
    #[error("cannot factor {digits}-digit cofactor")]
    FactorizationOutOfRange { digits: usize },
    /// A register exponent grew past `u64::MAX`.
    #[error("register {prime} overflowed")]
    ExponentOverflow { prime: String },
    /// File I/O failure.
    #[error("io error on {path}: {reason}")]
    IoError { path: String, reason: String },
}
