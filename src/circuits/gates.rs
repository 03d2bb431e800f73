//! Gate library.
//!
//! Every gate is a program fragment wired between a `begin` and an `end`
//! control state. Started in `begin`, a gate performs its register
//! transformation and leaves the machine in `end`. Gates that need internal
//! control states or scratch registers draw them from the [`Allocator`];
//! scratch registers are always back at zero when `end` is reached.
//!
//! All arithmetic is over naturals: decrementing zero leaves zero.
//!
//! Fragments compose by concatenation. Rules are listed so that, for any
//! reachable configuration, the first applicable rule is the one intended:
//! rules of the same state are ordered from the most specific guard to the
//! bare state.

use crate::circuits::symbol::{Allocator, State, Term, Var};
use crate::machine::errors::FractranError;
use crate::machine::program::{Fraction, Program};

/// Builds a program from `(numerator, denominator)` pairs.
macro_rules! rules {
    ($(($num:expr, $den:expr)),* $(,)?) => {
        Program::from(vec![$(Fraction::new($num, $den)),*])
    };
}

/// `dst += src`, `src` unchanged.
pub fn accumulate(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    dst: Var,
    src: Var,
) -> Result<Program, FractranError> {
    let [e1, e2, e3] = alloc.next_states()?;
    let z = alloc.next_var()?;
    Ok(rules![
        // move src into z
        (z * e1, src * begin),
        (begin, e1),
        (e2, begin),
        // move z back into src and dst
        (dst * src * e3, z * e2),
        (e2, e3),
        (end, e2),
    ])
}

/// `dst += src`, `src = 0`.
pub fn accumulate_and_destroy(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    dst: Var,
    src: Var,
) -> Result<Program, FractranError> {
    let e = alloc.next_state()?;
    Ok(rules![(dst * e, src * begin), (begin, e), (end, begin)])
}

/// `dst = x + y`, `x` and `y` unchanged.
pub fn add(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    dst: Var,
    x: Var,
    y: Var,
) -> Result<Program, FractranError> {
    let [e1, e2, e3] = alloc.next_states()?;
    let [u, v] = alloc.next_vars()?;
    Ok(rules![
        (e1, dst * begin),
        (u * e1, x * begin),
        (v * e1, y * begin),
        (begin, e1),
        (e2, begin),
        (x * dst * e3, u * e2),
        (y * dst * e3, v * e2),
        (e2, e3),
        (end, e2),
    ])
}

/// `dst = src`, `src` unchanged.
pub fn copy(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    dst: Var,
    src: Var,
) -> Result<Program, FractranError> {
    let [e1, e2, e3] = alloc.next_states()?;
    let z = alloc.next_var()?;
    Ok(rules![
        // clear dst while moving src into z
        (e1, dst * begin),
        (z * e1, src * begin),
        (begin, e1),
        (e2, begin),
        (dst * src * e3, z * e2),
        (e2, e3),
        (end, e2),
    ])
}

/// `x += k` in a single rule.
pub fn increment_times(begin: State, end: State, x: Var, k: u32) -> Program {
    rules![(x.pow(k) * end, begin)]
}

pub fn increment(begin: State, end: State, x: Var) -> Program {
    increment_times(begin, end, x, 1)
}

/// `x = max(0, x - 1)`.
pub fn decrement(begin: State, end: State, x: Var) -> Program {
    rules![(end, x * begin), (end, begin)]
}

/// Goes to `on_true` with `x - 1` when `x > 0`, else to `on_false`.
pub fn branch_then_decrement(begin: State, on_true: State, on_false: State, x: Var) -> Program {
    rules![(on_true, x * begin), (on_false, begin)]
}

/// Goes to `on_true` when `x > 0`, else to `on_false`. `x` is unchanged.
pub fn branch(
    alloc: &mut Allocator,
    begin: State,
    on_true: State,
    on_false: State,
    x: Var,
) -> Result<Program, FractranError> {
    let e = alloc.next_state()?;
    Ok(rules![(e, x * begin), (on_false, begin), (x * on_true, e)])
}

/// Goes to `on_true` when `x > y`, else to `on_false`.
///
/// Destructive: both operands lose `min(x, y)`, and `x` loses one more on
/// the true side. Callers compare copies.
pub fn branch_gt(
    alloc: &mut Allocator,
    begin: State,
    on_true: State,
    on_false: State,
    x: Var,
    y: Var,
) -> Result<Program, FractranError> {
    let e = alloc.next_state()?;
    Ok(rules![
        (e, x * y * begin),
        (begin, e),
        (on_true, x * begin),
        (on_false, begin),
    ])
}

/// Unconditional jump. Does nothing unless the machine is in `begin`.
pub fn goto(begin: State, end: State) -> Program {
    rules![(end, begin)]
}

/// `x = 0`.
pub fn clear(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    x: Var,
) -> Result<Program, FractranError> {
    let e = alloc.next_state()?;
    Ok(rules![(e, x * begin), (begin, e), (end, begin)])
}

/// Drains a symbol whatever the control state.
///
/// Placed after the rules that use the symbol, this retires a scratch
/// register or the terminal control state so no stray exponent survives.
pub fn destroy(symbol: impl Into<Term>) -> Program {
    rules![(Term::one(), symbol)]
}

/// `quotient = n / d` and `remainder = n % d` for `d > 0`; `n` and `d` are
/// unchanged.
///
/// Works on scratch copies of both operands: `d2` is counted down against
/// `n2`, and every time it empties the quotient grows by one and `d2` is
/// refilled from the remainder register.
pub fn euclidean_division(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    n: Var,
    d: Var,
    quotient: Var,
    remainder: Var,
) -> Result<Program, FractranError> {
    let [z1, z2, z3, a0, a2, x1, x2, t1, t2] = alloc.next_states()?;
    let [n2, d2] = alloc.next_vars()?;
    let (q, r) = (quotient, remainder);

    Ok(Program::concat([
        copy(alloc, begin, z1, n2, n)?,
        copy(alloc, z1, z2, d2, d)?,
        rules![
            // clear both outputs
            (z3, q * z2),
            (z3, r * z2),
            (z2, z3),
            (a0, z2),
            // subtract one from n2 and d2, counting it in r
            (r * a2, n2 * d2 * a0),
            (a0, a2),
            // n2 ran out first: r holds the remainder
            (x1, d2 * a0),
            // d2 ran out: one more in the quotient, refill d2 from r
            (q * t1, a0),
            (d2 * t2, r * t1),
            (t1, t2),
            (a0, t1),
            (x2, d2 * x1),
            (x1, x2),
            (end, x1),
        ],
        destroy(n2),
        destroy(d2),
    ]))
}

/// `o = x * y`, `x` and `y` unchanged.
pub fn multiply(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    x: Var,
    y: Var,
    o: Var,
) -> Result<Program, FractranError> {
    let [z1, z2, z3, a0, a2, t1, t2] = alloc.next_states()?;
    let [x2, y2, p] = alloc.next_vars()?;

    Ok(Program::concat([
        copy(alloc, begin, z1, x2, x)?,
        copy(alloc, z1, z2, y2, y)?,
        rules![
            (z3, o * z2),
            (z2, z3),
            (a0, z2),
            // refill y2 from p
            (y2 * a2, p * a0),
            // one pass: add y2 into o, parking it in p
            (t1, x2 * a0),
            // x2 exhausted: drain y2
            (a2, y2 * a0),
            (a0, a2),
            (o * p * t2, y2 * t1),
            (t1, t2),
            (a0, t1),
            (end, a0),
        ],
        destroy(x2),
        destroy(y2),
        destroy(p),
    ]))
}

/// `dst = dst * src`, `src` unchanged. `dst` and `src` may be the same register.
pub fn multiply_on(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    dst: Var,
    src: Var,
) -> Result<Program, FractranError> {
    let e = alloc.next_state()?;
    let temp = alloc.next_var()?;
    Ok(Program::concat([
        multiply(alloc, begin, e, dst, src, temp)?,
        copy(alloc, e, end, dst, temp)?,
        destroy(temp),
    ]))
}
