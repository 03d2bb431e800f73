//! Complete automata composed from gates.
//!
//! Each automaton threads gate fragments from `begin` to `end`, allocating a
//! fresh control state per intermediate step and fresh scratch registers for
//! loop-carried temporaries. Scratch registers are destroyed at the end of
//! the fragment. The returned fragment stops in `end`; wrap it with
//! [`terminate`] to get a standalone program.

use crate::circuits::gates::{
    accumulate, add, branch, branch_gt, branch_then_decrement, clear, copy, decrement, destroy,
    euclidean_division, goto, increment, increment_times, multiply_on,
};
use crate::circuits::symbol::{Allocator, State, Var};
use crate::machine::errors::FractranError;
use crate::machine::program::Program;

/// Appends the rule that retires the terminal control state, so a halted
/// run leaves only register exponents behind.
pub fn terminate(mut fragment: Program, end: State) -> Program {
    fragment.append(destroy(end));
    fragment
}

/// `o = 1 + 2 + ... + i`. Leaves `i` at zero.
pub fn sum(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    i: Var,
    o: Var,
) -> Result<Program, FractranError> {
    let [e0, e1, e2, e3] = alloc.next_states()?;
    Ok(Program::concat([
        clear(alloc, begin, e0, o)?,
        goto(e0, e1),
        branch(alloc, e1, e2, end, i)?,
        accumulate(alloc, e2, e3, o, i)?,
        branch_then_decrement(e3, e1, end, i),
    ]))
}

/// `o = fib(n + 1)` with `fib(1) = fib(2) = 1`, so `n = 0` gives 1 and `n = 6`
/// gives 13. Leaves `n` at zero.
pub fn fibonacci(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    n: Var,
    o: Var,
) -> Result<Program, FractranError> {
    let [e0, e1, e2, e3, e4, e5] = alloc.next_states()?;
    let [prev, next] = alloc.next_vars()?;
    let cur = o;
    Ok(Program::concat([
        clear(alloc, begin, e0, cur)?,
        increment(e0, e1, cur),
        branch_then_decrement(e1, e2, end, n),
        add(alloc, e2, e3, next, prev, cur)?,
        copy(alloc, e3, e4, prev, cur)?,
        copy(alloc, e4, e5, cur, next)?,
        goto(e5, e1),
        destroy(prev),
        destroy(next),
    ]))
}

/// `o` = number of Collatz steps taken by `n` to reach 1.
///
/// Halting for every `n` is exactly the Collatz conjecture; run it under a
/// step budget. `n` is left at zero.
pub fn collatz(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    n: Var,
    o: Var,
) -> Result<Program, FractranError> {
    let [two, three, q, r] = alloc.next_vars()?;
    let [e0, e1, e2, e3, e4, e5, e6, e7, e8, e9, e10] = alloc.next_states()?;
    let steps = o;
    Ok(Program::concat([
        clear(alloc, begin, e0, steps)?,
        increment_times(e0, e1, two, 2),
        increment_times(e1, e2, three, 3),
        // n <= 1 ends the run
        branch_then_decrement(e2, e3, end, n),
        branch(alloc, e3, e4, end, n)?,
        increment(e4, e5, n),
        increment(e5, e6, steps),
        euclidean_division(alloc, e6, e7, n, two, q, r)?,
        // odd: n = 3n + 1
        branch_then_decrement(e7, e8, e10, r),
        multiply_on(alloc, e8, e9, n, three)?,
        increment(e9, e2, n),
        // even: n = n / 2
        copy(alloc, e10, e2, n, q)?,
        destroy(two),
        destroy(three),
        destroy(q),
        destroy(r),
    ]))
}

/// `o = floor(sqrt(n))`. `n` is unchanged.
pub fn sqrt(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    n: Var,
    o: Var,
) -> Result<Program, FractranError> {
    let [e0, e1, e2, e3, e4, e5, e6, e7] = alloc.next_states()?;
    let [t, m] = alloc.next_vars()?;
    let root = o;
    Ok(Program::concat([
        clear(alloc, begin, e0, root)?,
        increment(e0, e1, root),
        // t = root^2 - 1, m = n
        copy(alloc, e1, e2, t, root)?,
        copy(alloc, e2, e3, m, n)?,
        multiply_on(alloc, e3, e4, t, t)?,
        decrement(e4, e5, t),
        // n >= root^2: try the next root
        branch_gt(alloc, e5, e6, e7, m, t)?,
        increment(e6, e1, root),
        decrement(e7, end, root),
        destroy(t),
        destroy(m),
    ]))
}

/// `n = n!` for `n >= 1`. Zero is left at zero.
pub fn factorial(
    alloc: &mut Allocator,
    begin: State,
    end: State,
    n: Var,
) -> Result<Program, FractranError> {
    let [e1, e2, e3, e4] = alloc.next_states()?;
    let m = alloc.next_var()?;
    Ok(Program::concat([
        copy(alloc, begin, e1, m, n)?,
        decrement(e1, e2, m),
        branch(alloc, e2, e3, end, m)?,
        multiply_on(alloc, e3, e4, n, m)?,
        decrement(e4, e2, m),
        destroy(m),
    ]))
}
