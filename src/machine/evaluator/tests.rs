use super::*;
use crate::machine::notation::parse_configuration;
use crate::machine::program::Fraction;
use num_traits::Pow;

const MODES: [Mode; 2] = [Mode::Direct, Mode::Register];

/// Conway's prime-generating program.
const PRIMEGAME: &str = "17/91\n78/85\n19/51\n23/38\n29/33\n77/29\n95/23\n77/19\n1/17\n11/13\n13/11\n15/2\n1/7\n55/1";

/// 2^a * 3^b -> 5^(a*b)
const MULTIPLY: &str = "455/33\n11/13\n1/11\n3/7\n11/2\n1/3";

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

fn pow(base: u64, exp: u64) -> BigUint {
    Pow::pow(&big(base), exp)
}

fn program(text: &str) -> Program {
    Program::parse(text).unwrap()
}

fn run(program: &Program, mode: Mode, input: &BigUint) -> Outcome {
    Evaluator::new(program).with_mode(mode).run(input).unwrap()
}

fn trace(program: &Program, mode: Mode, input: &BigUint, limit: Option<u64>) -> Vec<BigUint> {
    let mut seen = Vec::new();
    let mut observe = |snap: Snapshot<'_>| seen.push(snap.configuration());
    Evaluator::new(program)
        .with_mode(mode)
        .with_step_limit(limit)
        .run_traced(input, &mut observe)
        .unwrap();
    seen
}

#[test]
fn adder_moves_one_register_into_another() {
    let p = program("3 / 2");
    for mode in MODES {
        for a in 0..6 {
            for b in 0..6 {
                let out = run(&p, mode, &(pow(2, a) * pow(3, b)));
                assert_eq!(out.state(), &pow(3, a + b), "{mode:?} a={a} b={b}");
                assert_eq!(out.steps(), a);
                assert!(out.is_halted());
            }
        }
    }
}

#[test]
fn multiplication_program() {
    let p = program(MULTIPLY);
    for mode in MODES {
        for a in 0..5 {
            for b in 0..5 {
                let out = run(&p, mode, &(pow(2, a) * pow(3, b)));
                assert_eq!(out.into_state(), pow(5, a * b), "{mode:?} a={a} b={b}");
            }
        }
    }
}

#[test]
fn modes_visit_identical_configurations() {
    let p = program(MULTIPLY);
    let input = pow(2, 3) * pow(3, 4);
    let direct = trace(&p, Mode::Direct, &input, None);
    let registers = trace(&p, Mode::Register, &input, None);
    assert_eq!(direct, registers);
    assert_eq!(direct.last(), Some(&pow(5, 12)));
}

#[test]
fn primegame_reaches_four_after_nineteen_steps() {
    let p = program(PRIMEGAME);
    let expected: Vec<BigUint> = [
        2u64, 15, 825, 725, 1925, 2275, 425, 390, 330, 290, 770, 910, 170, 156, 132, 116, 308, 364,
        68, 4,
    ]
    .into_iter()
    .map(big)
    .collect();

    for mode in MODES {
        let out = Evaluator::new(&p)
            .with_mode(mode)
            .with_step_limit(Some(19))
            .run(&big(2))
            .unwrap();
        assert_eq!(
            out,
            Outcome::Inconclusive {
                state: big(4),
                steps: 19
            }
        );
        assert_eq!(trace(&p, mode, &big(2), Some(19)), expected, "{mode:?}");
    }
}

#[test]
fn unreduced_fractions_agree() {
    // 6 / 4 fires on 2 although 4 does not divide 2.
    let p = program("6 / 4");
    for mode in MODES {
        assert_eq!(run(&p, mode, &big(2)).into_state(), big(3), "{mode:?}");
    }

    let p = program("12 / 8");
    for mode in MODES {
        let out = run(&p, mode, &pow(2, 5));
        assert_eq!(out.state(), &pow(3, 5));
        assert_eq!(out.steps(), 5);
    }
}

#[test]
fn pseudo_random_programs_agree() {
    const PRIMES: [u64; 5] = [2, 3, 5, 7, 11];
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) as usize
    };

    for _ in 0..60 {
        let term = |next: &mut dyn FnMut() -> usize| {
            let mut t = BigUint::from(1u32);
            for _ in 0..next() % 4 {
                t *= big(PRIMES[next() % PRIMES.len()]);
            }
            t
        };
        let rules: Vec<Fraction> = (0..1 + next() % 5)
            .map(|_| {
                let num = term(&mut next);
                let den = term(&mut next);
                Fraction::try_new(num, den).unwrap()
            })
            .collect();
        let p = Program::from(rules);
        let input = term(&mut next) * term(&mut next);

        let outcomes: Vec<Outcome> = MODES
            .iter()
            .map(|&mode| {
                Evaluator::new(&p)
                    .with_mode(mode)
                    .with_step_limit(Some(200))
                    .run(&input)
                    .unwrap()
            })
            .collect();
        assert_eq!(outcomes[0], outcomes[1], "program:\n{p}input: {input}");
    }
}

#[test]
fn step_budget_zero() {
    let p = program("3 / 2");
    for mode in MODES {
        let ev = Evaluator::new(&p).with_mode(mode).with_step_limit(Some(0));
        assert_eq!(
            ev.run(&big(2)).unwrap(),
            Outcome::Inconclusive {
                state: big(2),
                steps: 0
            }
        );
        assert_eq!(
            ev.run(&big(9)).unwrap(),
            Outcome::Halted {
                state: big(9),
                steps: 0
            }
        );
    }
}

#[test]
fn budget_equal_to_run_length_halts() {
    let p = program("3 / 2");
    for mode in MODES {
        let out = Evaluator::new(&p)
            .with_mode(mode)
            .with_step_limit(Some(3))
            .run(&big(8))
            .unwrap();
        assert!(out.is_halted());
        assert_eq!(out.state(), &big(27));
    }
}

#[test]
fn non_terminating_program_is_inconclusive() {
    // 1 / 1 applies to every configuration.
    let p = program("1 / 1");
    for mode in MODES {
        let out = Evaluator::new(&p)
            .with_mode(mode)
            .with_step_limit(Some(1_000))
            .run(&big(7))
            .unwrap();
        assert!(!out.is_halted());
        assert_eq!(out.steps(), 1_000);
        assert_eq!(out.state(), &big(7));
    }
}

#[test]
fn observer_sees_every_step_and_the_halt() {
    let p = program("3 / 2");
    for mode in MODES {
        let seen = trace(&p, mode, &pow(2, 4), None);
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], pow(2, 4));
        assert_eq!(seen[4], pow(3, 4));
    }
}

#[test]
fn observer_does_not_change_result() {
    let p = program(MULTIPLY);
    let input = pow(2, 2) * pow(3, 3);
    for mode in MODES {
        let mut calls = 0u64;
        let mut count = |_: Snapshot<'_>| calls += 1;
        let traced = Evaluator::new(&p)
            .with_mode(mode)
            .run_traced(&input, &mut count)
            .unwrap();
        assert_eq!(traced, run(&p, mode, &input));
        assert_eq!(calls, traced.steps() + 1);
    }
}

#[test]
fn register_snapshot_exposes_exponents() {
    let p = program("3 / 2");
    let mut first = None;
    let mut grab = |snap: Snapshot<'_>| {
        if first.is_none()
            && let Snapshot::Registers(regs) = snap
        {
            first = Some((regs.get(&big(2)), regs.get(&big(3))));
        }
    };
    Evaluator::new(&p)
        .with_mode(Mode::Register)
        .run_traced(&(pow(2, 7) * big(3)), &mut grab)
        .unwrap();
    assert_eq!(first, Some((7, 1)));
}

#[test]
fn empty_program_halts_immediately() {
    let p = Program::new();
    for mode in MODES {
        let out = run(&p, mode, &big(12));
        assert_eq!(
            out,
            Outcome::Halted {
                state: big(12),
                steps: 0
            }
        );
        assert_eq!(trace(&p, mode, &big(12), None).len(), 1);
    }
}

#[test]
fn zero_configuration_is_rejected() {
    let p = program("3 / 2");
    for mode in MODES {
        assert!(matches!(
            Evaluator::new(&p).with_mode(mode).run(&big(0)),
            Err(FractranError::ZeroConfiguration)
        ));
    }
}

#[test]
fn first_matching_rule_wins() {
    // Both rules apply to 6; only the first may fire.
    let p = program("5 / 2\n7 / 3");
    for mode in MODES {
        assert_eq!(run(&p, mode, &big(6)).into_state(), big(35));
    }
    let p = program("7 / 3\n5 / 2");
    for mode in MODES {
        let out = run(&p, mode, &big(6));
        assert_eq!(out.state(), &big(35));
        assert_eq!(out.steps(), 2);
    }
    let p = program("5 / 6\n7 / 3");
    for mode in MODES {
        assert_eq!(run(&p, mode, &big(6)).into_state(), big(5));
    }
    let p = program("7 / 3\n5 / 6");
    for mode in MODES {
        assert_eq!(run(&p, mode, &big(6)).into_state(), big(14));
    }
}

#[test]
fn large_registers() {
    let p = program("3 / 2");
    let input = parse_configuration("2^2000 * 5").unwrap();
    let expected = parse_configuration("3^2000 * 5").unwrap();
    for mode in MODES {
        assert_eq!(evaluate(&p, &input, mode).unwrap(), expected);
    }
}

#[test]
fn mode_names() {
    assert_eq!(Mode::default(), Mode::Direct);
    assert_eq!("register".parse::<Mode>(), Ok(Mode::Register));
    assert_eq!("direct".parse::<Mode>(), Ok(Mode::Direct));
    assert!("fast".parse::<Mode>().is_err());
    assert_eq!(Mode::Register.as_str(), "register");
    assert_eq!(Evaluator::new(&Program::new()).mode(), Mode::Direct);
}
