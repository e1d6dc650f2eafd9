//! Randomised checks of the solver against brute force on small formulas.

use rustc_hash::FxHashSet;
use std::io::Cursor;
use tiny_sat::sat::assignment::Model;
use tiny_sat::sat::cnf::Cnf;
use tiny_sat::sat::dimacs::parse_dimacs;
use tiny_sat::sat::dpll::Dpll;
use tiny_sat::sat::enumerate::{EnumerationStatus, Enumerator};
use tiny_sat::sat::solver::{
    DefaultConfig, FixedOrderConfig, Solver, SolverConfig, solve_all, solve_one,
};
use tiny_sat::sudoku::solver::parse_sudoku;

const ROUNDS: usize = 300;

/// Largest formula checked against brute force.
const SOLVE_VARS: usize = 12;

/// Largest formula whose models are all enumerated. A formula with few
/// clauses over `n` variables has close to `2^n` of them.
const ENUMERATE_VARS: usize = 8;

/// Up to `max_vars` variables, up to `4n` clauses of 1 to 4 literals, and
/// now and then an empty clause.
fn random_cnf(rng: &mut fastrand::Rng, max_vars: usize) -> Cnf {
    let num_vars = rng.usize(1..=max_vars);
    let max = i32::try_from(num_vars).unwrap();
    let clauses: Vec<Vec<i32>> = (0..rng.usize(0..=4 * num_vars))
        .map(|_| {
            let len = if rng.u8(..) == 0 { 0 } else { rng.usize(1..=4) };
            (0..len)
                .map(|_| {
                    let var = rng.i32(1..=max);
                    if rng.bool() { var } else { -var }
                })
                .collect()
        })
        .collect();
    Cnf::new(num_vars, clauses).unwrap()
}

/// Every satisfying assignment, by trying all `2^n` of them.
fn brute_force(cnf: &Cnf) -> FxHashSet<Model> {
    (0..1u32 << cnf.num_vars())
        .map(|bits| {
            let values: Vec<bool> = (0..cnf.num_vars()).map(|i| (bits >> i) & 1 == 1).collect();
            Model::from_values(&values)
        })
        .filter(|model| cnf.verify(model))
        .collect()
}

fn check_sound_and_complete<Config: SolverConfig>(cnf: &Cnf, models: &FxHashSet<Model>) {
    let outcome = Dpll::<Config>::new(cnf).solve();
    assert!(!outcome.is_aborted());
    match outcome.model() {
        Some(model) => {
            assert!(cnf.verify(model), "unsound model {model} for\n{cnf}");
            assert!(models.contains(model));
        }
        None => assert!(models.is_empty(), "missed a model of\n{cnf}"),
    }
}

#[test]
fn test_sound_and_complete() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut widest = 0;
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, SOLVE_VARS);
        widest = widest.max(cnf.num_vars());
        let models = brute_force(&cnf);
        check_sound_and_complete::<DefaultConfig>(&cnf, &models);
        check_sound_and_complete::<FixedOrderConfig>(&cnf, &models);
        assert_eq!(solve_one(&cnf).is_some(), !models.is_empty());
    }
    assert_eq!(widest, SOLVE_VARS);
}

#[test]
fn test_enumeration_matches_brute_force() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, ENUMERATE_VARS);
        let expected = brute_force(&cnf);

        let found = solve_all(&cnf, None);
        let distinct: FxHashSet<Model> = found.iter().cloned().collect();
        assert_eq!(distinct.len(), found.len(), "duplicate model for\n{cnf}");
        assert_eq!(distinct, expected);

        let fixed = Enumerator::<FixedOrderConfig>::new(&cnf).run();
        assert_eq!(fixed.status, EnumerationStatus::Exhausted);
        assert_eq!(fixed.models.into_iter().collect::<FxHashSet<_>>(), expected);
    }
}

#[test]
fn test_enumeration_limit() {
    let mut rng = fastrand::Rng::with_seed(13);
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, SOLVE_VARS);
        let total = brute_force(&cnf).len();
        let limit = rng.usize(0..=4);

        let found = solve_all(&cnf, Some(limit));
        assert_eq!(found.len(), limit.min(total));
        assert!(found.iter().all(|model| cnf.verify(model)));
    }
}

#[test]
fn test_blocking_clause_excludes_model() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, SOLVE_VARS);
        let Some(model) = solve_one(&cnf) else {
            continue;
        };

        let mut blocked = cnf.clone();
        blocked
            .add_clause(model.blocking_clause().iter().map(|lit| lit.to_i32()))
            .unwrap();
        assert!(!blocked.verify(&model));
        assert_ne!(solve_one(&blocked), Some(model));
    }
}

#[test]
fn test_contradictory_units_are_unsat() {
    let mut rng = fastrand::Rng::with_seed(19);
    for _ in 0..ROUNDS {
        let mut cnf = random_cnf(&mut rng, SOLVE_VARS);
        let v = rng.i32(1..=i32::try_from(cnf.num_vars()).unwrap());
        cnf.add_clause([v]).unwrap();
        cnf.add_clause([-v]).unwrap();

        assert_eq!(solve_one(&cnf), None);
        assert!(solve_all(&cnf, None).is_empty());
    }
}

#[test]
fn test_repeated_solves_agree() {
    let mut rng = fastrand::Rng::with_seed(23);
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, SOLVE_VARS);
        let before = cnf.clone();

        let first = solve_one(&cnf);
        let second = solve_one(&cnf);
        assert_eq!(first, second);
        if let Some(model) = &first {
            assert!(cnf.verify(model));
        }
        assert_eq!(cnf, before);
    }
}

#[test]
fn test_dimacs_round_trip() {
    let mut rng = fastrand::Rng::with_seed(29);
    for _ in 0..ROUNDS {
        let cnf = random_cnf(&mut rng, SOLVE_VARS);
        let parsed = parse_dimacs(Cursor::new(cnf.to_string())).unwrap();
        assert_eq!(parsed, cnf);
    }
}

#[test]
fn test_sudoku_round_trip() {
    let puzzle = parse_sudoku(
        "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79",
    )
    .unwrap();

    let model = solve_one(&puzzle.to_cnf().unwrap()).unwrap();
    let solution = puzzle.decode(&model).unwrap();

    assert!(solution.is_solved());
    assert!(solution.agrees_with(&puzzle));
    for row in solution.iter() {
        let mut sorted = row.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=9).collect::<Vec<_>>());
    }
}
