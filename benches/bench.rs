use criterion::{Criterion, criterion_group, criterion_main};
use std::fmt::Debug;
use std::hint::black_box;
use std::marker::PhantomData;
use std::time::Duration;
use tiny_sat::sat::cnf::Cnf;
use tiny_sat::sat::dpll::Dpll;
use tiny_sat::sat::enumerate::Enumerator;
use tiny_sat::sat::propagation::UnitSearch;
use tiny_sat::sat::solver::{DefaultConfig, Solver, SolverConfig};
use tiny_sat::sat::variable_selection::{FirstUnsatisfied, FixedOrder, VariableSelection};
use tiny_sat::sudoku::solver::{EXAMPLE_NINE, Sudoku};

#[derive(Debug, Clone)]
struct SelectorConfig<V: VariableSelection>(PhantomData<V>);

impl<V: VariableSelection + Debug> SolverConfig for SelectorConfig<V> {
    type Propagator = UnitSearch;
    type VariableSelector = V;
}

/// Uniform random 3-SAT at the 4.26 clause/variable threshold.
fn random_3sat(rng: &mut fastrand::Rng, num_vars: usize) -> Cnf {
    let num_clauses = num_vars * 426 / 100;
    let max = i32::try_from(num_vars).unwrap();
    let clauses = (0..num_clauses).map(|_| {
        (0..3)
            .map(|_| {
                let var = rng.i32(1..=max);
                if rng.bool() { var } else { -var }
            })
            .collect::<Vec<_>>()
    });
    Cnf::new(num_vars, clauses.collect::<Vec<_>>()).unwrap()
}

fn bench_sudoku(c: &mut Criterion) {
    let cnf = Sudoku::try_from(EXAMPLE_NINE).unwrap().to_cnf().unwrap();

    let mut group = c.benchmark_group("sudoku - variable selection");
    group.sample_size(20);

    group.bench_function("FirstUnsatisfied", |b| {
        b.iter(|| {
            let mut state: Dpll<SelectorConfig<FirstUnsatisfied>> = Solver::new(&cnf);
            black_box(state.solve());
        })
    });

    group.bench_function("FixedOrder", |b| {
        b.iter(|| {
            let mut state: Dpll<SelectorConfig<FixedOrder>> = Solver::new(&cnf);
            black_box(state.solve());
        })
    });

    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let cnf = Sudoku::try_from([[0; 4]; 4]).unwrap().to_cnf().unwrap();

    let mut group = c.benchmark_group("enumeration");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("empty 4x4 sudoku, all 288 grids", |b| {
        b.iter(|| {
            let result = Enumerator::<DefaultConfig>::new(&cnf).run();
            black_box(result.models.len());
        })
    });

    group.finish();
}

fn bench_3sat(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let cnfs: Vec<Cnf> = (0..50).map(|_| random_3sat(&mut rng, 30)).collect();

    let mut group = c.benchmark_group("3sat - variable selection");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("FirstUnsatisfied", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let mut state: Dpll<SelectorConfig<FirstUnsatisfied>> = Solver::new(cnf);
                black_box(state.solve());
            }
        })
    });

    group.bench_function("FixedOrder", |b| {
        b.iter(|| {
            for cnf in &cnfs {
                let mut state: Dpll<SelectorConfig<FixedOrder>> = Solver::new(cnf);
                black_box(state.solve());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_sudoku, bench_enumeration, bench_3sat);

criterion_main!(benches);
