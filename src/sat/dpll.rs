//! Defines the main DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! The `Dpll` struct decides a borrowed CNF formula by backtracking search:
//!
//! 1.  **Unit Propagation:** every clause that has become unit forces its
//!     remaining literal. A falsified clause is a conflict.
//! 2.  **Decision:** when propagation reaches a fixpoint and some clause is
//!     still unsatisfied, the configured `VariableSelection` policy picks a
//!     variable and the solver tries it `true` first.
//! 3.  **Backtracking:** after a conflict the solver undoes the trail down to
//!     the innermost decision still tried only `true`, and retries that
//!     variable `false`. When no such decision is left the formula is
//!     unsatisfiable.
//!
//! The recursion of the textbook algorithm is replaced by an explicit stack
//! of decision frames, one per decision level, and a trail of assignments.
//! Search depth is therefore bounded by the heap, not the call stack, and a
//! branch never sees assignments made by a sibling branch because the trail
//! is unwound before the sibling starts.
//!
//! The solver is generic over a `SolverConfig`, which selects the propagator
//! and the branching policy.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::interrupt::Interrupt;
use crate::sat::literal::{Literal, Variable};
use crate::sat::propagation::Propagator;
use crate::sat::solver::{DefaultConfig, SolutionStats, SolveOutcome, Solver, SolverConfig};
use crate::sat::trail::Trail;
use crate::sat::variable_selection::VariableSelection;
use log::{debug, trace};

/// An open decision: the variable and the polarity currently being tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    var: Variable,
    polarity: bool,
}

/// A DPLL solver over a borrowed formula.
///
/// All mutable search state (assignment, trail, decision frames) is owned by
/// the solver and rebuilt at the start of every `solve` call, so separate
/// solvers can run on separate threads against the same `Cnf`.
#[derive(Debug, Clone)]
pub struct Dpll<'a, Config: SolverConfig = DefaultConfig> {
    cnf: &'a Cnf,
    assignment: Assignment,
    trail: Trail,
    frames: Vec<Frame>,
    propagator: Config::Propagator,
    selector: Config::VariableSelector,
    interrupt: Interrupt,
    stats: SolutionStats,
}

impl<'a, Config: SolverConfig> Solver<'a> for Dpll<'a, Config> {
    fn new(cnf: &'a Cnf) -> Self {
        Self {
            cnf,
            assignment: Assignment::new(cnf.num_vars()),
            trail: Trail::new(cnf.num_vars()),
            frames: Vec::new(),
            propagator: Config::Propagator::new(cnf),
            selector: Config::VariableSelector::new(cnf),
            interrupt: Interrupt::never(),
            stats: SolutionStats::default(),
        }
    }

    /// Runs the search to completion, or until the interrupt fires.
    ///
    /// Each loop iteration is one search step: poll the interrupt, propagate,
    /// then either report a model, branch, or backtrack.
    fn solve(&mut self) -> SolveOutcome {
        self.reset();
        debug!(
            "dpll: {} clauses over {} variables",
            self.cnf.len(),
            self.cnf.num_vars()
        );

        let outcome = loop {
            if self.interrupt.is_triggered() {
                break SolveOutcome::Aborted;
            }

            match self
                .propagator
                .propagate(self.cnf, &mut self.trail, &mut self.assignment)
            {
                Ok(propagated) => self.stats.propagations += propagated,
                Err(conflict) => {
                    self.stats.conflicts += 1;
                    trace!(
                        "conflict on clause {} at level {}",
                        conflict.clause,
                        self.trail.decision_level()
                    );
                    if self.backtrack() {
                        continue;
                    }
                    break SolveOutcome::Unsatisfiable;
                }
            }

            if self.is_sat() {
                break SolveOutcome::Satisfiable(self.assignment.to_model());
            }

            match self.selector.pick(self.cnf, &self.assignment) {
                Some(var) => self.decide(var),
                // Unsatisfied clauses remain but none can be branched on.
                None if self.backtrack() => {}
                None => break SolveOutcome::Unsatisfiable,
            }
        };

        debug!(
            "dpll: {} after {} decisions, {} conflicts, {} propagations",
            match &outcome {
                SolveOutcome::Satisfiable(_) => "SAT",
                SolveOutcome::Unsatisfiable => "UNSAT",
                SolveOutcome::Aborted => "aborted",
            },
            self.stats.decisions,
            self.stats.conflicts,
            self.stats.propagations
        );

        outcome
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}

impl<Config: SolverConfig> Dpll<'_, Config> {
    /// Replaces the interrupt polled between search steps.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Current decision level of the search.
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.frames.len()
    }

    fn reset(&mut self) {
        self.trail.clear(&mut self.assignment);
        self.frames.clear();
        self.stats = SolutionStats::default();
        self.propagator = Config::Propagator::new(self.cnf);
        self.selector = Config::VariableSelector::new(self.cnf);
    }

    /// Opens a new decision level with `var` tried `true`.
    fn decide(&mut self, var: Variable) {
        self.stats.decisions += 1;
        self.frames.push(Frame {
            var,
            polarity: true,
        });
        self.stats.max_depth = self.stats.max_depth.max(self.frames.len());
        trace!("decide {var} at level {}", self.frames.len());
        self.trail
            .decide(Literal::new(var, true), &mut self.assignment);
    }

    /// Unwinds to the innermost decision whose `false` branch is still open
    /// and enters that branch. Returns `false` when every decision has been
    /// tried both ways.
    fn backtrack(&mut self) -> bool {
        while let Some(frame) = self.frames.pop() {
            self.trail
                .backtrack_to(self.frames.len(), &mut self.assignment);

            if frame.polarity {
                self.frames.push(Frame {
                    var: frame.var,
                    polarity: false,
                });
                trace!("flip {} at level {}", frame.var, self.frames.len());
                self.trail
                    .decide(Literal::new(frame.var, false), &mut self.assignment);
                return true;
            }
        }
        false
    }

    /// Checks if every clause has a true literal. `true` for a formula
    /// without clauses.
    fn is_sat(&self) -> bool {
        self.cnf
            .iter()
            .all(|clause| clause.is_satisfied(&self.assignment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::solver::FixedOrderConfig;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn cnf(num_vars: usize, clauses: &[&[i32]]) -> Cnf {
        Cnf::new(num_vars, clauses.iter().map(|c| c.to_vec())).unwrap()
    }

    /// `holes + 1` pigeons into `holes` holes.
    fn pigeonhole(holes: usize) -> Cnf {
        let pigeons = holes + 1;
        let var = |p: usize, h: usize| i32::try_from(p * holes + h + 1).unwrap();
        let mut clauses: Vec<Vec<i32>> = (0..pigeons)
            .map(|p| (0..holes).map(|h| var(p, h)).collect())
            .collect();
        for h in 0..holes {
            for p1 in 0..pigeons {
                for p2 in p1 + 1..pigeons {
                    clauses.push(vec![-var(p1, h), -var(p2, h)]);
                }
            }
        }
        Cnf::new(pigeons * holes, clauses).unwrap()
    }

    #[test]
    fn test_satisfiable() {
        let cnf = cnf(3, &[&[1, 2, 3], &[-1, -2], &[-2, -3], &[-1, 3], &[-3, 1, 2]]);
        let mut solver = Dpll::<DefaultConfig>::new(&cnf);
        let outcome = solver.solve();
        let model = outcome.model().unwrap();
        assert!(cnf.verify(model));
    }

    #[test]
    fn test_first_model_takes_true_branch() {
        let cnf = cnf(2, &[&[1, 2]]);
        let model = Dpll::<DefaultConfig>::new(&cnf).solve().into_model().unwrap();
        assert_eq!(model.to_vec(), vec![true, false]);
    }

    #[test]
    fn test_contradictory_units_are_unsat() {
        let cnf = cnf(1, &[&[1], &[-1]]);
        let mut solver = Dpll::<DefaultConfig>::new(&cnf);
        assert_eq!(solver.solve(), SolveOutcome::Unsatisfiable);
        assert_eq!(solver.stats().decisions, 0);
    }

    #[test]
    fn test_empty_formula_is_sat() {
        let cnf = cnf(2, &[]);
        let outcome = Dpll::<DefaultConfig>::new(&cnf).solve();
        assert_eq!(outcome.into_model().unwrap().to_vec(), vec![false, false]);
    }

    #[test]
    fn test_empty_clause_is_unsat() {
        let cnf = cnf(2, &[&[1, 2], &[]]);
        assert!(Dpll::<DefaultConfig>::new(&cnf).solve().is_unsat());
    }

    #[test]
    fn test_pigeonhole_is_unsat() {
        let cnf = pigeonhole(3);
        let mut solver = Dpll::<DefaultConfig>::new(&cnf);
        assert!(solver.solve().is_unsat());
        assert!(solver.stats().conflicts > 0);
        assert!(solver.stats().decisions > 0);
        assert_eq!(solver.decision_level(), 0);

        let mut solver = Dpll::<FixedOrderConfig>::new(&cnf);
        assert!(solver.solve().is_unsat());
    }

    #[test]
    fn test_backtracking_finds_model() {
        // Only 1 = false leads anywhere; the true branch conflicts after
        // propagation.
        let cnf = cnf(3, &[&[-1, 2], &[-1, -2], &[1, 3], &[-3, 1, 2]]);
        let mut solver = Dpll::<DefaultConfig>::new(&cnf);
        let model = solver.solve().into_model().unwrap();
        assert!(cnf.verify(&model));
        assert!(!model.value(1));
        assert!(solver.stats().conflicts >= 1);
    }

    #[test]
    fn test_solve_is_repeatable() {
        let unsat = pigeonhole(2);
        let satisfiable = cnf(4, &[&[1, -2], &[2, 3, -4], &[-1, 4], &[-3, -4]]);
        let before = satisfiable.clone();

        let mut solver = Dpll::<DefaultConfig>::new(&satisfiable);
        let first = solver.solve();
        let stats = solver.stats();
        let second = solver.solve();
        assert_eq!(first, second);
        assert_eq!(stats, solver.stats());
        assert_eq!(first, Dpll::<DefaultConfig>::new(&satisfiable).solve());
        assert_eq!(satisfiable, before);

        let mut solver = Dpll::<DefaultConfig>::new(&unsat);
        assert!(solver.solve().is_unsat());
        assert!(solver.solve().is_unsat());
    }

    #[test]
    fn test_fixed_order_config() {
        let cnf = cnf(3, &[&[3, 2], &[-2, 1]]);
        let model = Dpll::<FixedOrderConfig>::new(&cnf)
            .solve()
            .into_model()
            .unwrap();
        assert!(cnf.verify(&model));
        assert_eq!(model.to_vec(), vec![true, true, false]);
    }

    #[test]
    fn test_interrupt_aborts() {
        let cnf = pigeonhole(4);
        let flag = Arc::new(AtomicBool::new(true));
        let mut solver =
            Dpll::<DefaultConfig>::new(&cnf).with_interrupt(Interrupt::never().with_flag(flag));
        assert_eq!(solver.solve(), SolveOutcome::Aborted);

        let mut solver = Dpll::<DefaultConfig>::new(&cnf)
            .with_interrupt(Interrupt::never().with_deadline(std::time::Instant::now()));
        assert!(solver.solve().is_aborted());
    }
}
