#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver interface, its compile-time configuration, and the two
//! convenience entry points `solve_one` and `solve_all`.

use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::Dpll;
use crate::sat::enumerate::Enumerator;
use crate::sat::propagation::{Propagator, UnitSearch};
use crate::sat::variable_selection::{FirstUnsatisfied, FixedOrder, VariableSelection};
use std::fmt::Debug;
use std::ops::AddAssign;

/// Selects the strategies a solver is built from.
pub trait SolverConfig: Debug + Clone {
    type Propagator: Propagator;
    type VariableSelector: VariableSelection;
}

/// Scan-based unit propagation, branching on the first unassigned variable
/// of the first unsatisfied clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl SolverConfig for DefaultConfig {
    type Propagator = UnitSearch;
    type VariableSelector = FirstUnsatisfied;
}

/// Scan-based unit propagation, branching on the lowest-numbered variable
/// still occurring in an unsatisfied clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOrderConfig;

impl SolverConfig for FixedOrderConfig {
    type Propagator = UnitSearch;
    type VariableSelector = FixedOrder;
}

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable(Model),
    /// The search space was exhausted without finding a model.
    Unsatisfiable,
    /// The search was interrupted before it could decide the formula.
    Aborted,
}

impl SolveOutcome {
    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Satisfiable(model) => Some(model),
            Self::Unsatisfiable | Self::Aborted => None,
        }
    }

    #[must_use]
    pub fn into_model(self) -> Option<Model> {
        match self {
            Self::Satisfiable(model) => Some(model),
            Self::Unsatisfiable | Self::Aborted => None,
        }
    }

    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Satisfiable(_))
    }

    #[must_use]
    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }

    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Counters collected during search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    /// Variables branched on (first polarity only).
    pub decisions: usize,
    /// Literals assigned by unit propagation.
    pub propagations: usize,
    /// Falsified clauses met by propagation.
    pub conflicts: usize,
    /// Deepest decision level reached.
    pub max_depth: usize,
}

impl AddAssign for SolutionStats {
    fn add_assign(&mut self, rhs: Self) {
        self.decisions += rhs.decisions;
        self.propagations += rhs.propagations;
        self.conflicts += rhs.conflicts;
        self.max_depth = self.max_depth.max(rhs.max_depth);
    }
}

pub trait Solver<'a> {
    fn new(cnf: &'a Cnf) -> Self;

    /// Searches for a model from a fresh assignment. Calling `solve` again
    /// repeats the same search and returns the same outcome.
    fn solve(&mut self) -> SolveOutcome;

    fn stats(&self) -> SolutionStats;
}

/// Returns the first model found by the default solver, or `None` if `cnf`
/// is unsatisfiable.
#[must_use]
pub fn solve_one(cnf: &Cnf) -> Option<Model> {
    Dpll::<DefaultConfig>::new(cnf).solve().into_model()
}

/// Returns up to `limit` distinct models of `cnf` (all of them for `None`),
/// in the order the default solver finds them.
#[must_use]
pub fn solve_all(cnf: &Cnf, limit: Option<usize>) -> Vec<Model> {
    Enumerator::<DefaultConfig>::new(cnf)
        .with_limit(limit)
        .run()
        .models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_one() {
        let cnf = Cnf::new(2, vec![vec![1, 2], vec![-1]]).unwrap();
        let model = solve_one(&cnf).unwrap();
        assert!(cnf.verify(&model));
        assert_eq!(model.to_vec(), vec![false, true]);

        let unsat = Cnf::new(1, vec![vec![1], vec![-1]]).unwrap();
        assert_eq!(solve_one(&unsat), None);
    }

    #[test]
    fn test_solve_all() {
        let cnf = Cnf::new(2, vec![vec![1, 2]]).unwrap();
        assert_eq!(solve_all(&cnf, None).len(), 3);
        assert_eq!(solve_all(&cnf, Some(2)).len(), 2);
        assert!(solve_all(&cnf, Some(0)).is_empty());
    }

    #[test]
    fn test_outcome_accessors() {
        let model = Model::from_values(&[true]);
        let sat = SolveOutcome::Satisfiable(model.clone());
        assert!(sat.is_sat());
        assert_eq!(sat.model(), Some(&model));
        assert_eq!(sat.into_model(), Some(model));

        assert!(SolveOutcome::Unsatisfiable.is_unsat());
        assert!(SolveOutcome::Aborted.is_aborted());
        assert_eq!(SolveOutcome::Aborted.into_model(), None);
    }

    #[test]
    fn test_stats_accumulate() {
        let mut total = SolutionStats {
            decisions: 1,
            propagations: 2,
            conflicts: 3,
            max_depth: 4,
        };
        total += SolutionStats {
            decisions: 10,
            propagations: 20,
            conflicts: 30,
            max_depth: 2,
        };
        assert_eq!(
            total,
            SolutionStats {
                decisions: 11,
                propagations: 22,
                conflicts: 33,
                max_depth: 4,
            }
        );
    }
}
