#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching policies.
//!
//! A policy picks the next decision variable among the unassigned variables
//! that still occur in an unsatisfied clause. Both policies here are
//! deterministic, so the first model found for a formula is reproducible.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use bit_vec::BitVec;
use clap::ValueEnum;
use std::fmt::{Debug, Display};

pub trait VariableSelection: Debug + Clone {
    fn new(cnf: &Cnf) -> Self;

    /// Returns `None` when no unsatisfied clause has an unassigned literal.
    fn pick(&mut self, cnf: &Cnf, assignment: &Assignment) -> Option<Variable>;
}

/// Picks the first unassigned variable met while scanning clauses in their
/// original order, skipping satisfied clauses. The default policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstUnsatisfied;

impl VariableSelection for FirstUnsatisfied {
    fn new(_: &Cnf) -> Self {
        Self
    }

    fn pick(&mut self, cnf: &Cnf, assignment: &Assignment) -> Option<Variable> {
        cnf.iter()
            .filter(|clause| !clause.is_satisfied(assignment))
            .flat_map(|clause| clause.iter())
            .find(|lit| assignment.literal_value(**lit).is_none())
            .map(|lit| lit.variable())
    }
}

/// Picks the lowest-numbered unassigned variable that occurs in some
/// unsatisfied clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedOrder {
    present: BitVec,
}

impl VariableSelection for FixedOrder {
    fn new(cnf: &Cnf) -> Self {
        Self {
            present: BitVec::from_elem(cnf.num_vars() + 1, false),
        }
    }

    fn pick(&mut self, cnf: &Cnf, assignment: &Assignment) -> Option<Variable> {
        self.present = BitVec::from_elem(cnf.num_vars() + 1, false);
        for clause in cnf.iter().filter(|c| !c.is_satisfied(assignment)) {
            for lit in clause {
                self.present.set(lit.index(), true);
            }
        }

        self.present
            .iter()
            .enumerate()
            .skip(1)
            .find(|&(var, present)| present && assignment[var].is_unassigned())
            .map(|(var, _)| var as Variable)
    }
}

/// Runtime name of a branching policy, for the command line.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, Default, ValueEnum)]
pub enum VariableSelectionType {
    /// `FirstUnsatisfied`
    #[default]
    FirstUnsatisfied,
    /// `FixedOrder`
    FixedOrder,
}

impl Display for VariableSelectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstUnsatisfied => write!(f, "first-unsatisfied"),
            Self::FixedOrder => write!(f, "fixed-order"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::Literal;

    #[test]
    fn test_first_unsatisfied_follows_clause_order() {
        let cnf = Cnf::new(5, vec![vec![4, 1], vec![-5, 2], vec![3]]).unwrap();
        let mut assignment = Assignment::new(5);
        let mut selector = FirstUnsatisfied::new(&cnf);

        assert_eq!(selector.pick(&cnf, &assignment), Some(4));

        assignment.assign(Literal::from(1));
        assert_eq!(selector.pick(&cnf, &assignment), Some(5));

        assignment.assign(Literal::from(5));
        assert_eq!(selector.pick(&cnf, &assignment), Some(2));

        assignment.assign(Literal::from(2));
        assignment.assign(Literal::from(3));
        assert_eq!(selector.pick(&cnf, &assignment), None);
    }

    #[test]
    fn test_fixed_order_picks_lowest_present_variable() {
        let cnf = Cnf::new(6, vec![vec![4, 3], vec![-5, 2], vec![6]]).unwrap();
        let mut assignment = Assignment::new(6);
        let mut selector = FixedOrder::new(&cnf);

        assert_eq!(selector.pick(&cnf, &assignment), Some(2));

        assignment.assign(Literal::from(-5));
        assert_eq!(selector.pick(&cnf, &assignment), Some(3));

        assignment.assign(Literal::from(4));
        assert_eq!(selector.pick(&cnf, &assignment), Some(6));

        assignment.assign(Literal::from(6));
        assert_eq!(selector.pick(&cnf, &assignment), None);
    }

    #[test]
    fn test_variables_outside_clauses_are_never_picked() {
        let cnf = Cnf::new(3, vec![vec![2]]).unwrap();
        let assignment = Assignment::new(3);
        assert_eq!(FirstUnsatisfied.pick(&cnf, &assignment), Some(2));
        assert_eq!(FixedOrder::new(&cnf).pick(&cnf, &assignment), Some(2));
    }

    #[test]
    fn test_selection_type_names() {
        for kind in VariableSelectionType::value_variants() {
            let parsed = VariableSelectionType::from_str(&kind.to_string(), false).unwrap();
            assert_eq!(parsed, *kind);
        }
        assert_eq!(
            VariableSelectionType::default(),
            VariableSelectionType::FirstUnsatisfied
        );
    }
}
