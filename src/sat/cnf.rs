#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Formulas in conjunctive normal form.
//!
//! A `Cnf` is a list of clauses over a fixed number of variables. It is
//! validated once on construction (no zero literals, every variable within
//! `1..=num_vars`, `num_vars` within `MAX_VARIABLE`) and is read-only from
//! the solver's point of view: search borrows it and never rewrites clauses.
//! Repeated literals are dropped as clauses are built, so a clause with a
//! single distinct unassigned literal is recognised as unit.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::error::FormulaError;
use crate::sat::literal::{Literal, MAX_VARIABLE};
use core::ops::Index;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    clauses: Vec<Clause>,
    num_vars: usize,
}

impl Cnf {
    /// Builds a formula over variables `1..=num_vars`.
    ///
    /// # Errors
    ///
    /// `FormulaError` if `num_vars` exceeds `MAX_VARIABLE`, or a clause
    /// contains `0` or a literal whose variable exceeds `num_vars`.
    pub fn new<I, C>(num_vars: usize, clauses: I) -> Result<Self, FormulaError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        check_num_vars(num_vars)?;
        let clauses = clauses
            .into_iter()
            .enumerate()
            .map(|(idx, clause)| {
                build_clause(
                    clause
                        .into_iter()
                        .map(|value| check_literal(idx, value, num_vars)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses, num_vars })
    }

    /// Builds a formula whose variable count is the largest variable that
    /// occurs in `clauses`.
    ///
    /// # Errors
    ///
    /// `FormulaError::ZeroLiteral` if a clause contains `0`,
    /// `FormulaError::TooManyVariables` for a literal beyond `MAX_VARIABLE`.
    pub fn from_clauses<I, C>(clauses: I) -> Result<Self, FormulaError>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let clauses: Vec<Vec<i32>> = clauses
            .into_iter()
            .map(|c| c.into_iter().collect())
            .collect();
        let num_vars = clauses
            .iter()
            .flatten()
            .map(|l| l.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        Self::new(num_vars, clauses)
    }

    /// Builds a formula from clauses of already constructed literals, with
    /// the same checks as [`Cnf::new`].
    ///
    /// # Errors
    ///
    /// See [`Cnf::new`].
    pub fn from_literals(
        num_vars: usize,
        clauses: impl IntoIterator<Item = Clause>,
    ) -> Result<Self, FormulaError> {
        check_num_vars(num_vars)?;
        let clauses = clauses
            .into_iter()
            .enumerate()
            .map(|(idx, clause)| {
                build_clause(
                    clause
                        .iter()
                        .map(|lit| check_literal(idx, lit.to_i32(), num_vars)),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { clauses, num_vars })
    }

    /// Appends a clause after checking it against `num_vars`.
    ///
    /// # Errors
    ///
    /// See [`Cnf::new`].
    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = i32>) -> Result<(), FormulaError> {
        let idx = self.clauses.len();
        let num_vars = self.num_vars;
        let clause = build_clause(
            clause
                .into_iter()
                .map(|value| check_literal(idx, value, num_vars)),
        )?;
        self.clauses.push(clause);
        Ok(())
    }

    /// Appends a clause built from already-valid literals.
    pub(crate) fn push(&mut self, clause: Clause) {
        debug_assert!(
            clause
                .iter()
                .all(|l| l.variable() != 0 && l.index() <= self.num_vars)
        );
        self.clauses.push(clause);
    }

    /// Number of variables; every literal's variable is in `1..=num_vars`.
    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    #[must_use]
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_empty)
    }

    /// Checks that every clause has a literal made true by `model`.
    #[must_use]
    pub fn verify(&self, model: &Model) -> bool {
        model.num_vars() >= self.num_vars
            && self
                .clauses
                .iter()
                .all(|c| c.iter().any(|&lit| model.literal_value(lit)))
    }
}

fn check_num_vars(num_vars: usize) -> Result<(), FormulaError> {
    let max = MAX_VARIABLE as usize;
    if num_vars > max {
        return Err(FormulaError::TooManyVariables { num_vars, max });
    }
    Ok(())
}

/// Collects checked literals into a clause, keeping the first occurrence of
/// each.
fn build_clause(
    literals: impl Iterator<Item = Result<Literal, FormulaError>>,
) -> Result<Clause, FormulaError> {
    let literals = literals.collect::<Result<Vec<_>, _>>()?;
    Ok(Clause::new(literals.into_iter().unique()))
}

fn check_literal(clause: usize, value: i32, num_vars: usize) -> Result<Literal, FormulaError> {
    if value == 0 {
        return Err(FormulaError::ZeroLiteral { clause });
    }
    if value.unsigned_abs() as usize > num_vars {
        return Err(FormulaError::LiteralOutOfRange {
            clause,
            literal: value,
            num_vars,
        });
    }
    Ok(Literal::from_i32(value))
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl<'a> IntoIterator for &'a Cnf {
    type Item = &'a Clause;
    type IntoIter = core::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

/// DIMACS CNF: problem line followed by one clause per line.
impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_literals() {
        let cnf = Cnf::new(3, vec![vec![1, -2], vec![3]]).unwrap();
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.num_literals(), 3);

        assert_eq!(
            Cnf::new(3, vec![vec![1], vec![2, 0]]),
            Err(FormulaError::ZeroLiteral { clause: 1 })
        );
        assert_eq!(
            Cnf::new(2, vec![vec![-3]]),
            Err(FormulaError::LiteralOutOfRange {
                clause: 0,
                literal: -3,
                num_vars: 2
            })
        );
    }

    #[test]
    fn test_variable_count_is_bounded() {
        let max = MAX_VARIABLE as usize;
        assert_eq!(
            Cnf::new(max + 1, vec![vec![1]]),
            Err(FormulaError::TooManyVariables {
                num_vars: max + 1,
                max
            })
        );
        assert_eq!(
            Cnf::from_clauses(vec![vec![i32::MIN]]),
            Err(FormulaError::TooManyVariables {
                num_vars: max + 1,
                max
            })
        );

        let widest = Cnf::new(max, vec![vec![i32::MAX, -i32::MAX]]).unwrap();
        assert_eq!(widest.num_vars(), max);
        assert_eq!(widest[0].len(), 2);
    }

    #[test]
    fn test_repeated_literals_are_dropped() {
        let cnf = Cnf::new(3, vec![vec![3, 3, -1, 3], vec![2, -2, 2]]).unwrap();
        assert_eq!(cnf[0].literals(), &[Literal::from(3), Literal::from(-1)]);
        assert_eq!(cnf[1].literals(), &[Literal::from(2), Literal::from(-2)]);
        assert_eq!(cnf.num_literals(), 4);

        let mut cnf = Cnf::new(2, Vec::<Vec<i32>>::new()).unwrap();
        cnf.add_clause([1, 1]).unwrap();
        assert!(cnf[0].is_unit());
    }

    #[test]
    fn test_from_literals_checks_range() {
        let clauses = vec![
            Clause::new([Literal::from(1), Literal::from(-2)]),
            Clause::new([Literal::from(2), Literal::from(2)]),
        ];
        let cnf = Cnf::from_literals(2, clauses.clone()).unwrap();
        assert_eq!(cnf.len(), 2);
        assert!(cnf[1].is_unit());

        assert_eq!(
            Cnf::from_literals(1, clauses),
            Err(FormulaError::LiteralOutOfRange {
                clause: 0,
                literal: -2,
                num_vars: 1
            })
        );
        assert_eq!(
            Cnf::from_literals(3, vec![Clause::new([Literal::from_i32(0)])]),
            Err(FormulaError::ZeroLiteral { clause: 0 })
        );
    }

    #[test]
    fn test_from_clauses_infers_num_vars() {
        let cnf = Cnf::from_clauses(vec![vec![1, -5], vec![2]]).unwrap();
        assert_eq!(cnf.num_vars, 5);

        let empty = Cnf::from_clauses(Vec::<Vec<i32>>::new()).unwrap();
        assert_eq!(empty.num_vars, 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_add_clause() {
        let mut cnf = Cnf::new(2, vec![vec![1]]).unwrap();
        cnf.add_clause([-1, 2]).unwrap();
        assert_eq!(cnf.len(), 2);
        assert!(cnf.add_clause([4]).is_err());
        assert_eq!(cnf.len(), 2);
        cnf.add_clause(Vec::<i32>::new()).unwrap();
        assert!(cnf.has_empty_clause());
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::new(3, vec![vec![1, 2], vec![-1, 3]]).unwrap();
        assert!(cnf.verify(&Model::from_values(&[true, false, true])));
        assert!(!cnf.verify(&Model::from_values(&[true, false, false])));
        assert!(!cnf.verify(&Model::from_values(&[false, true])));
    }

    #[test]
    fn test_display() {
        let cnf = Cnf::new(2, vec![vec![1, -2], vec![2]]).unwrap();
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n2 0\n");
    }
}
