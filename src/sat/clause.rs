#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A clause is a disjunction of literals.
//!
//! Most clauses produced by encoders are short (binary "at most one"
//! clauses dominate a Sudoku encoding), so literals live in a `SmallVec`
//! that only spills to the heap for long clauses such as blocking clauses.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Literal;
use core::ops::Index;
use smallvec::SmallVec;
use std::fmt;

/// Inline capacity of a clause before it spills to the heap.
pub const INLINE_LITERALS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    literals: SmallVec<[Literal; INLINE_LITERALS]>,
}

/// How a clause stands under a partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseState {
    /// At least one literal is true.
    Satisfied,
    /// Every literal is false (or the clause is empty).
    Falsified,
    /// No literal is true and exactly one is unassigned.
    Unit(Literal),
    /// No literal is true and at least two are unassigned.
    Unresolved,
}

impl Clause {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Evaluates the clause against `assignment`, stopping at the first true
    /// literal.
    #[must_use]
    pub fn state(&self, assignment: &Assignment) -> ClauseState {
        let mut unassigned = None;
        let mut unassigned_count = 0usize;

        for &lit in &self.literals {
            match assignment.literal_value(lit) {
                Some(true) => return ClauseState::Satisfied,
                Some(false) => {}
                None => {
                    unassigned_count += 1;
                    unassigned = Some(lit);
                }
            }
        }

        match (unassigned_count, unassigned) {
            (0, _) | (_, None) => ClauseState::Falsified,
            (1, Some(lit)) => ClauseState::Unit(lit),
            _ => ClauseState::Unresolved,
        }
    }

    #[must_use]
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.literals
            .iter()
            .any(|&lit| assignment.literal_value(lit) == Some(true))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;
    type IntoIter = core::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

/// DIMACS clause line, including the terminating `0`.
impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}
