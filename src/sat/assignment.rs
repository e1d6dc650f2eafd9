#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial assignments used during search, and the complete models returned
//! to callers.

use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;
use core::ops::Index;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// Tri-state value per variable. Slot 0 is a sentinel and never assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<usize> for Assignment {
    type Output = VarState;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Assignment {
    /// A fully unassigned assignment over variables `1..=num_vars`.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars + 1])
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len() - 1
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        self.0[lit.index()] = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(var as usize).and_then(|s| s.value())
    }

    /// `Some(true)` if `lit` holds, `Some(false)` if its negation holds,
    /// `None` while its variable is unassigned.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.0.iter().skip(1).all(|s| s.is_assigned())
    }

    pub fn unassigned(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, s)| s.is_unassigned())
            .map(|(i, _)| i as Variable)
    }

    /// Completes the assignment into a model. Variables the search never had
    /// to decide are set to `false`.
    #[must_use]
    pub fn to_model(&self) -> Model {
        let mut bits = BitVec::from_elem(self.0.len(), false);
        for (i, state) in self.0.iter().enumerate().skip(1) {
            if state.value() == Some(true) {
                bits.set(i, true);
            }
        }
        Model(bits)
    }
}

/// A complete truth assignment to variables `1..=num_vars`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model(BitVec);

impl Model {
    /// Builds a model from the values of variables `1..=values.len()`.
    #[must_use]
    pub fn from_values(values: &[bool]) -> Self {
        let mut bits = BitVec::from_elem(values.len() + 1, false);
        for (i, &v) in values.iter().enumerate() {
            bits.set(i + 1, v);
        }
        Self(bits)
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len() - 1
    }

    /// Value of `var`.
    ///
    /// # Panics
    ///
    /// If `var` is `0` or greater than `num_vars`.
    #[must_use]
    pub fn value(&self, var: Variable) -> bool {
        assert!(
            var != 0 && (var as usize) <= self.num_vars(),
            "variable {var} outside model of {} variables",
            self.num_vars()
        );
        self.0.get(var as usize).unwrap_or(false)
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == lit.polarity()
    }

    pub fn true_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, b)| b)
            .map(|(i, _)| i as Variable)
    }

    /// One literal per variable, in variable order, agreeing with the model.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.0
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, b)| Literal::new(i as Variable, b))
    }

    /// The clause falsified by this model and by no other complete
    /// assignment: the negation of every literal of the model.
    #[must_use]
    pub fn blocking_clause(&self) -> Clause {
        self.literals().map(Literal::negated).collect()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<bool> {
        self.0.iter().skip(1).collect()
    }
}

/// DIMACS `v` line.
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v")?;
        for lit in self.literals() {
            write!(f, " {lit}")?;
        }
        write!(f, " 0")
    }
}
