#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail records every assignment made during search, in order, so that
//! backtracking can undo exactly the assignments made since a decision.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Literal;
use std::ops::Index;

/// Why a literal was put on the trail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Chosen by the branching policy.
    #[default]
    Decision,
    /// Forced by the clause at this index becoming unit.
    Unit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub lit: Literal,
    pub decision_level: usize,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
    /// Position in `t` of the decision that opened each level, level 1 first.
    level_starts: Vec<usize>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

/// Steps reserved up front; the trail grows on demand past this.
const INITIAL_CAPACITY: usize = 1024;

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars.min(INITIAL_CAPACITY)),
            level_starts: Vec::new(),
        }
    }

    /// Number of open decisions. Level 0 holds assignments forced before any
    /// decision.
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.level_starts.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    /// Assigns `lit` at the current level.
    pub fn push(&mut self, lit: Literal, reason: Reason, assignment: &mut Assignment) {
        debug_assert!(assignment[lit.index()].is_unassigned());
        assignment.assign(lit);
        self.t.push(Step {
            lit,
            decision_level: self.decision_level(),
            reason,
        });
    }

    /// Opens a new decision level and assigns `lit` as its decision.
    pub fn decide(&mut self, lit: Literal, assignment: &mut Assignment) {
        self.level_starts.push(self.t.len());
        self.push(lit, Reason::Decision, assignment);
    }

    /// Undoes every assignment made above `level`, leaving the trail exactly
    /// as it was before the decision that opened `level + 1`.
    pub fn backtrack_to(&mut self, level: usize, assignment: &mut Assignment) {
        if level >= self.decision_level() {
            return;
        }
        let start = self.level_starts[level];
        for step in self.t.drain(start..) {
            assignment.unassign(step.lit.variable());
        }
        self.level_starts.truncate(level);
    }

    /// Undoes everything, including level 0.
    pub fn clear(&mut self, assignment: &mut Assignment) {
        for step in self.t.drain(..) {
            assignment.unassign(step.lit.variable());
        }
        self.level_starts.clear();
    }
}
