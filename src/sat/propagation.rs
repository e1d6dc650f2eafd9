#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation.
//!
//! A propagator extends a partial assignment with every literal forced by a
//! unit clause, until nothing more is forced or some clause is falsified.
//! It only ever writes to the assignment and trail it is handed, so sibling
//! branches of the search never observe each other's propagations.

use crate::sat::assignment::Assignment;
use crate::sat::clause::ClauseState;
use crate::sat::cnf::Cnf;
use crate::sat::trail::{Reason, Trail};
use log::trace;
use std::fmt::Debug;

/// A clause with no true and no unassigned literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conflict {
    /// Index of the falsified clause in the formula.
    pub clause: usize,
}

pub trait Propagator: Debug + Clone {
    fn new(cnf: &Cnf) -> Self;

    /// Runs propagation to a fixpoint.
    ///
    /// # Errors
    ///
    /// `Conflict` as soon as a falsified clause is found. Assignments made
    /// before the conflict stay on the trail; the caller undoes them by
    /// backtracking.
    ///
    /// On success returns the number of literals assigned.
    fn propagate(
        &mut self,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Result<usize, Conflict>;
}

/// Propagation by repeated full passes over the clause list.
///
/// Each pass visits clauses in order against the live assignment, so a
/// literal forced early in a pass is already visible to later clauses. A
/// pass that assigns nothing ends propagation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSearch;

impl Propagator for UnitSearch {
    fn new(_: &Cnf) -> Self {
        Self
    }

    fn propagate(
        &mut self,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Result<usize, Conflict> {
        let mut total = 0;

        loop {
            let mut assigned = 0;

            for (idx, clause) in cnf.iter().enumerate() {
                match clause.state(assignment) {
                    ClauseState::Satisfied | ClauseState::Unresolved => {}
                    ClauseState::Falsified => {
                        trace!("conflict in clause {idx}: {clause}");
                        return Err(Conflict { clause: idx });
                    }
                    ClauseState::Unit(lit) => {
                        trace!("clause {idx} forces {lit}");
                        trail.push(lit, Reason::Unit(idx), assignment);
                        assigned += 1;
                    }
                }
            }

            if assigned == 0 {
                return Ok(total);
            }
            total += assigned;
        }
    }
}
