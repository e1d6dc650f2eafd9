#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Model enumeration with blocking clauses.
//!
//! After each model `M` is found, the clause `¬M` (the negation of every
//! literal of `M`, over all variables) is added to a private copy of the
//! formula. It is falsified by `M` and by no other complete assignment, so
//! the next search finds a different model or proves there is none.

use crate::sat::assignment::Model;
use crate::sat::cnf::Cnf;
use crate::sat::dpll::Dpll;
use crate::sat::interrupt::Interrupt;
use crate::sat::solver::{DefaultConfig, SolutionStats, SolveOutcome, Solver, SolverConfig};
use log::debug;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Why enumeration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationStatus {
    /// Every model has been returned.
    Exhausted,
    /// The requested number of models has been returned.
    LimitReached,
    /// The interrupt fired. Models returned so far are still valid.
    Aborted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Counters summed over all searches.
    pub search: SolutionStats,
    /// Number of searches run.
    pub solves: usize,
    pub blocking_clauses: usize,
}

/// Everything an enumeration produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    pub models: Vec<Model>,
    pub status: EnumerationStatus,
    pub stats: EnumerationStats,
}

/// Lazily yields distinct models of a formula.
///
/// ```
/// use tiny_sat::sat::cnf::Cnf;
/// use tiny_sat::sat::enumerate::Enumerator;
/// use tiny_sat::sat::solver::DefaultConfig;
///
/// let cnf = Cnf::new(2, vec![vec![1, 2]]).unwrap();
/// let models: Vec<_> = Enumerator::<DefaultConfig>::new(&cnf).collect();
/// assert_eq!(models.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Enumerator<Config: SolverConfig = DefaultConfig> {
    working: Cnf,
    limit: Option<usize>,
    interrupt: Interrupt,
    found: usize,
    status: Option<EnumerationStatus>,
    stats: EnumerationStats,
    config: PhantomData<Config>,
}

impl<Config: SolverConfig> Enumerator<Config> {
    /// Copies `cnf`; blocking clauses are only ever added to the copy.
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        Self {
            working: cnf.clone(),
            limit: None,
            interrupt: Interrupt::never(),
            found: 0,
            status: None,
            stats: EnumerationStats::default(),
            config: PhantomData,
        }
    }

    /// Stops after `limit` models. `None` (the default) means no limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// `None` while more models may follow.
    #[must_use]
    pub const fn status(&self) -> Option<EnumerationStatus> {
        self.status
    }

    #[must_use]
    pub const fn stats(&self) -> EnumerationStats {
        self.stats
    }

    /// The original formula plus every blocking clause added so far.
    #[must_use]
    pub const fn formula(&self) -> &Cnf {
        &self.working
    }

    /// Drains the enumerator.
    #[must_use]
    pub fn run(mut self) -> Enumeration {
        let models: Vec<Model> = self.by_ref().collect();
        Enumeration {
            models,
            status: self.status.unwrap_or(EnumerationStatus::Exhausted),
            stats: self.stats,
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.found >= limit)
    }
}

impl<Config: SolverConfig> Iterator for Enumerator<Config> {
    type Item = Model;

    fn next(&mut self) -> Option<Self::Item> {
        if self.status.is_some() {
            return None;
        }
        if self.limit_reached() {
            self.status = Some(EnumerationStatus::LimitReached);
            return None;
        }

        let mut solver = Dpll::<Config>::new(&self.working).with_interrupt(self.interrupt.clone());
        let outcome = solver.solve();
        self.stats.search += solver.stats();
        self.stats.solves += 1;

        match outcome {
            SolveOutcome::Satisfiable(model) => {
                self.found += 1;
                debug!("enumerate: model {} found", self.found);
                if self.limit_reached() {
                    self.status = Some(EnumerationStatus::LimitReached);
                } else {
                    self.working.push(model.blocking_clause());
                    self.stats.blocking_clauses += 1;
                }
                Some(model)
            }
            SolveOutcome::Unsatisfiable => {
                debug!("enumerate: exhausted after {} models", self.found);
                self.status = Some(EnumerationStatus::Exhausted);
                None
            }
            SolveOutcome::Aborted => {
                debug!("enumerate: aborted after {} models", self.found);
                self.status = Some(EnumerationStatus::Aborted);
                None
            }
        }
    }
}

impl<Config: SolverConfig> FusedIterator for Enumerator<Config> {}
