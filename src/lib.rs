#![deny(missing_docs)]
//! A small DPLL SAT engine with unit propagation and blocking-clause model
//! enumeration, plus a Sudoku encoder built on top of it.

/// The `sat` module implements the SAT engine: the CNF formula model, unit
/// propagation, the DPLL search and model enumeration.
#[allow(missing_docs)]
pub mod sat;

/// The `sudoku` module encodes Sudoku puzzles as CNF formulas and decodes
/// models back into solved grids.
pub mod sudoku;
