#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Sudoku as a SAT problem: puzzle parsing, CNF encoding and decoding of
//! models back into grids.

/// Errors for puzzle parsing and model decoding.
pub mod error;

/// The encoder, the decoder and the puzzle types.
pub mod solver;
