//! Errors raised while building or reading formulas.
//!
//! Unsatisfiability is not an error: the solver reports it through
//! `SolveOutcome::Unsatisfiable`.

use thiserror::Error;

/// A formula that breaks the input contract of the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("clause {clause} contains the literal 0")]
    ZeroLiteral { clause: usize },

    #[error("clause {clause} contains literal {literal}, outside variables 1..={num_vars}")]
    LiteralOutOfRange {
        clause: usize,
        literal: i32,
        num_vars: usize,
    },

    #[error("{num_vars} variables requested, at most {max} are supported")]
    TooManyVariables { num_vars: usize, max: usize },
}

/// Failure to read a DIMACS CNF document.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed problem line `{text}`")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: cannot parse literal `{token}`")]
    InvalidLiteral { line: usize, token: String },

    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),
}
