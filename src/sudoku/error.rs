//! Errors raised while reading puzzles and decoding models.

use thiserror::Error;

/// Failure to turn text or a digit grid into a `Sudoku`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The puzzle file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The puzzle does not have 16 or 81 cells.
    #[error("expected 16 or 81 cells, found {cells}")]
    InvalidLength {
        /// Number of non-whitespace characters found.
        cells: usize,
    },

    /// A character that is neither a digit nor a blank marker.
    #[error("invalid character `{character}` at cell {position}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Zero-based cell index.
        position: usize,
    },

    /// A digit larger than the board size.
    #[error("digit {digit} at row {row}, column {col} does not fit a {size}x{size} board")]
    DigitOutOfRange {
        /// The offending digit.
        digit: usize,
        /// One-based row.
        row: usize,
        /// One-based column.
        col: usize,
        /// Board side length.
        size: usize,
    },

    /// A grid that is not square, or whose side is not 4 or 9.
    #[error("a board must be 4x4 or 9x9, found {rows} rows")]
    InvalidShape {
        /// Number of rows in the grid.
        rows: usize,
    },
}

/// A model that does not describe a valid grid.
///
/// This means the formula and the model disagree. It is never the result of
/// an unsolvable puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The model has fewer variables than the encoding uses.
    #[error("model has {found} variables, the encoding needs {expected}")]
    ModelTooSmall {
        /// Variables required by the board size.
        expected: usize,
        /// Variables present in the model.
        found: usize,
    },

    /// No digit variable of a cell is true.
    #[error("no digit is set for row {row}, column {col}")]
    MissingDigit {
        /// One-based row.
        row: usize,
        /// One-based column.
        col: usize,
    },

    /// More than one digit variable of a cell is true.
    #[error("row {row}, column {col} holds both {first} and {second}")]
    ConflictingDigits {
        /// One-based row.
        row: usize,
        /// One-based column.
        col: usize,
        /// Smaller digit set in the cell.
        first: usize,
        /// Larger digit set in the cell.
        second: usize,
    },
}
