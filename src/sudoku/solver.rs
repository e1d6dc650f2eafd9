//! Encodes Sudoku puzzles as CNF and decodes models back into grids.
//!
//! Cell `(row, col)` holding digit `num` is the variable
//! `(row - 1) * n² + (col - 1) * n + num` for an `n × n` board (all indices
//! one-based). The formula states that every cell, row, column and block
//! holds every digit exactly once, as one at-least-one clause plus pairwise
//! at-most-one clauses per group, and pins each clue with a unit clause.

use crate::sat::assignment::Model;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::error::FormulaError;
use crate::sat::literal::{self, Literal};
use crate::sudoku::error::{DecodeError, ParseError};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A grid of digits, row-major. `0` marks a blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Wraps a row-major grid without checking it. `Sudoku::new` validates.
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// The rows of the grid.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.0
    }

    /// Digit at one-based `(row, col)`, `0` if blank.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> usize {
        self.0[row - 1][col - 1]
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

impl From<[[usize; 4]; 4]> for Board {
    fn from(board: [[usize; 4]; 4]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl From<[[usize; 9]; 9]> for Board {
    fn from(board: [[usize; 9]; 9]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

/// A 4×4 puzzle with a single solution.
pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 3, 0], [0, 4, 0, 2], [2, 0, 4, 0], [0, 3, 0, 1]];

/// A classic 9×9 puzzle with a single solution.
pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// `EXAMPLE_NINE` in the one-line text format.
pub const EXAMPLE_NINE_TEXT: &str =
    "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";

/// Side length of a supported board.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    /// 4×4 with 2×2 blocks.
    Four = 4,
    /// 9×9 with 3×3 blocks.
    Nine = 9,
}

impl TryFrom<usize> for Size {
    type Error = ParseError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            _ => Err(ParseError::InvalidShape { rows: value }),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

impl Size {
    /// Side length of a block.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
        }
    }

    /// Number of variables in the encoding, `n³`.
    #[must_use]
    pub const fn num_vars(self) -> usize {
        let n = self as usize;
        n * n * n
    }
}

/// The proposition "cell `(row, col)` holds `num`", all one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    /// One-based row.
    pub row: usize,
    /// One-based column.
    pub col: usize,
    /// Digit in `1..=n`.
    pub num: usize,
}

impl Variable {
    /// Creates the proposition for `(row, col, num)`.
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    /// The SAT variable of this proposition.
    #[must_use]
    pub const fn encode(&self, size: Size) -> usize {
        let n = size as usize;
        (self.row - 1) * n * n + (self.col - 1) * n + self.num
    }

    /// Inverse of `encode`. `None` outside `1..=n³`.
    #[must_use]
    pub const fn decode(var: usize, size: Size) -> Option<Self> {
        let n = size as usize;
        if var == 0 || var > size.num_vars() {
            return None;
        }
        let idx = var - 1;
        Some(Self::new(idx / (n * n) + 1, (idx / n) % n + 1, idx % n + 1))
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn variable(self, size: Size) -> literal::Variable {
        // At most 729, so the cast is lossless.
        self.encode(size) as literal::Variable
    }

    fn literal(self, size: Size) -> Literal {
        Literal::new(self.variable(size), true)
    }
}

/// One at-least-one clause over `group`, then a binary clause forbidding
/// each pair.
fn exactly_one(group: &[Literal]) -> impl Iterator<Item = Clause> + '_ {
    std::iter::once(Clause::new(group.iter().copied())).chain(
        group
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| Clause::new([-a, -b])),
    )
}

fn generate_cell_clauses(size: Size) -> Vec<Clause> {
    let n = usize::from(size);
    let mut clauses = vec![];
    for (row, col) in (1..=n).cartesian_product(1..=n) {
        let group: Vec<Literal> = (1..=n)
            .map(|num| Variable::new(row, col, num).literal(size))
            .collect();
        clauses.extend(exactly_one(&group));
    }
    clauses
}

fn generate_row_clauses(size: Size) -> Vec<Clause> {
    let n = usize::from(size);
    let mut clauses = vec![];
    for (row, num) in (1..=n).cartesian_product(1..=n) {
        let group: Vec<Literal> = (1..=n)
            .map(|col| Variable::new(row, col, num).literal(size))
            .collect();
        clauses.extend(exactly_one(&group));
    }
    clauses
}

fn generate_col_clauses(size: Size) -> Vec<Clause> {
    let n = usize::from(size);
    let mut clauses = vec![];
    for (col, num) in (1..=n).cartesian_product(1..=n) {
        let group: Vec<Literal> = (1..=n)
            .map(|row| Variable::new(row, col, num).literal(size))
            .collect();
        clauses.extend(exactly_one(&group));
    }
    clauses
}

fn generate_block_clauses(size: Size) -> Vec<Clause> {
    let n = usize::from(size);
    let b = size.block_size();
    let mut clauses = vec![];
    for (br, bc) in (0..n)
        .step_by(b)
        .cartesian_product((0..n).step_by(b))
    {
        for num in 1..=n {
            let group: Vec<Literal> = (br + 1..=br + b)
                .cartesian_product(bc + 1..=bc + b)
                .map(|(row, col)| Variable::new(row, col, num).literal(size))
                .collect();
            clauses.extend(exactly_one(&group));
        }
    }
    clauses
}

fn generate_pre_filled_clauses(size: Size, board: &Board) -> Vec<Clause> {
    let mut clauses = vec![];
    for (r, row) in board.0.iter().enumerate() {
        for (c, &num) in row.iter().enumerate() {
            if num != 0 {
                clauses.push(Clause::new([Variable::new(r + 1, c + 1, num).literal(size)]));
            }
        }
    }
    clauses
}

/// A validated puzzle or solution. Only `Sudoku::new` and `decode` build
/// one, so the board always matches `size` and holds digits in `0..=n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    board: Board,
    size: Size,
}

impl Sudoku {
    /// Validates `board`: it must be square with side 4 or 9, and hold
    /// digits in `0..=n`.
    ///
    /// # Errors
    ///
    /// `ParseError::InvalidShape` or `ParseError::DigitOutOfRange`.
    pub fn new(board: Board) -> Result<Self, ParseError> {
        let rows = board.0.len();
        let size = Size::try_from(rows)?;
        let n = usize::from(size);

        if board.0.iter().any(|row| row.len() != n) {
            return Err(ParseError::InvalidShape { rows });
        }
        for (r, row) in board.0.iter().enumerate() {
            if let Some((c, &digit)) = row.iter().enumerate().find(|&(_, &d)| d > n) {
                return Err(ParseError::DigitOutOfRange {
                    digit,
                    row: r + 1,
                    col: c + 1,
                    size: n,
                });
            }
        }

        Ok(Self { board, size })
    }

    /// The digits, `0` for blanks.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Board side length.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of given digits.
    #[must_use]
    pub fn clue_count(&self) -> usize {
        self.board.0.iter().flatten().filter(|&&d| d != 0).count()
    }

    /// The full encoding of the puzzle over `n³` variables.
    ///
    /// # Errors
    ///
    /// `FormulaError` if a clause falls outside the `n³` variables, which
    /// the checks in `Sudoku::new` rule out.
    pub fn to_cnf(&self) -> Result<Cnf, FormulaError> {
        let clauses = generate_cell_clauses(self.size)
            .into_iter()
            .chain(generate_row_clauses(self.size))
            .chain(generate_col_clauses(self.size))
            .chain(generate_block_clauses(self.size))
            .chain(generate_pre_filled_clauses(self.size, &self.board));

        Cnf::from_literals(self.size.num_vars(), clauses)
    }

    /// Reads the grid encoded by `model`.
    ///
    /// # Errors
    ///
    /// `DecodeError` if the model is too small for the board, or a cell has
    /// no true digit variable or more than one.
    pub fn decode(&self, model: &Model) -> Result<Self, DecodeError> {
        let n = usize::from(self.size);
        let expected = self.size.num_vars();
        if model.num_vars() < expected {
            return Err(DecodeError::ModelTooSmall {
                expected,
                found: model.num_vars(),
            });
        }

        let mut board = vec![vec![0; n]; n];
        for (row, col) in (1..=n).cartesian_product(1..=n) {
            let mut digits = (1..=n)
                .filter(|&num| model.value(Variable::new(row, col, num).variable(self.size)));

            let first = digits
                .next()
                .ok_or(DecodeError::MissingDigit { row, col })?;
            if let Some(second) = digits.next() {
                return Err(DecodeError::ConflictingDigits {
                    row,
                    col,
                    first,
                    second,
                });
            }
            board[row - 1][col - 1] = first;
        }

        Ok(Self {
            board: Board::new(board),
            size: self.size,
        })
    }

    /// Checks that every row, column and block holds each digit once.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let n = usize::from(self.size);
        let b = self.size.block_size();
        let is_permutation = |cells: Vec<usize>| {
            let seen: FxHashSet<usize> = cells.iter().copied().collect();
            seen.len() == n && cells.iter().all(|&d| (1..=n).contains(&d))
        };

        let rows = (1..=n).all(|r| is_permutation((1..=n).map(|c| self.board.get(r, c)).collect()));
        let cols = (1..=n).all(|c| is_permutation((1..=n).map(|r| self.board.get(r, c)).collect()));
        let blocks = (0..n)
            .step_by(b)
            .cartesian_product((0..n).step_by(b))
            .all(|(br, bc)| {
                is_permutation(
                    (br + 1..=br + b)
                        .cartesian_product(bc + 1..=bc + b)
                        .map(|(r, c)| self.board.get(r, c))
                        .collect(),
                )
            });

        rows && cols && blocks
    }

    /// Checks that every clue of `puzzle` appears unchanged in `self`.
    #[must_use]
    pub fn agrees_with(&self, puzzle: &Self) -> bool {
        self.size == puzzle.size
            && self
                .board
                .0
                .iter()
                .flatten()
                .zip(puzzle.board.0.iter().flatten())
                .all(|(&ours, &clue)| clue == 0 || ours == clue)
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.board.0.iter()
    }
}

impl TryFrom<[[usize; 4]; 4]> for Sudoku {
    type Error = ParseError;

    fn try_from(board: [[usize; 4]; 4]) -> Result<Self, Self::Error> {
        Self::new(Board::from(board))
    }
}

impl TryFrom<[[usize; 9]; 9]> for Sudoku {
    type Error = ParseError;

    fn try_from(board: [[usize; 9]; 9]) -> Result<Self, Self::Error> {
        Self::new(Board::from(board))
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}

impl FromStr for Sudoku {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sudoku(s)
    }
}

/// Rows of space-separated digits, `.` for blanks, with `|` and `-+-`
/// between blocks.
impl fmt::Display for Sudoku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.size.block_size();
        let separator = vec!["-".repeat(2 * b - 1); b].join("-+-");

        for (r, row) in self.board.0.iter().enumerate() {
            if r > 0 && r % b == 0 {
                writeln!(f, "{separator}")?;
            }
            let line = row
                .chunks(b)
                .map(|block| {
                    block
                        .iter()
                        .map(|&d| if d == 0 { ".".to_string() } else { d.to_string() })
                        .join(" ")
                })
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Parses a puzzle from text.
///
/// Whitespace is ignored, so both the single-line and the grid layout are
/// accepted. 16 cells make a 4×4 board, 81 a 9×9 board. Digits `1..=n` are
/// clues; `.`, `0`, `_` and `*` are blanks.
///
/// # Errors
///
/// `ParseError` for a wrong cell count, an unknown character or a digit too
/// large for the board.
pub fn parse_sudoku(text: &str) -> Result<Sudoku, ParseError> {
    let cells: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let n = match cells.len() {
        16 => 4,
        81 => 9,
        cells => return Err(ParseError::InvalidLength { cells }),
    };

    let digits = cells
        .iter()
        .enumerate()
        .map(|(position, &character)| match character {
            '.' | '0' | '_' | '*' => Ok(0),
            c => c
                .to_digit(10)
                .and_then(|d| usize::try_from(d).ok())
                .ok_or(ParseError::InvalidCharacter {
                    character,
                    position,
                }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let board = digits.chunks(n).map(<[usize]>::to_vec).collect();
    Sudoku::new(Board::new(board))
}

/// Reads and parses a puzzle file. See `parse_sudoku` for the format.
///
/// # Errors
///
/// `ParseError::Io` if the file cannot be read, plus everything
/// `parse_sudoku` reports.
pub fn parse_sudoku_file(path: impl AsRef<Path>) -> Result<Sudoku, ParseError> {
    let text = std::fs::read_to_string(path)?;
    parse_sudoku(&text)
}
