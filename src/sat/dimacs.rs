#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The format consists of:
//! - Comment lines starting with `c`.
//! - A problem line `p cnf <num_variables> <num_clauses>`. When present, the
//!   variable count fixes `num_vars` and every literal is checked against
//!   it. Without it, `num_vars` is the largest variable seen. The clause
//!   count is informational only.
//! - Clauses as whitespace-separated integers, each clause terminated by
//!   `0`. A clause may span several lines, and several clauses may share a
//!   line. A lone `0` is an empty clause.
//! - An optional `%` line marking end-of-data (used by some benchmark sets).
//!
//! Writing goes through `Display for Cnf`.

use crate::sat::cnf::Cnf;
use crate::sat::error::DimacsError;
use std::io::{self, BufRead};
use std::path::Path;

/// Parses DIMACS formatted data from a `BufRead` source into a `Cnf`.
///
/// Literals after the last `0` are kept as a final clause, so files that
/// omit the last terminator still parse.
///
/// # Errors
///
/// `DimacsError` on I/O failure, a malformed problem line, a token that is
/// not an integer, or a literal outside the declared variable range.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut declared_vars: Option<usize> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None | Some(&"c") => {}
            Some(token) if token.starts_with('c') => {}
            Some(&"p") => {
                declared_vars = Some(parse_header(&line, line_no)?);
            }
            Some(_) => {
                for token in parts {
                    let value = token.parse::<i32>().map_err(|_| DimacsError::InvalidLiteral {
                        line: line_no,
                        token: token.to_string(),
                    })?;
                    if value == 0 {
                        clauses.push(std::mem::take(&mut current));
                    } else {
                        current.push(value);
                    }
                }
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    let cnf = match declared_vars {
        Some(num_vars) => Cnf::new(num_vars, clauses)?,
        None => Cnf::from_clauses(clauses)?,
    };
    Ok(cnf)
}

fn parse_header(line: &str, line_no: usize) -> Result<usize, DimacsError> {
    let invalid = || DimacsError::InvalidHeader {
        line: line_no,
        text: line.to_string(),
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        ["p", "cnf", vars, clauses] => {
            clauses.parse::<usize>().map_err(|_| invalid())?;
            vars.parse::<usize>().map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

/// Parses a DIMACS CNF file specified by its path.
///
/// # Errors
///
/// `DimacsError::Io` if the file cannot be opened, plus everything
/// `parse_dimacs` reports.
pub fn parse_file(file_path: impl AsRef<Path>) -> Result<Cnf, DimacsError> {
    let file = std::fs::File::open(file_path)?;
    parse_dimacs(io::BufReader::new(file))
}
