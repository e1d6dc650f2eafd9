#![allow(clippy::cast_precision_loss)]

use clap::{Args, Parser, Subcommand};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tikv_jemalloc_ctl::{epoch, stats};
use tiny_sat::sat::assignment::Model;
use tiny_sat::sat::cnf::Cnf;
use tiny_sat::sat::dimacs::parse_file;
use tiny_sat::sat::dpll::Dpll;
use tiny_sat::sat::enumerate::{Enumeration, EnumerationStatus, Enumerator};
use tiny_sat::sat::error::{DimacsError, FormulaError};
use tiny_sat::sat::interrupt::Interrupt;
use tiny_sat::sat::solver::{
    DefaultConfig, FixedOrderConfig, SolutionStats, SolveOutcome, Solver, SolverConfig,
};
use tiny_sat::sat::variable_selection::VariableSelectionType;
use tiny_sat::sudoku::error::{DecodeError, ParseError};
use tiny_sat::sudoku::solver::{Sudoku, parse_sudoku, parse_sudoku_file};

/// Defines the command-line interface for the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(
    name = "tiny-sat",
    version,
    about = "A small DPLL SAT solver with model enumeration"
)]
pub(crate) struct Cli {
    /// A DIMACS .cnf file, or a directory of them, solved when no subcommand
    /// is given.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`, `sudoku`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Options used with the bare `path` argument.
    #[command(flatten)]
    pub common: CommonOptions,
}

impl Cli {
    /// Whether `--debug` was given, at the top level or to the subcommand.
    pub(crate) fn debug(&self) -> bool {
        self.common.debug
            || match &self.command {
                Some(
                    Commands::File { common, .. }
                    | Commands::Text { common, .. }
                    | Commands::Sudoku { common, .. },
                ) => common.debug,
                Some(Commands::Completions { .. }) | None => false,
            }
    }
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format, or every `.cnf` and `.sudoku` file
    /// under a directory.
    File {
        /// Path to the DIMACS .cnf file or directory.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a CNF formula provided as plain text.
    Text {
        /// Literal CNF input as a string (e.g. "1 -2 0\n2 3 0").
        /// Each line holds one or more clauses, each terminated by 0; a
        /// missing final 0 is implied. Both real newlines and the two
        /// characters `\n` separate lines.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve a Sudoku puzzle.
    /// The puzzle is converted into a CNF formula, which is then solved.
    Sudoku {
        /// The puzzle as text: 16 or 81 cells, digits for clues and `.`,
        /// `0`, `_` or `*` for blanks. Whitespace is ignored.
        #[arg(long, conflicts_with = "path", required_unless_present = "path")]
        puzzle: Option<String>,

        /// Path to a puzzle file in the same format as `--puzzle`.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the DIMACS encoding of the puzzle, and save it next to the
        /// puzzle file when reading from `--path`.
        #[arg(short, long, default_value_t = false)]
        export_dimacs: bool,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug logging. `RUST_LOG` takes precedence.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check every reported model against the formula (and, for Sudoku,
    /// the decoded grid against the rules and the clues).
    #[arg(short, long, default_value_t = false)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(short, long, default_value_t = false)]
    pub(crate) stats: bool,

    /// Print satisfying assignments as DIMACS `v` lines.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Enumerate models with blocking clauses and report how many there are.
    #[arg(short, long, default_value_t = false)]
    pub(crate) count: bool,

    /// Stop counting after this many models.
    #[arg(short, long)]
    pub(crate) limit: Option<usize>,

    /// Abort the search after this many seconds.
    #[arg(short, long)]
    pub(crate) timeout: Option<f64>,

    /// Branching policy.
    #[arg(long, value_enum, default_value_t = VariableSelectionType::FirstUnsatisfied)]
    pub(crate) variable_selection: VariableSelectionType,
}

/// Final verdict of a command, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Status {
    Satisfiable,
    Unsatisfiable,
    Aborted,
}

impl Status {
    pub(crate) const fn exit_code(self) -> u8 {
        match self {
            Self::Satisfiable => 0,
            Self::Unsatisfiable => 1,
            Self::Aborted => 3,
        }
    }

    fn of_enumeration(enumeration: &Enumeration) -> Self {
        match enumeration.status {
            EnumerationStatus::Aborted => Self::Aborted,
            _ if enumeration.models.is_empty() => Self::Unsatisfiable,
            _ => Self::Satisfiable,
        }
    }
}

impl From<&SolveOutcome> for Status {
    fn from(outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Satisfiable(_) => Self::Satisfiable,
            SolveOutcome::Unsatisfiable => Self::Unsatisfiable,
            SolveOutcome::Aborted => Self::Aborted,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
            Self::Aborted => write!(f, "UNKNOWN (aborted)"),
        }
    }
}

/// Everything that stops a command before it can report a verdict.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Dimacs(#[from] DimacsError),

    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),

    #[error("invalid puzzle: {0}")]
    Puzzle(#[from] ParseError),

    #[error("line {line}: cannot parse literal `{token}`")]
    InvalidLiteral { line: usize, token: String },

    #[error("unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("model does not decode to a grid: {0}")]
    Decode(#[from] DecodeError),

    #[error("solution failed verification")]
    VerificationFailed,
}

impl CliError {
    /// `2` for bad input, `4` when a model fails a consistency check.
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::Decode(_) | Self::VerificationFailed => 4,
            Self::Dimacs(_)
            | Self::Formula(_)
            | Self::Puzzle(_)
            | Self::InvalidLiteral { .. }
            | Self::Write { .. } => 2,
        }
    }
}

/// Where a Sudoku puzzle comes from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PuzzleSource<'a> {
    Text(&'a str),
    File(&'a Path),
}

/// Parses a textual representation of a CNF formula into a list of clauses.
///
/// Lines starting with `c` or `p` and blank lines are ignored. A `0` ends a
/// clause, so one line may hold several clauses; literals after the last
/// `0` of a line form one more clause. A lone `0` is the empty clause.
///
/// # Errors
///
/// `CliError::InvalidLiteral` for a token that is not an integer.
pub(crate) fn parse_textual_cnf(input: &str) -> Result<Vec<Vec<i32>>, CliError> {
    let input = input.replace("\\n", "\n");
    let mut clauses = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') || line.starts_with('p') {
            continue;
        }

        let literals = line
            .split_whitespace()
            .map(|token| {
                token.parse::<i32>().map_err(|_| CliError::InvalidLiteral {
                    line: idx + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut parts: Vec<&[i32]> = literals.split(|&lit| lit == 0).collect();
        if parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }
        clauses.extend(parts.into_iter().map(<[i32]>::to_vec));
    }

    Ok(clauses)
}

/// The interrupt for `--timeout`, or one that never fires.
pub(crate) fn interrupt(common: &CommonOptions) -> Interrupt {
    let interrupt = Interrupt::never();
    match common
        .timeout
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    {
        Some(timeout) => interrupt.with_timeout(timeout),
        None => interrupt,
    }
}

fn solve_with<Config: SolverConfig>(
    cnf: &Cnf,
    interrupt: Interrupt,
) -> (SolveOutcome, SolutionStats) {
    let mut solver = Dpll::<Config>::new(cnf).with_interrupt(interrupt);
    let outcome = solver.solve();
    (outcome, solver.stats())
}

fn enumerate_with<Config: SolverConfig>(
    cnf: &Cnf,
    limit: Option<usize>,
    interrupt: Interrupt,
) -> Enumeration {
    Enumerator::<Config>::new(cnf)
        .with_limit(limit)
        .with_interrupt(interrupt)
        .run()
}

/// Solves a CNF formula with the branching policy chosen in `common`.
///
/// # Returns
/// The outcome, the time taken by the search and its statistics.
pub(crate) fn solve(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> (SolveOutcome, Duration, SolutionStats) {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    debug!(
        "Variables: {}, clauses: {}, literals: {}, branching: {}",
        cnf.num_vars(),
        cnf.len(),
        cnf.num_literals(),
        common.variable_selection
    );

    let time = Instant::now();
    let (outcome, stats) = match common.variable_selection {
        VariableSelectionType::FirstUnsatisfied => {
            solve_with::<DefaultConfig>(cnf, interrupt(common))
        }
        VariableSelectionType::FixedOrder => solve_with::<FixedOrderConfig>(cnf, interrupt(common)),
    };
    let elapsed = time.elapsed();
    debug!("Time: {elapsed:?}");

    (outcome, elapsed, stats)
}

/// Enumerates up to `--limit` models of `cnf`.
pub(crate) fn enumerate(
    cnf: &Cnf,
    label: Option<&Path>,
    common: &CommonOptions,
) -> (Enumeration, Duration) {
    if let Some(name) = label {
        println!("Counting: {}", name.display());
    }

    let time = Instant::now();
    let enumeration = match common.variable_selection {
        VariableSelectionType::FirstUnsatisfied => {
            enumerate_with::<DefaultConfig>(cnf, common.limit, interrupt(common))
        }
        VariableSelectionType::FixedOrder => {
            enumerate_with::<FixedOrderConfig>(cnf, common.limit, interrupt(common))
        }
    };
    let elapsed = time.elapsed();
    debug!(
        "Enumeration {:?} after {} models in {elapsed:?}",
        enumeration.status,
        enumeration.models.len()
    );

    (enumeration, elapsed)
}

/// Verifies a model against a CNF formula and prints the result. Does
/// nothing for `None`.
///
/// # Errors
///
/// `CliError::VerificationFailed` if a clause is not satisfied.
pub(crate) fn verify_solution(cnf: &Cnf, model: Option<&Model>) -> Result<(), CliError> {
    if let Some(model) = model {
        let ok = cnf.verify(model);
        println!("Verified: {ok:?}");
        if !ok {
            return Err(CliError::VerificationFailed);
        }
    }
    Ok(())
}

/// Solves (or, with `--count`, enumerates) a formula and reports the
/// verdict, plus statistics and verification when requested.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Status, CliError> {
    if common.count {
        return count_and_report(cnf, common, label, parse_time);
    }

    let (outcome, elapsed, solver_stats) = solve(cnf, label, common);

    if common.verify {
        verify_solution(cnf, outcome.model())?;
    }

    if common.stats {
        print_stats(parse_time, elapsed, cnf, &solver_stats, None);
    }

    if common.print_solution {
        if let Some(model) = outcome.model() {
            println!("{model}");
        }
    }

    let status = Status::from(&outcome);
    println!("\n{status}");
    Ok(status)
}

fn count_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<Status, CliError> {
    let (enumeration, elapsed) = enumerate(cnf, label, common);

    if common.verify {
        let ok = enumeration.models.iter().all(|model| cnf.verify(model));
        println!("Verified: {ok:?}");
        if !ok {
            return Err(CliError::VerificationFailed);
        }
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            cnf,
            &enumeration.stats.search,
            Some(enumeration.stats.blocking_clauses),
        );
    }

    if common.print_solution {
        for model in &enumeration.models {
            println!("{model}");
        }
    }

    print_total(&enumeration);
    let status = Status::of_enumeration(&enumeration);
    println!("\n{status}");
    Ok(status)
}

fn print_total(enumeration: &Enumeration) {
    let total = enumeration.models.len();
    match enumeration.status {
        EnumerationStatus::Exhausted => println!("Total solutions: {total}"),
        EnumerationStatus::LimitReached => {
            println!("Total solutions: at least {total} (limit reached)");
        }
        EnumerationStatus::Aborted => println!("Total solutions: at least {total} (aborted)"),
    }
}

/// Solves a DIMACS file, or every file under `path` if it is a directory.
pub(crate) fn solve_path(path: &Path, common: &CommonOptions) -> Result<Status, CliError> {
    if path.is_dir() {
        return solve_dir(path, common);
    }

    let time = Instant::now();
    let cnf = parse_file(path)?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, Some(path), parse_time)
}

/// Solves a directory of CNF files.
/// This function walks the directory in file-name order, solving every
/// `.cnf` file as DIMACS and every `.sudoku` file as a puzzle. Other files
/// are skipped.
///
/// # Returns
/// The least favourable verdict seen: aborted over unsatisfiable over
/// satisfiable.
///
/// # Errors
/// The first file that cannot be read or parsed stops the walk.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Result<Status, CliError> {
    let mut worst = Status::Satisfiable;

    for entry in walkdir::WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        let status = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some("cnf") => solve_path(file_path, common)?,
            Some("sudoku") => solve_sudoku(PuzzleSource::File(file_path), false, common)?,
            _ => {
                debug!("Skipping: {}", file_path.display());
                continue;
            }
        };
        worst = worst.max(status);
    }

    Ok(worst)
}

/// Solves a formula typed on the command line.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Result<Status, CliError> {
    let time = Instant::now();
    let clauses = parse_textual_cnf(input)?;
    let cnf = Cnf::from_clauses(clauses)?;
    let parse_time = time.elapsed();

    solve_and_report(&cnf, common, None, parse_time)
}

fn check_grid(solution: &Sudoku, puzzle: &Sudoku, common: &CommonOptions) -> Result<(), CliError> {
    if common.verify && !(solution.is_solved() && solution.agrees_with(puzzle)) {
        return Err(CliError::VerificationFailed);
    }
    Ok(())
}

/// Solves a Sudoku puzzle and prints the grid, or with `--count` prints
/// every solution and the total.
///
/// # Errors
///
/// Parse errors before any solving, a failed write of the DIMACS export, or
/// a model that does not decode to a valid grid.
pub(crate) fn solve_sudoku(
    source: PuzzleSource<'_>,
    export_dimacs: bool,
    common: &CommonOptions,
) -> Result<Status, CliError> {
    let time = Instant::now();
    let (sudoku, label) = match source {
        PuzzleSource::Text(text) => (parse_sudoku(text)?, None),
        PuzzleSource::File(path) => (parse_sudoku_file(path)?, Some(path)),
    };
    println!("Parsed Sudoku:\n{sudoku}");

    let cnf = sudoku.to_cnf()?;

    if export_dimacs {
        let dimacs = cnf.to_string();
        println!("DIMACS:\n{dimacs}");

        if let Some(path) = label {
            let mut dimacs_path = path.as_os_str().to_owned();
            dimacs_path.push(".cnf");
            let dimacs_path = PathBuf::from(dimacs_path);
            std::fs::write(&dimacs_path, dimacs).map_err(|source| CliError::Write {
                path: dimacs_path.clone(),
                source,
            })?;
            println!("DIMACS written to: {}", dimacs_path.display());
        }
    }

    let parse_time = time.elapsed();

    if common.count {
        let (enumeration, elapsed) = enumerate(&cnf, label, common);
        if common.stats {
            print_stats(
                parse_time,
                elapsed,
                &cnf,
                &enumeration.stats.search,
                Some(enumeration.stats.blocking_clauses),
            );
        }

        for (idx, model) in enumeration.models.iter().enumerate() {
            let solution = sudoku.decode(model)?;
            check_grid(&solution, &sudoku, common)?;
            println!("Solution {}:\n{solution}", idx + 1);
        }
        if enumeration.models.is_empty() && enumeration.status == EnumerationStatus::Exhausted {
            println!("No solution");
        }
        print_total(&enumeration);
        return Ok(Status::of_enumeration(&enumeration));
    }

    let (outcome, elapsed, solver_stats) = solve(&cnf, label, common);

    if common.verify {
        verify_solution(&cnf, outcome.model())?;
    }

    if common.stats {
        print_stats(parse_time, elapsed, &cnf, &solver_stats, None);
    }

    match &outcome {
        SolveOutcome::Satisfiable(model) => {
            let solution = sudoku.decode(model)?;
            check_grid(&solution, &sudoku, common)?;
            println!("Solution:\n{solution}");
        }
        SolveOutcome::Unsatisfiable => println!("No solution"),
        SolveOutcome::Aborted => println!("Search aborted"),
    }

    Ok(Status::from(&outcome))
}

fn memory_usage() -> Option<(f64, f64)> {
    const MIB: f64 = 1024.0 * 1024.0;

    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((allocated as f64 / MIB, resident as f64 / MIB))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
///
/// # Arguments
/// * `parse_time` - Duration spent parsing the input.
/// * `elapsed` - Duration spent searching.
/// * `cnf` - The formula as given, without blocking clauses.
/// * `s` - Search counters, summed over every search when enumerating.
/// * `blocking_clauses` - Number of blocking clauses added, when enumerating.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    blocking_clauses: Option<usize>,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars());
    stat_line("Clauses", cnf.len());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Max decision level", s.max_depth);
    if let Some(blocking) = blocking_clauses {
        stat_line("Blocking clauses", blocking);
    }
    if let Some((allocated, resident)) = memory_usage() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
