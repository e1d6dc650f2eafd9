//! # tiny-sat
//!
//! `tiny-sat` is a command-line front end for a small DPLL SAT solver. It
//! solves problems in CNF (Conjunctive Normal Form) DIMACS format, CNF given
//! as plain text, and Sudoku puzzles by converting them to CNF. Any of them
//! can also be counted: models are enumerated one by one, each found model
//! being excluded by a blocking clause before the next search.
//!
//! ## Usage
//!
//! ```sh
//! tiny-sat [OPTIONS] [PATH] [SUBCOMMAND]
//! ```
//!
//! 1.  **`file`**: Solve a DIMACS file, or every `.cnf`/`.sudoku` file in a
//!     directory.
//!     ```sh
//!     tiny-sat file --path <path_to_cnf_file> [OPTIONS]
//!     ```
//!
//! 2.  **`text`**: Solve a CNF formula provided as plain text.
//!     ```sh
//!     tiny-sat text --input "1 -2 0\n2 3 0" [OPTIONS]
//!     ```
//!
//! 3.  **`sudoku`**: Solve a Sudoku puzzle given inline or in a file.
//!     ```sh
//!     tiny-sat sudoku --puzzle "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79"
//!     tiny-sat sudoku --path puzzle.sudoku --count --limit 10
//!     ```
//!
//! 4.  **`completions`**: Print a shell completion script.
//!
//! ### Common Options
//!
//! -   `-d, --debug`: Debug logging (`RUST_LOG` overrides the filter).
//! -   `-v, --verify`: Check reported models.
//! -   `-s, --stats`: Print problem and search statistics.
//! -   `-p, --print-solution`: Print models as DIMACS `v` lines.
//! -   `-c, --count`: Enumerate and count models.
//! -   `-l, --limit <N>`: Stop counting after `N` models.
//! -   `-t, --timeout <SECONDS>`: Abort the search after a deadline.
//! -   `--variable-selection <first-unsatisfied|fixed-order>`: Branching policy.
//!
//! ## Exit Codes
//!
//! `0` a model was found, `1` no model exists, `2` the input could not be
//! read or parsed, `3` the search was aborted, `4` a model failed a
//! consistency check.

use clap::{CommandFactory, Parser};
use command_line::cli::{
    Cli, CliError, Commands, PuzzleSource, Status, solve_path, solve_sudoku, solve_text,
};
use std::process::ExitCode;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also provides the
/// memory figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug());

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "tiny-sat", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn run(cli: Cli) -> Result<Status, CliError> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_path(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Sudoku {
            puzzle,
            path,
            export_dimacs,
            common,
        }) => {
            let source = match (&puzzle, &path) {
                (Some(text), _) => PuzzleSource::Text(text),
                (None, Some(path)) => PuzzleSource::File(path),
                (None, None) => missing_input("sudoku needs --puzzle or --path"),
            };
            solve_sudoku(source, export_dimacs, &common)
        }
        Some(Commands::Completions { .. }) | None => match cli.path {
            Some(path) => solve_path(&path, &cli.common),
            None => missing_input("provide a path or a subcommand"),
        },
    }
}

fn missing_input(message: &str) -> ! {
    Cli::command()
        .error(clap::error::ErrorKind::MissingRequiredArgument, message)
        .exit()
}
