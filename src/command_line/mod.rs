/// Argument parsing and the solve/report drivers behind each subcommand.
pub(crate) mod cli;
