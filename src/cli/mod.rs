// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Parses the command-line arguments into a `CliArgs` struct. If parsing
/// fails (invalid arguments, missing required arguments, or the --help
/// flag), clap displays an error message or help text and exits the
/// process.
///
/// # Returns
///
/// Returns a `CliArgs` struct with the parsed command-line arguments.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
