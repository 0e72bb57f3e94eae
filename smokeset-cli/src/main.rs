// smokeset-cli/src/main.rs
//
// Entry point of the `smokeset` binary: parses arguments, installs the
// logger and dispatches to the command implementations. Any error is printed
// to stderr and the process exits with status 1.

use clap::Parser;
use smokeset_cli::{Cli, Commands, init_logging, run_extract, run_split, run_subsample};

use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract(args) => run_extract(args),
        Commands::Split(args) => run_split(args),
        Commands::Subsample(args) => run_subsample(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
