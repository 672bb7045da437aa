//! Lint CLI
//!
//! Resolves the configuration hierarchy for the working directory and lints
//! the given paths with the built-in rules.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cwd = std::env::current_dir()?;
    match cli.command {
        Some(Commands::Lint(args)) => commands::run_lint(&cwd, &args),
        Some(Commands::Rules(args)) => commands::run_rules(&cwd, &args).map(|()| 0),
        None => commands::run_lint(&cwd, &cli.lint),
    }
}
