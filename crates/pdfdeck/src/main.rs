mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use colored::Colorize;

fn main() {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let _logger = match logging::init(cli.verbose, cli.quiet, !cli.no_color) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("{} Failed to start logging: {e}", "warning:".yellow().bold());
            None
        }
    };

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
