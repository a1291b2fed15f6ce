use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::Cli;
use explite_runtime::logging;

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    commands::run(cli)
}
