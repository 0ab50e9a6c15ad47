use std::{io, process};

use tracing::error;

mod cli;
mod command;
mod error;
mod lockfile;
mod manifest;

fn main() {
    init_logging();

    if let Err(error) = cli::execute() {
        error!("{error:#}");
        process::exit(1);
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_target(false)
        .init();
}
