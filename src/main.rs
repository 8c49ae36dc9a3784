// src/main.rs
use anyhow::Result;
use clap::Parser;

use tidewatchr::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for the report
    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    cli::run(args)
}
