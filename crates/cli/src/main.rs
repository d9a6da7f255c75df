// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pj - unattended print queue with plate ejection

mod adapters;
mod commands;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{completions, ejector, macros, run, validate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pj",
    version,
    about = "pj runs a queue of print jobs, swapping build plates with an ejector arm"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a run file's rack sequence without touching hardware
    Validate(validate::ValidateArgs),
    /// Execute every job in a run file
    Run(run::RunArgs),
    /// Drive the ejector arm directly
    Ejector(ejector::EjectorArgs),
    /// Look up default device macros
    Macros(macros::MacrosArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions(args) = cli.command {
        completions::handle::<Cli>(args);
        return Ok(());
    }

    let _guard = logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Validate(args) => validate::handle(args),
        Commands::Run(args) => run::handle(args).await,
        Commands::Ejector(args) => ejector::handle(args).await,
        Commands::Macros(args) => macros::handle(args),
        Commands::Completions(_) => Ok(()),
    }
}
