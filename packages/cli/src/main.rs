mod commands;
mod config;
mod save;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, inspect, EditArgs, InspectArgs};
use config::Config;
use std::path::PathBuf;

/// Folio - rotate, delete and reorder PDF pages
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./folio.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log library events at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the pages of a PDF with their size and rotation
    Inspect(InspectArgs),

    /// Apply page edits and write an edited copy
    Edit(EditArgs),
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cwd: &str) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(cwd)?,
    };

    match cli.command {
        Command::Inspect(args) => inspect(args, cwd),
        Command::Edit(args) => edit(args, cwd, &config).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli, &cwd).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
