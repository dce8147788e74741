//! Command-line interface for quickargs
//!
//! Provides `resolve` and `options` subcommands over a configuration document.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod options;
mod resolve;
mod utils;

/// Override any value of a YAML configuration from the command line
#[derive(Parser)]
#[command(name = "quickargs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge overrides into a configuration and print the result
    Resolve(resolve::ResolveArgs),

    /// List the override options a configuration accepts
    Options(options::OptionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve(args) => resolve::run(args),
        Commands::Options(args) => options::run(args),
    }
}

/// Log to stderr so resolved documents on stdout stay clean. `RUST_LOG`
/// directives win over the `--verbose` default.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
