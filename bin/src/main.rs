//! ronda CLI binary.
//!
//! Runs the ronda valuation models against a company snapshot and prints the
//! results as text tables or JSON.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::Format;
use data::Inputs;
use std::{io, path::PathBuf, process};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Investment banking valuation toolkit", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Company snapshot (JSON); the built-in reference company when omitted
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Partial model configuration (JSON) merged over the defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: Format,

    /// Log model internals at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models
    Models {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Show descriptions and data requirements
        #[arg(short, long)]
        detailed: bool,
    },

    /// Discounted cash flow valuation
    Dcf,

    /// Free cash flow history and projection
    Fcf,

    /// Sum-of-the-parts valuation
    Sotp,

    /// Trading comparables
    Comps,

    /// Precedent transactions
    Precedents,

    /// Leveraged buyout returns
    Lbo,

    /// Merger accretion/dilution against a target snapshot
    Merger {
        /// Target company snapshot (JSON); the acquirer comes from --data
        #[arg(long)]
        target: PathBuf,
    },

    /// IPO pricing
    Ipo,

    /// Credit metrics and debt capacity
    Credit,

    /// SaaS unit economics and monthly operating model
    Operating,

    /// Integrated three-statement projection
    ThreeStatement,

    /// DCF sensitivity sweeps and scenarios
    Sensitivity,

    /// Investment committee memo
    Memo,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Logs go to stderr so JSON on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let inputs = Inputs {
        data: cli.data,
        config: cli.config,
        format: cli.format,
    };

    match cli.command {
        Commands::Models { category, detailed } => {
            cmd::models::list_models(category.as_deref(), detailed, inputs.format)
        }
        Commands::Dcf => cmd::intrinsic::dcf(&inputs),
        Commands::Fcf => cmd::intrinsic::fcf(&inputs),
        Commands::Sotp => cmd::intrinsic::sotp(&inputs),
        Commands::Comps => cmd::relative::comps(&inputs),
        Commands::Precedents => cmd::relative::precedents(&inputs),
        Commands::Lbo => cmd::transaction::lbo(&inputs),
        Commands::Merger { target } => cmd::transaction::merger(&inputs, &target),
        Commands::Ipo => cmd::transaction::ipo(&inputs),
        Commands::Credit => cmd::credit::credit(&inputs),
        Commands::Operating => cmd::operating::operating(&inputs),
        Commands::ThreeStatement => cmd::operating::three_statement(&inputs),
        Commands::Sensitivity => cmd::composite::sensitivity(&inputs),
        Commands::Memo => cmd::composite::memo(&inputs),
    }
}
