mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analyze::AnalyzeArgs;
use commands::batch::BatchArgs;
use commands::cashflow::CashflowArgs;
use commands::rate::RateArgs;
use commands::reserves::ReservesArgs;
use commands::score::ScoreArgs;

/// Rental property investment analysis
#[derive(Parser)]
#[command(
    name = "reia",
    version,
    about = "Rental property investment analysis",
    long_about = "A CLI for analyzing rental property investments with decimal precision. \
                  Covers mortgage amortization, maintenance and CapEx reserves, monthly \
                  cashflow, appreciation projections, and composite deal scoring."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full deal analysis pipeline on one property
    Analyze(AnalyzeArgs),
    /// Calculate monthly and annual cashflow components
    Cashflow(CashflowArgs),
    /// Estimate maintenance and CapEx reserves
    Reserves(ReservesArgs),
    /// Print the CapEx component reference guide
    CapexGuide,
    /// Resolve the effective appreciation rate for a neighborhood
    Rate(RateArgs),
    /// Score a deal from already-computed metrics
    Score(ScoreArgs),
    /// Analyze an array of deals in one run
    Batch(BatchArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args),
        Commands::Cashflow(args) => commands::cashflow::run_cashflow(args),
        Commands::Reserves(args) => commands::reserves::run_reserves(args),
        Commands::CapexGuide => commands::reserves::run_capex_guide(),
        Commands::Rate(args) => commands::rate::run_rate(args),
        Commands::Score(args) => commands::score::run_score(args),
        Commands::Batch(args) => commands::batch::run_batch(args),
        Commands::Version => {
            println!("reia {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
