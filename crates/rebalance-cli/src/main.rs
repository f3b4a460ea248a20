mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::allocate::AllocateArgs;
use commands::chart::ChartArgs;
use commands::parse::ParseArgs;

/// Distribute new contributions toward a target portfolio allocation
#[derive(Parser)]
#[command(
    name = "rebal",
    version,
    about = "Distribute new contributions toward a target portfolio allocation",
    long_about = "Given assets with current values and target percentages plus an amount \
                  of new capital, suggests how much to put into each asset so the \
                  portfolio moves toward its targets. Capital goes to underweight assets \
                  in proportion to how far each is below target."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log inputs and intermediate totals to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a contribution per asset and show the resulting table
    Allocate(AllocateArgs),
    /// Before/after pie-chart datasets for the suggested contributions
    Chart(ChartArgs),
    /// Show how a piece of form text is read as a number
    Parse(ParseArgs),
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
    logging::init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Allocate(args) => commands::allocate::run_allocate(args),
        Commands::Chart(args) => commands::chart::run_chart(args),
        Commands::Parse(args) => commands::parse::run_parse(args),
        Commands::Version => {
            println!("rebal {}", env!("CARGO_PKG_VERSION"));
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
