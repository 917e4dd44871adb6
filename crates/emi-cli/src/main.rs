mod chart;
mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use emi_core::calculator::EmiCalculator;

use chart::TerminalChart;
use commands::explore::ExploreArgs;
use commands::loan::{BreakdownArgs, CalculateArgs, ScheduleArgs};

/// Loan EMI and amortization schedule calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan EMI and amortization schedule calculations",
    long_about = "A CLI for fixed-rate loan calculations with decimal precision. \
                  Computes the equated monthly installment, total interest, the \
                  month-by-month amortization schedule and the principal/interest \
                  split of the total amount payable."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly installment, total interest and total payment
    Calculate(CalculateArgs),
    /// Month-by-month amortization schedule, one page at a time
    Schedule(ScheduleArgs),
    /// Principal vs interest share of the total payment
    Breakdown(BreakdownArgs),
    /// Interactive calculator session driven from stdin
    Explore(ExploreArgs),
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

impl OutputFormat {
    /// Only the table view is followed by the terminal chart; the other
    /// formats stay machine-readable.
    pub fn carries_chart(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emi=debug,emi_core=debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emi=warn,emi_core=warn"))
    };

    // stdout carries the results
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut chart_params = None;

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => {
            commands::loan::run_calculate(args).map(|(value, params)| {
                chart_params = Some(params);
                value
            })
        }
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Breakdown(args) => commands::loan::run_breakdown(args),
        Commands::Explore(args) => commands::explore::run_explore(args, &cli.output),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if !value.is_null() {
                output::format_output(&cli.output, &value);
            }
            if let Some(params) = chart_params.filter(|_| cli.output.carries_chart()) {
                let mut calc = EmiCalculator::new(params);
                calc.attach_surface(Box::new(TerminalChart::stdout()));
            }
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_table_output_carries_chart() {
        assert!(OutputFormat::Table.carries_chart());
        assert!(!OutputFormat::Json.carries_chart());
        assert!(!OutputFormat::Csv.carries_chart());
        assert!(!OutputFormat::Minimal.carries_chart());
    }
}
