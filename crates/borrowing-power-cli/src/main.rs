mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::borrowing::MaxBorrowingArgs;
use commands::deposit::DepositArgs;
use commands::serviceability::ServiceabilityArgs;
use commands::stamp_duty::StampDutyArgs;
use commands::tax::TaxArgs;

/// Borrowing-power and purchase-cost calculations
#[derive(Parser)]
#[command(
    name = "bpa",
    version,
    about = "Borrowing-power and purchase-cost calculations",
    long_about = "A CLI for sizing home-loan borrowing capacity with decimal precision. \
                  Runs the deposit and serviceability constraint solvers across LVR \
                  bands, prices transfer duty by state, and suggests improvement \
                  scenarios for the binding constraint."
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
    /// Full maximum-borrowing assessment (both solvers, all LVR bands)
    MaxBorrowing(MaxBorrowingArgs),
    /// Deposit-side capacity only: what the savings can purchase
    Deposit(DepositArgs),
    /// Transfer duty and purchase costs for one property price
    StampDuty(StampDutyArgs),
    /// Household surplus with a proposed loan on the books
    Serviceability(ServiceabilityArgs),
    /// Income tax assessment for one taxable income
    Tax(TaxArgs),
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
        Commands::MaxBorrowing(args) => commands::borrowing::run_max_borrowing(args),
        Commands::Deposit(args) => commands::deposit::run_deposit(args),
        Commands::StampDuty(args) => commands::stamp_duty::run_stamp_duty(args),
        Commands::Serviceability(args) => commands::serviceability::run_serviceability(args),
        Commands::Tax(args) => commands::tax::run_tax(args),
        Commands::Version => {
            println!("bpa {}", env!("CARGO_PKG_VERSION"));
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
