mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::debt::DebtPayoffArgs;
use commands::deposit::FdArgs;
use commands::emi::EmiArgs;
use commands::portfolio::PortfolioSimArgs;

/// Personal-finance calculators
#[derive(Parser)]
#[command(
    name = "pfc",
    version,
    about = "Personal-finance calculators with decimal precision",
    long_about = "A CLI for personal-finance calculations: loan EMI with \
                  prepayment analysis, fixed-deposit maturity, debt payoff \
                  planning, and seedable portfolio growth simulation."
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
    /// Loan EMI with optional prepayment comparison
    Emi(EmiArgs),
    /// Fixed-deposit maturity value and effective yield
    Fd(FdArgs),
    /// Multi-debt payoff plan (snowball / avalanche)
    DebtPayoff(DebtPayoffArgs),
    /// Seedable portfolio growth simulation
    PortfolioSim(PortfolioSimArgs),
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
        Commands::Emi(args) => commands::emi::run_emi(args),
        Commands::Fd(args) => commands::deposit::run_fd(args),
        Commands::DebtPayoff(args) => commands::debt::run_debt_payoff(args),
        Commands::PortfolioSim(args) => commands::portfolio::run_portfolio_sim(args),
        Commands::Version => {
            println!("pfc {}", env!("CARGO_PKG_VERSION"));
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
