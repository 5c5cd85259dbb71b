use clap::Args;
use serde_json::Value;

use pfcalc_core::portfolio::simulator::{self, PortfolioSimInput};

use crate::input;

/// Arguments for portfolio growth simulation
#[derive(Args)]
pub struct PortfolioSimArgs {
    /// Starting balance
    #[arg(long)]
    pub initial: Option<f64>,

    /// Contribution at the end of each month
    #[arg(long)]
    pub monthly: Option<f64>,

    /// Projection horizon in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Expected annual return as a decimal (0.07 = 7%)
    #[arg(long, alias = "return")]
    pub expected_return: Option<f64>,

    /// Annual volatility as a decimal (0.15 = 15%)
    #[arg(long)]
    pub volatility: Option<f64>,

    /// Number of simulated paths
    #[arg(long, default_value = "1000")]
    pub paths: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio_sim(args: PortfolioSimArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input: PortfolioSimInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(&args)?
    };
    let result = simulator::simulate_portfolio(&sim_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: &PortfolioSimArgs) -> Result<PortfolioSimInput, Box<dyn std::error::Error>> {
    Ok(PortfolioSimInput {
        initial_investment: args
            .initial
            .ok_or("--initial is required (or pass --input / pipe JSON)")?,
        monthly_contribution: args.monthly.unwrap_or(0.0),
        years: args.years.ok_or("--years is required")?,
        expected_annual_return: args.expected_return.ok_or("--expected-return is required")?,
        annual_volatility: args.volatility.ok_or("--volatility is required")?,
        num_paths: args.paths,
        seed: args.seed,
    })
}
