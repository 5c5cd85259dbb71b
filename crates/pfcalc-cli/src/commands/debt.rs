use clap::Args;
use serde_json::Value;

use pfcalc_core::debt::payoff::{self, DebtPayoffInput};

use crate::input;

/// Arguments for debt payoff planning
#[derive(Args)]
pub struct DebtPayoffArgs {
    /// Path to JSON input file with debts, budget, and strategy
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_debt_payoff(args: DebtPayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input: DebtPayoffInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for debt payoff planning".into());
    };
    let result = payoff::plan_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}
