use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use pfcalc_core::deposit::fixed_deposit::{
    calculate_fixed_deposit, CompoundingFrequency, FdInput, PayoutMode,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompoundingArg {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl From<CompoundingArg> for CompoundingFrequency {
    fn from(value: CompoundingArg) -> Self {
        match value {
            CompoundingArg::Monthly => CompoundingFrequency::Monthly,
            CompoundingArg::Quarterly => CompoundingFrequency::Quarterly,
            CompoundingArg::HalfYearly => CompoundingFrequency::HalfYearly,
            CompoundingArg::Yearly => CompoundingFrequency::Yearly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PayoutArg {
    Cumulative,
    Simple,
}

impl From<PayoutArg> for PayoutMode {
    fn from(value: PayoutArg) -> Self {
        match value {
            PayoutArg::Cumulative => PayoutMode::Cumulative,
            PayoutArg::Simple => PayoutMode::SimpleInterest,
        }
    }
}

/// Arguments for fixed-deposit calculation
#[derive(Args)]
pub struct FdArgs {
    /// Deposit amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate as a percentage (e.g. 7.1)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Compounding frequency
    #[arg(long, value_enum, default_value = "quarterly")]
    pub compounding: CompoundingArg,

    /// Interest payout mode
    #[arg(long, value_enum, default_value = "cumulative")]
    pub payout: PayoutArg,

    /// Value date (YYYY-MM-DD); enables the maturity date in the output
    #[arg(long)]
    pub start_date: Option<String>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_fd(args: FdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fd_input: FdInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(&args)?
    };
    let result = calculate_fixed_deposit(&fd_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: &FdArgs) -> Result<FdInput, Box<dyn std::error::Error>> {
    let principal = args
        .principal
        .ok_or("--principal is required (or pass --input / pipe JSON)")?;
    let annual_rate_pct = args.rate.ok_or("--rate is required")?;
    let tenure_months = args.months.ok_or("--months is required")?;

    let start_date = args
        .start_date
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| format!("Invalid --start-date: {e}"))?;

    Ok(FdInput {
        principal,
        annual_rate_pct,
        tenure_months,
        compounding: args.compounding.into(),
        payout: args.payout.into(),
        start_date,
    })
}
