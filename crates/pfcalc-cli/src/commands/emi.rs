use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use pfcalc_core::amortization::loan::{
    analyze_loan, LoanInput, PrepaymentFrequency, PrepaymentPolicy,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PrepayFrequencyArg {
    Monthly,
    Quarterly,
    Annual,
}

impl From<PrepayFrequencyArg> for PrepaymentFrequency {
    fn from(value: PrepayFrequencyArg) -> Self {
        match value {
            PrepayFrequencyArg::Monthly => PrepaymentFrequency::Monthly,
            PrepayFrequencyArg::Quarterly => PrepaymentFrequency::Quarterly,
            PrepayFrequencyArg::Annual => PrepaymentFrequency::Annual,
        }
    }
}

/// Arguments for loan EMI analysis
#[derive(Args)]
pub struct EmiArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate as a percentage (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Extra principal paid on each prepayment date
    #[arg(long)]
    pub prepay_amount: Option<Decimal>,

    /// Prepayment cadence
    #[arg(long, value_enum)]
    pub prepay_frequency: Option<PrepayFrequencyArg>,

    /// First month (1-based) the prepayment applies
    #[arg(long, default_value = "1")]
    pub prepay_start_month: u32,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_emi(args: EmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(&args)?
    };
    let result = analyze_loan(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: &EmiArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    let principal = args
        .principal
        .ok_or("--principal is required (or pass --input / pipe JSON)")?;
    let annual_rate_pct = args.rate.ok_or("--rate is required")?;
    let tenure_years = args.years.ok_or("--years is required")?;

    let prepayment = match (args.prepay_amount, args.prepay_frequency) {
        (Some(amount), Some(frequency)) => Some(PrepaymentPolicy {
            frequency: frequency.into(),
            amount,
            start_month: args.prepay_start_month,
        }),
        (Some(_), None) => {
            return Err("--prepay-frequency is required when --prepay-amount is given".into())
        }
        _ => None,
    };

    Ok(LoanInput {
        principal,
        annual_rate_pct,
        tenure_years,
        prepayment,
    })
}
