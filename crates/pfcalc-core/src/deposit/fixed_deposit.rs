//! Fixed-deposit maturity math.
//!
//! Cumulative deposits compound at the bank's stated frequency, with any
//! broken period (months left over after the last full compounding period)
//! accruing simple interest. Payout deposits pay simple interest each
//! period and return the principal at maturity.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PfCalcError;
use crate::time_value::compound_factor;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PfCalcResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Compounding (or payout) frequency offered on the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::HalfYearly => 2,
            CompoundingFrequency::Yearly => 1,
        }
    }

    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }
}

/// Whether interest compounds or is paid out each period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMode {
    /// Interest is reinvested and paid at maturity.
    #[default]
    Cumulative,
    /// Simple interest paid out every period; principal returned at maturity.
    SimpleInterest,
}

/// Fixed-deposit input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdInput {
    pub principal: Money,
    /// Quoted annual rate as a percentage (e.g. 7.1 for 7.1%).
    pub annual_rate_pct: Rate,
    pub tenure_months: u32,
    pub compounding: CompoundingFrequency,
    #[serde(default)]
    pub payout: PayoutMode,
    /// Value date of the deposit; enables the maturity date in the output.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FdOutput {
    pub maturity_value: Money,
    pub interest_earned: Money,
    /// Annualised yield implied by the maturity value, as a percentage.
    pub effective_annual_yield_pct: Rate,
    /// Interest paid each period under `SimpleInterest` payout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodic_payout: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute maturity value, interest earned and effective yield for a
/// fixed deposit.
pub fn calculate_fixed_deposit(input: &FdInput) -> PfCalcResult<ComputationOutput<FdOutput>> {
    let start = Instant::now();

    validate_fd(input)?;
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_rate_pct > dec!(15) {
        warnings.push(format!(
            "Deposit rate {}% is unusually high",
            input.annual_rate_pct
        ));
    }

    let annual_rate = input.annual_rate_pct / dec!(100);
    let months = Decimal::from(input.tenure_months);

    let (maturity_value, periodic_payout) = match input.payout {
        PayoutMode::Cumulative => {
            let m = input.compounding.periods_per_year();
            let months_per_period = input.compounding.months_per_period();
            let full_periods = input.tenure_months / months_per_period;
            let broken_months = input.tenure_months % months_per_period;

            let period_rate = annual_rate / Decimal::from(m);
            let mut value = input.principal * compound_factor(period_rate, full_periods);

            // Broken period accrues simple interest on the compounded value.
            if broken_months > 0 {
                value *= Decimal::ONE + annual_rate * Decimal::from(broken_months) / dec!(12);
            }
            (value, None)
        }
        PayoutMode::SimpleInterest => {
            let months_per_period = Decimal::from(input.compounding.months_per_period());
            let payout = input.principal * annual_rate * months_per_period / dec!(12);
            (input.principal, Some(payout))
        }
    };

    let (total_interest, total_proceeds) = match input.payout {
        PayoutMode::Cumulative => (maturity_value - input.principal, maturity_value),
        PayoutMode::SimpleInterest => {
            let interest = input.principal * annual_rate * months / dec!(12);
            (interest, input.principal + interest)
        }
    };

    // Annualised yield implied by total proceeds over the tenure.
    let proceeds_ratio = total_proceeds / input.principal;
    let effective_annual_yield_pct =
        (proceeds_ratio.powd(dec!(12) / months) - Decimal::ONE) * dec!(100);

    let maturity_date = input
        .start_date
        .and_then(|d| d.checked_add_months(Months::new(input.tenure_months)));

    let output = FdOutput {
        maturity_value,
        interest_earned: total_interest,
        effective_annual_yield_pct,
        periodic_payout,
        maturity_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Deposit Compounding",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_fd(input: &FdInput) -> PfCalcResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(PfCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(PfCalcError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Deposit rate cannot be negative".into(),
        });
    }
    if input.tenure_months == 0 {
        return Err(PfCalcError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Tenure must be at least one month".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn quarterly_fd() -> FdInput {
        FdInput {
            principal: dec!(100_000),
            annual_rate_pct: dec!(6),
            tenure_months: 12,
            compounding: CompoundingFrequency::Quarterly,
            payout: PayoutMode::Cumulative,
            start_date: None,
        }
    }

    fn run(input: &FdInput) -> FdOutput {
        calculate_fixed_deposit(input).unwrap().result
    }

    #[test]
    fn test_quarterly_compounding_known_answer() {
        // 100,000 at 6% quarterly for a year: 100,000 * 1.015^4 = 106,136.36
        let out = run(&quarterly_fd());
        assert_close(out.maturity_value, dec!(106_136.36), TOL, "maturity");
        assert_close(out.interest_earned, dec!(6_136.36), TOL, "interest");
    }

    #[test]
    fn test_effective_yield_exceeds_quoted_rate() {
        // Quarterly compounding at 6% quoted: EAY ≈ 6.136%
        let out = run(&quarterly_fd());
        assert_close(out.effective_annual_yield_pct, dec!(6.136), dec!(0.001), "EAY");
    }

    #[test]
    fn test_broken_period_simple_interest_tail() {
        // 4 full quarters then 2 months simple at 6%:
        // 106,136.36 * (1 + 0.06 * 2/12) = 107,197.72
        let mut input = quarterly_fd();
        input.tenure_months = 14;
        let out = run(&input);
        assert_close(out.maturity_value, dec!(107_197.72), TOL, "broken period");
    }

    #[test]
    fn test_simple_interest_payout() {
        // Monthly payout at 6% on 100,000: 500 per month, principal back.
        let input = FdInput {
            compounding: CompoundingFrequency::Monthly,
            payout: PayoutMode::SimpleInterest,
            ..quarterly_fd()
        };
        let out = run(&input);
        assert_eq!(out.maturity_value, dec!(100_000));
        assert_eq!(out.periodic_payout, Some(dec!(500)));
        assert_eq!(out.interest_earned, dec!(6_000));
    }

    #[test]
    fn test_zero_rate_deposit() {
        let mut input = quarterly_fd();
        input.annual_rate_pct = Decimal::ZERO;
        let out = run(&input);
        assert_eq!(out.maturity_value, dec!(100_000));
        assert_eq!(out.interest_earned, Decimal::ZERO);
        assert_eq!(out.effective_annual_yield_pct, Decimal::ZERO);
    }

    #[test]
    fn test_maturity_date() {
        let mut input = quarterly_fd();
        input.start_date = Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        input.tenure_months = 18;
        let out = run(&input);
        assert_eq!(
            out.maturity_date,
            Some(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap())
        );
    }

    #[test]
    fn test_yearly_equals_single_compound() {
        let input = FdInput {
            compounding: CompoundingFrequency::Yearly,
            ..quarterly_fd()
        };
        let out = run(&input);
        assert_eq!(out.maturity_value, dec!(106_000));
    }

    #[test]
    fn test_validation_rejects_zero_tenure() {
        let mut input = quarterly_fd();
        input.tenure_months = 0;
        assert!(calculate_fixed_deposit(&input).is_err());
    }

    #[test]
    fn test_validation_rejects_nonpositive_principal() {
        let mut input = quarterly_fd();
        input.principal = dec!(-5);
        assert!(calculate_fixed_deposit(&input).is_err());
    }
}
