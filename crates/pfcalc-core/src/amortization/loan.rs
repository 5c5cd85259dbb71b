//! Reducing-balance loan amortisation with prepayment comparison.
//!
//! Computes the level monthly installment for a loan, simulates the
//! month-by-month schedule with an optional prepayment cadence, and reports
//! interest and tenure saved against the no-prepayment baseline. All math
//! in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PfCalcError;
use crate::time_value::{annuity_payment, periodic_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PfCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Balance threshold below which the loan is considered fully paid.
const BALANCE_EPSILON: Decimal = dec!(0.0001);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Cadence on which an extra principal payment is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrepaymentFrequency {
    /// No prepayment.
    #[default]
    None,
    /// Every month from `start_month` onward.
    Monthly,
    /// Every third month (month % 3 == 0) once `start_month` is reached.
    Quarterly,
    /// Every twelfth month (month % 12 == 0) once `start_month` is reached.
    Annual,
}

/// Extra-principal payment policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentPolicy {
    pub frequency: PrepaymentFrequency,
    /// Amount of each prepayment. Clamped so the balance never goes negative.
    pub amount: Money,
    /// First month (1-based) the policy is eligible to fire.
    #[serde(default = "default_start_month")]
    pub start_month: u32,
}

fn default_start_month() -> u32 {
    1
}

/// Top-level loan analysis input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount borrowed.
    pub principal: Money,
    /// Quoted annual rate as a percentage (e.g. 8.5 for 8.5%).
    pub annual_rate_pct: Rate,
    /// Contractual tenure in years.
    pub tenure_years: u32,
    /// Optional prepayment policy. Omitted means baseline only.
    #[serde(default)]
    pub prepayment: Option<PrepaymentPolicy>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One retained row of the detailed schedule. Rows are kept at the first
/// month, year boundaries, the payoff month, and the final scheduled month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// Absolute month index, 1-based.
    pub period: u32,
    /// Loan year, ceil(period / 12).
    pub year: u32,
    pub scheduled_payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub prepayment_component: Money,
    pub remaining_balance: Money,
}

/// Per-year aggregates across every simulated month of that year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRow {
    pub year: u32,
    /// Principal retired this year, prepayments included.
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub year_end_balance: Money,
}

/// Aggregate totals for one simulated schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_interest_paid: Money,
    /// principal + total_interest_paid, exactly.
    pub total_amount_paid: Money,
    /// Last month in which a payment was applied. Equals the contractual
    /// tenure unless prepayments retire the loan early.
    pub actual_tenure_months: u32,
    pub yearly_breakdown: Vec<YearRow>,
}

/// Full analysis: baseline vs prepayment schedule plus savings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysisOutput {
    pub monthly_installment: Money,
    pub contractual_tenure_months: u32,
    pub baseline: ScheduleSummary,
    pub with_prepayment: ScheduleSummary,
    /// baseline interest minus with-prepayment interest. Never negative.
    pub interest_saved: Money,
    /// baseline tenure minus with-prepayment tenure. Never negative.
    pub months_saved: u32,
    /// Retained detail rows for the with-prepayment schedule.
    pub schedule: Vec<ScheduleRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly installment for a reducing-balance loan.
pub fn monthly_installment(
    principal: Money,
    annual_rate_pct: Rate,
    tenure_years: u32,
) -> PfCalcResult<Money> {
    validate_terms(principal, annual_rate_pct, tenure_years)?;
    let rate = periodic_rate(annual_rate_pct, 12);
    annuity_payment(principal, rate, tenure_years * 12)
}

/// Run the full loan analysis: installment, baseline schedule, prepayment
/// schedule, and savings.
pub fn analyze_loan(input: &LoanInput) -> PfCalcResult<ComputationOutput<LoanAnalysisOutput>> {
    let start = Instant::now();

    validate_loan(input)?;
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_rate_pct > dec!(30) {
        warnings.push(format!(
            "Annual rate {}% is unusually high for a consumer loan",
            input.annual_rate_pct
        ));
    }
    if input.tenure_years > 40 {
        warnings.push(format!(
            "Tenure of {} years is unusually long",
            input.tenure_years
        ));
    }

    let monthly_rate = periodic_rate(input.annual_rate_pct, 12);
    let total_payments = input.tenure_years * 12;
    let installment = annuity_payment(input.principal, monthly_rate, total_payments)?;

    let (baseline, baseline_rows) =
        simulate_schedule(input.principal, monthly_rate, total_payments, installment, None);

    let (with_prepayment, schedule) = match &input.prepayment {
        Some(policy) if policy.frequency != PrepaymentFrequency::None && !policy.amount.is_zero() => {
            simulate_schedule(
                input.principal,
                monthly_rate,
                total_payments,
                installment,
                Some(policy),
            )
        }
        _ => (baseline.clone(), baseline_rows),
    };

    let interest_saved = baseline.total_interest_paid - with_prepayment.total_interest_paid;
    let months_saved = baseline.actual_tenure_months - with_prepayment.actual_tenure_months;

    let output = LoanAnalysisOutput {
        monthly_installment: installment,
        contractual_tenure_months: total_payments,
        baseline,
        with_prepayment,
        interest_saved,
        months_saved,
        schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Reducing-Balance Amortisation with Prepayment Comparison",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Simulate the month-by-month schedule. Assumes validated terms.
pub fn simulate_schedule(
    principal: Money,
    monthly_rate: Rate,
    total_payments: u32,
    installment: Money,
    policy: Option<&PrepaymentPolicy>,
) -> (ScheduleSummary, Vec<ScheduleRow>) {
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut actual_tenure_months = total_payments;

    let mut rows: Vec<ScheduleRow> = Vec::new();
    let mut yearly: Vec<YearRow> = Vec::new();
    let mut year_principal = Decimal::ZERO;
    let mut year_interest = Decimal::ZERO;

    for month in 1..=total_payments {
        if balance <= Decimal::ZERO {
            actual_tenure_months = month - 1;
            break;
        }

        let interest = balance * monthly_rate;
        let mut principal_part = installment - interest;
        if principal_part > balance {
            principal_part = balance;
        }
        if principal_part < Decimal::ZERO {
            principal_part = Decimal::ZERO;
        }

        let mut prepayment = Decimal::ZERO;
        if let Some(p) = policy {
            if prepayment_due(p, month) {
                prepayment = p.amount.min(balance - principal_part);
                if prepayment < Decimal::ZERO {
                    prepayment = Decimal::ZERO;
                }
            }
        }

        balance -= principal_part + prepayment;
        if balance <= BALANCE_EPSILON {
            balance = Decimal::ZERO;
        }

        total_interest += interest;
        year_principal += principal_part + prepayment;
        year_interest += interest;

        let year = (month + 11) / 12;
        let paid_off = balance.is_zero();
        let year_boundary = month % 12 == 0;

        if month == 1 || year_boundary || paid_off || month == total_payments {
            rows.push(ScheduleRow {
                period: month,
                year,
                scheduled_payment: installment,
                principal_component: principal_part,
                interest_component: interest,
                prepayment_component: prepayment,
                remaining_balance: balance,
            });
        }

        if year_boundary || paid_off || month == total_payments {
            yearly.push(YearRow {
                year,
                principal_paid: year_principal,
                interest_paid: year_interest,
                year_end_balance: balance,
            });
            year_principal = Decimal::ZERO;
            year_interest = Decimal::ZERO;
        }

        if paid_off {
            actual_tenure_months = month;
            break;
        }
    }

    let summary = ScheduleSummary {
        total_interest_paid: total_interest,
        total_amount_paid: principal + total_interest,
        actual_tenure_months,
        yearly_breakdown: yearly,
    };

    (summary, rows)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Whether the policy fires this month. A start_month beyond the tenure is
/// valid and simply never triggers.
fn prepayment_due(policy: &PrepaymentPolicy, month: u32) -> bool {
    if policy.amount <= Decimal::ZERO || month < policy.start_month {
        return false;
    }
    match policy.frequency {
        PrepaymentFrequency::None => false,
        PrepaymentFrequency::Monthly => true,
        PrepaymentFrequency::Quarterly => month % 3 == 0,
        PrepaymentFrequency::Annual => month % 12 == 0,
    }
}

fn validate_terms(principal: Money, annual_rate_pct: Rate, tenure_years: u32) -> PfCalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(PfCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(PfCalcError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if tenure_years == 0 {
        return Err(PfCalcError::InvalidInput {
            field: "tenure_years".into(),
            reason: "Tenure must be at least one year".into(),
        });
    }
    Ok(())
}

fn validate_loan(input: &LoanInput) -> PfCalcResult<()> {
    validate_terms(input.principal, input.annual_rate_pct, input.tenure_years)?;
    if let Some(policy) = &input.prepayment {
        if policy.amount < Decimal::ZERO {
            return Err(PfCalcError::InvalidInput {
                field: "prepayment.amount".into(),
                reason: "Prepayment amount cannot be negative".into(),
            });
        }
        if policy.start_month == 0 {
            return Err(PfCalcError::InvalidInput {
                field: "prepayment.start_month".into(),
                reason: "Start month is 1-based and must be at least 1".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
