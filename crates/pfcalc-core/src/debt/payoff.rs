//! Multi-debt payoff planning (snowball / avalanche).
//!
//! Simulates a fixed monthly budget across several debts: interest accrues
//! monthly on each balance, minimums are paid first, and the remainder of
//! the budget cascades onto the strategy-ordered target debt. Minimums
//! freed by a paid-off debt roll into the budget automatically.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PfCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PfCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard cap on the simulation horizon. A plan that cannot clear every debt
/// inside this window is treated as infeasible.
const MAX_PAYOFF_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Order in which the extra budget attacks open debts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Smallest balance first.
    Snowball,
    /// Highest rate first.
    Avalanche,
}

/// One debt account in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtAccount {
    pub name: String,
    pub balance: Money,
    /// Quoted annual rate as a percentage (e.g. 18 for 18% APR).
    pub annual_rate_pct: Rate,
    pub minimum_payment: Money,
}

/// Top-level payoff plan input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayoffInput {
    pub debts: Vec<DebtAccount>,
    /// Total amount put toward all debts each month.
    pub monthly_budget: Money,
    pub strategy: PayoffStrategy,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-debt outcome, in payoff order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayoffRecord {
    pub name: String,
    /// Month (1-based) in which the balance reached zero.
    pub payoff_month: u32,
    pub interest_paid: Money,
}

/// Aggregate totals for one simulated plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffTotals {
    pub months_to_debt_free: u32,
    pub total_interest_paid: Money,
    /// Starting balances plus total interest, exactly.
    pub total_amount_paid: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayoffOutput {
    pub plan: PayoffTotals,
    pub payoff_order: Vec<DebtPayoffRecord>,
    /// Minimum-payments-only baseline, when the minimums alone can clear
    /// the debts inside the horizon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_only: Option<PayoffTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_saved: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_saved: Option<u32>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Plan the payoff of a set of debts under a fixed monthly budget.
pub fn plan_payoff(input: &DebtPayoffInput) -> PfCalcResult<ComputationOutput<DebtPayoffOutput>> {
    let start = Instant::now();

    validate_payoff(input)?;
    let mut warnings: Vec<String> = Vec::new();

    let (plan, payoff_order) = run_plan(input)?;

    let (minimum_only, interest_saved, months_saved) = match run_minimum_only(&input.debts) {
        Some(baseline) => {
            let saved_interest = baseline.total_interest_paid - plan.total_interest_paid;
            let saved_months = baseline.months_to_debt_free - plan.months_to_debt_free;
            (Some(baseline), Some(saved_interest), Some(saved_months))
        }
        None => {
            warnings.push(format!(
                "Minimum payments alone do not clear these debts within {} months; \
                 no baseline comparison available",
                MAX_PAYOFF_MONTHS
            ));
            (None, None, None)
        }
    };

    let output = DebtPayoffOutput {
        plan,
        payoff_order,
        minimum_only,
        interest_saved,
        months_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        match input.strategy {
            PayoffStrategy::Snowball => "Debt Snowball Payoff Plan",
            PayoffStrategy::Avalanche => "Debt Avalanche Payoff Plan",
        },
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

struct OpenDebt {
    index: usize,
    balance: Money,
    monthly_rate: Rate,
    minimum_payment: Money,
    interest_paid: Money,
}

fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / dec!(12) / dec!(100)
}

fn run_plan(input: &DebtPayoffInput) -> PfCalcResult<(PayoffTotals, Vec<DebtPayoffRecord>)> {
    let starting_total: Money = input.debts.iter().map(|d| d.balance).sum();

    let mut open: Vec<OpenDebt> = input
        .debts
        .iter()
        .enumerate()
        .map(|(index, d)| OpenDebt {
            index,
            balance: d.balance,
            monthly_rate: monthly_rate(d.annual_rate_pct),
            minimum_payment: d.minimum_payment,
            interest_paid: Decimal::ZERO,
        })
        .collect();

    let mut payoff_order: Vec<DebtPayoffRecord> = Vec::new();
    let mut total_interest = Decimal::ZERO;
    let mut months = 0;

    for month in 1..=MAX_PAYOFF_MONTHS {
        // Accrue interest on every open balance.
        for debt in &mut open {
            let interest = debt.balance * debt.monthly_rate;
            debt.balance += interest;
            debt.interest_paid += interest;
            total_interest += interest;
        }

        // Minimums first, clamped to the balance.
        let mut available = input.monthly_budget;
        for debt in &mut open {
            let payment = debt.minimum_payment.min(debt.balance);
            debt.balance -= payment;
            available -= payment;
        }

        // Extra budget cascades through the strategy order.
        while available > Decimal::ZERO {
            let target = match pick_target(&open, input.strategy) {
                Some(i) => i,
                None => break,
            };
            let payment = available.min(open[target].balance);
            open[target].balance -= payment;
            available -= payment;
        }

        // Retire cleared debts in strategy order so payoff_order is stable.
        let mut cleared: Vec<usize> = open
            .iter()
            .enumerate()
            .filter(|(_, d)| d.balance.is_zero())
            .map(|(i, _)| i)
            .collect();
        cleared.sort_unstable();
        for i in cleared.into_iter().rev() {
            let debt = open.remove(i);
            payoff_order.push(DebtPayoffRecord {
                name: input.debts[debt.index].name.clone(),
                payoff_month: month,
                interest_paid: debt.interest_paid,
            });
        }

        if open.is_empty() {
            months = month;
            break;
        }
    }

    if !open.is_empty() {
        return Err(PfCalcError::FinancialImpossibility(format!(
            "Budget of {} cannot clear the debts within {} months; interest accrues \
             faster than it is repaid",
            input.monthly_budget, MAX_PAYOFF_MONTHS
        )));
    }

    payoff_order.sort_by_key(|r| r.payoff_month);

    let totals = PayoffTotals {
        months_to_debt_free: months,
        total_interest_paid: total_interest,
        total_amount_paid: starting_total + total_interest,
    };
    Ok((totals, payoff_order))
}

/// Index into `open` of the debt the extra budget should attack next.
fn pick_target(open: &[OpenDebt], strategy: PayoffStrategy) -> Option<usize> {
    open.iter()
        .enumerate()
        .filter(|(_, d)| d.balance > Decimal::ZERO)
        .min_by(|(_, a), (_, b)| match strategy {
            PayoffStrategy::Snowball => a
                .balance
                .cmp(&b.balance)
                .then(a.index.cmp(&b.index)),
            PayoffStrategy::Avalanche => b
                .monthly_rate
                .cmp(&a.monthly_rate)
                .then(a.index.cmp(&b.index)),
        })
        .map(|(i, _)| i)
}

/// Minimum-payments-only baseline: each debt pays its own minimum, nothing
/// rolls over. Returns None when the debts outlive the horizon.
fn run_minimum_only(debts: &[DebtAccount]) -> Option<PayoffTotals> {
    let starting_total: Money = debts.iter().map(|d| d.balance).sum();

    let mut balances: Vec<Money> = debts.iter().map(|d| d.balance).collect();
    let rates: Vec<Rate> = debts.iter().map(|d| monthly_rate(d.annual_rate_pct)).collect();

    let mut total_interest = Decimal::ZERO;

    for month in 1..=MAX_PAYOFF_MONTHS {
        for (i, balance) in balances.iter_mut().enumerate() {
            if balance.is_zero() {
                continue;
            }
            let interest = *balance * rates[i];
            *balance += interest;
            total_interest += interest;
            *balance -= debts[i].minimum_payment.min(*balance);
        }

        if balances.iter().all(|b| b.is_zero()) {
            return Some(PayoffTotals {
                months_to_debt_free: month,
                total_interest_paid: total_interest,
                total_amount_paid: starting_total + total_interest,
            });
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_payoff(input: &DebtPayoffInput) -> PfCalcResult<()> {
    if input.debts.is_empty() {
        return Err(PfCalcError::InvalidInput {
            field: "debts".into(),
            reason: "At least one debt is required".into(),
        });
    }
    let mut minimum_sum = Decimal::ZERO;
    for (i, debt) in input.debts.iter().enumerate() {
        if debt.balance <= Decimal::ZERO {
            return Err(PfCalcError::InvalidInput {
                field: format!("debts[{i}].balance"),
                reason: "Balance must be positive".into(),
            });
        }
        if debt.annual_rate_pct < Decimal::ZERO {
            return Err(PfCalcError::InvalidInput {
                field: format!("debts[{i}].annual_rate_pct"),
                reason: "Rate cannot be negative".into(),
            });
        }
        if debt.minimum_payment <= Decimal::ZERO {
            return Err(PfCalcError::InvalidInput {
                field: format!("debts[{i}].minimum_payment"),
                reason: "Minimum payment must be positive".into(),
            });
        }
        minimum_sum += debt.minimum_payment;
    }
    if input.monthly_budget < minimum_sum {
        return Err(PfCalcError::InvalidInput {
            field: "monthly_budget".into(),
            reason: format!(
                "Budget {} is below the sum of minimum payments {}",
                input.monthly_budget, minimum_sum
            ),
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

    fn debt(name: &str, balance: Decimal, rate_pct: Decimal, minimum: Decimal) -> DebtAccount {
        DebtAccount {
            name: name.into(),
            balance,
            annual_rate_pct: rate_pct,
            minimum_payment: minimum,
        }
    }

    fn run(input: &DebtPayoffInput) -> DebtPayoffOutput {
        plan_payoff(input).unwrap().result
    }

    #[test]
    fn test_single_debt_payoff_months() {
        // 10,000 at 12% with 500/month: 1.01^n = 500/400 => n ≈ 22.4,
        // so the final (partial) payment lands in month 23.
        let input = DebtPayoffInput {
            debts: vec![debt("card", dec!(10_000), dec!(12), dec!(500))],
            monthly_budget: dec!(500),
            strategy: PayoffStrategy::Avalanche,
        };
        let out = run(&input);
        assert_eq!(out.plan.months_to_debt_free, 23);
        assert_eq!(out.payoff_order.len(), 1);
        assert_eq!(out.payoff_order[0].payoff_month, 23);
    }

    #[test]
    fn test_conservation_total_paid() {
        let input = DebtPayoffInput {
            debts: vec![
                debt("card", dec!(5_000), dec!(18), dec!(150)),
                debt("auto", dec!(12_000), dec!(9), dec!(300)),
            ],
            monthly_budget: dec!(800),
            strategy: PayoffStrategy::Snowball,
        };
        let out = run(&input);
        assert_eq!(
            out.plan.total_amount_paid,
            dec!(17_000) + out.plan.total_interest_paid
        );
    }

    #[test]
    fn test_snowball_attacks_smallest_balance_first() {
        let input = DebtPayoffInput {
            debts: vec![
                debt("big-cheap", dec!(20_000), dec!(6), dec!(400)),
                debt("small-dear", dec!(2_000), dec!(24), dec!(60)),
            ],
            monthly_budget: dec!(1_000),
            strategy: PayoffStrategy::Snowball,
        };
        let out = run(&input);
        assert_eq!(out.payoff_order[0].name, "small-dear");
    }

    #[test]
    fn test_avalanche_never_pays_more_interest_than_snowball() {
        let debts = vec![
            debt("card", dec!(8_000), dec!(22), dec!(200)),
            debt("loan", dec!(15_000), dec!(10), dec!(350)),
            debt("store", dec!(1_500), dec!(28), dec!(50)),
        ];
        let avalanche = run(&DebtPayoffInput {
            debts: debts.clone(),
            monthly_budget: dec!(1_200),
            strategy: PayoffStrategy::Avalanche,
        });
        let snowball = run(&DebtPayoffInput {
            debts,
            monthly_budget: dec!(1_200),
            strategy: PayoffStrategy::Snowball,
        });
        assert!(
            avalanche.plan.total_interest_paid <= snowball.plan.total_interest_paid,
            "avalanche paid {} vs snowball {}",
            avalanche.plan.total_interest_paid,
            snowball.plan.total_interest_paid
        );
    }

    #[test]
    fn test_extra_budget_beats_minimum_only() {
        let input = DebtPayoffInput {
            debts: vec![
                debt("card", dec!(6_000), dec!(18), dec!(200)),
                debt("auto", dec!(9_000), dec!(8), dec!(250)),
            ],
            monthly_budget: dec!(900),
            strategy: PayoffStrategy::Avalanche,
        };
        let out = run(&input);
        let baseline = out.minimum_only.expect("minimums amortise here");
        assert!(out.plan.months_to_debt_free < baseline.months_to_debt_free);
        assert!(out.plan.total_interest_paid < baseline.total_interest_paid);
        assert_eq!(
            out.months_saved,
            Some(baseline.months_to_debt_free - out.plan.months_to_debt_free)
        );
        assert!(out.interest_saved.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_budget_below_minimums_rejected() {
        let input = DebtPayoffInput {
            debts: vec![debt("card", dec!(5_000), dec!(18), dec!(150))],
            monthly_budget: dec!(100),
            strategy: PayoffStrategy::Snowball,
        };
        assert!(matches!(
            plan_payoff(&input),
            Err(PfCalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_budget_that_cannot_outrun_interest_is_impossible() {
        // 10,000 at 60% accrues 500/month; a 400 budget never gains ground.
        let input = DebtPayoffInput {
            debts: vec![debt("payday", dec!(10_000), dec!(60), dec!(400))],
            monthly_budget: dec!(400),
            strategy: PayoffStrategy::Avalanche,
        };
        assert!(matches!(
            plan_payoff(&input),
            Err(PfCalcError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_zero_rate_debt_pays_off_linearly() {
        let input = DebtPayoffInput {
            debts: vec![debt("family", dec!(1_200), Decimal::ZERO, dec!(100))],
            monthly_budget: dec!(100),
            strategy: PayoffStrategy::Snowball,
        };
        let out = run(&input);
        assert_eq!(out.plan.months_to_debt_free, 12);
        assert_eq!(out.plan.total_interest_paid, Decimal::ZERO);
    }

    #[test]
    fn test_validation_rejects_empty_debts() {
        let input = DebtPayoffInput {
            debts: vec![],
            monthly_budget: dec!(500),
            strategy: PayoffStrategy::Snowball,
        };
        assert!(plan_payoff(&input).is_err());
    }
}
