//! Time-value-of-money primitives shared by the calculators.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PfCalcError;
use crate::types::{Money, Rate};
use crate::PfCalcResult;

/// (1 + r)^n via iterative multiplication (avoids Decimal::powd drift
/// over monthly horizons).
pub fn compound_factor(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Level payment that amortises `principal` over `periods` at `rate` per
/// period. Zero-rate loans degenerate to straight-line repayment.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u32) -> PfCalcResult<Money> {
    if periods == 0 {
        return Err(PfCalcError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = compound_factor(rate, periods);
    let denom = factor - Decimal::ONE;
    if denom.is_zero() {
        return Err(PfCalcError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    Ok(principal * rate * factor / denom)
}

/// Future value of a present amount plus a level contribution made at the
/// end of each period.
pub fn fv_with_contributions(
    present_value: Money,
    contribution: Money,
    rate: Rate,
    periods: u32,
) -> Money {
    if rate.is_zero() {
        return present_value + contribution * Decimal::from(periods);
    }

    let factor = compound_factor(rate, periods);
    present_value * factor + contribution * (factor - Decimal::ONE) / rate
}

/// Convert a quoted annual percentage (e.g. 8.5) to a per-period decimal
/// rate for `periods_per_year` compounding periods.
pub fn periodic_rate(annual_rate_pct: Rate, periods_per_year: u32) -> Rate {
    annual_rate_pct / Decimal::from(periods_per_year) / dec!(100)
}
