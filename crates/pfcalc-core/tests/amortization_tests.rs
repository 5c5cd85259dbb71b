#![cfg(feature = "amortization")]

use pfcalc_core::amortization::loan::{
    analyze_loan, monthly_installment, simulate_schedule, LoanInput, PrepaymentFrequency,
    PrepaymentPolicy,
};
use pfcalc_core::time_value::periodic_rate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Engine-level tests against the public pieces wired together
// ===========================================================================

fn home_loan() -> LoanInput {
    LoanInput {
        principal: dec!(250_000),
        annual_rate_pct: dec!(7.2),
        tenure_years: 15,
        prepayment: None,
    }
}

#[test]
fn test_schedule_consistent_with_installment() {
    let input = home_loan();
    let installment =
        monthly_installment(input.principal, input.annual_rate_pct, input.tenure_years).unwrap();
    let rate = periodic_rate(input.annual_rate_pct, 12);

    let (summary, rows) = simulate_schedule(input.principal, rate, 180, installment, None);

    assert_eq!(summary.actual_tenure_months, 180);
    assert_eq!(
        summary.total_amount_paid,
        input.principal + summary.total_interest_paid
    );

    // Every retained row's components reconcile against the installment,
    // apart from the clamped final payment.
    for row in &rows {
        if row.period < 180 {
            let diff =
                (row.principal_component + row.interest_component - installment).abs();
            assert!(
                diff < dec!(0.0001),
                "month {}: components {} + {} drift from installment {}",
                row.period,
                row.principal_component,
                row.interest_component,
                installment
            );
        }
    }
}

#[test]
fn test_first_month_interest_is_on_full_principal() {
    let input = home_loan();
    let out = analyze_loan(&input).unwrap().result;
    let first = &out.schedule[0];
    assert_eq!(first.period, 1);
    assert_eq!(
        first.interest_component,
        dec!(250_000) * periodic_rate(dec!(7.2), 12)
    );
}

#[test]
fn test_interest_front_loading() {
    // Early in the schedule interest dominates; late it is nearly all
    // principal. Year-1 interest must exceed final-year interest.
    let out = analyze_loan(&home_loan()).unwrap().result;
    let years = &out.baseline.yearly_breakdown;
    assert!(years.first().unwrap().interest_paid > years.last().unwrap().interest_paid);
    assert!(years.first().unwrap().principal_paid < years.last().unwrap().principal_paid);
}

#[test]
fn test_comparison_contract_monthly_prepayment() {
    let input = LoanInput {
        prepayment: Some(PrepaymentPolicy {
            frequency: PrepaymentFrequency::Monthly,
            amount: dec!(2_000),
            start_month: 13,
        }),
        ..home_loan()
    };
    let out = analyze_loan(&input).unwrap().result;

    assert!(out.interest_saved > Decimal::ZERO);
    assert!(out.months_saved > 0);
    assert_eq!(
        out.interest_saved,
        out.baseline.total_interest_paid - out.with_prepayment.total_interest_paid
    );
    assert_eq!(
        out.months_saved,
        out.baseline.actual_tenure_months - out.with_prepayment.actual_tenure_months
    );
    // Contractual tenure is never exceeded.
    assert!(out.with_prepayment.actual_tenure_months <= out.contractual_tenure_months);
}

#[test]
fn test_larger_prepayment_saves_at_least_as_much() {
    let run = |amount: Decimal| {
        let input = LoanInput {
            prepayment: Some(PrepaymentPolicy {
                frequency: PrepaymentFrequency::Annual,
                amount,
                start_month: 12,
            }),
            ..home_loan()
        };
        analyze_loan(&input).unwrap().result
    };

    let mut prev_saved = Decimal::ZERO;
    for amount in [dec!(1_000), dec!(5_000), dec!(20_000), dec!(80_000)] {
        let out = run(amount);
        assert!(
            out.interest_saved >= prev_saved,
            "saving should not shrink as the prepayment grows: {} < {}",
            out.interest_saved,
            prev_saved
        );
        prev_saved = out.interest_saved;
    }
}

#[test]
fn test_serde_round_trip_of_input() {
    let json = r#"{
        "principal": "250000",
        "annual_rate_pct": "7.2",
        "tenure_years": 15,
        "prepayment": {"frequency": "quarterly", "amount": "3000", "start_month": 6}
    }"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.principal, dec!(250_000));
    let policy = input.prepayment.as_ref().unwrap();
    assert_eq!(policy.frequency, PrepaymentFrequency::Quarterly);
    assert_eq!(policy.start_month, 6);

    let out = analyze_loan(&input).unwrap();
    let serialized = serde_json::to_string(&out).unwrap();
    assert!(serialized.contains("interest_saved"));
}
