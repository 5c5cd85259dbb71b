use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: pfcalc_core::amortization::loan::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        pfcalc_core::amortization::loan::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

#[napi]
pub fn fixed_deposit(input_json: String) -> NapiResult<String> {
    let input: pfcalc_core::deposit::fixed_deposit::FdInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pfcalc_core::deposit::fixed_deposit::calculate_fixed_deposit(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Debt planning
// ---------------------------------------------------------------------------

#[napi]
pub fn debt_payoff(input_json: String) -> NapiResult<String> {
    let input: pfcalc_core::debt::payoff::DebtPayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pfcalc_core::debt::payoff::plan_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_portfolio(input_json: String) -> NapiResult<String> {
    let input: pfcalc_core::portfolio::simulator::PortfolioSimInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pfcalc_core::portfolio::simulator::simulate_portfolio(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
