//! Seedable portfolio growth simulator.
//!
//! Projects a contribution plan forward under normally distributed annual
//! returns. The random source is an explicit `StdRng` seeded from the
//! input, so results are reproducible in tests and across the UI and CLI.
//! Simulation math is in `f64`; the precision tag in the metadata says so.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;

use crate::error::PfCalcError;
use crate::types::{ComputationMetadata, ComputationOutput};
use crate::PfCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MIN_PATHS: u32 = 100;
const MAX_YEARS: u32 = 100;

/// Floor on a sampled annual return. Worse than -99% wipes the year out.
const RETURN_FLOOR: f64 = -0.99;

// ---------------------------------------------------------------------------
// Envelope helper
// ---------------------------------------------------------------------------

fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Portfolio growth simulation input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSimInput {
    pub initial_investment: f64,
    /// Contribution at the end of each month.
    pub monthly_contribution: f64,
    pub years: u32,
    /// Expected annual return as a decimal (0.07 = 7%).
    pub expected_annual_return: f64,
    /// Annual return standard deviation as a decimal (0.15 = 15%).
    pub annual_volatility: f64,
    /// Number of simulated paths (minimum 100).
    #[serde(default = "default_num_paths")]
    pub num_paths: u32,
    /// Optional seed for reproducibility.
    pub seed: Option<u64>,
}

fn default_num_paths() -> u32 {
    1_000
}

/// Percentile summary of ending balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancePercentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Cross-path balance spread at the end of one projection year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub year: u32,
    pub p10_balance: f64,
    pub median_balance: f64,
    pub p90_balance: f64,
}

/// Output of a portfolio growth simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSimOutput {
    pub num_paths: u32,
    /// Initial investment plus every monthly contribution.
    pub total_contributed: f64,
    pub ending_balance_mean: f64,
    pub ending_balance_median: f64,
    pub ending_balance_std_dev: f64,
    pub ending_balances: BalancePercentiles,
    /// Fraction of paths ending below the total contributed.
    pub probability_of_loss: f64,
    pub yearly_trajectory: Vec<TrajectoryPoint>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate portfolio growth across `num_paths` random return paths.
pub fn simulate_portfolio(
    input: &PortfolioSimInput,
) -> PfCalcResult<ComputationOutput<PortfolioSimOutput>> {
    let start = Instant::now();

    validate_sim(input)?;
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_volatility > 0.5 {
        warnings.push(format!(
            "Annual volatility of {:.0}% is unusually high",
            input.annual_volatility * 100.0
        ));
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let normal = if input.annual_volatility > 0.0 {
        Some(
            Normal::new(input.expected_annual_return, input.annual_volatility).map_err(|e| {
                PfCalcError::InvalidInput {
                    field: "annual_volatility".into(),
                    reason: format!("Invalid return distribution: {e}"),
                }
            })?,
        )
    } else {
        None
    };

    let paths = input.num_paths as usize;
    let years = input.years as usize;

    // year_end_balances[y] holds every path's balance at the end of year y+1.
    let mut year_end_balances: Vec<Vec<f64>> = vec![Vec::with_capacity(paths); years];
    let mut ending: Vec<f64> = Vec::with_capacity(paths);

    for _ in 0..paths {
        let mut balance = input.initial_investment;
        for year_balances in year_end_balances.iter_mut() {
            let annual_return = match &normal {
                Some(n) => rng.sample(n).max(RETURN_FLOOR),
                None => input.expected_annual_return,
            };
            let monthly_factor = (1.0 + annual_return).powf(1.0 / 12.0);
            for _ in 0..12 {
                balance = balance * monthly_factor + input.monthly_contribution;
            }
            year_balances.push(balance);
        }
        ending.push(balance);
    }

    let total_contributed =
        input.initial_investment + input.monthly_contribution * 12.0 * input.years as f64;

    let loss_paths = ending.iter().filter(|&&b| b < total_contributed).count();
    let probability_of_loss = loss_paths as f64 / paths as f64;

    ending.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean = ending.iter().sum::<f64>() / paths as f64;
    let variance = ending.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / paths as f64;

    let yearly_trajectory = year_end_balances
        .iter_mut()
        .enumerate()
        .map(|(y, balances)| {
            balances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            TrajectoryPoint {
                year: y as u32 + 1,
                p10_balance: percentile_sorted(balances, 10.0),
                median_balance: percentile_sorted(balances, 50.0),
                p90_balance: percentile_sorted(balances, 90.0),
            }
        })
        .collect();

    let output = PortfolioSimOutput {
        num_paths: input.num_paths,
        total_contributed,
        ending_balance_mean: mean,
        ending_balance_median: percentile_sorted(&ending, 50.0),
        ending_balance_std_dev: variance.sqrt(),
        ending_balances: BalancePercentiles {
            p5: percentile_sorted(&ending, 5.0),
            p10: percentile_sorted(&ending, 10.0),
            p25: percentile_sorted(&ending, 25.0),
            p50: percentile_sorted(&ending, 50.0),
            p75: percentile_sorted(&ending, 75.0),
            p90: percentile_sorted(&ending, 90.0),
            p95: percentile_sorted(&ending, 95.0),
        },
        probability_of_loss,
        yearly_trajectory,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Normal-Return Portfolio Growth Simulation",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Percentile from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn validate_sim(input: &PortfolioSimInput) -> PfCalcResult<()> {
    if input.initial_investment < 0.0 || input.monthly_contribution < 0.0 {
        return Err(PfCalcError::InvalidInput {
            field: "initial_investment".into(),
            reason: "Investment amounts cannot be negative".into(),
        });
    }
    if input.initial_investment == 0.0 && input.monthly_contribution == 0.0 {
        return Err(PfCalcError::InvalidInput {
            field: "monthly_contribution".into(),
            reason: "Nothing to simulate: no initial investment and no contributions".into(),
        });
    }
    if input.years == 0 || input.years > MAX_YEARS {
        return Err(PfCalcError::InvalidInput {
            field: "years".into(),
            reason: format!("Years must be between 1 and {MAX_YEARS}"),
        });
    }
    if input.expected_annual_return <= -1.0 {
        return Err(PfCalcError::InvalidInput {
            field: "expected_annual_return".into(),
            reason: "Expected return must be greater than -100%".into(),
        });
    }
    if input.annual_volatility < 0.0 {
        return Err(PfCalcError::InvalidInput {
            field: "annual_volatility".into(),
            reason: "Volatility cannot be negative".into(),
        });
    }
    if input.num_paths < MIN_PATHS {
        return Err(PfCalcError::InvalidInput {
            field: "num_paths".into(),
            reason: format!("At least {MIN_PATHS} paths are required"),
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

    fn standard_input() -> PortfolioSimInput {
        PortfolioSimInput {
            initial_investment: 10_000.0,
            monthly_contribution: 500.0,
            years: 20,
            expected_annual_return: 0.07,
            annual_volatility: 0.15,
            num_paths: 500,
            seed: Some(42),
        }
    }

    fn run(input: &PortfolioSimInput) -> PortfolioSimOutput {
        simulate_portfolio(input).unwrap().result
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let a = run(&standard_input());
        let b = run(&standard_input());
        assert_eq!(a.ending_balance_mean, b.ending_balance_mean);
        assert_eq!(a.ending_balances.p50, b.ending_balances.p50);
        assert_eq!(a.probability_of_loss, b.probability_of_loss);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = run(&standard_input());
        let mut input = standard_input();
        input.seed = Some(43);
        let b = run(&input);
        assert_ne!(a.ending_balance_mean, b.ending_balance_mean);
    }

    #[test]
    fn test_zero_volatility_matches_closed_form() {
        let input = PortfolioSimInput {
            annual_volatility: 0.0,
            num_paths: 100,
            ..standard_input()
        };
        let out = run(&input);

        let monthly_rate = 1.07_f64.powf(1.0 / 12.0) - 1.0;
        let n = 240;
        let factor = (1.0 + monthly_rate).powi(n);
        let expected = 10_000.0 * factor + 500.0 * (factor - 1.0) / monthly_rate;

        let rel_err = (out.ending_balance_mean - expected).abs() / expected;
        assert!(rel_err < 1e-9, "got {}, expected {}", out.ending_balance_mean, expected);
        // Every path is identical, so the fan collapses.
        assert!((out.ending_balances.p95 - out.ending_balances.p5).abs() < 1e-6);
        assert_eq!(out.probability_of_loss, 0.0);
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let out = run(&standard_input());
        let p = &out.ending_balances;
        assert!(p.p5 <= p.p10);
        assert!(p.p10 <= p.p25);
        assert!(p.p25 <= p.p50);
        assert!(p.p50 <= p.p75);
        assert!(p.p75 <= p.p90);
        assert!(p.p90 <= p.p95);
    }

    #[test]
    fn test_trajectory_has_one_point_per_year() {
        let out = run(&standard_input());
        assert_eq!(out.yearly_trajectory.len(), 20);
        assert_eq!(out.yearly_trajectory[0].year, 1);
        assert_eq!(out.yearly_trajectory[19].year, 20);
        for point in &out.yearly_trajectory {
            assert!(point.p10_balance <= point.median_balance);
            assert!(point.median_balance <= point.p90_balance);
        }
    }

    #[test]
    fn test_total_contributed() {
        let out = run(&standard_input());
        assert_eq!(out.total_contributed, 10_000.0 + 500.0 * 12.0 * 20.0);
    }

    #[test]
    fn test_probability_of_loss_bounds() {
        let out = run(&standard_input());
        assert!((0.0..=1.0).contains(&out.probability_of_loss));
    }

    #[test]
    fn test_validation_rejects_too_few_paths() {
        let mut input = standard_input();
        input.num_paths = 50;
        assert!(simulate_portfolio(&input).is_err());
    }

    #[test]
    fn test_validation_rejects_zero_years() {
        let mut input = standard_input();
        input.years = 0;
        assert!(simulate_portfolio(&input).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_plan() {
        let mut input = standard_input();
        input.initial_investment = 0.0;
        input.monthly_contribution = 0.0;
        assert!(simulate_portfolio(&input).is_err());
    }

    #[test]
    fn test_metadata_reports_f64_precision() {
        let result = simulate_portfolio(&standard_input()).unwrap();
        assert_eq!(result.metadata.precision, "ieee754_f64");
    }
}
