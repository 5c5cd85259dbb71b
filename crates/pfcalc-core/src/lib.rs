pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "deposit")]
pub mod deposit;

#[cfg(feature = "debt")]
pub mod debt;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use error::PfCalcError;
pub use types::*;

/// Standard result type for all pfcalc operations
pub type PfCalcResult<T> = Result<T, PfCalcError>;
