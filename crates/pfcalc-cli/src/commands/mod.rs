pub mod debt;
pub mod deposit;
pub mod emi;
pub mod portfolio;
