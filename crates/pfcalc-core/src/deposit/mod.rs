pub mod fixed_deposit;
