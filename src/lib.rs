//! Staking-progression, loan and investment calculators with an HTTP front.

pub mod api;
pub mod core;
