//! xrate Common Types
//!
//! This crate contains shared types used across the xrate workspace,
//! including currency codes, rate sets, the currency catalogue and
//! time utilities.

pub mod catalog;
pub mod currency;
pub mod error;
pub mod time;

pub use catalog::*;
pub use currency::*;
pub use error::*;
pub use time::*;
