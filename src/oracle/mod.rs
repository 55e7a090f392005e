//! Price oracle adapter.
//!
//! Wraps an external price source per collateral kind, converts token
//! amounts to USD-denominated values, and enforces the staleness bound.

pub mod adapter;
pub mod source;

pub use adapter::OracleAdapter;
pub use source::{FixedPriceSource, PricePoint, PriceSource};
