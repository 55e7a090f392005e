//! Strongly-typed amounts.
//!
//! Three distinct numeric domains flow through the engine: collateral token
//! base units, synthetic debt units, and USD-denominated values. Wrapping
//! each in a newtype prevents mixing them in arithmetic or call sites.

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// An amount of collateral tokens, in base units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from base units
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Raw base units
    pub const fn units(&self) -> u64 {
        self.0
    }

    /// Check if zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEBT AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// An amount of issued synthetic debt units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DebtAmount(u64);

impl DebtAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from debt units
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    /// Raw debt units
    pub const fn units(&self) -> u64 {
        self.0
    }

    /// Check if zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for DebtAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// USD VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// A USD-denominated value produced by the oracle adapter.
///
/// Held as `u128` so a full-range token amount times a normalized price
/// cannot overflow it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct UsdValue(u128);

impl UsdValue {
    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Create from a raw fixed-point USD value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Raw fixed-point value
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Check if zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for UsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
