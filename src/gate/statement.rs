//! Public statements and opaque proofs.
//!
//! A statement is the pair of numbers a proof attests to: the post-operation
//! debt and the post-operation collateral value in USD. The engine derives
//! it from live state; the off-chain prover derives it from the caller's
//! view. They must agree byte for byte.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::{STATEMENT_BYTES, STATEMENT_WORD_BYTES};
use crate::utils::crypto::Hash;

// ═══════════════════════════════════════════════════════════════════════════════
// PROOF
// ═══════════════════════════════════════════════════════════════════════════════

/// An opaque proof blob supplied by the caller.
///
/// The engine never inspects its contents; only the external verifier
/// assigns it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof(Vec<u8>);

impl Proof {
    /// Wrap raw proof bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the blob is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Proof {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC STATEMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// The two-element public statement of a candidate transition.
///
/// Constructed fresh per attempt and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStatement {
    /// Post-operation debt, in synthetic units
    pub expected_debt: u128,
    /// Post-operation collateral value, in USD fixed-point
    pub expected_collateral_usd: u128,
}

impl PublicStatement {
    /// Create a statement
    pub fn new(expected_debt: u128, expected_collateral_usd: u128) -> Self {
        Self {
            expected_debt,
            expected_collateral_usd,
        }
    }

    /// Canonical byte encoding: two 128-bit big-endian unsigned integers,
    /// debt first, collateral second.
    ///
    /// This layout is a compatibility contract with the off-chain prover;
    /// changing it invalidates every proof in flight.
    pub fn encode(&self) -> [u8; STATEMENT_BYTES] {
        let mut out = [0u8; STATEMENT_BYTES];
        out[..STATEMENT_WORD_BYTES].copy_from_slice(&self.expected_debt.to_be_bytes());
        out[STATEMENT_WORD_BYTES..].copy_from_slice(&self.expected_collateral_usd.to_be_bytes());
        out
    }

    /// SHA256 digest of the canonical encoding
    pub fn digest(&self) -> Hash {
        Hash::sha256(&self.encode())
    }
}

impl fmt::Display for PublicStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(debt: {}, collateral_usd: {})",
            self.expected_debt, self.expected_collateral_usd
        )
    }
}
