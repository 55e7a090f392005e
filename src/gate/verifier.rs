//! Statement verification.
//!
//! [`StatementVerifier`] is the injected capability over the external proof
//! system. [`ProofGate`] derives the expected post-operation statement from
//! current state and deltas, then asks the verifier whether the supplied
//! proof attests to exactly that statement.

use crate::core::units::{DebtAmount, UsdValue};
use crate::error::{Error, Result};
use crate::gate::statement::{Proof, PublicStatement};
use crate::utils::math::apply_delta;

// ═══════════════════════════════════════════════════════════════════════════════
// VERIFIER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// External verifier capability.
///
/// Must be deterministic and side-effect-free from the engine's perspective.
/// `true` means the proof was constructed against exactly this statement;
/// nothing more is guaranteed.
pub trait StatementVerifier: Send + Sync {
    /// Verify a proof against a statement
    fn verify(&self, proof: &Proof, statement: &PublicStatement) -> bool;
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROOF GATE
// ═══════════════════════════════════════════════════════════════════════════════

/// The proof verification gate.
///
/// A pure decision function: callers must not mutate any state before it
/// returns `true`.
pub struct ProofGate<V: StatementVerifier> {
    verifier: V,
}

impl<V: StatementVerifier> ProofGate<V> {
    /// Create a gate over an external verifier
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// Decide whether a candidate transition may proceed.
    ///
    /// Computes `expected = current + delta` for both statement elements
    /// (deltas may be negative for burns and redemptions), rejects a
    /// negative post-state, and returns the verifier's verdict on the
    /// resulting statement unmodified.
    pub fn attempt_transition(
        &self,
        current_debt: DebtAmount,
        current_collateral_usd: UsdValue,
        debt_delta: i128,
        collateral_usd_delta: i128,
        proof: &Proof,
    ) -> Result<bool> {
        let expected_debt = apply_delta(current_debt.units() as u128, debt_delta)?;
        let expected_collateral_usd =
            apply_delta(current_collateral_usd.raw(), collateral_usd_delta)?;

        if expected_debt < 0 || expected_collateral_usd < 0 {
            return Err(Error::NegativeResultingState {
                expected_debt,
                expected_collateral_usd,
            });
        }

        let statement =
            PublicStatement::new(expected_debt as u128, expected_collateral_usd as u128);
        Ok(self.verifier.verify(proof, &statement))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIGEST VERIFIER
// ═══════════════════════════════════════════════════════════════════════════════

/// Deterministic stand-in for the external proof system.
///
/// Accepts a proof iff its bytes equal the SHA256 digest of the canonical
/// statement encoding. [`DigestVerifier::prove`] plays the off-chain prover:
/// a proof it makes for statement `(d, c)` verifies against `(d, c)` and
/// nothing else. Useful for development and tests; it offers no
/// zero-knowledge and no soundness against a party that can compute hashes.
#[derive(Debug, Clone, Default)]
pub struct DigestVerifier;

impl DigestVerifier {
    /// Create a digest verifier
    pub fn new() -> Self {
        Self
    }

    /// Produce the proof this verifier accepts for `statement`
    pub fn prove(statement: &PublicStatement) -> Proof {
        Proof::new(statement.digest().as_bytes().to_vec())
    }
}

impl StatementVerifier for DigestVerifier {
    fn verify(&self, proof: &Proof, statement: &PublicStatement) -> bool {
        proof.as_bytes() == statement.digest().as_bytes()
    }
}
