//! Proof verification gate.
//!
//! Derives the public statement a candidate transition would produce and
//! checks a caller-supplied proof against it through the external verifier.
//! The gate has no side effects of its own.

pub mod statement;
pub mod verifier;

pub use statement::{Proof, PublicStatement};
pub use verifier::{DigestVerifier, ProofGate, StatementVerifier};
