//! Asset transfer capability.
//!
//! Token custody is external to the engine: collateral moves between the
//! owner's wallet and the vault, and debt tokens are minted and burned, by
//! whatever settlement machinery the deployment provides. The engine only
//! sees binary success or failure through [`AssetTransfer`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::core::registry::CollateralKind;
use crate::core::units::{DebtAmount, TokenAmount};
use crate::utils::crypto::PublicKey;

/// Failure reported by the asset-transfer capability
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{0}")]
pub struct CustodyError(pub String);

impl CustodyError {
    /// Create a failure with a reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Result of a custody call
pub type CustodyResult = std::result::Result<(), CustodyError>;

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET TRANSFER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// External token movement capability.
///
/// Implementations may call back into the engine; the engine's
/// mutual-exclusion guard turns any such nested call into `ReentrantCall`.
pub trait AssetTransfer: Send + Sync {
    /// Pull collateral from the owner's wallet into the vault
    fn move_in(&self, owner: &PublicKey, kind: &CollateralKind, amount: TokenAmount)
        -> CustodyResult;

    /// Release collateral from the vault back to the owner's wallet
    fn move_out(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        amount: TokenAmount,
    ) -> CustodyResult;

    /// Mint freshly issued debt tokens to the owner
    fn mint_debt_token(&self, owner: &PublicKey, amount: DebtAmount) -> CustodyResult;

    /// Burn debt tokens surrendered to the engine
    fn burn_debt_token(&self, amount: DebtAmount) -> CustodyResult;
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMORY CUSTODIAN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct CustodianBook {
    /// Wallet balances per (owner, kind)
    wallets: HashMap<(PublicKey, CollateralKind), u64>,
    /// Vault holdings per kind
    vault: HashMap<CollateralKind, u64>,
    /// Debt token balances per owner
    debt_tokens: HashMap<PublicKey, u64>,
    /// Outstanding debt token supply
    debt_supply: u64,
    /// When set, the next call fails with this reason
    fail_next: Option<String>,
}

/// In-memory custodian for tests and local tooling.
///
/// Keeps a full double-entry book: collateral leaves a wallet when it enters
/// the vault and vice versa, and the debt token supply tracks mints and
/// burns. `fail_next` forces the next call to fail, for exercising abort
/// paths.
#[derive(Debug, Default)]
pub struct MemoryCustodian {
    book: Mutex<CustodianBook>,
}

impl MemoryCustodian {
    /// Create an empty custodian
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an owner's wallet with collateral
    pub fn fund_wallet(&self, owner: &PublicKey, kind: &CollateralKind, amount: TokenAmount) {
        let mut book = self.book.lock().expect("custodian lock");
        *book.wallets.entry((*owner, kind.clone())).or_default() += amount.units();
    }

    /// Wallet balance of an owner for a kind
    pub fn wallet_balance(&self, owner: &PublicKey, kind: &CollateralKind) -> TokenAmount {
        let book = self.book.lock().expect("custodian lock");
        TokenAmount::from_units(
            book.wallets
                .get(&(*owner, kind.clone()))
                .copied()
                .unwrap_or(0),
        )
    }

    /// Vault holdings for a kind
    pub fn vault_balance(&self, kind: &CollateralKind) -> TokenAmount {
        let book = self.book.lock().expect("custodian lock");
        TokenAmount::from_units(book.vault.get(kind).copied().unwrap_or(0))
    }

    /// Debt tokens held by an owner
    pub fn debt_balance(&self, owner: &PublicKey) -> DebtAmount {
        let book = self.book.lock().expect("custodian lock");
        DebtAmount::from_units(book.debt_tokens.get(owner).copied().unwrap_or(0))
    }

    /// Outstanding debt token supply
    pub fn debt_supply(&self) -> DebtAmount {
        let book = self.book.lock().expect("custodian lock");
        DebtAmount::from_units(book.debt_supply)
    }

    /// Make the next custody call fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        let mut book = self.book.lock().expect("custodian lock");
        book.fail_next = Some(reason.into());
    }

    fn take_forced_failure(book: &mut CustodianBook) -> CustodyResult {
        match book.fail_next.take() {
            Some(reason) => Err(CustodyError(reason)),
            None => Ok(()),
        }
    }
}

impl AssetTransfer for MemoryCustodian {
    fn move_in(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        amount: TokenAmount,
    ) -> CustodyResult {
        let mut book = self.book.lock().map_err(|_| CustodyError::new("custodian lock poisoned"))?;
        Self::take_forced_failure(&mut book)?;

        let wallet = book.wallets.entry((*owner, kind.clone())).or_default();
        if *wallet < amount.units() {
            return Err(CustodyError::new(format!(
                "wallet holds {} of {}, needs {}",
                wallet, kind, amount
            )));
        }
        *wallet -= amount.units();
        *book.vault.entry(kind.clone()).or_default() += amount.units();
        Ok(())
    }

    fn move_out(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        amount: TokenAmount,
    ) -> CustodyResult {
        let mut book = self.book.lock().map_err(|_| CustodyError::new("custodian lock poisoned"))?;
        Self::take_forced_failure(&mut book)?;

        let vault = book.vault.entry(kind.clone()).or_default();
        if *vault < amount.units() {
            return Err(CustodyError::new(format!(
                "vault holds {} of {}, needs {}",
                vault, kind, amount
            )));
        }
        *vault -= amount.units();
        *book.wallets.entry((*owner, kind.clone())).or_default() += amount.units();
        Ok(())
    }

    fn mint_debt_token(&self, owner: &PublicKey, amount: DebtAmount) -> CustodyResult {
        let mut book = self.book.lock().map_err(|_| CustodyError::new("custodian lock poisoned"))?;
        Self::take_forced_failure(&mut book)?;

        *book.debt_tokens.entry(*owner).or_default() += amount.units();
        book.debt_supply += amount.units();
        Ok(())
    }

    fn burn_debt_token(&self, amount: DebtAmount) -> CustodyResult {
        let mut book = self.book.lock().map_err(|_| CustodyError::new("custodian lock poisoned"))?;
        Self::take_forced_failure(&mut book)?;

        if book.debt_supply < amount.units() {
            return Err(CustodyError::new(format!(
                "supply {} cannot burn {}",
                book.debt_supply, amount
            )));
        }
        book.debt_supply -= amount.units();
        Ok(())
    }
}
