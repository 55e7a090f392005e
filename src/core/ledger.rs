//! Account ledger - the mutable state of the engine.
//!
//! Tracks, per owner, the deposited amount of every collateral kind and the
//! issued synthetic debt. Accounts are created lazily on first credit and
//! pruned when they return to zero, so an emptied account is
//! indistinguishable from one that never existed.
//!
//! Mutators validate first and mutate second; a failed mutator leaves the
//! ledger untouched. Only the transition operations call them, inside a
//! single atomic scope.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::registry::CollateralKind;
use crate::core::units::{DebtAmount, TokenAmount, UsdValue};
use crate::error::{Error, Result};
use crate::oracle::adapter::OracleAdapter;
use crate::oracle::source::PriceSource;
use crate::utils::crypto::PublicKey;
use crate::utils::validation::ensure_nonzero;

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Balances of a single owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Deposited collateral, by kind; zero entries are removed
    deposits: HashMap<CollateralKind, TokenAmount>,
    /// Issued synthetic debt
    debt: DebtAmount,
}

impl Account {
    /// Deposited amount of one kind (zero when absent)
    pub fn deposit(&self, kind: &CollateralKind) -> TokenAmount {
        self.deposits.get(kind).copied().unwrap_or(TokenAmount::ZERO)
    }

    /// Issued debt
    pub fn debt(&self) -> DebtAmount {
        self.debt
    }

    /// All non-zero deposits
    pub fn deposits(&self) -> &HashMap<CollateralKind, TokenAmount> {
        &self.deposits
    }

    /// True when the account holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.debt.is_zero() && self.deposits.is_empty()
    }

    fn credit(&mut self, kind: &CollateralKind, amount: TokenAmount) -> Result<()> {
        let current = self.deposit(kind);
        let updated = current.checked_add(amount).ok_or(Error::Overflow {
            operation: format!("deposit {} + {}", current, amount),
        })?;
        self.deposits.insert(kind.clone(), updated);
        Ok(())
    }

    fn debit(&mut self, kind: &CollateralKind, amount: TokenAmount) -> Result<()> {
        let current = self.deposit(kind);
        let updated = current.checked_sub(amount).ok_or(Error::InsufficientCollateral {
            required: amount.units() as u128,
            available: current.units() as u128,
        })?;
        if updated.is_zero() {
            self.deposits.remove(kind);
        } else {
            self.deposits.insert(kind.clone(), updated);
        }
        Ok(())
    }

    fn increase_debt(&mut self, amount: DebtAmount) -> Result<()> {
        self.debt = self.debt.checked_add(amount).ok_or(Error::Overflow {
            operation: format!("debt {} + {}", self.debt, amount),
        })?;
        Ok(())
    }

    fn decrease_debt(&mut self, amount: DebtAmount) -> Result<()> {
        self.debt = self.debt.checked_sub(amount).ok_or(Error::InsufficientDebt {
            required: amount.units(),
            available: self.debt.units(),
        })?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// All accounts, keyed by owner identity.
///
/// Exclusively owned by the engine; nothing outside a transition operation
/// may mutate it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: HashMap<PublicKey, Account>,
}

impl AccountLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Account view for an owner (a default view when never created)
    pub fn get(&self, owner: &PublicKey) -> Account {
        self.accounts.get(owner).cloned().unwrap_or_default()
    }

    /// Issued debt of an owner
    pub fn debt_of(&self, owner: &PublicKey) -> DebtAmount {
        self.accounts
            .get(owner)
            .map(|a| a.debt())
            .unwrap_or(DebtAmount::ZERO)
    }

    /// Deposited amount of one kind for an owner
    pub fn deposit_of(&self, owner: &PublicKey, kind: &CollateralKind) -> TokenAmount {
        self.accounts
            .get(owner)
            .map(|a| a.deposit(kind))
            .unwrap_or(TokenAmount::ZERO)
    }

    /// Number of live (non-empty) accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MUTATORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Credit a collateral deposit
    pub fn credit_deposit(
        &mut self,
        owner: &PublicKey,
        kind: &CollateralKind,
        amount: TokenAmount,
    ) -> Result<()> {
        ensure_nonzero(amount.units())?;
        self.accounts
            .entry(*owner)
            .or_default()
            .credit(kind, amount)
    }

    /// Debit a collateral deposit
    pub fn debit_deposit(
        &mut self,
        owner: &PublicKey,
        kind: &CollateralKind,
        amount: TokenAmount,
    ) -> Result<()> {
        ensure_nonzero(amount.units())?;
        let account = self.accounts.entry(*owner).or_default();
        let result = account.debit(kind, amount);
        self.prune(owner);
        result
    }

    /// Increase issued debt
    pub fn increase_debt(&mut self, owner: &PublicKey, amount: DebtAmount) -> Result<()> {
        ensure_nonzero(amount.units())?;
        self.accounts.entry(*owner).or_default().increase_debt(amount)
    }

    /// Decrease issued debt
    pub fn decrease_debt(&mut self, owner: &PublicKey, amount: DebtAmount) -> Result<()> {
        ensure_nonzero(amount.units())?;
        let account = self.accounts.entry(*owner).or_default();
        let result = account.decrease_debt(amount);
        self.prune(owner);
        result
    }

    fn prune(&mut self, owner: &PublicKey) {
        if self.accounts.get(owner).is_some_and(Account::is_empty) {
            self.accounts.remove(owner);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // VALUATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total USD value of an owner's collateral.
    ///
    /// Folds over the registered kinds in registry order, valuing each
    /// non-zero deposit through the oracle adapter and summing with checked
    /// addition. The fixed fold order makes the result deterministic.
    pub fn total_collateral_usd<S: PriceSource>(
        &self,
        owner: &PublicKey,
        adapter: &OracleAdapter<S>,
        now: u64,
    ) -> Result<UsdValue> {
        let Some(account) = self.accounts.get(owner) else {
            return Ok(UsdValue::ZERO);
        };

        let mut total = UsdValue::ZERO;
        for kind in adapter.registry().kinds() {
            let deposit = account.deposit(kind);
            if deposit.is_zero() {
                continue;
            }
            let value = adapter.value_in_usd(kind, deposit, now)?;
            total = total.checked_add(value).ok_or(Error::Overflow {
                operation: format!("collateral value sum for {}", owner.short()),
            })?;
        }
        Ok(total)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Serialize the ledger to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a ledger from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
