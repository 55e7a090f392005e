//! The proof-gated ledger engine.
//!
//! The engine composes the account ledger, the oracle adapter, the proof
//! gate and the asset-transfer capability into the four transition
//! operations. Every transition follows the same discipline:
//!
//! 1. validate inputs before touching any state
//! 2. take the engine guard (`try_lock`; a nested call gets `ReentrantCall`)
//! 3. read current `(debt, collateral_usd)` from the ledger
//! 4. compute the operation's deltas through the oracle adapter
//! 5. check the operation's extra preconditions
//! 6. ask the gate; a `false` verdict is `ProofRejected`
//! 7. move assets externally, collateral first, then debt
//! 8. apply the ledger mutations and record events
//!
//! A failure at any step aborts the attempt with zero persisted change. The
//! engine never recomputes the solvency threshold; it only guarantees that
//! the statement the proof attests to is the one derived from live state.

use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::core::config::EngineParams;
use crate::core::ledger::AccountLedger;
use crate::core::registry::{CollateralKind, CollateralRegistry};
use crate::core::units::{DebtAmount, TokenAmount, UsdValue};
use crate::custody::AssetTransfer;
use crate::error::{Error, Result};
use crate::gate::{Proof, ProofGate, StatementVerifier};
use crate::oracle::{OracleAdapter, PriceSource};
use crate::protocol::events::{EngineEvent, EventLog, RecordedEvent};
use crate::protocol::operations::{
    AccountInfo, BurnOnlyReceipt, DepositAndMintReceipt, RedeemAndBurnReceipt, RedeemOnlyReceipt,
    TransitionKind,
};
use crate::utils::crypto::PublicKey;
use crate::utils::validation::ensure_nonzero;

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// State behind the engine guard: the ledger plus its audit log.
#[derive(Debug, Default)]
struct EngineState {
    ledger: AccountLedger,
    events: EventLog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The proof-gated ledger engine.
///
/// Owns the account ledger exclusively; the registry, oracle source,
/// verifier and custodian are injected capabilities.
pub struct LedgerEngine<S, V, T>
where
    S: PriceSource,
    V: StatementVerifier,
    T: AssetTransfer,
{
    oracle: OracleAdapter<S>,
    gate: ProofGate<V>,
    custody: T,
    params: EngineParams,
    state: Mutex<EngineState>,
}

impl<S, V, T> LedgerEngine<S, V, T>
where
    S: PriceSource,
    V: StatementVerifier,
    T: AssetTransfer,
{
    /// Create an engine over a fixed registry and the injected capabilities.
    pub fn new(
        registry: CollateralRegistry,
        source: S,
        verifier: V,
        custody: T,
        params: EngineParams,
    ) -> Result<Self> {
        if !params.validate() {
            return Err(Error::InvalidParameter {
                name: "params".into(),
                reason: "inconsistent engine parameters".into(),
            });
        }
        let registry = std::sync::Arc::new(registry);
        let oracle = OracleAdapter::new(registry, source, params.max_price_staleness_secs);
        Ok(Self {
            oracle,
            gate: ProofGate::new(verifier),
            custody,
            params,
            state: Mutex::new(EngineState::default()),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITION OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit collateral and mint debt against it.
    pub fn deposit_and_mint(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        deposit: TokenAmount,
        mint: DebtAmount,
        proof: &Proof,
        now: u64,
    ) -> Result<DepositAndMintReceipt> {
        ensure_nonzero(deposit.units())?;
        ensure_nonzero(mint.units())?;
        self.ensure_registered(kind)?;

        let mut state = self.guard()?;
        let current_debt = state.ledger.debt_of(owner);
        let current_collateral = state.ledger.total_collateral_usd(owner, &self.oracle, now)?;
        let deposit_usd = self.oracle.value_in_usd(kind, deposit, now)?;

        // The post-state must be representable before the gate sees it.
        let new_debt = current_debt.checked_add(mint).ok_or(Error::Overflow {
            operation: format!("debt {} + {}", current_debt, mint),
        })?;
        let new_collateral =
            current_collateral
                .checked_add(deposit_usd)
                .ok_or(Error::Overflow {
                    operation: format!("collateral {} + {}", current_collateral, deposit_usd),
                })?;

        self.check_gate(
            TransitionKind::DepositAndMint,
            owner,
            current_debt,
            current_collateral,
            mint.units() as i128,
            usd_delta(deposit_usd)?,
            proof,
        )?;

        // External movement, collateral first, then debt.
        self.custody
            .move_in(owner, kind, deposit)
            .map_err(|e| transfer_failed("move_in", e))?;
        self.custody
            .mint_debt_token(owner, mint)
            .map_err(|e| transfer_failed("mint_debt_token", e))?;

        state.ledger.credit_deposit(owner, kind, deposit)?;
        state.ledger.increase_debt(owner, mint)?;

        state.events.record(EngineEvent::CollateralDeposited {
            owner: *owner,
            kind: kind.clone(),
            amount: deposit,
            value_usd: deposit_usd,
            at: now,
        });
        state.events.record(EngineEvent::DebtMinted {
            owner: *owner,
            amount: mint,
            at: now,
        });
        tracing::info!(
            op = TransitionKind::DepositAndMint.name(),
            owner = %owner.short(),
            %deposit,
            %mint,
            "transition committed"
        );

        Ok(DepositAndMintReceipt {
            owner: *owner,
            kind: kind.clone(),
            deposited: deposit,
            deposited_usd: deposit_usd,
            minted: mint,
            new_debt,
            new_collateral_usd: new_collateral,
        })
    }

    /// Redeem collateral and burn debt in one transition.
    pub fn redeem_and_burn(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        redeem: TokenAmount,
        burn: DebtAmount,
        proof: &Proof,
        now: u64,
    ) -> Result<RedeemAndBurnReceipt> {
        ensure_nonzero(redeem.units())?;
        ensure_nonzero(burn.units())?;
        self.ensure_registered(kind)?;

        let mut state = self.guard()?;
        let current_debt = state.ledger.debt_of(owner);
        let current_collateral = state.ledger.total_collateral_usd(owner, &self.oracle, now)?;
        let redeem_usd = self.oracle.value_in_usd(kind, redeem, now)?;

        let new_debt = self.check_burn_covered(current_debt, burn)?;
        self.check_redeem_covered(&state, owner, kind, redeem, redeem_usd, current_collateral)?;
        let new_collateral =
            current_collateral
                .checked_sub(redeem_usd)
                .ok_or(Error::InsufficientCollateral {
                    required: redeem_usd.raw(),
                    available: current_collateral.raw(),
                })?;

        self.check_gate(
            TransitionKind::RedeemAndBurn,
            owner,
            current_debt,
            current_collateral,
            -(burn.units() as i128),
            -usd_delta(redeem_usd)?,
            proof,
        )?;

        self.custody
            .move_out(owner, kind, redeem)
            .map_err(|e| transfer_failed("move_out", e))?;
        self.custody
            .burn_debt_token(burn)
            .map_err(|e| transfer_failed("burn_debt_token", e))?;

        state.ledger.debit_deposit(owner, kind, redeem)?;
        state.ledger.decrease_debt(owner, burn)?;

        state.events.record(EngineEvent::CollateralRedeemed {
            owner: *owner,
            kind: kind.clone(),
            amount: redeem,
            value_usd: redeem_usd,
            at: now,
        });
        state.events.record(EngineEvent::DebtBurned {
            owner: *owner,
            amount: burn,
            at: now,
        });
        tracing::info!(
            op = TransitionKind::RedeemAndBurn.name(),
            owner = %owner.short(),
            %redeem,
            %burn,
            "transition committed"
        );

        Ok(RedeemAndBurnReceipt {
            owner: *owner,
            kind: kind.clone(),
            redeemed: redeem,
            redeemed_usd: redeem_usd,
            burned: burn,
            new_debt,
            new_collateral_usd: new_collateral,
        })
    }

    /// Redeem collateral without touching debt.
    pub fn redeem_only(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
        redeem: TokenAmount,
        proof: &Proof,
        now: u64,
    ) -> Result<RedeemOnlyReceipt> {
        ensure_nonzero(redeem.units())?;
        self.ensure_registered(kind)?;

        let mut state = self.guard()?;
        let current_debt = state.ledger.debt_of(owner);
        let current_collateral = state.ledger.total_collateral_usd(owner, &self.oracle, now)?;
        let redeem_usd = self.oracle.value_in_usd(kind, redeem, now)?;

        self.check_redeem_covered(&state, owner, kind, redeem, redeem_usd, current_collateral)?;
        let new_collateral =
            current_collateral
                .checked_sub(redeem_usd)
                .ok_or(Error::InsufficientCollateral {
                    required: redeem_usd.raw(),
                    available: current_collateral.raw(),
                })?;

        self.check_gate(
            TransitionKind::RedeemOnly,
            owner,
            current_debt,
            current_collateral,
            0,
            -usd_delta(redeem_usd)?,
            proof,
        )?;

        self.custody
            .move_out(owner, kind, redeem)
            .map_err(|e| transfer_failed("move_out", e))?;

        state.ledger.debit_deposit(owner, kind, redeem)?;

        state.events.record(EngineEvent::CollateralRedeemed {
            owner: *owner,
            kind: kind.clone(),
            amount: redeem,
            value_usd: redeem_usd,
            at: now,
        });
        tracing::info!(
            op = TransitionKind::RedeemOnly.name(),
            owner = %owner.short(),
            %redeem,
            "transition committed"
        );

        Ok(RedeemOnlyReceipt {
            owner: *owner,
            kind: kind.clone(),
            redeemed: redeem,
            redeemed_usd: redeem_usd,
            new_collateral_usd: new_collateral,
        })
    }

    /// Burn debt without touching collateral.
    pub fn burn_only(
        &self,
        owner: &PublicKey,
        burn: DebtAmount,
        proof: &Proof,
        now: u64,
    ) -> Result<BurnOnlyReceipt> {
        ensure_nonzero(burn.units())?;

        let mut state = self.guard()?;
        let current_debt = state.ledger.debt_of(owner);
        let new_debt = self.check_burn_covered(current_debt, burn)?;
        let current_collateral = state.ledger.total_collateral_usd(owner, &self.oracle, now)?;

        self.check_gate(
            TransitionKind::BurnOnly,
            owner,
            current_debt,
            current_collateral,
            -(burn.units() as i128),
            0,
            proof,
        )?;

        self.custody
            .burn_debt_token(burn)
            .map_err(|e| transfer_failed("burn_debt_token", e))?;

        state.ledger.decrease_debt(owner, burn)?;

        state.events.record(EngineEvent::DebtBurned {
            owner: *owner,
            amount: burn,
            at: now,
        });
        tracing::info!(
            op = TransitionKind::BurnOnly.name(),
            owner = %owner.short(),
            %burn,
            "transition committed"
        );

        Ok(BurnOnlyReceipt {
            owner: *owner,
            burned: burn,
            new_debt,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Debt and total collateral value of an account.
    pub fn account_info(&self, owner: &PublicKey, now: u64) -> Result<AccountInfo> {
        let state = self.guard()?;
        Ok(AccountInfo {
            owner: *owner,
            debt: state.ledger.debt_of(owner),
            collateral_usd: state.ledger.total_collateral_usd(owner, &self.oracle, now)?,
        })
    }

    /// Deposited token amount of one kind.
    pub fn collateral_balance(
        &self,
        owner: &PublicKey,
        kind: &CollateralKind,
    ) -> Result<TokenAmount> {
        self.ensure_registered(kind)?;
        let state = self.guard()?;
        Ok(state.ledger.deposit_of(owner, kind))
    }

    /// Total collateral value of an account at current prices.
    pub fn total_collateral_value(&self, owner: &PublicKey, now: u64) -> Result<UsdValue> {
        let state = self.guard()?;
        state.ledger.total_collateral_usd(owner, &self.oracle, now)
    }

    /// Token amount of `kind` currently worth `usd_value`. Estimation only.
    pub fn token_amount_for_usd(
        &self,
        kind: &CollateralKind,
        usd_value: UsdValue,
        now: u64,
    ) -> Result<TokenAmount> {
        self.oracle.amount_from_usd(kind, usd_value, now)
    }

    /// Engine parameters.
    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Registered collateral kinds, in registry order.
    pub fn registered_kinds(&self) -> Vec<CollateralKind> {
        self.oracle.registry().kinds().cloned().collect()
    }

    /// The injected custody capability.
    pub fn custody(&self) -> &T {
        &self.custody
    }

    /// Drain the audit log.
    pub fn drain_events(&self) -> Result<Vec<RecordedEvent>> {
        let mut state = self.guard()?;
        Ok(state.events.drain())
    }

    /// Serialize the ledger for export.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        let state = self.guard()?;
        state.ledger.to_bytes()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Take the engine guard without blocking.
    ///
    /// A held guard means a transition is in flight; a nested call (for
    /// example, from an asset-transfer callback) is rejected instead of
    /// deadlocking.
    fn guard(&self) -> Result<MutexGuard<'_, EngineState>> {
        match self.state.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => Err(Error::ReentrantCall),
            Err(TryLockError::Poisoned(_)) => Err(Error::Lock),
        }
    }

    fn ensure_registered(&self, kind: &CollateralKind) -> Result<()> {
        if !self.oracle.registry().is_allowed(kind) {
            return Err(Error::UnknownCollateralKind(kind.symbol().to_string()));
        }
        Ok(())
    }

    fn check_burn_covered(&self, current_debt: DebtAmount, burn: DebtAmount) -> Result<DebtAmount> {
        current_debt.checked_sub(burn).ok_or(Error::InsufficientDebt {
            required: burn.units(),
            available: current_debt.units(),
        })
    }

    fn check_redeem_covered(
        &self,
        state: &EngineState,
        owner: &PublicKey,
        kind: &CollateralKind,
        redeem: TokenAmount,
        redeem_usd: UsdValue,
        current_collateral: UsdValue,
    ) -> Result<()> {
        let held = state.ledger.deposit_of(owner, kind);
        if redeem > held {
            return Err(Error::InsufficientCollateral {
                required: redeem.units() as u128,
                available: held.units() as u128,
            });
        }
        if redeem_usd > current_collateral {
            return Err(Error::InsufficientCollateral {
                required: redeem_usd.raw(),
                available: current_collateral.raw(),
            });
        }
        Ok(())
    }

    /// Run the gate and translate a `false` verdict into `ProofRejected`.
    ///
    /// Invalid proofs and valid-but-wrong-statement proofs are deliberately
    /// indistinguishable here.
    #[allow(clippy::too_many_arguments)]
    fn check_gate(
        &self,
        op: TransitionKind,
        owner: &PublicKey,
        current_debt: DebtAmount,
        current_collateral: UsdValue,
        debt_delta: i128,
        collateral_delta: i128,
        proof: &Proof,
    ) -> Result<()> {
        let accepted = self.gate.attempt_transition(
            current_debt,
            current_collateral,
            debt_delta,
            collateral_delta,
            proof,
        )?;
        if !accepted {
            tracing::warn!(
                op = op.name(),
                owner = %owner.short(),
                "proof rejected"
            );
            return Err(Error::ProofRejected);
        }
        Ok(())
    }
}

/// Convert a USD value into a signed delta magnitude.
fn usd_delta(value: UsdValue) -> Result<i128> {
    i128::try_from(value.raw()).map_err(|_| Error::Overflow {
        operation: format!("usd delta {}", value),
    })
}

fn transfer_failed(operation: &str, e: crate::custody::CustodyError) -> Error {
    Error::AssetTransferFailed {
        operation: operation.into(),
        reason: e.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
