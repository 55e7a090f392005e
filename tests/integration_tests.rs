//! Integration tests for the provault engine.
//!
//! These tests drive the full engine through the injected capability fakes:
//! a fixed price source, the digest verifier standing in for the external
//! proof system, and an in-memory custodian.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use provault::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

const NOW: u64 = 1_000_000;

fn kind(s: &str) -> CollateralKind {
    CollateralKind::new(s).unwrap()
}

/// Verifier wrapper that counts how often the external verifier is consulted.
struct CountingVerifier {
    inner: DigestVerifier,
    calls: Arc<AtomicUsize>,
}

impl StatementVerifier for CountingVerifier {
    fn verify(&self, proof: &Proof, statement: &PublicStatement) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(proof, statement)
    }
}

struct Fixture {
    engine: LedgerEngine<FixedPriceSource, CountingVerifier, MemoryCustodian>,
    verifier_calls: Arc<AtomicUsize>,
}

/// Engine with WETH at $2,000 and WBTC at $100,000, both observed at `NOW`.
fn fixture() -> Fixture {
    provault::utils::log::try_init();

    let mut registry = CollateralRegistry::new();
    registry
        .register(kind("WETH"), OracleBinding::new("ETH-USD"))
        .unwrap();
    registry
        .register(kind("WBTC"), OracleBinding::new("BTC-USD"))
        .unwrap();

    let mut source = FixedPriceSource::new();
    source.set("ETH-USD", PricePoint::new(2_000, 0, NOW));
    source.set("BTC-USD", PricePoint::new(100_000, 0, NOW));

    let verifier_calls = Arc::new(AtomicUsize::new(0));
    let verifier = CountingVerifier {
        inner: DigestVerifier::new(),
        calls: verifier_calls.clone(),
    };

    let engine = LedgerEngine::new(
        registry,
        source,
        verifier,
        MemoryCustodian::new(),
        EngineParams::default(),
    )
    .unwrap();

    Fixture {
        engine,
        verifier_calls,
    }
}

fn new_owner() -> PublicKey {
    *KeyPair::generate().public_key()
}

fn proof_for(debt: u128, collateral: u128) -> Proof {
    DigestVerifier::prove(&PublicStatement::new(debt, collateral))
}

/// Open the canonical test position: 10 WETH deposited, 1,000 units minted.
fn open_position(fx: &Fixture) -> PublicKey {
    let owner = new_owner();
    fx.engine
        .custody()
        .fund_wallet(&owner, &kind("WETH"), TokenAmount::from_units(10));
    fx.engine
        .deposit_and_mint(
            &owner,
            &kind("WETH"),
            TokenAmount::from_units(10),
            DebtAmount::from_units(1_000),
            &proof_for(1_000, 20_000),
            NOW,
        )
        .unwrap();
    owner
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn scenario_a_deposit_and_mint_fresh_account() {
    let fx = fixture();
    let owner = new_owner();
    fx.engine
        .custody()
        .fund_wallet(&owner, &kind("WETH"), TokenAmount::from_units(10));

    // 10 units at $2,000/unit, minting 1,000 debt units, proof for (1000, 20000)
    let receipt = fx
        .engine
        .deposit_and_mint(
            &owner,
            &kind("WETH"),
            TokenAmount::from_units(10),
            DebtAmount::from_units(1_000),
            &proof_for(1_000, 20_000),
            NOW,
        )
        .unwrap();

    assert_eq!(receipt.deposited_usd, UsdValue::from_raw(20_000));

    let info = fx.engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.debt, DebtAmount::from_units(1_000));
    assert_eq!(info.collateral_usd, UsdValue::from_raw(20_000));
}

#[test]
fn scenario_b_burn_more_than_debt_fails_before_proof_check() {
    let fx = fixture();
    let owner = open_position(&fx);

    let calls_before = fx.verifier_calls.load(Ordering::SeqCst);
    let result = fx.engine.burn_only(
        &owner,
        DebtAmount::from_units(1_001),
        &proof_for(0, 20_000),
        NOW,
    );

    assert_eq!(
        result.unwrap_err(),
        Error::InsufficientDebt {
            required: 1_001,
            available: 1_000
        }
    );
    // The verifier was never consulted
    assert_eq!(fx.verifier_calls.load(Ordering::SeqCst), calls_before);
}

#[test]
fn scenario_c_redeem_worth_more_than_collateral_fails_before_proof_check() {
    let fx = fixture();
    let owner = open_position(&fx);

    let calls_before = fx.verifier_calls.load(Ordering::SeqCst);
    // 13 WETH = $26,000 > the $20,000 position
    let result = fx.engine.redeem_only(
        &owner,
        &kind("WETH"),
        TokenAmount::from_units(13),
        &proof_for(1_000, 0),
        NOW,
    );

    assert!(matches!(
        result.unwrap_err(),
        Error::InsufficientCollateral { .. }
    ));
    assert_eq!(fx.verifier_calls.load(Ordering::SeqCst), calls_before);
}

#[test]
fn scenario_d_wrong_statement_proof_rejected_idempotently() {
    let fx = fixture();
    let owner = open_position(&fx);
    let before = fx.engine.account_info(&owner, NOW).unwrap();

    // Preconditions hold, but the proof was generated for (0, 0)
    let stale_proof = proof_for(0, 0);
    for _ in 0..2 {
        let result = fx.engine.burn_only(
            &owner,
            DebtAmount::from_units(400),
            &stale_proof,
            NOW,
        );
        assert_eq!(result.unwrap_err(), Error::ProofRejected);

        let after = fx.engine.account_info(&owner, NOW).unwrap();
        assert_eq!(after.debt, before.debt);
        assert_eq!(after.collateral_usd, before.collateral_usd);
    }
}

#[test]
fn scenario_e_stale_price_fails_conversions() {
    let fx = fixture();
    let owner = open_position(&fx);

    let max_age = fx.engine.params().max_price_staleness_secs;
    let later = NOW + max_age + 1;

    // Any operation needing a USD conversion now fails
    let result = fx.engine.deposit_and_mint(
        &owner,
        &kind("WETH"),
        TokenAmount::from_units(1),
        DebtAmount::from_units(1),
        &proof_for(1_001, 22_000),
        later,
    );
    assert!(matches!(result.unwrap_err(), Error::StalePrice { .. }));

    let result = fx.engine.burn_only(
        &owner,
        DebtAmount::from_units(1),
        &proof_for(999, 20_000),
        later,
    );
    assert!(matches!(result.unwrap_err(), Error::StalePrice { .. }));

    // Queries that need a conversion fail the same way
    assert!(matches!(
        fx.engine.account_info(&owner, later).unwrap_err(),
        Error::StalePrice { .. }
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn total_collateral_folds_in_registry_order_over_all_kinds() {
    let fx = fixture();
    let owner = new_owner();
    let (weth, wbtc) = (kind("WETH"), kind("WBTC"));

    fx.engine
        .custody()
        .fund_wallet(&owner, &weth, TokenAmount::from_units(10));
    fx.engine
        .custody()
        .fund_wallet(&owner, &wbtc, TokenAmount::from_units(2));

    // Deposit in the opposite order of registration
    fx.engine
        .deposit_and_mint(
            &owner,
            &wbtc,
            TokenAmount::from_units(2),
            DebtAmount::from_units(1),
            &proof_for(1, 200_000),
            NOW,
        )
        .unwrap();
    fx.engine
        .deposit_and_mint(
            &owner,
            &weth,
            TokenAmount::from_units(10),
            DebtAmount::from_units(1),
            &proof_for(2, 220_000),
            NOW,
        )
        .unwrap();

    // 10 WETH * $2,000 + 2 WBTC * $100,000
    let total = fx.engine.total_collateral_value(&owner, NOW).unwrap();
    assert_eq!(total, UsdValue::from_raw(220_000));

    // Per-kind balances survive independently
    assert_eq!(
        fx.engine.collateral_balance(&owner, &weth).unwrap(),
        TokenAmount::from_units(10)
    );
    assert_eq!(
        fx.engine.collateral_balance(&owner, &wbtc).unwrap(),
        TokenAmount::from_units(2)
    );
}

#[test]
fn emptied_account_is_indistinguishable_from_fresh() {
    let fx = fixture();
    let owner = open_position(&fx);

    fx.engine
        .redeem_and_burn(
            &owner,
            &kind("WETH"),
            TokenAmount::from_units(10),
            DebtAmount::from_units(1_000),
            &proof_for(0, 0),
            NOW,
        )
        .unwrap();

    let info = fx.engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.debt, DebtAmount::ZERO);
    assert_eq!(info.collateral_usd, UsdValue::ZERO);

    let never_used = new_owner();
    let fresh = fx.engine.account_info(&never_used, NOW).unwrap();
    assert_eq!(info.debt, fresh.debt);
    assert_eq!(info.collateral_usd, fresh.collateral_usd);

    // The wallet got everything back
    assert_eq!(
        fx.engine.custody().wallet_balance(&owner, &kind("WETH")),
        TokenAmount::from_units(10)
    );
    assert_eq!(fx.engine.custody().debt_supply(), DebtAmount::ZERO);
}

#[test]
fn estimation_query_round_trips_within_one_unit() {
    let fx = fixture();

    let value = UsdValue::from_raw(25_000);
    let amount = fx
        .engine
        .token_amount_for_usd(&kind("WETH"), value, NOW)
        .unwrap();
    // $25,000 at $2,000/unit, truncated
    assert_eq!(amount, TokenAmount::from_units(12));
}

#[test]
fn burn_only_leaves_collateral_untouched() {
    let fx = fixture();
    let owner = open_position(&fx);

    let receipt = fx
        .engine
        .burn_only(
            &owner,
            DebtAmount::from_units(400),
            &proof_for(600, 20_000),
            NOW,
        )
        .unwrap();
    assert_eq!(receipt.new_debt, DebtAmount::from_units(600));

    let info = fx.engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.collateral_usd, UsdValue::from_raw(20_000));
    assert_eq!(
        fx.engine.custody().vault_balance(&kind("WETH")),
        TokenAmount::from_units(10)
    );
}

#[test]
fn redeem_only_leaves_debt_untouched() {
    let fx = fixture();
    let owner = open_position(&fx);

    let receipt = fx
        .engine
        .redeem_only(
            &owner,
            &kind("WETH"),
            TokenAmount::from_units(2),
            &proof_for(1_000, 16_000),
            NOW,
        )
        .unwrap();
    assert_eq!(receipt.new_collateral_usd, UsdValue::from_raw(16_000));

    let info = fx.engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.debt, DebtAmount::from_units(1_000));
}

#[test]
fn asset_transfer_failure_aborts_after_gate() {
    let fx = fixture();
    let owner = open_position(&fx);

    fx.engine.custody().fail_next("settlement halted");
    let result = fx.engine.redeem_and_burn(
        &owner,
        &kind("WETH"),
        TokenAmount::from_units(4),
        DebtAmount::from_units(400),
        &proof_for(600, 12_000),
        NOW,
    );
    assert!(matches!(
        result.unwrap_err(),
        Error::AssetTransferFailed { .. }
    ));

    // Ledger unchanged
    let info = fx.engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.debt, DebtAmount::from_units(1_000));
    assert_eq!(info.collateral_usd, UsdValue::from_raw(20_000));
}

#[test]
fn error_classes_match_retry_policy() {
    let fx = fixture();
    let owner = open_position(&fx);

    let err = fx
        .engine
        .burn_only(
            &owner,
            DebtAmount::from_units(2_000),
            &proof_for(0, 20_000),
            NOW,
        )
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::State);
    assert!(err.is_retryable());

    let err = fx
        .engine
        .burn_only(&owner, DebtAmount::from_units(1), &proof_for(9, 9), NOW)
        .unwrap_err();
    assert_eq!(err.class(), FailureClass::Security);
    assert!(!err.is_retryable());
}

// ═══════════════════════════════════════════════════════════════════════════════
// REENTRANCY
// ═══════════════════════════════════════════════════════════════════════════════

type HookFn = Box<dyn Fn() -> Option<Error> + Send>;

/// Custodian that calls back into the engine from inside a transfer, the way
/// a token contract with transfer hooks could.
#[derive(Default)]
struct ReentrantCustodian {
    hook: Mutex<Option<HookFn>>,
    observed: Mutex<Option<Error>>,
}

impl ReentrantCustodian {
    fn arm(&self, hook: HookFn) {
        *self.hook.lock().unwrap() = Some(hook);
    }

    fn observed(&self) -> Option<Error> {
        self.observed.lock().unwrap().clone()
    }

    fn fire(&self) {
        let hook = self.hook.lock().unwrap().take();
        if let Some(hook) = hook {
            *self.observed.lock().unwrap() = hook();
        }
    }
}

impl AssetTransfer for ReentrantCustodian {
    fn move_in(
        &self,
        _owner: &PublicKey,
        _kind: &CollateralKind,
        _amount: TokenAmount,
    ) -> std::result::Result<(), provault::custody::CustodyError> {
        self.fire();
        Ok(())
    }

    fn move_out(
        &self,
        _owner: &PublicKey,
        _kind: &CollateralKind,
        _amount: TokenAmount,
    ) -> std::result::Result<(), provault::custody::CustodyError> {
        self.fire();
        Ok(())
    }

    fn mint_debt_token(
        &self,
        _owner: &PublicKey,
        _amount: DebtAmount,
    ) -> std::result::Result<(), provault::custody::CustodyError> {
        self.fire();
        Ok(())
    }

    fn burn_debt_token(
        &self,
        _amount: DebtAmount,
    ) -> std::result::Result<(), provault::custody::CustodyError> {
        self.fire();
        Ok(())
    }
}

#[test]
fn nested_call_from_transfer_hook_is_rejected() {
    provault::utils::log::try_init();

    let mut registry = CollateralRegistry::new();
    registry
        .register(kind("WETH"), OracleBinding::new("ETH-USD"))
        .unwrap();
    let mut source = FixedPriceSource::new();
    source.set("ETH-USD", PricePoint::new(2_000, 0, NOW));

    let engine = Arc::new(
        LedgerEngine::new(
            registry,
            source,
            DigestVerifier::new(),
            ReentrantCustodian::default(),
            EngineParams::default(),
        )
        .unwrap(),
    );

    let owner = new_owner();

    // From inside move_in, try to run a second transition
    let nested_engine = engine.clone();
    let nested_owner = owner;
    engine.custody().arm(Box::new(move || {
        nested_engine
            .burn_only(
                &nested_owner,
                DebtAmount::from_units(1),
                &proof_for(0, 0),
                NOW,
            )
            .err()
    }));

    let receipt = engine
        .deposit_and_mint(
            &owner,
            &kind("WETH"),
            TokenAmount::from_units(10),
            DebtAmount::from_units(1_000),
            &proof_for(1_000, 20_000),
            NOW,
        )
        .unwrap();
    assert_eq!(receipt.new_debt, DebtAmount::from_units(1_000));

    // The nested transition saw the guard, not a deadlock and not the ledger
    assert_eq!(engine.custody().observed(), Some(Error::ReentrantCall));

    // And the outer transition committed exactly once
    let info = engine.account_info(&owner, NOW).unwrap();
    assert_eq!(info.debt, DebtAmount::from_units(1_000));
    assert_eq!(info.collateral_usd, UsdValue::from_raw(20_000));
}
