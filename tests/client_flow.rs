/*
 * End-to-end flows of the client core against a stubbed backend
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use hashswap::backend::{AmmBackend, FaucetStatus, ReserveSnapshot, SharePosition};
use hashswap::config::{Deployment, DeploymentConfig};
use hashswap::liquidity::{FormState, SyncOutcome};
use hashswap::models::{HashSwapError, Result, Side, SwapCall, TradeRequest, TxReceipt};
use hashswap::service::SwapService;

/// Deployment backend stub: fixed reserves per pool, a pricing oracle
/// with a flat 1.8 rate, optional per-amount response delays, and a log
/// of execution calls.
#[derive(Default)]
struct StubBackend {
    reserves: HashMap<String, (u128, u128)>,
    quote_delays: HashMap<u128, Duration>,
    swaps: Mutex<Vec<SwapCall>>,
    deposits: Mutex<Vec<(String, u128, u128)>>,
    removals: Mutex<Vec<(String, u128)>>,
}

impl StubBackend {
    fn with_reserves(pool_id: &str, reserve_a: u128, reserve_b: u128) -> Self {
        let mut reserves = HashMap::new();
        reserves.insert(pool_id.to_string(), (reserve_a, reserve_b));
        Self {
            reserves,
            ..Self::default()
        }
    }
}

#[async_trait]
impl AmmBackend for StubBackend {
    async fn get_reserves(&self, pool_id: &str) -> Result<ReserveSnapshot> {
        let (reserve_a, reserve_b) = self
            .reserves
            .get(pool_id)
            .copied()
            .ok_or_else(|| HashSwapError::ApiError(format!("unknown pool {pool_id}")))?;
        Ok(ReserveSnapshot {
            reserve_a,
            reserve_b,
            fetched_at: Utc::now(),
        })
    }

    async fn get_amount_out(
        &self,
        _pool_id: &str,
        amount_in_minor: u128,
        _base_is_input: bool,
    ) -> Result<u128> {
        if let Some(delay) = self.quote_delays.get(&amount_in_minor) {
            tokio::time::sleep(*delay).await;
        }
        Ok(amount_in_minor * 18 / 10)
    }

    async fn swap(&self, call: &SwapCall) -> Result<TxReceipt> {
        self.swaps.lock().unwrap().push(call.clone());
        Ok(TxReceipt {
            tx_id: "0.0.9@1.1".to_string(),
        })
    }

    async fn add_liquidity(
        &self,
        pool_id: &str,
        amount_a_minor: u128,
        amount_b_minor: u128,
    ) -> Result<TxReceipt> {
        self.deposits
            .lock()
            .unwrap()
            .push((pool_id.to_string(), amount_a_minor, amount_b_minor));
        Ok(TxReceipt {
            tx_id: "0.0.9@2.2".to_string(),
        })
    }

    async fn remove_liquidity(&self, pool_id: &str, shares: u128) -> Result<TxReceipt> {
        self.removals.lock().unwrap().push((pool_id.to_string(), shares));
        Ok(TxReceipt {
            tx_id: "0.0.9@3.3".to_string(),
        })
    }

    async fn get_balances(&self, _account_id: &str) -> Result<HashMap<String, u128>> {
        let mut balances = HashMap::new();
        balances.insert("hUSD".to_string(), 12_500_000);
        balances.insert("hEUR".to_string(), 3_000_000);
        Ok(balances)
    }

    async fn get_share_position(&self, _pool_id: &str, _account_id: &str) -> Result<SharePosition> {
        Ok(SharePosition {
            shares: 123,
            total_shares: 10_000,
        })
    }

    async fn faucet_status(&self, _account_id: &str) -> Result<FaucetStatus> {
        Ok(FaucetStatus {
            eligible: true,
            detail: None,
        })
    }

    async fn faucet_claim(&self, _account_id: &str) -> Result<TxReceipt> {
        Ok(TxReceipt {
            tx_id: "0.0.9@4.4".to_string(),
        })
    }
}

const POOL: &str = "0.0.5001";

fn service_with(backend: StubBackend) -> (SwapService, Arc<StubBackend>) {
    let backend = Arc::new(backend);
    let deployment = Deployment::new(DeploymentConfig::reference()).unwrap();
    (SwapService::new(deployment, backend.clone()), backend)
}

fn trade(amount: &str, slippage_bps: u32) -> TradeRequest {
    TradeRequest {
        from_token: "hUSD".to_string(),
        to_token: "hEUR".to_string(),
        amount: amount.to_string(),
        slippage_bps,
    }
}

#[tokio::test]
async fn quote_and_swap_with_slippage_guard() {
    // Reserves 1000 : 2000, oracle answers 180 for 100 in.
    let (service, backend) =
        service_with(StubBackend::with_reserves(POOL, 1_000_000_000, 2_000_000_000));

    let quote = service
        .refresh_quote(&trade("100", 50))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(quote.amount_out, "180");
    assert_eq!(quote.rate_line(), "1 hUSD ≈ 1.8 hEUR");
    assert_eq!(service.amount_out_display(), "180");

    service.execute_swap(&trade("100", 50)).await.unwrap();

    let swaps = backend.swaps.lock().unwrap();
    assert_eq!(swaps.len(), 1);
    assert_eq!(swaps[0].amount_in_minor, 100_000_000);
    // 180 less 50 bps -> 179.1
    assert_eq!(swaps[0].min_out_minor, 179_100_000);
    assert!(swaps[0].base_is_input);
}

#[tokio::test]
async fn stale_quote_response_is_discarded() {
    let mut backend = StubBackend::with_reserves(POOL, 1_000_000_000, 2_000_000_000);
    // Request #1 (amount 10) resolves only after request #2 (amount 20).
    backend
        .quote_delays
        .insert(10_000_000, Duration::from_millis(50));
    let (service, _) = service_with(backend);

    let first_trade = trade("10", 50);
    let second_trade = trade("20", 50);
    let (first, second) = tokio::join!(
        service.refresh_quote(&first_trade),
        service.refresh_quote(&second_trade)
    );

    assert!(first.unwrap().is_none(), "stale result must not surface");
    assert_eq!(second.unwrap().unwrap().amount_in, "20");

    let displayed = service.displayed_quote().unwrap();
    assert_eq!(displayed.amount_in, "20");
    assert_eq!(displayed.amount_out, "36");
}

#[tokio::test]
async fn unsupported_pair_blocks_quoting() {
    let (service, _) = service_with(StubBackend::with_reserves(POOL, 1, 2));
    let mut request = trade("100", 50);
    request.to_token = "hGBP".to_string();
    request.from_token = "hEUR".to_string();

    let err = service.refresh_quote(&request).await.unwrap_err();
    assert!(matches!(err, HashSwapError::UnsupportedPair(_, _)));
}

#[tokio::test]
async fn deposit_form_follows_pool_ratio() {
    let (service, backend) =
        service_with(StubBackend::with_reserves(POOL, 1_000_000_000, 2_000_000_000));

    let view = service.select_pool(POOL).await.unwrap();
    assert_eq!(view.state, FormState::Empty);
    assert_eq!(view.ratio.as_deref(), Some("1 hUSD ≈ 2 hEUR"));

    let view = service.edit_deposit(POOL, Side::A, "10").await.unwrap();
    assert_eq!(view.amount_b, "20");
    assert_eq!(view.preview.as_deref(), Some("Deposit 10 hUSD + 20 hEUR"));

    service.add_liquidity(POOL).await.unwrap();
    let deposits = backend.deposits.lock().unwrap();
    assert_eq!(deposits[0], (POOL.to_string(), 10_000_000, 20_000_000));
}

#[tokio::test]
async fn empty_pool_takes_both_sides_verbatim() {
    let (service, backend) = service_with(StubBackend::with_reserves(POOL, 0, 0));

    service.select_pool(POOL).await.unwrap();
    let view = service.edit_deposit(POOL, Side::A, "10").await.unwrap();
    assert_eq!(view.outcome, SyncOutcome::Independent);
    assert_eq!(view.state, FormState::PoolEmpty);
    assert_eq!(view.ratio, None);

    let view = service.edit_deposit(POOL, Side::B, "7").await.unwrap();
    assert_eq!(view.amount_a, "10");
    assert_eq!(view.amount_b, "7");

    service.add_liquidity(POOL).await.unwrap();
    let deposits = backend.deposits.lock().unwrap();
    assert_eq!(deposits[0], (POOL.to_string(), 10_000_000, 7_000_000));
}

#[tokio::test]
async fn switching_pools_resets_the_form() {
    let mut backend = StubBackend::with_reserves(POOL, 1_000_000_000, 2_000_000_000);
    backend
        .reserves
        .insert("0.0.5002".to_string(), (1_000_000, 1_000_000));
    let (service, _) = service_with(backend);

    service.select_pool(POOL).await.unwrap();
    service.edit_deposit(POOL, Side::A, "10").await.unwrap();

    let view = service.select_pool("0.0.5002").await.unwrap();
    assert_eq!(view.amount_a, "");
    assert_eq!(view.amount_b, "");
    assert_eq!(view.state, FormState::Empty);
}

#[tokio::test]
async fn removal_validates_share_input() {
    let (service, backend) = service_with(StubBackend::with_reserves(POOL, 1, 2));

    service.remove_liquidity(POOL, "5").await.unwrap();
    assert_eq!(backend.removals.lock().unwrap()[0], (POOL.to_string(), 5));

    for bad in ["1.5", "-2", "abc", "0"] {
        let err = service.remove_liquidity(POOL, bad).await.unwrap_err();
        assert!(matches!(err, HashSwapError::InvalidShares(_)), "{bad}");
    }
}

#[tokio::test]
async fn liquidity_overview_combines_ratio_and_position() {
    let (service, _) =
        service_with(StubBackend::with_reserves(POOL, 1_000_000_000, 2_000_000_000));

    let overview = service.liquidity_overview(POOL, "0.0.4242").await.unwrap();
    assert_eq!(overview, "1 hUSD ≈ 2 hEUR · 123 / 10000 shares (1.23%)");
}

#[tokio::test]
async fn balances_line_follows_catalogue_order() {
    let (service, _) = service_with(StubBackend::with_reserves(POOL, 1, 2));
    let line = service.balances_line("0.0.4242").await.unwrap();
    assert_eq!(line, "hUSD 12.5 · hEUR 3 · hGBP 0");
}

#[tokio::test]
async fn faucet_requires_well_formed_account_id() {
    let (service, _) = service_with(StubBackend::with_reserves(POOL, 1, 2));

    let receipt = service.faucet_claim("0.0.4242").await.unwrap();
    assert_eq!(receipt.tx_id, "0.0.9@4.4");

    assert!(service.faucet_claim("not-an-account").await.is_err());
}
