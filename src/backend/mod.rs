/*
 * Backend collaborator interfaces consumed by the client core
 */

mod http;

pub use http::HttpBackend;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Result, SwapCall, TxReceipt};

/// A consistent snapshot of a pool's reserves in minor units: both legs
/// come from the same backend read, never from independent fetches.
#[derive(Debug, Clone, Copy)]
pub struct ReserveSnapshot {
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub fetched_at: DateTime<Utc>,
}

/// Classification of a snapshot for ratio purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveState {
    /// No ratio exists yet; the first deposit sets it.
    Empty,
    Available { reserve_a: u128, reserve_b: u128 },
}

impl ReserveSnapshot {
    /// A pool with exactly one zero leg must never be read as a valid
    /// ratio; it is classified empty.
    #[must_use]
    pub fn state(&self) -> ReserveState {
        if self.reserve_a == 0 || self.reserve_b == 0 {
            ReserveState::Empty
        } else {
            ReserveState::Available {
                reserve_a: self.reserve_a,
                reserve_b: self.reserve_b,
            }
        }
    }
}

/// Read-through of an account's pool shares over the pool total.
#[derive(Debug, Clone, Copy)]
pub struct SharePosition {
    pub shares: u128,
    pub total_shares: u128,
}

/// Faucet eligibility as reported by the backend.
#[derive(Debug, Clone)]
pub struct FaucetStatus {
    pub eligible: bool,
    pub detail: Option<String>,
}

/// The external AMM deployment: reserve reads, the authoritative pricing
/// oracle, and execution calls. The core supplies validated minor-unit
/// arguments and never recomputes `get_amount_out` locally.
#[async_trait]
pub trait AmmBackend: Send + Sync {
    async fn get_reserves(&self, pool_id: &str) -> Result<ReserveSnapshot>;

    async fn get_amount_out(
        &self,
        pool_id: &str,
        amount_in_minor: u128,
        base_is_input: bool,
    ) -> Result<u128>;

    async fn swap(&self, call: &SwapCall) -> Result<TxReceipt>;

    async fn add_liquidity(
        &self,
        pool_id: &str,
        amount_a_minor: u128,
        amount_b_minor: u128,
    ) -> Result<TxReceipt>;

    async fn remove_liquidity(&self, pool_id: &str, shares: u128) -> Result<TxReceipt>;

    async fn get_balances(&self, account_id: &str) -> Result<HashMap<String, u128>>;

    async fn get_share_position(&self, pool_id: &str, account_id: &str) -> Result<SharePosition>;

    async fn faucet_status(&self, account_id: &str) -> Result<FaucetStatus>;

    async fn faucet_claim(&self, account_id: &str) -> Result<TxReceipt>;
}
