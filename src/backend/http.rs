/*
 * HTTP implementation of the AmmBackend trait against a HashSwap REST backend
 */

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::{AmmBackend, FaucetStatus, ReserveSnapshot, SharePosition};
use crate::models::{HashSwapError, Result, SwapCall, TxReceipt};

pub struct HttpBackend {
    client: Client,
    api_base: String,
}

impl HttpBackend {
    #[must_use]
    pub fn new(api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.api_base, path);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or_else(|_| json!({}));

        Self::check_envelope(status, body)
    }

    async fn post_json(&self, path: &str, payload: Value) -> Result<Value> {
        let url = format!("{}{}", self.api_base, path);
        debug!("POST {url}");

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or_else(|_| json!({}));

        Self::check_envelope(status, body)
    }

    // Responses are wrapped as { ok: bool, error?: string, ... }; a non-2xx
    // status or ok == false both carry the backend's error message.
    fn check_envelope(status: reqwest::StatusCode, body: Value) -> Result<Value> {
        let ok = body["ok"].as_bool().unwrap_or(true);
        if !status.is_success() || !ok {
            let message = body["error"]
                .as_str()
                .map_or_else(|| format!("HTTP {status}"), ToString::to_string);
            return Err(HashSwapError::ApiError(message));
        }
        Ok(body)
    }

    fn parse_minor(value: &Value, field: &str) -> Result<u128> {
        value[field]
            .as_str()
            .ok_or_else(|| HashSwapError::ApiError(format!("Missing field: {field}")))?
            .parse()
            .map_err(|e| HashSwapError::ApiError(format!("Malformed {field}: {e}")))
    }

    fn parse_tx_id(value: &Value) -> Result<TxReceipt> {
        let tx_id = value["txId"]
            .as_str()
            .ok_or_else(|| HashSwapError::ApiError("Missing field: txId".to_string()))?;
        Ok(TxReceipt {
            tx_id: tx_id.to_string(),
        })
    }
}

#[async_trait]
impl AmmBackend for HttpBackend {
    async fn get_reserves(&self, pool_id: &str) -> Result<ReserveSnapshot> {
        let body = self
            .get_json(&format!("/api/pools/{pool_id}/reserves"))
            .await?;

        Ok(ReserveSnapshot {
            reserve_a: Self::parse_minor(&body, "reserveA")?,
            reserve_b: Self::parse_minor(&body, "reserveB")?,
            fetched_at: Utc::now(),
        })
    }

    async fn get_amount_out(
        &self,
        pool_id: &str,
        amount_in_minor: u128,
        base_is_input: bool,
    ) -> Result<u128> {
        let body = self
            .get_json(&format!(
                "/api/pools/{pool_id}/quote?amountIn={amount_in_minor}&baseIn={base_is_input}"
            ))
            .await?;

        Self::parse_minor(&body, "amountOut")
    }

    async fn swap(&self, call: &SwapCall) -> Result<TxReceipt> {
        let body = self
            .post_json(
                "/api/swap",
                json!({
                    "pool": call.pool,
                    "amountIn": call.amount_in_minor.to_string(),
                    "minOut": call.min_out_minor.to_string(),
                    "baseIn": call.base_is_input,
                }),
            )
            .await?;

        Self::parse_tx_id(&body)
    }

    async fn add_liquidity(
        &self,
        pool_id: &str,
        amount_a_minor: u128,
        amount_b_minor: u128,
    ) -> Result<TxReceipt> {
        let body = self
            .post_json(
                "/api/liquidity/add",
                json!({
                    "pool": pool_id,
                    "amountA": amount_a_minor.to_string(),
                    "amountB": amount_b_minor.to_string(),
                }),
            )
            .await?;

        Self::parse_tx_id(&body)
    }

    async fn remove_liquidity(&self, pool_id: &str, shares: u128) -> Result<TxReceipt> {
        let body = self
            .post_json(
                "/api/liquidity/remove",
                json!({
                    "pool": pool_id,
                    "shares": shares.to_string(),
                }),
            )
            .await?;

        Self::parse_tx_id(&body)
    }

    async fn get_balances(&self, account_id: &str) -> Result<HashMap<String, u128>> {
        let body = self
            .get_json(&format!("/api/balances?accountId={account_id}"))
            .await?;

        let entries = body["balances"]
            .as_object()
            .ok_or_else(|| HashSwapError::ApiError("Missing field: balances".to_string()))?;

        let mut balances = HashMap::new();
        for (symbol, raw) in entries {
            let minor = raw
                .as_str()
                .ok_or_else(|| HashSwapError::ApiError(format!("Malformed balance: {symbol}")))?
                .parse()
                .map_err(|e| HashSwapError::ApiError(format!("Malformed balance {symbol}: {e}")))?;
            balances.insert(symbol.clone(), minor);
        }
        Ok(balances)
    }

    async fn get_share_position(&self, pool_id: &str, account_id: &str) -> Result<SharePosition> {
        let body = self
            .get_json(&format!(
                "/api/liquidity/position?pool={pool_id}&accountId={account_id}"
            ))
            .await?;

        Ok(SharePosition {
            shares: Self::parse_minor(&body, "shares")?,
            total_shares: Self::parse_minor(&body, "totalShares")?,
        })
    }

    async fn faucet_status(&self, account_id: &str) -> Result<FaucetStatus> {
        let body = self
            .get_json(&format!("/api/faucet/status?accountId={account_id}"))
            .await?;

        Ok(FaucetStatus {
            eligible: body["eligible"].as_bool().unwrap_or(false),
            detail: body["detail"].as_str().map(ToString::to_string),
        })
    }

    async fn faucet_claim(&self, account_id: &str) -> Result<TxReceipt> {
        let body = self
            .post_json("/api/faucet/claim", json!({ "accountId": account_id }))
            .await?;

        Self::parse_tx_id(&body)
    }
}
