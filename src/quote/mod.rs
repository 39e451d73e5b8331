/*
 * Quote orchestration and the slippage-bounded minimum-output guard
 */

use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::backend::AmmBackend;
use crate::config::Deployment;
use crate::models::{HashSwapError, Result, SwapCall, TradeRequest};
use crate::units::{to_human_units, to_minor_units};

pub const BPS_DENOMINATOR: u32 = 10_000;

/// A priced trade. Output and rate come from the deployment's pricing
/// oracle; this client never recomputes the curve locally.
#[derive(Debug, Clone)]
pub struct SwapQuote {
    pub pool_id: String,
    pub from_token: String,
    pub to_token: String,
    pub base_is_input: bool,
    pub amount_in_minor: u128,
    pub amount_out_minor: u128,
    pub amount_in: String,
    pub amount_out: String,
    pub effective_rate: Decimal,
}

impl SwapQuote {
    /// Display line in the form `1 hUSD ≈ 1.8 hEUR`.
    #[must_use]
    pub fn rate_line(&self) -> String {
        format!(
            "1 {} ≈ {} {}",
            self.from_token,
            self.effective_rate.normalize(),
            self.to_token
        )
    }
}

pub struct QuoteEngine {
    backend: Arc<dyn AmmBackend>,
}

impl QuoteEngine {
    #[must_use]
    pub fn new(backend: Arc<dyn AmmBackend>) -> Self {
        Self { backend }
    }

    /// Prices a trade request against the deployment's oracle.
    ///
    /// Returns `Ok(None)` when there is nothing to quote (blank or zero
    /// input). Malformed input and unsupported pairs are field-level
    /// errors; an oracle failure becomes `QuoteUnavailable` so callers can
    /// degrade to a placeholder and retry on the next input event.
    pub async fn quote(
        &self,
        deployment: &Deployment,
        request: &TradeRequest,
    ) -> Result<Option<SwapQuote>> {
        if request.amount.trim().is_empty() {
            return Ok(None);
        }

        let from = deployment.token(&request.from_token)?;
        let to = deployment.token(&request.to_token)?;

        let scaled = to_minor_units(&request.amount, from.decimals)?;
        let resolved = deployment
            .topology
            .resolve(&request.from_token, &request.to_token)?;

        if scaled.minor == 0 {
            return Ok(None);
        }

        let amount_out_minor = self
            .backend
            .get_amount_out(&resolved.pool_id, scaled.minor, resolved.base_is_input)
            .await
            .map_err(|e| HashSwapError::QuoteUnavailable(format!("Pricing call failed: {e}")))?;

        let amount_in = to_human_units(scaled.minor, from.decimals);
        let amount_out = to_human_units(amount_out_minor, to.decimals);

        let effective_rate = effective_rate(&amount_in, &amount_out)?;

        debug!(
            pool = %resolved.pool_id,
            %amount_in, %amount_out, %effective_rate,
            "quote computed"
        );

        Ok(Some(SwapQuote {
            pool_id: resolved.pool_id,
            from_token: request.from_token.clone(),
            to_token: request.to_token.clone(),
            base_is_input: resolved.base_is_input,
            amount_in_minor: scaled.minor,
            amount_out_minor,
            amount_in,
            amount_out,
            effective_rate,
        }))
    }

    /// Builds the executing swap call from a quote: the minimum-output
    /// guard derived here is the caller's sole protection against price
    /// movement between quote and execution.
    #[must_use]
    pub fn swap_call(&self, quote: &SwapQuote, slippage_bps: u32) -> SwapCall {
        SwapCall {
            pool: quote.pool_id.clone(),
            amount_in_minor: quote.amount_in_minor,
            min_out_minor: min_output(quote.amount_out_minor, slippage_bps),
            base_is_input: quote.base_is_input,
        }
    }
}

/// `floor(amount_out × (10000 − bps) / 10000)`: monotonically
/// non-increasing in `bps`, identity at zero, never above `amount_out`.
#[must_use]
pub fn min_output(amount_out_minor: u128, slippage_bps: u32) -> u128 {
    let bps = slippage_bps.min(BPS_DENOMINATOR);
    let kept = BigUint::from(amount_out_minor) * (BPS_DENOMINATOR - bps) / BPS_DENOMINATOR;
    // The quotient is bounded by amount_out_minor, so this always fits.
    kept.to_u128().unwrap_or(amount_out_minor)
}

/// Parses a user-selected slippage option in basis points, falling back to
/// the deployment default when the option is malformed or above 100%.
#[must_use]
pub fn parse_slippage_bps(input: &str, default_bps: u32) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(bps) if bps <= BPS_DENOMINATOR => bps,
        _ => default_bps.min(BPS_DENOMINATOR),
    }
}

fn effective_rate(amount_in: &str, amount_out: &str) -> Result<Decimal> {
    let amount_in = Decimal::from_str(amount_in)
        .map_err(|e| HashSwapError::QuoteUnavailable(format!("Rate conversion failed: {e}")))?;
    let amount_out = Decimal::from_str(amount_out)
        .map_err(|e| HashSwapError::QuoteUnavailable(format!("Rate conversion failed: {e}")))?;

    amount_out
        .checked_div(amount_in)
        .ok_or_else(|| HashSwapError::QuoteUnavailable("Rate division failed".to_string()))
}
