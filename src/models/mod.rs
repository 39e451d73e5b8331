/*
 * Data models and types shared across the HashSwap client core
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which leg of a pool an amount belongs to. Pools are conventionally
/// oriented with the deployment's base token as side A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// A single quote/swap attempt as entered by the user. Transient: built per
/// input event and discarded after the quote is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub from_token: String,
    pub to_token: String,
    pub amount: String,
    pub slippage_bps: u32,
}

/// Fully validated, unit-converted arguments for the executing swap call.
/// `min_out_minor` is the caller's worst-acceptable output and the only
/// protection against price movement between quote and execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapCall {
    pub pool: String,
    pub amount_in_minor: u128,
    pub min_out_minor: u128,
    pub base_is_input: bool,
}

/// Receipt returned by the backend for an executed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

#[derive(Debug, Error)]
pub enum HashSwapError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported pair: {0}/{1}")]
    UnsupportedPair(String, String),

    #[error("Quote unavailable: {0}")]
    QuoteUnavailable(String),

    #[error("Invalid shares: {0}")]
    InvalidShares(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Backend API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HashSwapError>;
