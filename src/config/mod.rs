/*
 * Deployment configuration for the HashSwap client
 */

use std::env;

use serde::{Deserialize, Serialize};

use crate::models::{HashSwapError, Result};
use crate::pools::{Pool, PoolTopology};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiDefaults {
    pub default_from: String,
    pub default_to: String,
    pub slippage_default_bps: u32,
}

/// One deployment of the HashSwap frontend family. Everything that differs
/// between the deployments (network, backend, token set, pool topology,
/// UI defaults) lives here; the engines are deployment-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub app_name: String,
    pub network_name: String,
    pub api_base: String,
    pub tokens: Vec<TokenConfig>,
    pub pools: Vec<Pool>,
    pub ui: UiDefaults,
}

impl DeploymentConfig {
    /// Loads the deployment selected by `HASHSWAP_CONFIG`, or falls back
    /// to the reference deployment when the variable is unset.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        match env::var("HASHSWAP_CONFIG") {
            Ok(path) => Self::from_file(&path),
            Err(_) => Ok(Self::reference()),
        }
    }

    /// Reads a deployment file (TOML/JSON/YAML by extension), with
    /// `HASHSWAP_`-prefixed environment variables taking precedence.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("HASHSWAP").separator("__"))
            .build()
            .map_err(|e| HashSwapError::ConfigError(format!("Failed to read {path}: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| HashSwapError::ConfigError(format!("Invalid deployment config: {e}")))
    }

    /// The Hedera Testnet reference deployment.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            app_name: "HashSwap".to_string(),
            network_name: "Hedera Testnet".to_string(),
            api_base: "http://localhost:8787".to_string(),
            tokens: vec![
                TokenConfig {
                    symbol: "hUSD".to_string(),
                    address: "0.0.4001".to_string(),
                    decimals: 6,
                },
                TokenConfig {
                    symbol: "hEUR".to_string(),
                    address: "0.0.4002".to_string(),
                    decimals: 6,
                },
                TokenConfig {
                    symbol: "hGBP".to_string(),
                    address: "0.0.4003".to_string(),
                    decimals: 6,
                },
            ],
            pools: vec![
                Pool {
                    id: "0.0.5001".to_string(),
                    token_a: "hUSD".to_string(),
                    token_b: "hEUR".to_string(),
                },
                Pool {
                    id: "0.0.5002".to_string(),
                    token_a: "hUSD".to_string(),
                    token_b: "hGBP".to_string(),
                },
            ],
            ui: UiDefaults {
                default_from: "hUSD".to_string(),
                default_to: "hEUR".to_string(),
                slippage_default_bps: 50,
            },
        }
    }
}

/// A validated deployment: the raw catalogue plus the pair table built
/// from it. This is the context object the engines receive per operation,
/// instead of reading shared mutable selection state.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub config: DeploymentConfig,
    pub topology: PoolTopology,
}

impl Deployment {
    pub fn new(config: DeploymentConfig) -> Result<Self> {
        let base = config
            .pools
            .first()
            .map(|p| p.token_a.clone())
            .ok_or_else(|| HashSwapError::ConfigError("Deployment has no pools".to_string()))?;

        let topology = PoolTopology::new(base, &config.pools)?;

        for pool in &config.pools {
            for leg in [&pool.token_a, &pool.token_b] {
                if !config.tokens.iter().any(|t| &t.symbol == leg) {
                    return Err(HashSwapError::ConfigError(format!(
                        "Pool {} references unknown token {leg}",
                        pool.id
                    )));
                }
            }
        }

        if config.ui.slippage_default_bps > 10_000 {
            return Err(HashSwapError::ConfigError(format!(
                "Default slippage out of range: {} bps",
                config.ui.slippage_default_bps
            )));
        }

        Ok(Self { config, topology })
    }

    /// Looks up a token of this deployment's catalogue.
    pub fn token(&self, symbol: &str) -> Result<&TokenConfig> {
        self.config
            .tokens
            .iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| HashSwapError::ConfigError(format!("Unknown token: {symbol}")))
    }

    pub fn decimals(&self, symbol: &str) -> Result<u32> {
        Ok(self.token(symbol)?.decimals)
    }

    /// The pool record behind a pool id.
    pub fn pool(&self, pool_id: &str) -> Result<&Pool> {
        self.config
            .pools
            .iter()
            .find(|p| p.id == pool_id)
            .ok_or_else(|| HashSwapError::ConfigError(format!("Unknown pool: {pool_id}")))
    }
}
