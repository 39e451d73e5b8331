/*
 * Static pool topology and pair resolution
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{HashSwapError, Result, Side};

/// One AMM pool of a deployment. Legs are conventionally ordered with the
/// deployment's base token as `token_a` for every pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: String,
    pub token_a: String,
    pub token_b: String,
}

/// Outcome of resolving a (from, to) token pair against the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    pub pool_id: String,
    /// True when the base token (side A) is the input leg of the trade.
    pub base_is_input: bool,
}

impl ResolvedPool {
    #[must_use]
    pub fn input_side(&self) -> Side {
        if self.base_is_input {
            Side::A
        } else {
            Side::B
        }
    }
}

/// The static pair table of one deployment: every pool connects the base
/// token to one other token. Built once from configuration, queried on
/// every quote and liquidity event. Resolution depends only on the table
/// and the two token identities.
#[derive(Debug, Clone)]
pub struct PoolTopology {
    base_token: String,
    by_other: HashMap<String, String>,
}

impl PoolTopology {
    /// Builds the table from the deployment's pool list.
    ///
    /// Every pool must have the base token as `token_a`, a distinct
    /// `token_b`, and no other token may appear twice.
    pub fn new(base_token: impl Into<String>, pools: &[Pool]) -> Result<Self> {
        let base_token = base_token.into();
        let mut by_other = HashMap::new();

        for pool in pools {
            if pool.token_a != base_token {
                return Err(HashSwapError::ConfigError(format!(
                    "Pool {} is not anchored on base token {}",
                    pool.id, base_token
                )));
            }
            if pool.token_b == base_token {
                return Err(HashSwapError::ConfigError(format!(
                    "Pool {} pairs the base token with itself",
                    pool.id
                )));
            }
            if by_other
                .insert(pool.token_b.clone(), pool.id.clone())
                .is_some()
            {
                return Err(HashSwapError::ConfigError(format!(
                    "Duplicate pool for token {}",
                    pool.token_b
                )));
            }
        }

        Ok(Self {
            base_token,
            by_other,
        })
    }

    #[must_use]
    pub fn base_token(&self) -> &str {
        &self.base_token
    }

    /// Resolves the unique pool serving a token pair, along with the trade
    /// orientation. Self-pairs and pairs not touching the base token are
    /// unsupported; this client never routes through more than one hop.
    pub fn resolve(&self, from_token: &str, to_token: &str) -> Result<ResolvedPool> {
        if from_token == to_token {
            return Err(HashSwapError::UnsupportedPair(
                from_token.to_string(),
                to_token.to_string(),
            ));
        }

        let (other, base_is_input) = if from_token == self.base_token {
            (to_token, true)
        } else if to_token == self.base_token {
            (from_token, false)
        } else {
            return Err(HashSwapError::UnsupportedPair(
                from_token.to_string(),
                to_token.to_string(),
            ));
        };

        match self.by_other.get(other) {
            Some(pool_id) => Ok(ResolvedPool {
                pool_id: pool_id.clone(),
                base_is_input,
            }),
            None => Err(HashSwapError::UnsupportedPair(
                from_token.to_string(),
                to_token.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> PoolTopology {
        let pools = vec![
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
        ];
        PoolTopology::new("hUSD", &pools).unwrap()
    }

    #[test]
    fn resolves_base_to_other() {
        let resolved = topology().resolve("hUSD", "hEUR").unwrap();
        assert_eq!(resolved.pool_id, "0.0.5001");
        assert!(resolved.base_is_input);
        assert_eq!(resolved.input_side(), Side::A);
    }

    #[test]
    fn resolution_is_symmetric_in_pool() {
        let topo = topology();
        let forward = topo.resolve("hUSD", "hGBP").unwrap();
        let reverse = topo.resolve("hGBP", "hUSD").unwrap();
        assert_eq!(forward.pool_id, reverse.pool_id);
        assert!(forward.base_is_input);
        assert!(!reverse.base_is_input);
    }

    #[test]
    fn self_pair_is_unsupported() {
        let err = topology().resolve("hUSD", "hUSD").unwrap_err();
        assert!(matches!(err, HashSwapError::UnsupportedPair(_, _)));
    }

    #[test]
    fn pair_without_base_leg_is_unsupported() {
        // Both tokens have pools against the base, but no direct pool and
        // no multi-hop routing.
        let err = topology().resolve("hEUR", "hGBP").unwrap_err();
        assert!(matches!(err, HashSwapError::UnsupportedPair(_, _)));
    }

    #[test]
    fn unknown_token_is_unsupported() {
        let err = topology().resolve("hUSD", "hJPY").unwrap_err();
        assert!(matches!(err, HashSwapError::UnsupportedPair(_, _)));
    }

    #[test]
    fn misanchored_pool_rejected_at_build() {
        let pools = vec![Pool {
            id: "0.0.5003".to_string(),
            token_a: "hEUR".to_string(),
            token_b: "hGBP".to_string(),
        }];
        assert!(PoolTopology::new("hUSD", &pools).is_err());
    }

    #[test]
    fn self_paired_pool_rejected_at_build() {
        let pools = vec![Pool {
            id: "0.0.5004".to_string(),
            token_a: "hUSD".to_string(),
            token_b: "hUSD".to_string(),
        }];
        assert!(PoolTopology::new("hUSD", &pools).is_err());
    }
}
