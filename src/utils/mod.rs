/*
 * Utility functions and helpers
 */

use crate::models::{HashSwapError, Result};

/// Validates and normalizes a Hedera account ID (`shard.realm.num`).
pub fn normalize_account_id(account_id: &str) -> Result<String> {
    let trimmed = account_id.trim();
    let parts: Vec<&str> = trimmed.split('.').collect();

    let well_formed = parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

    if !well_formed {
        return Err(HashSwapError::ConfigError(format!(
            "Invalid account ID format: {account_id}"
        )));
    }
    Ok(trimmed.to_string())
}
