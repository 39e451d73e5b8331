/*
 * Lossless conversion between human-decimal strings and integer minor units
 */

use crate::models::{HashSwapError, Result};

/// Result of scaling a human amount to minor units. `truncated` counts the
/// fractional digits discarded beyond the token's precision; callers may
/// surface it as a non-blocking warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledAmount {
    pub minor: u128,
    pub truncated: usize,
}

/// Converts a human-readable decimal string to integer minor units.
///
/// Excess fractional digits are truncated at `decimals` places, never
/// rounded up. The input must be a plain non-negative decimal: no sign,
/// no exponent, at most one decimal point.
pub fn to_minor_units(human: &str, decimals: u32) -> Result<ScaledAmount> {
    let trimmed = human.trim();
    if trimmed.is_empty() || trimmed == "." {
        return Err(HashSwapError::InvalidAmount(format!(
            "Not a decimal number: {human:?}"
        )));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };

    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(HashSwapError::InvalidAmount(format!(
            "Not a non-negative decimal number: {human:?}"
        )));
    }

    let scale = 10u128
        .checked_pow(decimals)
        .ok_or_else(|| HashSwapError::InvalidAmount(format!("Unsupported precision: {decimals}")))?;

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|e| HashSwapError::InvalidAmount(format!("Integer part too large: {e}")))?
    };

    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let truncated = frac_part.len() - kept.len();

    let mut frac_value: u128 = if kept.is_empty() {
        0
    } else {
        kept.parse()
            .map_err(|e| HashSwapError::InvalidAmount(format!("Fractional part invalid: {e}")))?
    };
    // Right-pad the kept digits out to the token's full precision.
    for _ in kept.len()..decimals as usize {
        frac_value = frac_value
            .checked_mul(10)
            .ok_or_else(|| HashSwapError::InvalidAmount("Amount out of range".to_string()))?;
    }

    let minor = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| HashSwapError::InvalidAmount("Amount out of range".to_string()))?;

    Ok(ScaledAmount { minor, truncated })
}

/// Converts integer minor units back to a human-readable decimal string,
/// trimmed of insignificant trailing zeros. Zero renders as "0".
#[must_use]
pub fn to_human_units(minor: u128, decimals: u32) -> String {
    if decimals == 0 {
        return minor.to_string();
    }

    let digits = minor.to_string();
    let width = decimals as usize + 1;
    let padded = format!("{digits:0>width$}");
    let split = padded.len() - decimals as usize;
    let (int_part, frac_part) = padded.split_at(split);

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_trimmed}")
    }
}
