/*
 * Two-sided liquidity deposit form synchronization and share removal
 */

use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::backend::{ReserveSnapshot, ReserveState, SharePosition};
use crate::config::Deployment;
use crate::models::{HashSwapError, Result, Side};
use crate::units::{to_human_units, to_minor_units};

/// Token context of a pool's two legs, as needed for scaling and display.
#[derive(Debug, Clone)]
pub struct PoolLegs {
    pub symbol_a: String,
    pub symbol_b: String,
    pub decimals_a: u32,
    pub decimals_b: u32,
}

impl PoolLegs {
    pub fn from_deployment(deployment: &Deployment, pool_id: &str) -> Result<Self> {
        let pool = deployment.pool(pool_id)?;
        Ok(Self {
            symbol_a: pool.token_a.clone(),
            symbol_b: pool.token_b.clone(),
            decimals_a: deployment.decimals(&pool.token_a)?,
            decimals_b: deployment.decimals(&pool.token_b)?,
        })
    }
}

/// Form state as classified against the current reserves snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Both fields blank.
    Empty,
    /// One side authoritative, the other derived from the pool ratio.
    SingleSided,
    /// No ratio exists yet; both sides are supplied independently and the
    /// first deposit sets the initial ratio.
    PoolEmpty,
    /// Reserve read failed; nothing can be derived.
    Unavailable,
}

/// What one edit did to the form. At most one derivation happens per
/// edit; a derived write never re-enters the edit path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Edited side is blank or zero; the opposite field was cleared.
    Cleared,
    Derived { side: Side, value: String },
    /// Pool is empty: the edited value stands alone, nothing derived.
    Independent,
    /// Reserves unreadable or the derived amount is unrepresentable; the
    /// opposite field was cleared rather than left showing a stale value.
    Unavailable,
    /// Malformed input; the opposite field was cleared.
    Invalid { message: String },
    /// A newer edit superseded this one while its reserves read was in
    /// flight; the form was left untouched.
    Superseded,
}

/// The two-sided deposit form. Fields hold raw user/derived text;
/// `last_edited` disambiguates which side is authoritative when both are
/// populated. All methods are pure functions of the form fields and the
/// reserves snapshot passed in.
#[derive(Debug, Clone, Default)]
pub struct DepositForm {
    amount_a: String,
    amount_b: String,
    last_edited: Option<Side>,
}

impl DepositForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool selection changed: both fields blank, no authoritative side.
    pub fn reset(&mut self) {
        self.amount_a.clear();
        self.amount_b.clear();
        self.last_edited = None;
    }

    #[must_use]
    pub fn amount(&self, side: Side) -> &str {
        match side {
            Side::A => &self.amount_a,
            Side::B => &self.amount_b,
        }
    }

    #[must_use]
    pub fn last_edited(&self) -> Option<Side> {
        self.last_edited
    }

    /// Applies a user edit to one side and, when a pool ratio exists,
    /// derives the opposite side in integer minor-unit arithmetic. The
    /// derived value is written directly into the field: it does not pass
    /// through this method again, so a single edit can never cascade.
    pub fn edit(
        &mut self,
        side: Side,
        value: &str,
        legs: &PoolLegs,
        reserves: Option<&ReserveSnapshot>,
    ) -> SyncOutcome {
        *self.field_mut(side) = value.trim().to_string();
        self.last_edited = Some(side);

        let (own_decimals, other_decimals) = match side {
            Side::A => (legs.decimals_a, legs.decimals_b),
            Side::B => (legs.decimals_b, legs.decimals_a),
        };

        if self.amount(side).is_empty() {
            self.field_mut(side.opposite()).clear();
            return SyncOutcome::Cleared;
        }

        let minor = match to_minor_units(self.amount(side), own_decimals) {
            Ok(scaled) => scaled.minor,
            Err(e) => {
                self.field_mut(side.opposite()).clear();
                return SyncOutcome::Invalid {
                    message: e.to_string(),
                };
            }
        };

        if minor == 0 {
            self.field_mut(side.opposite()).clear();
            return SyncOutcome::Cleared;
        }

        let Some(snapshot) = reserves else {
            self.field_mut(side.opposite()).clear();
            return SyncOutcome::Unavailable;
        };

        let (reserve_a, reserve_b) = match snapshot.state() {
            ReserveState::Empty => return SyncOutcome::Independent,
            ReserveState::Available {
                reserve_a,
                reserve_b,
            } => (reserve_a, reserve_b),
        };

        let (reserve_own, reserve_other) = match side {
            Side::A => (reserve_a, reserve_b),
            Side::B => (reserve_b, reserve_a),
        };

        // amount_other = amount_own * reserve_other / reserve_own, floored.
        let derived = BigUint::from(minor) * reserve_other / reserve_own;
        let Some(derived_minor) = derived.to_u128() else {
            warn!("Derived deposit amount exceeds representable range");
            self.field_mut(side.opposite()).clear();
            return SyncOutcome::Unavailable;
        };

        let rendered = to_human_units(derived_minor, other_decimals);
        *self.field_mut(side.opposite()) = rendered.clone();

        SyncOutcome::Derived {
            side: side.opposite(),
            value: rendered,
        }
    }

    /// Classifies the form against a reserves snapshot.
    #[must_use]
    pub fn state(&self, reserves: Option<&ReserveSnapshot>) -> FormState {
        let Some(snapshot) = reserves else {
            return FormState::Unavailable;
        };
        if snapshot.state() == ReserveState::Empty {
            return FormState::PoolEmpty;
        }
        if self.amount_a.is_empty() && self.amount_b.is_empty() {
            FormState::Empty
        } else {
            FormState::SingleSided
        }
    }

    /// Validated minor-unit amounts for the add-liquidity call. Both sides
    /// must hold a positive amount.
    pub fn deposit_amounts(&self, legs: &PoolLegs) -> Result<(u128, u128)> {
        let a = to_minor_units(&self.amount_a, legs.decimals_a)?.minor;
        let b = to_minor_units(&self.amount_b, legs.decimals_b)?.minor;
        if a == 0 || b == 0 {
            return Err(HashSwapError::InvalidAmount(
                "Both deposit amounts must be positive".to_string(),
            ));
        }
        Ok((a, b))
    }

    /// Summary of both deposit amounts, once both are populated.
    #[must_use]
    pub fn preview(&self, legs: &PoolLegs) -> Option<String> {
        if self.amount_a.is_empty() || self.amount_b.is_empty() {
            return None;
        }
        Some(format!(
            "Deposit {} {} + {} {}",
            self.amount_a, legs.symbol_a, self.amount_b, legs.symbol_b
        ))
    }

    fn field_mut(&mut self, side: Side) -> &mut String {
        match side {
            Side::A => &mut self.amount_a,
            Side::B => &mut self.amount_b,
        }
    }
}

/// Human-readable pool ratio, `1 A ≈ r B`, or `None` while no ratio
/// exists.
#[must_use]
pub fn ratio_line(legs: &PoolLegs, reserves: &ReserveSnapshot) -> Option<String> {
    let ReserveState::Available {
        reserve_a,
        reserve_b,
    } = reserves.state()
    else {
        return None;
    };

    let human_a = Decimal::from_str(&to_human_units(reserve_a, legs.decimals_a)).ok()?;
    let human_b = Decimal::from_str(&to_human_units(reserve_b, legs.decimals_b)).ok()?;
    let rate = human_b.checked_div(human_a)?;

    Some(format!(
        "1 {} ≈ {} {}",
        legs.symbol_a,
        rate.normalize(),
        legs.symbol_b
    ))
}

/// Parses a share-removal input. Shares are whole units: no sign, no
/// fraction. The returned count is forwarded to the contract unchanged;
/// the contract determines the amounts actually returned.
pub fn validate_shares(input: &str) -> Result<u128> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(HashSwapError::InvalidShares(format!(
            "Shares must be a non-negative whole number: {input:?}"
        )));
    }
    trimmed
        .parse()
        .map_err(|e| HashSwapError::InvalidShares(format!("Share count out of range: {e}")))
}

/// Display of the account's share balance over the pool total.
#[must_use]
pub fn position_line(position: &SharePosition) -> String {
    if position.total_shares == 0 {
        return "0 / 0 shares".to_string();
    }

    let percent = (Decimal::from_str(&position.shares.to_string()).ok())
        .zip(Decimal::from_str(&position.total_shares.to_string()).ok())
        .and_then(|(shares, total)| shares.checked_div(total))
        .and_then(|f| f.checked_mul(Decimal::from(100)))
        .map(|p| p.round_dp(2).normalize());

    match percent {
        Some(p) => format!(
            "{} / {} shares ({p}%)",
            position.shares, position.total_shares
        ),
        None => format!("{} / {} shares", position.shares, position.total_shares),
    }
}
