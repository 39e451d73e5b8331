/*
 * Session service coordinating quoting, liquidity and faucet operations
 */

use std::sync::Arc;
use std::sync::Mutex;

use tracing::{info, warn};

use crate::backend::{AmmBackend, HttpBackend, ReserveSnapshot};
use crate::config::{Deployment, DeploymentConfig};
use crate::liquidity::{
    position_line, ratio_line, validate_shares, DepositForm, FormState, PoolLegs, SyncOutcome,
};
use crate::models::{HashSwapError, Result, Side, TradeRequest, TxReceipt};
use crate::quote::{QuoteEngine, SwapQuote};
use crate::session::{Commit, SequenceGate};
use crate::utils::normalize_account_id;

/// Placeholder shown whenever no trustworthy number is available.
pub const NO_QUOTE: &str = "—";

/// State of the liquidity form session: which pool it is bound to, and the
/// form itself. Selecting a different pool discards the session.
#[derive(Debug, Default)]
struct LiquiditySession {
    pool_id: Option<String>,
    form: DepositForm,
}

/// View handed back to the presentation layer after a deposit-form event.
#[derive(Debug, Clone)]
pub struct DepositView {
    pub outcome: SyncOutcome,
    pub state: FormState,
    pub amount_a: String,
    pub amount_b: String,
    pub ratio: Option<String>,
    pub preview: Option<String>,
}

/// The explicit session object of this client: engines are pure functions
/// of (deployment, inputs); the service owns the few pieces of state that
/// must persist between events (latest displayed quote, liquidity form)
/// and the sequence gates that keep stale backend reads out of them.
pub struct SwapService {
    deployment: Deployment,
    backend: Arc<dyn AmmBackend>,
    quote_engine: QuoteEngine,
    quote_gate: SequenceGate,
    sync_gate: SequenceGate,
    latest_quote: Mutex<Option<SwapQuote>>,
    liquidity: Mutex<LiquiditySession>,
}

impl SwapService {
    pub fn new(deployment: Deployment, backend: Arc<dyn AmmBackend>) -> Self {
        info!(
            app = %deployment.config.app_name,
            network = %deployment.config.network_name,
            pools = deployment.config.pools.len(),
            "Initializing swap service"
        );

        Self {
            deployment,
            backend: backend.clone(),
            quote_engine: QuoteEngine::new(backend),
            quote_gate: SequenceGate::new(),
            sync_gate: SequenceGate::new(),
            latest_quote: Mutex::new(None),
            liquidity: Mutex::new(LiquiditySession::default()),
        }
    }

    /// Builds a service against the deployment's HTTP backend.
    pub fn connect(config: DeploymentConfig) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&config.api_base));
        let deployment = Deployment::new(config)?;
        Ok(Self::new(deployment, backend))
    }

    #[must_use]
    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Re-quotes after an input event. Requests are sequenced: if a newer
    /// request was issued while this one was reading the oracle, its
    /// result is discarded and the displayed quote is left to the newer
    /// request. An oracle failure degrades to "no quote" and is retried on
    /// the next event; malformed input and unsupported pairs surface as
    /// field-level errors.
    pub async fn refresh_quote(&self, request: &TradeRequest) -> Result<Option<SwapQuote>> {
        let ticket = self.quote_gate.issue();

        let quote = match self.quote_engine.quote(&self.deployment, request).await {
            Ok(quote) => quote,
            Err(HashSwapError::QuoteUnavailable(reason)) => {
                warn!("Quote unavailable: {reason}");
                None
            }
            Err(e) => return Err(e),
        };

        match self.quote_gate.commit(ticket) {
            Commit::Applied => {
                *self.latest_quote.lock().unwrap() = quote.clone();
                Ok(quote)
            }
            Commit::Superseded => Ok(None),
        }
    }

    /// The committed quote, if any.
    #[must_use]
    pub fn displayed_quote(&self) -> Option<SwapQuote> {
        self.latest_quote.lock().unwrap().clone()
    }

    /// Output amount for display: the committed quote's, or a placeholder.
    /// A wrong number is worse than no number.
    #[must_use]
    pub fn amount_out_display(&self) -> String {
        self.latest_quote
            .lock()
            .unwrap()
            .as_ref()
            .map_or_else(|| NO_QUOTE.to_string(), |q| q.amount_out.clone())
    }

    /// Quotes and executes in one step, guarding the swap with the
    /// slippage-bounded minimum output.
    pub async fn execute_swap(&self, request: &TradeRequest) -> Result<TxReceipt> {
        let quote = self
            .quote_engine
            .quote(&self.deployment, request)
            .await?
            .ok_or_else(|| HashSwapError::InvalidAmount("Nothing to swap".to_string()))?;

        let call = self.quote_engine.swap_call(&quote, request.slippage_bps);
        info!(
            pool = %call.pool,
            amount_in = call.amount_in_minor,
            min_out = call.min_out_minor,
            "Submitting swap"
        );

        self.backend.swap(&call).await
    }

    /// Binds the liquidity form to a pool, discarding any previous form
    /// state, and reports the current ratio from a fresh reserves read.
    pub async fn select_pool(&self, pool_id: &str) -> Result<DepositView> {
        let legs = PoolLegs::from_deployment(&self.deployment, pool_id)?;

        {
            let mut session = self.liquidity.lock().unwrap();
            session.pool_id = Some(pool_id.to_string());
            session.form.reset();
        }

        let reserves = self.read_reserves(pool_id).await;
        let session = self.liquidity.lock().unwrap();
        Ok(Self::view(&session.form, &legs, reserves.as_ref(), SyncOutcome::Cleared))
    }

    /// Applies a deposit-field edit. A fresh reserves snapshot is read per
    /// edit; edits are sequenced so a slow read cannot overwrite the form
    /// after a newer edit already has.
    pub async fn edit_deposit(&self, pool_id: &str, side: Side, value: &str) -> Result<DepositView> {
        let legs = PoolLegs::from_deployment(&self.deployment, pool_id)?;
        let ticket = self.sync_gate.issue();

        let reserves = self.read_reserves(pool_id).await;

        let mut session = self.liquidity.lock().unwrap();
        if session.pool_id.as_deref() != Some(pool_id) {
            session.pool_id = Some(pool_id.to_string());
            session.form.reset();
        }

        if self.sync_gate.commit(ticket) == Commit::Superseded {
            return Ok(Self::view(
                &session.form,
                &legs,
                reserves.as_ref(),
                SyncOutcome::Superseded,
            ));
        }

        let outcome = session.form.edit(side, value, &legs, reserves.as_ref());
        Ok(Self::view(&session.form, &legs, reserves.as_ref(), outcome))
    }

    /// Submits the deposit currently held by the form.
    pub async fn add_liquidity(&self, pool_id: &str) -> Result<TxReceipt> {
        let legs = PoolLegs::from_deployment(&self.deployment, pool_id)?;
        let (amount_a, amount_b) = {
            let session = self.liquidity.lock().unwrap();
            if session.pool_id.as_deref() != Some(pool_id) {
                return Err(HashSwapError::InvalidAmount(
                    "No deposit prepared for this pool".to_string(),
                ));
            }
            session.form.deposit_amounts(&legs)?
        };

        info!(pool = %pool_id, amount_a, amount_b, "Submitting liquidity deposit");
        self.backend.add_liquidity(pool_id, amount_a, amount_b).await
    }

    /// Validates a share-removal input and forwards it; the contract
    /// determines the amounts actually returned.
    pub async fn remove_liquidity(&self, pool_id: &str, shares_input: &str) -> Result<TxReceipt> {
        let shares = validate_shares(shares_input)?;
        if shares == 0 {
            return Err(HashSwapError::InvalidShares(
                "Share count must be positive".to_string(),
            ));
        }

        info!(pool = %pool_id, shares, "Submitting liquidity removal");
        self.backend.remove_liquidity(pool_id, shares).await
    }

    /// Pool ratio plus the account's share position, fetched as one
    /// consistent pair of reads.
    pub async fn liquidity_overview(&self, pool_id: &str, account_id: &str) -> Result<String> {
        let account = normalize_account_id(account_id)?;
        let legs = PoolLegs::from_deployment(&self.deployment, pool_id)?;

        let (reserves, position) = tokio::try_join!(
            self.backend.get_reserves(pool_id),
            self.backend.get_share_position(pool_id, &account)
        )?;

        let ratio = ratio_line(&legs, &reserves)
            .unwrap_or_else(|| "No liquidity yet".to_string());
        Ok(format!("{ratio} · {}", position_line(&position)))
    }

    /// Token balances of an account, in catalogue order.
    pub async fn balances_line(&self, account_id: &str) -> Result<String> {
        let account = normalize_account_id(account_id)?;
        let balances = self.backend.get_balances(&account).await?;

        let line = self
            .deployment
            .config
            .tokens
            .iter()
            .map(|token| {
                let minor = balances.get(&token.symbol).copied().unwrap_or(0);
                format!(
                    "{} {}",
                    token.symbol,
                    crate::units::to_human_units(minor, token.decimals)
                )
            })
            .collect::<Vec<_>>()
            .join(" · ");

        Ok(line)
    }

    pub async fn faucet_status(&self, account_id: &str) -> Result<crate::backend::FaucetStatus> {
        let account = normalize_account_id(account_id)?;
        self.backend.faucet_status(&account).await
    }

    pub async fn faucet_claim(&self, account_id: &str) -> Result<TxReceipt> {
        let account = normalize_account_id(account_id)?;
        let receipt = self.backend.faucet_claim(&account).await?;
        info!(account = %account, tx = %receipt.tx_id, "Faucet claim submitted");
        Ok(receipt)
    }

    async fn read_reserves(&self, pool_id: &str) -> Option<ReserveSnapshot> {
        match self.backend.get_reserves(pool_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Reserve read failed for {pool_id}: {e}");
                None
            }
        }
    }

    fn view(
        form: &DepositForm,
        legs: &PoolLegs,
        reserves: Option<&ReserveSnapshot>,
        outcome: SyncOutcome,
    ) -> DepositView {
        DepositView {
            outcome,
            state: form.state(reserves),
            amount_a: form.amount(Side::A).to_string(),
            amount_b: form.amount(Side::B).to_string(),
            ratio: reserves.and_then(|snapshot| ratio_line(legs, snapshot)),
            preview: form.preview(legs),
        }
    }
}
