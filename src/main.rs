/*
 * HashSwap client
 * Entry point: connects to the configured deployment and reports state
 */

use hashswap::{config::DeploymentConfig, models::TradeRequest, service::SwapService};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting HashSwap client");

    let config = DeploymentConfig::load().map_err(|e| {
        error!("Failed to load deployment configuration: {}", e);
        e
    })?;

    info!(
        "Deployment: {} on {}",
        config.app_name, config.network_name
    );

    let request = TradeRequest {
        from_token: config.ui.default_from.clone(),
        to_token: config.ui.default_to.clone(),
        amount: "1".to_string(),
        slippage_bps: config.ui.slippage_default_bps,
    };

    let service = SwapService::connect(config)?;

    for pool in &service.deployment().config.pools {
        match service.select_pool(&pool.id).await {
            Ok(view) => info!(
                "Pool {} ({}/{}): {}",
                pool.id,
                pool.token_a,
                pool.token_b,
                view.ratio.as_deref().unwrap_or("no liquidity yet")
            ),
            Err(e) => error!("Pool {} unavailable: {}", pool.id, e),
        }
    }

    match service.refresh_quote(&request).await {
        Ok(Some(quote)) => info!(
            "{} {} -> {} {} ({})",
            quote.amount_in,
            quote.from_token,
            quote.amount_out,
            quote.to_token,
            quote.rate_line()
        ),
        Ok(None) => info!("No quote available for the default pair"),
        Err(e) => error!("Quote failed: {}", e),
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hashswap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
