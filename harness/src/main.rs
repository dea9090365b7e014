//! TWAP Harness entry point
//!
//! Recovers the deployer wallet, connects to the node, logs the deployer's
//! balances, then bootstraps the pool and samples prices.

use anyhow::{Context, Result};
use twap_harness::{Bootstrap, ChainClient, CliChainClient, Config, RetryingClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting TWAP harness");

    // Load configuration
    let config = Config::load()
        .unwrap_or_else(|e| {
            log::warn!("Failed to load config ({:#}), using default local config", e);
            Config::default_local()
        })
        .apply_env();

    log::info!("Connecting to node: {}", config.chain.node);

    let client = CliChainClient::connect(config.chain.clone())
        .await
        .context("Failed to recover deployer wallet")?;
    let client = RetryingClient::new(client, config.retry_policy());

    log::info!("Deployer wallet: {}", client.address());

    // Startup reads fail fast; only the bootstrap retries
    for denom in [&config.pool.token1_denom, &config.pool.token2_denom] {
        let balance = client
            .inner()
            .balance(client.address(), denom)
            .await
            .context(format!("Failed to read {} balance", denom))?;
        log::info!("Balance: {}", balance);
    }

    let report = Bootstrap::new(&client, config.pool.clone())
        .run()
        .await
        .context("Pool bootstrap failed")?;

    log::info!(
        "Pool ready: cw20 codeId={}, pool codeId={}, address={}",
        report.token_code_id,
        report.pool_code_id,
        report.pool_address
    );
    log::info!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    Ok(())
}
