//! Swap Tests (T-10 to T-12)
//!
//! Verifies reserve movement and oracle availability across the scripted
//! token1 -> token2 swaps.

use anyhow::Result;
use twap_harness::chain::token_balance;
use twap_harness::prices::query_twap;
use twap_harness::{BootstrapReport, ChainClient};

use crate::harness::TestContext;

/// T-10: Reserve Trend
///
/// Each swap must add exactly the configured swap amount to token1 reserves
/// and take a positive amount out of token2 reserves.
pub async fn test_t10_reserve_trend(ctx: &TestContext, report: &BootstrapReport) -> Result<()> {
    println!("\n=== T-10: Reserve Trend ===");

    let swap_amount = ctx.config.pool.swap_amount as u128;
    for pair in report.samples.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let token1_delta = next.token1_reserve.amount.u128() as i128
            - prev.token1_reserve.amount.u128() as i128;
        let token2_delta = next.token2_reserve.amount.u128() as i128
            - prev.token2_reserve.amount.u128() as i128;

        println!("{}: token1 {:+}, token2 {:+}", next.step, token1_delta, token2_delta);

        if token1_delta != swap_amount as i128 {
            anyhow::bail!("{}: token1 moved by {} instead of {}", next.step, token1_delta, swap_amount);
        }
        if token2_delta >= 0 {
            anyhow::bail!("{}: token2 reserves did not decrease", next.step);
        }
    }

    println!("✅ T-10 PASSED: Reserves moved with every swap");
    Ok(())
}

/// T-11: TWAP Availability
///
/// The oracle must answer at every step and once more after the run.
pub async fn test_t11_twap_available(ctx: &TestContext, report: &BootstrapReport) -> Result<()> {
    println!("\n=== T-11: TWAP Availability ===");

    for sample in &report.samples {
        println!("{}: twap={}", sample.step, sample.twap);
        if sample.twap.is_null() {
            anyhow::bail!("{}: empty TWAP response", sample.step);
        }
    }

    let latest = query_twap(&ctx.client, &report.pool_address).await?;
    println!("latest: twap={}", latest);

    println!("✅ T-11 PASSED: TWAP retrievable at every step");
    Ok(())
}

/// T-12: LP Token Balance
///
/// The deployer provided the initial liquidity, so it must hold LP tokens in
/// the cw20 contract the pool instantiated.
pub async fn test_t12_lp_balance(ctx: &TestContext, report: &BootstrapReport) -> Result<()> {
    println!("\n=== T-12: LP Token Balance ===");

    let info = ctx
        .client
        .query_smart(&report.pool_address, &serde_json::json!({ "info": {} }))
        .await?;

    let Some(lp_token) = info.get("lp_token_address").and_then(|v| v.as_str()) else {
        println!("Pool info has no lp_token_address: {}", info);
        println!("⚠️  T-12 SKIPPED: LP token is not a cw20 contract");
        return Ok(());
    };

    let balance = token_balance(&ctx.client, ctx.client.address(), lp_token).await?;
    println!("LP token: {} balance={}", lp_token, balance);

    if balance.is_zero() {
        anyhow::bail!("Deployer holds no LP tokens");
    }

    println!("✅ T-12 PASSED: LP tokens minted to deployer");
    Ok(())
}
