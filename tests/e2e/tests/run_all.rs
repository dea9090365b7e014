//! Run all E2E tests
//!
//! Deploys the real cw20 and wasmswap artifacts to a local node and runs
//! the price verification plan.
//!
//! ```text
//! TWAP_HARNESS_NODE=http://localhost:26657/ cargo test -p twap-e2e-tests -- --ignored
//! ```

use twap_e2e_tests::*;

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires a local node and compiled contract artifacts"]
async fn run_all_e2e_tests() {
    println!("\n");
    println!("═══════════════════════════════════════════════════════════");
    println!("  TWAP Harness End-to-End Test Suite");
    println!("═══════════════════════════════════════════════════════════");

    println!("\nInitializing test environment...");
    let ctx = match TestContext::new().await {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("❌ Failed to initialize test context: {:#}", e);
            eprintln!("Make sure a local node is running and artifacts/ is populated");
            panic!("Test setup failed");
        }
    };

    println!("\n✓ Test environment ready");
    println!("  RPC URL: {}", ctx.node.rpc_url);

    let mut passed = 0;
    let mut failed = 0;

    // Track 1: Bootstrap
    println!("\n━━━ Track 1: Bootstrap ━━━");

    let report = match test_bootstrap::test_t01_deploy(&ctx).await {
        Ok(report) => {
            passed += 1;
            report
        }
        Err(e) => {
            eprintln!("❌ T-01 FAILED: {:#}", e);
            panic!("Deployment failed, remaining tests need a pool");
        }
    };

    match test_bootstrap::test_t02_initial_spot(&ctx, &report).await {
        Ok(_) => passed += 1,
        Err(e) => {
            eprintln!("❌ T-02 FAILED: {:#}", e);
            failed += 1;
        }
    }

    match test_bootstrap::test_t03_live_spot(&ctx, &report).await {
        Ok(_) => passed += 1,
        Err(e) => {
            eprintln!("❌ T-03 FAILED: {:#}", e);
            failed += 1;
        }
    }

    // Track 2: Swaps
    println!("\n━━━ Track 2: Swaps ━━━");

    match test_trading::test_t10_reserve_trend(&ctx, &report).await {
        Ok(_) => passed += 1,
        Err(e) => {
            eprintln!("❌ T-10 FAILED: {:#}", e);
            failed += 1;
        }
    }

    match test_trading::test_t11_twap_available(&ctx, &report).await {
        Ok(_) => passed += 1,
        Err(e) => {
            eprintln!("❌ T-11 FAILED: {:#}", e);
            failed += 1;
        }
    }

    match test_trading::test_t12_lp_balance(&ctx, &report).await {
        Ok(_) => passed += 1,
        Err(e) => {
            eprintln!("❌ T-12 FAILED: {:#}", e);
            failed += 1;
        }
    }

    println!("\n═══════════════════════════════════════════════════════════");
    println!("  Test Summary");
    println!("═══════════════════════════════════════════════════════════");
    println!("  ✅ Passed:  {}", passed);
    println!("  ❌ Failed:  {}", failed);
    println!("  📊 Total:   {}", passed + failed);
    println!("═══════════════════════════════════════════════════════════\n");

    if failed > 0 {
        panic!("{} test(s) failed", failed);
    }
}
