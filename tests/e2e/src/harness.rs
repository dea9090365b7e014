//! Test harness for E2E tests against a local node

use anyhow::{Context, Result};
use std::process::Command;
use twap_harness::{ChainClient, CliChainClient, Config, RetryingClient};

use crate::utils::{find_node_binary, workspace_root};

/// Local node reachable over RPC
pub struct LocalNode {
    pub binary: String,
    pub rpc_url: String,
}

impl LocalNode {
    /// Check that a node answers on the configured endpoint
    pub fn connect(config: &Config) -> Result<Self> {
        let binary = if config.chain.binary.contains('/') {
            config.chain.binary.clone()
        } else {
            find_node_binary(&config.chain.binary)
                .to_string_lossy()
                .into_owned()
        };

        println!("Checking node at {}...", config.chain.node);
        let output = Command::new(&binary)
            .args(["status", "--node", &config.chain.node])
            .output()
            .context(format!("Failed to run {}", binary))?;

        if !output.status.success() {
            anyhow::bail!(
                "Node not reachable at {}: {}",
                config.chain.node,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        Ok(Self {
            binary,
            rpc_url: config.chain.node.clone(),
        })
    }
}

/// Test context with a connected deployer
pub struct TestContext {
    pub node: LocalNode,
    pub config: Config,
    pub client: RetryingClient<CliChainClient>,
}

impl TestContext {
    /// Connect to the local node and recover the deployer wallet
    pub async fn new() -> Result<Self> {
        let mut config = Config::load()
            .unwrap_or_else(|_| Config::default_local())
            .apply_env();

        let node = LocalNode::connect(&config)?;
        config.chain.binary = node.binary.clone();

        // Artifacts live under the workspace root
        let root = workspace_root()?;
        let cw20_wasm = root.join(config.pool.cw20_wasm_path());
        let pool_wasm = root.join(config.pool.pool_wasm_path());
        for path in [&cw20_wasm, &pool_wasm] {
            if !path.exists() {
                anyhow::bail!("Contract artifact missing: {}", path.display());
            }
        }
        config.pool.cw20_wasm = cw20_wasm.to_string_lossy().into_owned();
        config.pool.pool_wasm = pool_wasm.to_string_lossy().into_owned();

        let client = CliChainClient::connect(config.chain.clone())
            .await
            .context("Failed to recover deployer wallet")?;
        let client = RetryingClient::new(client, config.retry_policy());

        println!("Deployer: {}", client.address());

        Ok(Self {
            node,
            config,
            client,
        })
    }
}
