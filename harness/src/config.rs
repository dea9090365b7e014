//! Harness configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{OperationKind, RetryPolicy};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "TWAP_HARNESS_CONFIG";
/// Overrides `chain.mnemonic`
pub const MNEMONIC_ENV: &str = "TWAP_HARNESS_MNEMONIC";
/// Overrides `chain.node`
pub const NODE_ENV: &str = "TWAP_HARNESS_NODE";

/// Recovery phrase of the funded genesis account on a local test node
const LOCAL_TEST_MNEMONIC: &str = "satisfy adjust timber high purchase tuition stool faith fine install that you unaware feed domain license impose boss human eager hat rent enjoy dawn";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub pool: PoolConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Node CLI binary used to sign and broadcast
    pub binary: String,

    /// Tendermint RPC endpoint
    pub node: String,

    pub chain_id: String,

    /// Key name inside the CLI keyring
    pub key_name: String,

    pub keyring_backend: String,

    /// Recovery phrase for the signing account
    pub mnemonic: String,

    /// Gas price per unit, paid in `fee_denom`
    pub gas_price: String,

    pub fee_denom: String,

    pub gas_adjustment: f64,

    /// How many times to poll for a broadcast transaction
    pub tx_poll_attempts: u32,

    pub tx_poll_interval_ms: u64,
}

impl ChainConfig {
    /// Gas price as the CLI expects it, e.g. `0ujunox`
    pub fn gas_prices(&self) -> String {
        format!("{}{}", self.gas_price, self.fee_denom)
    }

    pub fn tx_poll_interval(&self) -> Duration {
        Duration::from_millis(self.tx_poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// cw20 base contract, used as the LP token code
    pub cw20_wasm: String,

    /// wasmswap pool contract
    pub pool_wasm: String,

    pub label: String,

    pub token1_denom: String,

    pub token2_denom: String,

    /// Initial token1 deposit
    pub token1_amount: u64,

    /// Initial token2 deposit, also the slippage bound sent to the pool
    pub max_token2: u64,

    pub min_liquidity: u64,

    /// token1 input per scripted swap
    pub swap_amount: u64,

    pub swap_count: u32,

    pub min_output: u64,
}

impl PoolConfig {
    pub fn cw20_wasm_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.cw20_wasm).as_ref())
    }

    pub fn pool_wasm_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.pool_wasm).as_ref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Pause between attempts; unset uses the per-kind default
    pub delay_ms: Option<u64>,

    pub applies_to: BTreeSet<OperationKind>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay_ms: None,
            applies_to: OperationKind::ALL.into_iter().collect(),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts.max(1),
            delay: config.delay_ms.map(Duration::from_millis),
            applies_to: config.applies_to.clone(),
        }
    }
}

impl Config {
    /// Load configuration from the TOML file named by `TWAP_HARNESS_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| "harness-config.toml".to_string());
        let expanded_path = shellexpand::tilde(&config_path);

        let config_str = std::fs::read_to_string(expanded_path.as_ref())
            .context(format!("Failed to read config file: {}", config_path))?;

        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// Replace the recovery phrase and endpoint from the environment when set
    pub fn apply_env(mut self) -> Self {
        if let Ok(mnemonic) = std::env::var(MNEMONIC_ENV) {
            self.chain.mnemonic = mnemonic;
        }
        if let Ok(node) = std::env::var(NODE_ENV) {
            self.chain.node = node;
        }
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    /// Local single-node test chain with the stock wasmswap scenario
    pub fn default_local() -> Self {
        Self {
            chain: ChainConfig {
                binary: "junod".to_string(),
                node: "http://localhost:26657/".to_string(),
                chain_id: "testing".to_string(),
                key_name: "twap-deployer".to_string(),
                keyring_backend: "test".to_string(),
                mnemonic: LOCAL_TEST_MNEMONIC.to_string(),
                gas_price: "0".to_string(),
                fee_denom: "ujunox".to_string(),
                gas_adjustment: 1.3,
                tx_poll_attempts: 30,
                tx_poll_interval_ms: 500,
            },
            pool: PoolConfig {
                cw20_wasm: "artifacts/cw20_base.wasm".to_string(),
                pool_wasm: "artifacts/wasmswap.wasm".to_string(),
                label: "wasmswap".to_string(),
                token1_denom: "ujunox".to_string(),
                token2_denom: "umockusdc".to_string(),
                token1_amount: 500_000,
                max_token2: 10_000_000,
                min_liquidity: 0,
                swap_amount: 5_000,
                swap_count: 3,
                min_output: 0,
            },
            retry: RetryConfig::default(),
        }
    }
}
