//! `ChainClient` backed by the chain's node CLI (`junod`)

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::tx::{TxResponse, TxResult};
use super::{ChainClient, CodeId};
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::msg::Coin;

pub struct CliChainClient {
    config: ChainConfig,
    address: String,
}

impl CliChainClient {
    /// Recover the signing key from the configured mnemonic and bind to it
    ///
    /// An existing key under `key_name` is reused only when it belongs to the
    /// mnemonic; a key left behind by a different mnemonic is an error.
    pub async fn connect(config: ChainConfig) -> Result<Self, ChainError> {
        let derived = mnemonic_address(&config).await?;

        let address = match show_address(&config).await {
            Ok(address) => {
                log::debug!("Reusing key '{}' from keyring", config.key_name);
                address
            }
            Err(_) => {
                log::info!("Recovering key '{}' from mnemonic", config.key_name);
                recover_key(&config).await?;
                show_address(&config).await?
            }
        };

        let address = check_key(&config.key_name, address, &derived)?;
        Ok(Self { config, address })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Sign and broadcast `args`, then wait for the block containing it
    async fn broadcast(&self, mut args: Vec<String>) -> Result<TxResponse, ChainError> {
        args.extend([
            "--from".to_string(),
            self.config.key_name.clone(),
            "--chain-id".to_string(),
            self.config.chain_id.clone(),
            "--node".to_string(),
            self.config.node.clone(),
            "--keyring-backend".to_string(),
            self.config.keyring_backend.clone(),
            "--gas".to_string(),
            "auto".to_string(),
            "--gas-adjustment".to_string(),
            self.config.gas_adjustment.to_string(),
            "--gas-prices".to_string(),
            self.config.gas_prices(),
            "--broadcast-mode".to_string(),
            "sync".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "-y".to_string(),
        ]);

        let stdout = run_cli(&self.config.binary, &args, None).await?;
        let submitted = TxResponse::parse(&stdout)?.check()?;
        log::debug!("Broadcast tx {}", submitted.txhash);

        self.await_tx(&submitted.txhash).await
    }

    async fn await_tx(&self, hash: &str) -> Result<TxResponse, ChainError> {
        let args = vec![
            "query".to_string(),
            "tx".to_string(),
            hash.to_string(),
            "--node".to_string(),
            self.config.node.clone(),
            "--output".to_string(),
            "json".to_string(),
        ];

        for _ in 0..self.config.tx_poll_attempts {
            tokio::time::sleep(self.config.tx_poll_interval()).await;

            // Not found until the tx lands in a block
            if let Ok(stdout) = run_cli(&self.config.binary, &args, None).await {
                return TxResponse::parse(&stdout)?.check();
            }
        }

        Err(ChainError::TxTimeout {
            hash: hash.to_string(),
            attempts: self.config.tx_poll_attempts,
        })
    }

    fn query_args(&self, mut args: Vec<String>) -> Vec<String> {
        args.extend([
            "--node".to_string(),
            self.config.node.clone(),
            "--output".to_string(),
            "json".to_string(),
        ]);
        args
    }
}

impl ChainClient for CliChainClient {
    fn address(&self) -> &str {
        &self.address
    }

    async fn upload_code(&self, wasm: &Path) -> Result<CodeId, ChainError> {
        log::debug!("Storing {}", wasm.display());
        let tx = self
            .broadcast(vec![
                "tx".to_string(),
                "wasm".to_string(),
                "store".to_string(),
                wasm.display().to_string(),
            ])
            .await?;

        let code_id = tx.require_attribute("store_code", "code_id")?;
        code_id
            .parse()
            .map_err(|_| ChainError::Decode(format!("code_id '{}' is not an integer", code_id)))
    }

    async fn instantiate(
        &self,
        code_id: CodeId,
        msg: &Value,
        label: &str,
        funds: &[Coin],
    ) -> Result<String, ChainError> {
        let mut args = vec![
            "tx".to_string(),
            "wasm".to_string(),
            "instantiate".to_string(),
            code_id.to_string(),
            msg.to_string(),
            "--label".to_string(),
            label.to_string(),
            "--no-admin".to_string(),
        ];
        push_funds(&mut args, funds);

        let tx = self.broadcast(args).await?;
        Ok(tx
            .require_attribute("instantiate", "_contract_address")?
            .to_string())
    }

    async fn execute(
        &self,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
    ) -> Result<TxResult, ChainError> {
        let mut args = vec![
            "tx".to_string(),
            "wasm".to_string(),
            "execute".to_string(),
            contract.to_string(),
            msg.to_string(),
        ];
        push_funds(&mut args, funds);

        let tx = self.broadcast(args).await?;
        Ok(tx.result())
    }

    async fn query_smart(&self, contract: &str, query: &Value) -> Result<Value, ChainError> {
        let args = self.query_args(vec![
            "query".to_string(),
            "wasm".to_string(),
            "contract-state".to_string(),
            "smart".to_string(),
            contract.to_string(),
            query.to_string(),
        ]);

        let stdout = run_cli(&self.config.binary, &args, None).await?;
        parse_smart_query(&stdout)
    }

    async fn balance(&self, account: &str, denom: &str) -> Result<Coin, ChainError> {
        let args = self.query_args(vec![
            "query".to_string(),
            "bank".to_string(),
            "balances".to_string(),
            account.to_string(),
            "--denom".to_string(),
            denom.to_string(),
        ]);

        let stdout = run_cli(&self.config.binary, &args, None).await?;
        parse_balance(&stdout, denom)
    }
}

async fn show_address(config: &ChainConfig) -> Result<String, ChainError> {
    let args = vec![
        "keys".to_string(),
        "show".to_string(),
        config.key_name.clone(),
        "-a".to_string(),
        "--keyring-backend".to_string(),
        config.keyring_backend.clone(),
    ];
    let stdout = run_cli(&config.binary, &args, None).await?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

#[derive(Deserialize)]
struct KeyOutput {
    address: String,
}

/// Address the configured mnemonic derives, without touching the keyring
async fn mnemonic_address(config: &ChainConfig) -> Result<String, ChainError> {
    let args = vec![
        "keys".to_string(),
        "add".to_string(),
        config.key_name.clone(),
        "--recover".to_string(),
        "--dry-run".to_string(),
        "--keyring-backend".to_string(),
        config.keyring_backend.clone(),
        "--output".to_string(),
        "json".to_string(),
    ];
    let mnemonic = format!("{}\n", config.mnemonic.trim());
    let stdout = run_cli(&config.binary, &args, Some(&mnemonic)).await?;
    let key: KeyOutput = serde_json::from_slice(&stdout)?;
    Ok(key.address)
}

fn check_key(key_name: &str, keyring_address: String, derived: &str) -> Result<String, ChainError> {
    if keyring_address != derived {
        return Err(ChainError::KeyMismatch {
            key_name: key_name.to_string(),
            keyring_address,
            mnemonic_address: derived.to_string(),
        });
    }
    Ok(keyring_address)
}

async fn recover_key(config: &ChainConfig) -> Result<(), ChainError> {
    let args = vec![
        "keys".to_string(),
        "add".to_string(),
        config.key_name.clone(),
        "--recover".to_string(),
        "--keyring-backend".to_string(),
        config.keyring_backend.clone(),
        "--output".to_string(),
        "json".to_string(),
    ];
    let mnemonic = format!("{}\n", config.mnemonic.trim());
    run_cli(&config.binary, &args, Some(&mnemonic)).await?;
    Ok(())
}

/// Run the CLI and return stdout, failing on a non-zero exit status
async fn run_cli(binary: &str, args: &[String], stdin: Option<&str>) -> Result<Vec<u8>, ChainError> {
    log::debug!("{} {}", binary, args.join(" "));

    let mut child = Command::new(binary)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ChainError::Spawn {
            binary: binary.to_string(),
            source,
        })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        pipe.write_all(input.as_bytes())
            .await
            .map_err(|source| ChainError::Spawn {
                binary: binary.to_string(),
                source,
            })?;
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|source| ChainError::Spawn {
            binary: binary.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ChainError::Command {
            command: format!("{} {}", binary, args.first().map(String::as_str).unwrap_or("")),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// `--amount` takes a comma-separated list sorted by denom
fn push_funds(args: &mut Vec<String>, funds: &[Coin]) {
    if funds.is_empty() {
        return;
    }
    let mut sorted: Vec<&Coin> = funds.iter().collect();
    sorted.sort_by(|a, b| a.denom.cmp(&b.denom));

    args.push("--amount".to_string());
    args.push(
        sorted
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
}

fn parse_smart_query(stdout: &[u8]) -> Result<Value, ChainError> {
    #[derive(Deserialize)]
    struct SmartQueryOutput {
        data: Value,
    }

    let parsed: SmartQueryOutput = serde_json::from_slice(stdout)?;
    Ok(parsed.data)
}

fn parse_balance(stdout: &[u8], denom: &str) -> Result<Coin, ChainError> {
    // Older CLIs print the coin itself, newer ones wrap it in `balance`
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BalanceOutput {
        Wrapped { balance: Coin },
        Bare(Coin),
    }

    let coin = match serde_json::from_slice(stdout)? {
        BalanceOutput::Wrapped { balance } => balance,
        BalanceOutput::Bare(coin) => coin,
    };

    // Unknown denoms come back empty rather than as an error
    if coin.denom.is_empty() {
        return Ok(Coin::new(0, denom));
    }
    Ok(coin)
}
