//! Chain access
//!
//! `ChainClient` is the seam between the deployment workflow and the node.
//! `CliChainClient` is the production implementation; tests plug in an
//! in-memory chain.

pub mod cli;
pub mod tx;

use serde_json::Value;
use std::path::Path;

use crate::error::ChainError;
use crate::msg::{Coin, Cw20BalanceResponse, Cw20QueryMsg, Uint128};

pub use cli::CliChainClient;
pub use tx::{TxResponse, TxResult};

/// Identifier of uploaded wasm code
pub type CodeId = u64;

/// Signing session bound to one account and one endpoint
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// Bech32 address of the signing account
    fn address(&self) -> &str;

    /// Store a wasm binary, returning its code id
    async fn upload_code(&self, wasm: &Path) -> Result<CodeId, ChainError>;

    /// Instantiate stored code, returning the new contract address
    async fn instantiate(
        &self,
        code_id: CodeId,
        msg: &Value,
        label: &str,
        funds: &[Coin],
    ) -> Result<String, ChainError>;

    async fn execute(
        &self,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
    ) -> Result<TxResult, ChainError>;

    /// Smart query; returns the contract's response body
    async fn query_smart(&self, contract: &str, query: &Value) -> Result<Value, ChainError>;

    /// Bank balance of a native denomination
    async fn balance(&self, account: &str, denom: &str) -> Result<Coin, ChainError>;
}

/// cw20 balance of `account` held in `token_contract`
pub async fn token_balance<C: ChainClient>(
    client: &C,
    account: &str,
    token_contract: &str,
) -> Result<Uint128, ChainError> {
    let query = serde_json::to_value(Cw20QueryMsg::Balance {
        address: account.to_string(),
    })?;
    let response = client.query_smart(token_contract, &query).await?;
    let parsed: Cw20BalanceResponse = serde_json::from_value(response)?;
    Ok(parsed.balance)
}
