//! Error types for the harness
//!
//! `ChainError` covers a single remote call and is what the retry policy
//! sees. `HarnessError` covers the deployment workflow as a whole.

use thiserror::Error;

use crate::bootstrap::Step;
use crate::retry::OperationKind;

/// Failure of one remote call against the chain
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("failed to spawn `{binary}`: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("transaction rejected with code {code}: {raw_log}")]
    TxRejected { code: u32, raw_log: String },

    #[error("transaction {hash} not confirmed after {attempts} polls")]
    TxTimeout { hash: String, attempts: u32 },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("event attribute `{event}.{key}` missing from transaction result")]
    MissingAttribute { event: String, key: String },

    #[error("key `{key_name}` in the keyring is {keyring_address}, but the configured mnemonic derives {mnemonic_address}")]
    KeyMismatch {
        key_name: String,
        keyring_address: String,
        mnemonic_address: String,
    },
}

impl ChainError {
    /// A write whose confirmation timed out may still land, so it is never
    /// broadcast a second time
    pub fn is_retryable(&self, kind: OperationKind) -> bool {
        !(kind.is_write() && matches!(self, ChainError::TxTimeout { .. }))
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Decode(err.to_string())
    }
}

/// Failure of the bootstrap / verification workflow
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A pool balance read as zero, so the spot ratio is undefined
    #[error("pool balance of {denom} is zero, spot price undefined")]
    DivisionByZero { denom: String },

    #[error(
        "reserves did not move as expected after {step}: \
         token1 {prev_token1} -> {token1}, token2 {prev_token2} -> {token2}"
    )]
    UnexpectedReserves {
        step: Step,
        prev_token1: u128,
        token1: u128,
        prev_token2: u128,
        token2: u128,
    },

    #[error("step {0} cannot run before its inputs are available")]
    InvalidStep(Step),
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
