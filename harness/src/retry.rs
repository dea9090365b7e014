//! Bounded retry around remote calls
//!
//! Every call runs once; when it fails and its kind is covered by the
//! policy, the wrapper sleeps and tries again until `max_attempts` is used
//! up. The last error is returned as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::chain::{ChainClient, CodeId, TxResult};
use crate::error::ChainError;
use crate::msg::Coin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Upload,
    Instantiate,
    Execute,
    Query,
    Balance,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Upload,
        OperationKind::Instantiate,
        OperationKind::Execute,
        OperationKind::Query,
        OperationKind::Balance,
    ];

    /// Whether the call broadcasts a transaction
    pub fn is_write(self) -> bool {
        matches!(
            self,
            OperationKind::Upload | OperationKind::Instantiate | OperationKind::Execute
        )
    }

    /// Pause used when the policy has no explicit delay
    pub fn default_delay(self) -> Duration {
        if self.is_write() {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(10)
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Upload => "upload",
            OperationKind::Instantiate => "instantiate",
            OperationKind::Execute => "execute",
            OperationKind::Query => "query",
            OperationKind::Balance => "balance",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first call included
    pub max_attempts: u32,
    /// Fixed pause between attempts; `None` falls back to the kind's default
    pub delay: Option<Duration>,
    pub applies_to: BTreeSet<OperationKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: None,
            applies_to: OperationKind::ALL.into_iter().collect(),
        }
    }
}

impl RetryPolicy {
    /// Every call runs exactly once
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: None,
            applies_to: BTreeSet::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn applies(&self, kind: OperationKind) -> bool {
        self.applies_to.contains(&kind)
    }

    pub fn attempts_for(&self, kind: OperationKind) -> u32 {
        if self.applies(kind) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    pub fn delay_for(&self, kind: OperationKind) -> Duration {
        self.delay.unwrap_or_else(|| kind.default_delay())
    }

    /// Run `call` under this policy
    pub async fn run<T, F, Fut>(&self, kind: OperationKind, mut call: F) -> Result<T, ChainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        let attempts = self.attempts_for(kind);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_retryable(kind) => {
                    log::warn!(
                        "{} attempt {}/{} failed: {}",
                        kind,
                        attempt,
                        attempts,
                        err
                    );
                    let delay = self.delay_for(kind);
                    log::debug!("sleeping {:?}", delay);
                    tokio::time::sleep(delay).await;
                    log::debug!("awake");
                    attempt += 1;
                }
                Err(err) => {
                    if !err.is_retryable(kind) {
                        log::warn!("{} not retried, it may still be included: {}", kind, err);
                    }
                    return Err(err);
                }
            }
        }
    }
}

/// `ChainClient` decorator that routes every call through a `RetryPolicy`
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: ChainClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<C: ChainClient> ChainClient for RetryingClient<C> {
    fn address(&self) -> &str {
        self.inner.address()
    }

    async fn upload_code(&self, wasm: &Path) -> Result<CodeId, ChainError> {
        self.policy
            .run(OperationKind::Upload, || self.inner.upload_code(wasm))
            .await
    }

    async fn instantiate(
        &self,
        code_id: CodeId,
        msg: &Value,
        label: &str,
        funds: &[Coin],
    ) -> Result<String, ChainError> {
        self.policy
            .run(OperationKind::Instantiate, || {
                self.inner.instantiate(code_id, msg, label, funds)
            })
            .await
    }

    async fn execute(
        &self,
        contract: &str,
        msg: &Value,
        funds: &[Coin],
    ) -> Result<TxResult, ChainError> {
        self.policy
            .run(OperationKind::Execute, || {
                self.inner.execute(contract, msg, funds)
            })
            .await
    }

    async fn query_smart(&self, contract: &str, query: &Value) -> Result<Value, ChainError> {
        self.policy
            .run(OperationKind::Query, || self.inner.query_smart(contract, query))
            .await
    }

    async fn balance(&self, account: &str, denom: &str) -> Result<Coin, ChainError> {
        self.policy
            .run(OperationKind::Balance, || self.inner.balance(account, denom))
            .await
    }
}
