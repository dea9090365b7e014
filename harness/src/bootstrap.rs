//! Pool bootstrap and price verification as an explicit step sequence
//!
//! ```text
//! UploadToken -> UploadPool -> Instantiate -> AddLiquidity -> Sample(0)
//!     -> Swap(1) -> Sample(1) -> ... -> Swap(N) -> Sample(N) -> Done
//! ```
//!
//! `advance` runs exactly one step. A failed step leaves the machine where
//! it was, so the caller can inspect it and call `advance` again. Nothing
//! already on chain is rolled back.

use serde::Serialize;
use std::fmt;

use crate::chain::{ChainClient, CodeId};
use crate::config::PoolConfig;
use crate::error::{HarnessError, Result};
use crate::msg::{Coin, Denom, ExecuteMsg, InstantiateMsg, TokenSelect, Uint128};
use crate::prices::{self, PriceSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    UploadToken,
    UploadPool,
    Instantiate,
    AddLiquidity,
    /// Scripted swap, numbered from 1
    Swap(u32),
    /// Price sample after add-liquidity (0) or after swap `n`
    Sample(u32),
    Done,
}

impl Step {
    pub fn next(self, swap_count: u32) -> Step {
        match self {
            Step::UploadToken => Step::UploadPool,
            Step::UploadPool => Step::Instantiate,
            Step::Instantiate => Step::AddLiquidity,
            Step::AddLiquidity => Step::Sample(0),
            Step::Sample(n) if n < swap_count => Step::Swap(n + 1),
            Step::Sample(_) => Step::Done,
            Step::Swap(n) => Step::Sample(n),
            Step::Done => Step::Done,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::UploadToken => write!(f, "upload-token"),
            Step::UploadPool => write!(f, "upload-pool"),
            Step::Instantiate => write!(f, "instantiate"),
            Step::AddLiquidity => write!(f, "add-liquidity"),
            Step::Swap(n) => write!(f, "swap-{}", n),
            Step::Sample(n) => write!(f, "sample-prices-{}", n),
            Step::Done => write!(f, "done"),
        }
    }
}

/// Everything a finished bootstrap produced
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub token_code_id: CodeId,
    pub pool_code_id: CodeId,
    pub pool_address: String,
    pub samples: Vec<PriceSample>,
}

pub struct Bootstrap<'a, C> {
    client: &'a C,
    pool: PoolConfig,
    step: Step,
    token_code_id: Option<CodeId>,
    pool_code_id: Option<CodeId>,
    pool_address: Option<String>,
    samples: Vec<PriceSample>,
}

impl<'a, C: ChainClient> Bootstrap<'a, C> {
    pub fn new(client: &'a C, pool: PoolConfig) -> Self {
        Self {
            client,
            pool,
            step: Step::UploadToken,
            token_code_id: None,
            pool_code_id: None,
            pool_address: None,
            samples: Vec::new(),
        }
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == Step::Done
    }

    pub fn token_code_id(&self) -> Option<CodeId> {
        self.token_code_id
    }

    pub fn pool_code_id(&self) -> Option<CodeId> {
        self.pool_code_id
    }

    pub fn pool_address(&self) -> Option<&str> {
        self.pool_address.as_deref()
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    /// Run the current step; on success move to the next one and return it
    pub async fn advance(&mut self) -> Result<Step> {
        let step = self.step;
        match step {
            Step::UploadToken => self.upload_token().await?,
            Step::UploadPool => self.upload_pool().await?,
            Step::Instantiate => self.instantiate().await?,
            Step::AddLiquidity => self.add_liquidity().await?,
            Step::Swap(_) => self.swap(step).await?,
            Step::Sample(_) => self.sample(step).await?,
            Step::Done => return Ok(Step::Done),
        }

        self.step = step.next(self.pool.swap_count);
        Ok(self.step)
    }

    /// Drive the sequence to `Done`
    pub async fn run(mut self) -> Result<BootstrapReport> {
        while !self.is_done() {
            self.advance().await?;
        }
        self.into_report()
    }

    pub fn into_report(self) -> Result<BootstrapReport> {
        match (self.token_code_id, self.pool_code_id, self.pool_address) {
            (Some(token_code_id), Some(pool_code_id), Some(pool_address)) if self.step == Step::Done => {
                Ok(BootstrapReport {
                    token_code_id,
                    pool_code_id,
                    pool_address,
                    samples: self.samples,
                })
            }
            _ => Err(HarnessError::InvalidStep(self.step)),
        }
    }

    async fn upload_token(&mut self) -> Result<()> {
        log::info!("Uploading cw20 base contract...");
        let code_id = self.client.upload_code(&self.pool.cw20_wasm_path()).await?;
        log::info!("Done! codeId={}", code_id);

        self.token_code_id = Some(code_id);
        Ok(())
    }

    async fn upload_pool(&mut self) -> Result<()> {
        log::info!("Uploading wasmswap pool contract...");
        let code_id = self.client.upload_code(&self.pool.pool_wasm_path()).await?;
        log::info!("Done! codeId={}", code_id);

        self.pool_code_id = Some(code_id);
        Ok(())
    }

    async fn instantiate(&mut self) -> Result<()> {
        let (Some(lp_token_code_id), Some(pool_code_id)) = (self.token_code_id, self.pool_code_id)
        else {
            return Err(HarnessError::InvalidStep(Step::Instantiate));
        };

        log::info!("Instantiating wasmswap pool contract...");
        let msg = serde_json::to_value(InstantiateMsg {
            token1_denom: Denom::Native(self.pool.token1_denom.clone()),
            token2_denom: Denom::Native(self.pool.token2_denom.clone()),
            lp_token_code_id,
        })?;

        let address = self
            .client
            .instantiate(pool_code_id, &msg, &self.pool.label, &[])
            .await?;
        log::info!("Done! pool={}", address);

        self.pool_address = Some(address);
        Ok(())
    }

    async fn add_liquidity(&mut self) -> Result<()> {
        let pool = self.require_pool(Step::AddLiquidity)?;

        let msg = serde_json::to_value(ExecuteMsg::AddLiquidity {
            token1_amount: Uint128::new(self.pool.token1_amount as u128),
            min_liquidity: Uint128::new(self.pool.min_liquidity as u128),
            max_token2: Uint128::new(self.pool.max_token2 as u128),
        })?;
        let funds = [
            Coin::new(self.pool.token1_amount as u128, &self.pool.token1_denom),
            Coin::new(self.pool.max_token2 as u128, &self.pool.token2_denom),
        ];

        log::info!(
            "Adding liquidity: {}, {} (min_liquidity={})",
            funds[0],
            funds[1],
            self.pool.min_liquidity
        );
        let tx = self.client.execute(&pool, &msg, &funds).await?;
        log::info!("Liquidity added in tx {} at height {}", tx.hash, tx.height);
        Ok(())
    }

    async fn swap(&mut self, step: Step) -> Result<()> {
        let pool = self.require_pool(step)?;
        let input_amount = Uint128::new(self.pool.swap_amount as u128);

        match prices::quote_token1_for_token2(self.client, &pool, input_amount).await {
            Ok(quote) => log::info!(
                "{}: {}{} expected to return {}{}",
                step,
                input_amount,
                self.pool.token1_denom,
                quote,
                self.pool.token2_denom
            ),
            Err(e) => log::warn!("{}: price quote unavailable: {}", step, e),
        }

        let msg = serde_json::to_value(ExecuteMsg::Swap {
            input_token: TokenSelect::Token1,
            input_amount,
            min_output: Uint128::new(self.pool.min_output as u128),
        })?;
        let funds = [Coin::new(input_amount.u128(), &self.pool.token1_denom)];

        let tx = self.client.execute(&pool, &msg, &funds).await?;
        log::info!("{} confirmed in tx {}", step, tx.hash);
        Ok(())
    }

    async fn sample(&mut self, step: Step) -> Result<()> {
        let pool = self.require_pool(step)?;
        let sample = prices::sample_prices(
            self.client,
            &pool,
            &self.pool.token1_denom,
            &self.pool.token2_denom,
            step,
        )
        .await?;

        log::info!("{}: twap={}", step, sample.twap);
        log::info!(
            "{}: spot {}={} {}={}",
            step,
            self.pool.token1_denom,
            sample.spot.token1_price,
            self.pool.token2_denom,
            sample.spot.token2_price
        );

        if let (Step::Sample(n), Some(prev)) = (step, self.samples.last()) {
            if n > 0 {
                prices::check_swap_trend(Step::Swap(n), prev, &sample)?;
            }
        }

        self.samples.push(sample);
        Ok(())
    }

    fn require_pool(&self, step: Step) -> Result<String> {
        self.pool_address
            .clone()
            .ok_or(HarnessError::InvalidStep(step))
    }
}
