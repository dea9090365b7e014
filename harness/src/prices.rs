//! Price sampling
//!
//! After every pool mutation the harness records two independently
//! derived prices:
//!
//! - the pool's own TWAP oracle (`twap_prices {}`), taken verbatim
//! - a spot price recomputed from the pool's raw bank balances
//!
//! The two are not expected to agree. TWAP averages over earlier blocks and
//! lags the spot price.

use serde::Serialize;
use serde_json::Value;

use crate::bootstrap::Step;
use crate::chain::ChainClient;
use crate::error::{HarnessError, Result};
use crate::msg::{Coin, QueryMsg, Token1ForToken2PriceResponse, Uint128};

/// Instantaneous price implied by pool balances
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpotPrice {
    /// token1 priced in token2 (`token2 / token1`)
    pub token1_price: f64,
    /// token2 priced in token1 (`token1 / token2`)
    pub token2_price: f64,
}

impl SpotPrice {
    /// Fails instead of producing a non-finite price when a balance is zero
    pub fn from_balances(token1: &Coin, token2: &Coin) -> Result<Self> {
        for coin in [token1, token2] {
            if coin.amount.is_zero() {
                return Err(HarnessError::DivisionByZero {
                    denom: coin.denom.clone(),
                });
            }
        }

        let a = token1.amount.u128() as f64;
        let b = token2.amount.u128() as f64;

        Ok(Self {
            token1_price: b / a,
            token2_price: a / b,
        })
    }
}

/// Both prices observed at one step boundary
#[derive(Debug, Clone, Serialize)]
pub struct PriceSample {
    pub step: Step,
    pub token1_reserve: Coin,
    pub token2_reserve: Coin,
    pub spot: SpotPrice,
    pub twap: Value,
}

/// Oracle TWAP as returned by the pool
pub async fn query_twap<C: ChainClient>(client: &C, pool: &str) -> Result<Value> {
    let query = serde_json::to_value(QueryMsg::TwapPrices {})?;
    Ok(client.query_smart(pool, &query).await?)
}

/// Read both pool balances and derive the spot price
pub async fn query_spot<C: ChainClient>(
    client: &C,
    pool: &str,
    token1_denom: &str,
    token2_denom: &str,
) -> Result<(Coin, Coin, SpotPrice)> {
    let token1 = client.balance(pool, token1_denom).await?;
    let token2 = client.balance(pool, token2_denom).await?;
    let spot = SpotPrice::from_balances(&token1, &token2)?;
    Ok((token1, token2, spot))
}

pub async fn sample_prices<C: ChainClient>(
    client: &C,
    pool: &str,
    token1_denom: &str,
    token2_denom: &str,
    step: Step,
) -> Result<PriceSample> {
    let twap = query_twap(client, pool).await?;
    let (token1_reserve, token2_reserve, spot) =
        query_spot(client, pool, token1_denom, token2_denom).await?;

    Ok(PriceSample {
        step,
        token1_reserve,
        token2_reserve,
        spot,
        twap,
    })
}

/// Expected token2 output for a token1 input at current reserves
pub async fn quote_token1_for_token2<C: ChainClient>(
    client: &C,
    pool: &str,
    token1_amount: Uint128,
) -> Result<Uint128> {
    let query = serde_json::to_value(QueryMsg::Token1ForToken2Price { token1_amount })?;
    let response = client.query_smart(pool, &query).await?;
    let parsed: Token1ForToken2PriceResponse = serde_json::from_value(response)?;
    Ok(parsed.token2_amount)
}

/// A token1 -> token2 swap must grow token1 reserves and shrink token2
pub fn check_swap_trend(step: Step, prev: &PriceSample, next: &PriceSample) -> Result<()> {
    let prev_token1 = prev.token1_reserve.amount.u128();
    let prev_token2 = prev.token2_reserve.amount.u128();
    let token1 = next.token1_reserve.amount.u128();
    let token2 = next.token2_reserve.amount.u128();

    if token1 > prev_token1 && token2 < prev_token2 {
        return Ok(());
    }

    Err(HarnessError::UnexpectedReserves {
        step,
        prev_token1,
        token1,
        prev_token2,
        token2,
    })
}
