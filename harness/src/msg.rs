//! Contract messages
//!
//! JSON shapes accepted by the wasmswap pool. Amounts, coins and the cw20
//! query come from `cosmwasm-std` and `cw20`; field names are fixed by the
//! contracts and must match exactly.

use cosmwasm_schema::cw_serde;
use cosmwasm_schema::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use cosmwasm_std::{Coin, Uint128};
pub use cw20::{BalanceResponse as Cw20BalanceResponse, Cw20QueryMsg, Denom};

#[cw_serde]
pub struct InstantiateMsg {
    pub token1_denom: Denom,
    pub token2_denom: Denom,
    pub lp_token_code_id: u64,
}

/// Deployed pool builds take the variant name as written (`"Token1"`),
/// so this stays outside `cw_serde` and its snake_case renaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[schemars(crate = "::cosmwasm_schema::schemars")]
pub enum TokenSelect {
    Token1,
    Token2,
}

#[cw_serde]
pub enum ExecuteMsg {
    AddLiquidity {
        token1_amount: Uint128,
        min_liquidity: Uint128,
        max_token2: Uint128,
    },
    Swap {
        input_token: TokenSelect,
        input_amount: Uint128,
        min_output: Uint128,
    },
}

#[cw_serde]
pub enum QueryMsg {
    TwapPrices {},
    Token1ForToken2Price { token1_amount: Uint128 },
}

#[cw_serde]
pub struct Token1ForToken2PriceResponse {
    pub token2_amount: Uint128,
}
