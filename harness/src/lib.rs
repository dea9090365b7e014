//! TWAP Harness
//!
//! Deploys a wasmswap pool with a TWAP oracle to a CosmWasm chain, drives a
//! scripted series of swaps, and samples the oracle's TWAP next to a spot
//! price computed from the pool's raw balances after every mutation.
//!
//! ## Layout
//!
//! - [`chain`]: `ChainClient` seam and the node-CLI implementation
//! - [`retry`]: bounded retry policy and the `RetryingClient` decorator
//! - [`bootstrap`]: upload / instantiate / add-liquidity / swap steps
//! - [`prices`]: TWAP and spot sampling
//! - [`msg`]: contract message shapes

pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod error;
pub mod msg;
pub mod prices;
pub mod retry;

pub use bootstrap::{Bootstrap, BootstrapReport, Step};
pub use chain::{ChainClient, CliChainClient, CodeId};
pub use config::Config;
pub use error::{ChainError, HarnessError};
pub use prices::{PriceSample, SpotPrice};
pub use retry::{OperationKind, RetryPolicy, RetryingClient};
