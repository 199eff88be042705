//! Subtensor chain access for coldkey history.
//!
//! - [`client`]: the connection trait and its subxt implementation
//! - [`manager`]: per-request connection ownership and recovery
//! - [`queries`]: balance and stake reads at a block
//! - [`sampler`]: history reconstruction over a lookback window

pub mod client;
pub mod config;
pub mod error;
pub mod manager;
pub mod queries;
pub mod sampler;
pub mod ss58;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::*;
pub use config::*;
pub use error::*;
pub use manager::{ConnectionManager, ManagerState};
pub use queries::stake::{ROOT_NETUID, StakeEntry};
pub use sampler::{BlockSampler, DailyReport, SampleReport};
pub use ss58::parse_coldkey;
