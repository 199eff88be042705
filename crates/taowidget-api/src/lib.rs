//! HTTP API serving coldkey balance and stake history from Subtensor.
//!
//! - [`routes`]: JSON and chart endpoints under `/api/v1`
//! - [`chart`]: PNG rendering of the daily series
//! - [`timing`]: `x-process-time` middleware
//! - [`config`]: command line and environment settings

pub mod chart;
pub mod config;
pub mod error;
pub mod routes;
pub mod timing;

pub use config::Args;
pub use error::ApiError;
pub use routes::{API_PREFIX, AppState, HistoryQuery, SKIPPED_BLOCKS_HEADER, router};
pub use timing::PROCESS_TIME_HEADER;
