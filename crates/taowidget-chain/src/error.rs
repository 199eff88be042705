//! Error types for chain operations.

use taowidget_core::BlockNumber;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Failed to connect to chain: {0}")]
    Connection(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Block {0} not found")]
    BlockNotFound(BlockNumber),

    #[error("Storage query failed: {0}")]
    Storage(String),

    #[error("Runtime API call failed: {0}")]
    RuntimeApi(String),

    #[error("Subxt error: {0}")]
    Subxt(#[from] subxt::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] subxt::error::DecodeError),

    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
