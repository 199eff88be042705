//! Chain client abstraction using subxt.
//!
//! Everything above this module talks to the chain through the
//! [`ChainConnection`] trait: four point-in-time primitives that cover what
//! history sampling needs. [`SubtensorClient`] implements them over a
//! WebSocket RPC connection; [`Connector`] is how the connection manager
//! creates fresh connections.

use crate::config::ChainConfig;
use crate::error::ChainError;
use async_trait::async_trait;
use taowidget_core::{BlockNumber, Network};

use subxt::backend::rpc::RpcClient;
use subxt::dynamic::{DecodedValueThunk, Value};
use subxt::utils::H256;
use subxt::{OnlineClient, PolkadotConfig};

/// Hash pinning a query to the chain state at one block.
pub type BlockHash = H256;

/// Point-in-time access to a chain node.
#[async_trait]
pub trait ChainConnection: Send + Sync {
    /// Number of the latest finalized block.
    async fn current_block(&self) -> Result<BlockNumber, ChainError>;

    /// Hash of the block at `block` height.
    async fn block_hash(&self, block: BlockNumber) -> Result<BlockHash, ChainError>;

    /// Read a storage entry as it was at block `at`.
    /// Returns `None` when the entry does not exist.
    async fn query_storage(
        &self,
        pallet: &str,
        entry: &str,
        keys: Vec<Value>,
        at: BlockHash,
    ) -> Result<Option<Value<u32>>, ChainError>;

    /// Call a runtime API method against the state at block `at`.
    async fn runtime_call(
        &self,
        api: &str,
        method: &str,
        args: Vec<Value>,
        at: BlockHash,
    ) -> Result<Value<u32>, ChainError>;

    /// Release the underlying session.
    async fn close(&mut self) -> Result<(), ChainError> {
        Ok(())
    }
}

/// Creates initialized connections on demand.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: ChainConnection + 'static;

    async fn connect(&self) -> Result<Self::Connection, ChainError>;
}

/// WebSocket RPC connection to a Subtensor node.
pub struct SubtensorClient {
    network: Network,
    endpoint: String,
    rpc: RpcClient,
    client: OnlineClient<PolkadotConfig>,
}

impl SubtensorClient {
    /// Connect to the configured endpoint and download runtime metadata.
    pub async fn connect(config: &ChainConfig) -> Result<Self, ChainError> {
        let network = config.network;
        let endpoint = config.endpoint_url().to_string();
        tracing::info!("Connecting to {} via {}", network, endpoint);

        let rpc = RpcClient::from_url(&endpoint)
            .await
            .map_err(|e| ChainError::Connection(format!("{}: {}", endpoint, e)))?;

        let client = OnlineClient::<PolkadotConfig>::from_rpc_client(rpc.clone())
            .await
            .map_err(|e| ChainError::Connection(format!("{}: {}", endpoint, e)))?;

        // Log chain name to verify we reached the expected node
        if let Ok(name) = rpc
            .request::<String>("system_chain", subxt::rpc_params![])
            .await
        {
            tracing::info!("Chain reported name: {}", name);
        }

        tracing::info!(
            "Connected to {} via {} (spec_version: {})",
            network,
            endpoint,
            client.runtime_version().spec_version
        );

        Ok(Self {
            network,
            endpoint,
            rpc,
            client,
        })
    }

    /// Get the connected network.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Get the endpoint URL this client dialled.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the underlying subxt client.
    pub fn client(&self) -> &OnlineClient<PolkadotConfig> {
        &self.client
    }
}

#[async_trait]
impl ChainConnection for SubtensorClient {
    async fn current_block(&self) -> Result<BlockNumber, ChainError> {
        let block = self.client.blocks().at_latest().await?;
        Ok(block.number())
    }

    async fn block_hash(&self, block: BlockNumber) -> Result<BlockHash, ChainError> {
        let hash = self
            .rpc
            .request::<Option<BlockHash>>("chain_getBlockHash", subxt::rpc_params![block])
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        hash.ok_or(ChainError::BlockNotFound(block))
    }

    async fn query_storage(
        &self,
        pallet: &str,
        entry: &str,
        keys: Vec<Value>,
        at: BlockHash,
    ) -> Result<Option<Value<u32>>, ChainError> {
        let storage_query = subxt::dynamic::storage(pallet, entry, keys);

        let result: Option<DecodedValueThunk> = self
            .client
            .storage()
            .at(at)
            .fetch(&storage_query)
            .await
            .map_err(|e| ChainError::Storage(format!("{}::{}: {}", pallet, entry, e)))?;

        match result {
            Some(value) => Ok(Some(value.to_value()?)),
            None => Ok(None),
        }
    }

    async fn runtime_call(
        &self,
        api: &str,
        method: &str,
        args: Vec<Value>,
        at: BlockHash,
    ) -> Result<Value<u32>, ChainError> {
        let payload = subxt::dynamic::runtime_api_call(api, method, args);

        let result: DecodedValueThunk = self
            .client
            .runtime_api()
            .at(at)
            .call(payload)
            .await
            .map_err(|e| ChainError::RuntimeApi(format!("{}_{}: {}", api, method, e)))?;

        Ok(result.to_value()?)
    }

    async fn close(&mut self) -> Result<(), ChainError> {
        // The WebSocket is torn down when the last handle to it is dropped
        tracing::debug!("Closing connection to {}", self.endpoint);
        Ok(())
    }
}

/// Connects [`SubtensorClient`]s from a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SubtensorConnector {
    config: ChainConfig,
}

impl SubtensorConnector {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

#[async_trait]
impl Connector for SubtensorConnector {
    type Connection = SubtensorClient;

    async fn connect(&self) -> Result<SubtensorClient, ChainError> {
        SubtensorClient::connect(&self.config).await
    }
}
