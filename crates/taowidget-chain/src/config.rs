//! Network configuration for chain connections.
//!
//! Historical balance and stake queries pin state to old block hashes, which
//! only archive nodes keep. Pruned endpoints (`finney`, `test`) answer for
//! recent blocks only.

use taowidget_core::Network;

/// Public WebSocket endpoint for a network.
pub fn get_rpc_endpoint(network: Network) -> &'static str {
    match network {
        Network::Finney => "wss://entrypoint-finney.opentensor.ai:443",
        Network::Archive => "wss://archive.chain.opentensor.ai:443",
        Network::Test => "wss://test.finney.opentensor.ai:443",
        Network::Local => "ws://127.0.0.1:9944",
    }
}

/// Where and how to connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainConfig {
    pub network: Network,
    /// Custom endpoint URL, overrides the network's public endpoint.
    pub endpoint: Option<String>,
}

impl ChainConfig {
    pub fn new(network: Network, endpoint: Option<String>) -> Self {
        Self { network, endpoint }
    }

    /// URL actually dialled.
    pub fn endpoint_url(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| get_rpc_endpoint(self.network))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_archive() {
        let config = ChainConfig::default();
        assert_eq!(config.network, Network::Archive);
        assert_eq!(
            config.endpoint_url(),
            "wss://archive.chain.opentensor.ai:443"
        );
    }

    #[test]
    fn test_custom_endpoint_wins() {
        let config = ChainConfig::new(Network::Finney, Some("ws://10.0.0.5:9944".into()));
        assert_eq!(config.endpoint_url(), "ws://10.0.0.5:9944");
    }

    #[test]
    fn test_every_network_has_websocket_endpoint() {
        for network in Network::all() {
            let url = get_rpc_endpoint(*network);
            assert!(url.starts_with("ws://") || url.starts_with("wss://"), "{url}");
        }
    }
}
