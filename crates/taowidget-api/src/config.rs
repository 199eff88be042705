//! Command line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use taowidget_chain::ChainConfig;
use taowidget_core::Network;

/// Coldkey balance and stake history over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "taowidget", author, version, about, long_about = None)]
pub struct Args {
    /// Network to read history from (finney, archive, test, local)
    #[arg(short, long, env = "SUBTENSOR_NETWORK", default_value = "archive")]
    pub network: Network,

    /// Custom RPC endpoint, overriding the network's default node
    #[arg(long, env = "SUBTENSOR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8001)]
    pub port: u16,

    /// TrueType font for chart text, replacing the bundled DejaVu Sans
    #[arg(long, env = "TAOWIDGET_CHART_FONT")]
    pub chart_font: Option<PathBuf>,
}

impl Args {
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig::new(self.network, self.endpoint.clone())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let args = Args::try_parse_from([
            "taowidget",
            "--network",
            "finney",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(args.network, Network::Finney);
        assert_eq!(args.socket_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_custom_endpoint_overrides_network() {
        let args = Args::try_parse_from([
            "taowidget",
            "--network",
            "local",
            "--endpoint",
            "ws://10.0.0.5:9944",
        ])
        .unwrap();
        let config = args.chain_config();
        assert_eq!(config.network, Network::Local);
        assert_eq!(config.endpoint_url(), "ws://10.0.0.5:9944");
    }

    #[test]
    fn test_chart_font_override() {
        let args =
            Args::try_parse_from(["taowidget", "--chart-font", "/opt/fonts/Inter.ttf"]).unwrap();
        assert_eq!(args.chart_font, Some(PathBuf::from("/opt/fonts/Inter.ttf")));
    }

    #[test]
    fn test_network_aliases() {
        let args = Args::try_parse_from(["taowidget", "-n", "mainnet"]).unwrap();
        assert_eq!(args.network, Network::Finney);
    }

    #[test]
    fn test_unknown_network_rejected() {
        let result = Args::try_parse_from(["taowidget", "--network", "kusama"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Args::try_parse_from(["taowidget", "--port", "70000"]);
        assert!(result.is_err());
    }
}
