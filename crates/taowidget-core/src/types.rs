//! Core domain types for balance and stake history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Amount in the chain's smallest unit (rao).
pub type Balance = u128;
pub type BlockNumber = u32;

/// Number of rao in one TAO.
pub const RAO_PER_TAO: f64 = 1e9;

/// Display symbol for the chain's native token.
pub const TOKEN_SYMBOL: &str = "TAO";

/// Convert an on-chain amount to TAO for display.
pub fn rao_to_tao(amount: Balance) -> f64 {
    amount as f64 / RAO_PER_TAO
}

/// Subtensor networks with a well-known public endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Main network, pruned nodes.
    Finney,
    /// Main network, archive nodes (keeps historical state).
    #[default]
    Archive,
    /// Public test network.
    Test,
    /// A node running on localhost.
    Local,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Finney => "finney",
            Network::Archive => "archive",
            Network::Test => "test",
            Network::Local => "local",
        }
    }

    /// Whether nodes on this network are expected to serve state for old blocks.
    pub fn keeps_history(&self) -> bool {
        matches!(self, Network::Archive | Network::Local)
    }

    /// Returns all known networks.
    pub fn all() -> &'static [Network] {
        &[
            Network::Finney,
            Network::Archive,
            Network::Test,
            Network::Local,
        ]
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown network '{0}'. Valid options: finney, archive, test, local")]
pub struct UnknownNetwork(pub String);

impl std::str::FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finney" | "main" | "mainnet" => Ok(Network::Finney),
            "archive" => Ok(Network::Archive),
            "test" | "testnet" => Ok(Network::Test),
            "local" | "localhost" => Ok(Network::Local),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

/// Which quantity a sample measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Free (transferable) balance of the coldkey.
    Balance,
    /// Root-network stake held by the coldkey.
    Stake,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Balance => "Free balance",
            Metric::Stake => "Staked",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Balance => write!(f, "balance"),
            Metric::Stake => write!(f, "stake"),
        }
    }
}

/// One metric sampled at one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalData {
    pub block_number: BlockNumber,
    /// Approximate wall-clock time of the block (whole-day offset from now).
    pub timestamp: DateTime<Utc>,
    /// Amount in TAO.
    pub value: f64,
}

impl HistoricalData {
    pub fn new(block_number: BlockNumber, timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            block_number,
            timestamp,
            value,
        }
    }
}

/// Balance and stake merged for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyData {
    /// Start of the day (00:00:00 UTC).
    pub date: DateTime<Utc>,
    pub balance: f64,
    pub stake: f64,
}

impl DailyData {
    /// Free balance plus stake.
    pub fn total(&self) -> f64 {
        self.balance + self.stake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_rao_to_tao() {
        assert_relative_eq!(rao_to_tao(1_000_000_000), 1.0);
        assert_relative_eq!(rao_to_tao(1_500_000_000), 1.5);
        assert_eq!(rao_to_tao(0), 0.0);
    }

    #[test]
    fn test_rao_to_tao_sub_unit() {
        assert_relative_eq!(rao_to_tao(1), 1e-9);
    }

    #[test]
    fn test_daily_total() {
        let day = DailyData {
            date: Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
            balance: 1.25,
            stake: 10.5,
        };
        assert_relative_eq!(day.total(), 11.75);
    }

    #[test]
    fn test_historical_data_serializes_iso_timestamp() {
        let sample = HistoricalData::new(
            4_200_000,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap(),
            2.5,
        );
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["block_number"], 4_200_000);
        assert_eq!(json["timestamp"], "2025-03-01T12:30:00Z");
        assert_eq!(json["value"], 2.5);
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("archive".parse::<Network>(), Ok(Network::Archive));
        assert_eq!("Finney".parse::<Network>(), Ok(Network::Finney));
        assert_eq!(" testnet ".parse::<Network>(), Ok(Network::Test));
        assert_eq!("localhost".parse::<Network>(), Ok(Network::Local));
        let err = "polkadot".parse::<Network>().unwrap_err();
        assert!(err.to_string().contains("polkadot"));
    }

    #[test]
    fn test_network_roundtrip_names() {
        for network in Network::all() {
            assert_eq!(network.name().parse::<Network>(), Ok(*network));
        }
        assert_eq!(Network::default(), Network::Archive);
        assert!(Network::Archive.keeps_history());
        assert!(!Network::Finney.keeps_history());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Balance.to_string(), "balance");
        assert_eq!(Metric::Stake.to_string(), "stake");
        assert_eq!(Metric::Stake.label(), "Staked");
    }
}
