//! Fetch balance and stake history for a coldkey from a live node.
//!
//! Run with: cargo run -p taowidget-chain --example fetch_history -- COLDKEY [DAYS] [RPC_URL]
//!
//! Examples:
//!   cargo run -p taowidget-chain --example fetch_history -- 5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY
//!   cargo run -p taowidget-chain --example fetch_history -- 5Grwva... 3 ws://127.0.0.1:9944

use futures::FutureExt;
use taowidget_chain::{
    BlockSampler, ChainConfig, ConnectionManager, SubtensorConnector, parse_coldkey,
};
use taowidget_core::{DEFAULT_LOOKBACK_DAYS, Network, format_tao};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = std::env::args().collect();
    let Some(address) = args.get(1) else {
        println!("Usage: fetch_history COLDKEY [DAYS] [RPC_URL]");
        return;
    };
    let days = args
        .get(2)
        .and_then(|d| d.parse().ok())
        .unwrap_or(DEFAULT_LOOKBACK_DAYS);
    let endpoint = args.get(3).cloned();

    let coldkey = match parse_coldkey(address) {
        Ok(coldkey) => coldkey,
        Err(e) => {
            println!("✗ {}", e);
            return;
        }
    };

    let config = ChainConfig::new(Network::Archive, endpoint);
    println!("Using endpoint: {}", config.endpoint_url());

    let mut manager = ConnectionManager::new(SubtensorConnector::new(config));
    let sampler = BlockSampler::new(days);

    let result = manager
        .acquire(move |conn| async move { sampler.daily_history(conn, &coldkey).await }.boxed())
        .await;
    manager.close().await;

    match result {
        Ok(report) => {
            println!("\n{} days, {} blocks skipped\n", report.days.len(), report.skipped);
            for day in &report.days {
                println!(
                    "{}  free {:>20}  staked {:>20}  total {:>20}",
                    day.date.format("%Y-%m-%d"),
                    format_tao(day.balance),
                    format_tao(day.stake),
                    format_tao(day.total())
                );
            }
        }
        Err(e) => println!("\n✗ Failed to fetch history: {}", e),
    }
}
