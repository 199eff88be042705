//! TaoWidget API - coldkey balance and stake history over HTTP.

use clap::Parser;
use color_eyre::Result;
use taowidget_api::{Args, chart, router};
use taowidget_chain::SubtensorConnector;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    color_eyre::install()?;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("taowidget=info".parse()?)
        .add_directive("taowidget_api=info".parse()?)
        .add_directive("taowidget_chain=info".parse()?)
        .add_directive("tower_http=info".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    chart::register_embedded_font()?;
    if let Some(path) = &args.chart_font {
        match chart::register_font(path) {
            Ok(()) => tracing::info!("Chart font: {}", path.display()),
            Err(e) => tracing::warn!("Keeping bundled chart font: {}", e),
        }
    }

    let chain_config = args.chain_config();
    tracing::info!(
        "Reading {} history from {}",
        chain_config.network,
        chain_config.endpoint_url()
    );
    if !chain_config.network.keeps_history() && chain_config.endpoint.is_none() {
        tracing::warn!(
            "{} nodes prune old state, history older than a few hours may be missing",
            chain_config.network
        );
    }

    let app = router(SubtensorConnector::new(chain_config));

    let addr = args.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
