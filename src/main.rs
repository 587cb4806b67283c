//! hotcfg daemon.
//!
//! Loads a configuration payload, keeps it reloaded on an interval, and logs
//! every snapshot it applies. Useful on its own to watch what a service would
//! see, and as a reference for embedding the registry.
//!
//! ```text
//! hotcfg --config-file ./app.confy --config-url http://sidecar:8500/app.json --interval 5
//! ```

use std::net::SocketAddr;

use clap::Parser;

use hotcfg::observability::{logging, metrics};
use hotcfg::{Registry, Settings, Snapshot};

#[derive(Parser)]
#[command(name = "hotcfg")]
#[command(about = "Watch a hot-reloaded configuration payload", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Serve Prometheus metrics on this address.
    #[arg(long, env = "HOTCFG_METRICS_ADDRESS")]
    metrics_address: Option<SocketAddr>,
}

fn log_snapshot(snapshot: &Snapshot) {
    if snapshot.is_empty() {
        tracing::debug!("Reload finished without changes");
        return;
    }
    tracing::info!(entries = snapshot.len(), "Reload finished");
    for (name, value) in snapshot {
        tracing::info!(name = %name, kind = %value.kind(), value = %value, "Config entry");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_tracing();

    let cli = Cli::parse();
    tracing::info!("hotcfg v{} starting", env!("CARGO_PKG_VERSION"));

    if let Some(addr) = cli.metrics_address {
        metrics::init_metrics(addr);
    }

    tracing::info!(
        file = ?cli.settings.file_path(),
        url = ?cli.settings.url(),
        interval_secs = cli.settings.reload_interval().as_secs(),
        "Settings loaded"
    );

    let registry = Registry::builder(cli.settings)
        .on_reload(log_snapshot)
        .build()?;

    registry.ready().await?;

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    registry.run_until(ctrl_c).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
