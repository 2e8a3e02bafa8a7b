use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatchd::config::DispatcherConfig;
use dispatchd::server::DispatcherServer;
use dispatchd::store::RedisStore;

#[derive(Parser)]
#[command(
    name = "dispatchd",
    version,
    about = "Label-aware task dispatcher for a Redis-coordinated worker pool",
    long_about = None
)]
struct Cli {
    /// Use random dispatching instead of label-aware dispatching
    #[arg(long)]
    random_dispatch: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let mut config = DispatcherConfig::from_env()?;
    if cli.random_dispatch {
        config.random_dispatch = true;
    }
    if config.random_dispatch {
        tracing::warn!("using random dispatch method");
    }

    let store = RedisStore::connect(
        &config.redis_url(),
        config.pool_size,
        config.op_timeout(),
    )
    .await?;

    let server = DispatcherServer::new(config, Arc::new(store))?;

    tracing::info!("starting dispatcher service");
    server.start_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "unable to listen for shutdown signal");
    }
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("dispatchd=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("dispatchd=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
