//! Webhook receiver.
//!
//! Receives alert webhooks over HTTP(S) and logs them.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                  WEBHOOK RECEIVER                     │
//!                    │                                                       │
//!   POST /webhook    │  ┌─────────┐    ┌─────────┐    ┌──────────────────┐  │
//!   ─────────────────┼─▶│   net   │───▶│  http   │───▶│ webhook handler  │  │
//!                    │  │ (TLS?)  │    │ router  │    │  (per endpoint)  │  │
//!                    │  └─────────┘    └─────────┘    └────────┬─────────┘  │
//!                    │                                         │            │
//!                    │                                         ▼            │
//!   200 {"status":   │                             ┌──────────────────────┐ │
//!        "ok"}       │                             │ security: client IP, │ │
//!   ◀────────────────┼─────────────────────────────│ allow-list, body cap │ │
//!                    │                             └──────────────────────┘ │
//!                    │                                                       │
//!                    │  ┌─────────┐  ┌───────────────┐  ┌───────────────┐   │
//!                    │  │ config  │  │ observability │  │   lifecycle   │   │
//!                    │  └─────────┘  └───────────────┘  └───────────────┘   │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use webhook_receiver::config::ConfigLoader;
use webhook_receiver::http::WebhookServer;
use webhook_receiver::lifecycle::shutdown_signal;
use webhook_receiver::observability::logging::{init_logging, LogFormat};
use webhook_receiver::observability::metrics::init_metrics;

#[derive(Parser)]
#[command(name = "webhook-receiver")]
#[command(about = "Receives alert webhooks and logs them", long_about = None)]
struct Cli {
    /// Config file (overrides CONFIG_PATH and the default search list).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    tracing::info!("webhook-receiver v{} starting", env!("CARGO_PKG_VERSION"));

    let mut loader = ConfigLoader::from_process_env();
    if let Some(path) = cli.config {
        loader = loader.with_config_path(path);
    }

    let loaded = match loader.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(
                "Failed to load config from {}: {}",
                loader.config_path().display(),
                e
            );
            return Err(e.into());
        }
    };

    if loaded.file_found {
        tracing::info!(path = %loaded.path.display(), "Loaded config");
    } else {
        tracing::info!(
            path = %loaded.path.display(),
            "Config file not found, using defaults and environment overrides"
        );
    }

    let config = loaded.config;
    tracing::info!(
        port = %config.port,
        endpoints = config.endpoints.len(),
        max_body_bytes = config.max_body_bytes,
        log_headers = config.log_headers,
        log_body = config.log_body,
        https = config.https_enabled,
        "Configuration loaded"
    );

    if let Some(address) = &config.metrics_address {
        match address.parse() {
            Ok(addr) => init_metrics(addr)?,
            Err(_) => {
                tracing::error!(metrics_address = %address, "Failed to parse metrics address");
            }
        }
    }

    let server = WebhookServer::new(&config)?;
    let listener = TcpListener::bind(server.address()).await?;

    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
