//! Server binary for pdfrelay.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to a `ServiceConfig` and runs the service.

use anyhow::{Context, Result};
use clap::Parser;
use pdfrelay::{api, ServiceConfig, WebhookTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdfrelay", version, about = "PDF-to-anything relay service")]
struct Args {
    /// Address to bind the HTTP intake to.
    #[arg(long, env = "PDFRELAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the HTTP intake to.
    #[arg(long, env = "PDFRELAY_PORT", default_value_t = 8080)]
    port: u16,

    /// Outbound webhook endpoint chat messages are delivered to.
    #[arg(long, env = "PDFRELAY_WEBHOOK_URL")]
    webhook_url: String,

    /// Directory for uploaded sources. Defaults to $TMPDIR/pdfrelay.
    #[arg(long, env = "PDFRELAY_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Capacity of the background task queue.
    #[arg(long, default_value_t = 64)]
    queue_capacity: usize,

    /// Pages per chat-replay batch.
    #[arg(long, default_value_t = 30)]
    page_batch_size: usize,

    /// Delay between consecutive chat messages, in milliseconds.
    #[arg(long, default_value_t = 50)]
    send_pacing_ms: u64,

    /// Maximum accepted upload size, in megabytes.
    #[arg(long, default_value_t = 50)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut builder = ServiceConfig::builder()
        .bind_host(&args.host)
        .bind_port(args.port)
        .queue_capacity(args.queue_capacity)
        .page_batch_size(args.page_batch_size)
        .send_pacing_ms(args.send_pacing_ms)
        .max_upload_bytes(args.max_upload_mb * 1024 * 1024);
    if let Some(dir) = args.storage_dir {
        builder = builder.storage_dir(dir);
    }
    let config = builder.build().context("invalid configuration")?;

    let transport = Arc::new(WebhookTransport::new(&args.webhook_url));

    info!(
        "starting pdfrelay on {} (outbound: {})",
        config.bind_addr(),
        args.webhook_url
    );

    api::serve(config, transport)
        .await
        .context("server terminated")?;

    Ok(())
}
