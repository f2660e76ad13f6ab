//! REST API server for delivery reports
//!
//! Usage:
//!   ./target/release/api_server [--config PATH] [--port PORT] [--input CSV | --url URL]
//!
//! REST endpoints:
//!   GET  /api/v1/health             - Health check
//!   GET  /api/v1/reports            - Base and courier reports plus status mix
//!   GET  /api/v1/reports/bases      - Rate by base (?order=&base=&courier=&city=)
//!   GET  /api/v1/reports/couriers   - Rate by courier
//!   GET  /api/v1/orders             - Annotated orders (?status=&limit=...)
//!   POST /api/v1/reload             - Drop the cached order sheet

use anyhow::{Context, Result};
use clap::Parser;
use delivery_rates::api::{create_router, ReportService};
use delivery_rates::config::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve delivery rate reports over HTTP")]
struct Args {
    /// TOML config file (falls back to DELIVERY_RATES_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides [server].port)
    #[arg(long)]
    port: Option<u16>,

    /// Order sheet as CSV (overrides [source])
    #[arg(long)]
    input: Option<PathBuf>,

    /// Remote CSV export of the order sheet (overrides [source])
    #[arg(long)]
    url: Option<String>,
}

fn print_banner(port: u16, source: &str) {
    println!("============================================================");
    println!("              DELIVERY RATE API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  Source:   {}", source);
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health             Health check");
    println!("  GET  /api/v1/reports            Both reports");
    println!("  GET  /api/v1/reports/bases      Rate by base");
    println!("  GET  /api/v1/reports/couriers   Rate by courier");
    println!("  GET  /api/v1/orders             Annotated orders");
    println!("  POST /api/v1/reload             Refetch order sheet");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("loading config")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.input {
        config.source.path = Some(path);
    } else if let Some(url) = args.url {
        config.source.path = None;
        config.source.url = Some(url);
    }

    let source = config
        .source
        .data_source()
        .map(|s| s.describe())
        .unwrap_or_default();
    print_banner(config.server.port, &source);

    let service = Arc::new(ReportService::new(&config)?);

    // Warm the cache; a failure here is not fatal, requests will retry.
    if let Err(e) = service.dataset().await {
        tracing::warn!("Initial load failed: {}", e);
    }

    let addr: SocketAddr = format!("0.0.0.0:{}", config.server.port).parse()?;
    let app = create_router(service);
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
