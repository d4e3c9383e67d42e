use anyhow::Result;
use clap::Parser;
use server::{router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve vehicle recommendations over HTTP.
#[derive(Parser)]
struct Args {
    /// Catalog file (.csv or .jsonl), loaded once at startup
    #[arg(long, default_value = "./sample_data/vehicles.csv")]
    catalog: PathBuf,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let state = AppState::load(&args.catalog)?;
    let models = state.num_models();
    if models == 0 {
        tracing::warn!(catalog = %args.catalog.display(), "catalog is empty; every query will return no results");
    }

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, catalog = %args.catalog.display(), models, "serving recommendations");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
