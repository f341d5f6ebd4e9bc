//! novel-sw server entry point.
//!
//! Loads configuration, installs and activates the offline cache coordinator,
//! then serves its event surface as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

use novel_sw_client::{Coordinator, FetchConfig, HttpFetcher, RecordingHost, WorkerConfig};
use novel_sw_core::{AppConfig, CacheDb, CacheStorage, MemoryStorage};

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let worker = WorkerConfig::from_app(&config)?;

    let storage: Arc<dyn CacheStorage> = if config.in_memory {
        tracing::info!("using in-memory partitions");
        Arc::new(MemoryStorage::new())
    } else {
        tracing::info!(path = %config.db_path.display(), "opening partition database");
        Arc::new(CacheDb::open(&config.db_path).await?)
    };
    let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::from(&config))?);
    let host = Arc::new(RecordingHost::new());
    let coordinator = Arc::new(Coordinator::new(worker, storage, fetcher, host.clone()));

    let installed = coordinator.install().await;
    tracing::info!(precached = installed.precached, partitions = installed.partitions.len(), "installed");
    let activated = coordinator.activate().await;
    tracing::info!(deleted = activated.deleted.len(), version = %activated.version, "activated");
    host.drain().await;

    tracing::info!(origin = %config.origin, "Starting novel-sw server on stdio transport");

    let handler = handler::NovelSwServer::new(coordinator.clone(), host);
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    coordinator.settle().await;
    Ok(())
}
