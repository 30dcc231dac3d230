//! ItemStack Server - HTTP item API backed by DynamoDB.
//!
//! Serves the `/items` resource (create, read, list, update, delete) with a
//! uniform `{data, errorMessage}` JSON envelope and CORS headers on every
//! response.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 ITEMS_TABLE_NAME=items itemstack-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `ITEMS_BACKEND` | `dynamodb` | `dynamodb` or `memory` |
//! | `ITEMS_TABLE_NAME` | `items` | Backing table name |
//! | `ITEMS_SCAN_PAGE_SIZE` | *(unset)* | Items requested per scan page |
//! | `ITEMS_MAX_SCAN_PAGES` | `10000` | Upper bound on pages per listing |
//! | `ITEMS_REQUEST_TIMEOUT_MS` | `10000` | Deadline per store operation |
//! | `ITEMS_ALLOWED_ORIGIN` | `*` | `Access-Control-Allow-Origin` value |
//! | `ITEMS_RESOURCE_PATH` | `items` | Resource path segment |
//! | `DYNAMODB_ENDPOINT_URL` | *(unset)* | DynamoDB endpoint override |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use itemstack_core::config::{ItemStoreConfig, StoreBackend};
use itemstack_core::table::{DynamoDbTable, ItemTable, MemoryTable};
use itemstack_core::{ItemStoreClient, ItemStoreHandler};
use itemstack_http::service::{ItemHttpConfig, ItemHttpService};

use crate::gateway::GatewayService;

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`ItemHttpConfig`] from the [`ItemStoreConfig`].
fn build_http_config(config: &ItemStoreConfig) -> ItemHttpConfig {
    ItemHttpConfig {
        allowed_origin: config.allowed_origin.clone(),
        resource_path: config.resource_path.clone(),
    }
}

/// Open the backing table selected by the configuration.
async fn open_table(config: &ItemStoreConfig) -> Arc<dyn ItemTable> {
    match config.backend {
        StoreBackend::DynamoDb => {
            info!(
                table = %config.table_name,
                endpoint = ?config.dynamodb_endpoint_url,
                "using DynamoDB backend",
            );
            Arc::new(DynamoDbTable::connect(config).await)
        }
        StoreBackend::Memory => {
            warn!(table = %config.table_name, "using in-memory backend, data is not persisted");
            Arc::new(MemoryTable::new(&config.table_name))
        }
    }
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve<H>(listener: TcpListener, service: GatewayService<H>) -> Result<()>
where
    H: itemstack_http::ItemHandler,
{
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Query the running server's health endpoint.
///
/// Succeeds only on a 200 response reporting `"running"`.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /_health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn is_healthy_response(response: &str) -> bool {
    response.starts_with("HTTP/1.1 200") && response.contains("\"running\"")
}

/// Read the gateway listen address from the environment.
fn gateway_listen_addr() -> String {
    std::env::var("GATEWAY_LISTEN").unwrap_or_else(|_| "0.0.0.0:4566".to_string())
}

/// Read the log level from the environment.
fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let listen_addr = gateway_listen_addr();

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = listen_addr.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let log = log_level();
    init_tracing(&log)?;

    let config = ItemStoreConfig::from_env().context("invalid item store configuration")?;
    info!(
        backend = ?config.backend,
        table = %config.table_name,
        resource = %config.resource_path,
        request_timeout = ?config.request_timeout,
        max_scan_pages = config.max_scan_pages,
        "initializing item service",
    );

    let table = open_table(&config).await;
    let client = Arc::new(ItemStoreClient::new(table, &config));
    let handler = Arc::new(ItemStoreHandler::new(client, &config.resource_path));
    let http_config = build_http_config(&config);
    let items = ItemHttpService::new(handler, &http_config).with_context(|| {
        format!(
            "invalid ITEMS_ALLOWED_ORIGIN header value: {}",
            config.allowed_origin
        )
    })?;
    let gateway = GatewayService::new(items, VERSION);

    let addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {listen_addr}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, version = VERSION, "starting ItemStack Server");

    serve(listener, gateway).await
}
