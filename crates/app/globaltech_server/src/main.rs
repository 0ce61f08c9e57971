//! Global Technology API server binary.
//!
//! Serves the shop API over PostgreSQL, or over an in-process store with
//! `--in-memory`.

use std::sync::Arc;
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use clap::Parser;
use globaltech_api::config::ApiConfig;
use globaltech_core::store::{MemoryStore, PgStore, Store, TimedStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "globaltech_server", about = "Global Technology API server")]
struct Args {
    /// Port to listen on (0 = ephemeral). Overrides the port in `BIND_ADDR`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/globaltech"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 10)]
    max_connections: u32,

    /// Bound on every store call, in milliseconds. Defaults to `STORE_TIMEOUT_MS`.
    #[arg(long)]
    store_timeout_ms: Option<u64>,

    /// Keep all data in process memory instead of PostgreSQL.
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| {
                    tracing_subscriber::EnvFilter::try_new(
                        "info,globaltech_api=debug,globaltech_core=debug,tower_http=debug",
                    )
                })?,
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.pg_connection_url = args.database_url;
    if let Some(ms) = args.store_timeout_ms {
        config.store_timeout = Duration::from_millis(ms);
    }
    if let Some(port) = args.port {
        let host = config
            .bind_addr
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "127.0.0.1".into());
        config.bind_addr = format!("{host}:{port}");
    }

    info!(bind_addr = %config.bind_addr, in_memory = args.in_memory, "starting globaltech_server");

    let store: Arc<dyn Store> = if args.in_memory {
        warn!("in-memory store: data is lost on exit");
        Arc::new(TimedStore::new(MemoryStore::new(), config.store_timeout))
    } else {
        info!(
            max_connections = args.max_connections,
            "configuring connection pool"
        );
        let pool = PgPoolOptions::new()
            .max_connections(args.max_connections)
            .acquire_timeout(config.store_timeout)
            .connect(&config.pg_connection_url)
            .await?;

        info!("running database migrations");
        globaltech_api::migrate(&pool).await?;

        Arc::new(TimedStore::new(PgStore::new(pool), config.store_timeout))
    };

    let state = globaltech_api::AppState::new(store, config.clone());
    let app = globaltech_api::app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
