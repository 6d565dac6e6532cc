//! Items service entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use items_api::api::{create_router, AppState, ServiceInfo};
use items_api::config::Config;
use items_api::metrics;
use items_api::store::{bootstrap, build_store, BackendKind, BootstrapPolicy, PgItemStore};
use items_api::utils::shutdown_signal;

/// Items CRUD service.
#[derive(Parser, Debug)]
#[command(name = "items-api")]
#[command(about = "HTTP service for an items collection backed by memory or PostgreSQL")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Storage backend (memory or postgres).
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP listen port.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Create the items table and exit.
    InitSchema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so RUST_LOG from .env applies
    let config = Config::load();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("items_api=debug,tower_http=debug,info")
    } else {
        let level = config.as_ref().map_or("info", |c| c.rust_log.as_str());
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(backend) = args.backend {
        config.storage_backend = backend;
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::InitSchema) => Ok(cmd_init_schema(&config).await?),
        Some(Command::Serve { port }) => Ok(cmd_serve(config, port.or(args.port)).await?),
        None => Ok(cmd_serve(config, args.port).await?),
    }
}

/// Print the resolved configuration.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ITEMS API - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Backend: {}", config.storage_backend);
    println!("  Version: {}", config.app_version());
    println!("  Port: {}", config.port);
    if config.storage_backend == BackendKind::Postgres {
        println!("  Database: {}", config.database_target());
        println!("  User: {}", config.db_user);
        println!("  Password: ********");
        println!("  Pool Size: {}", config.db_max_connections);
        println!("  Acquire Timeout: {}s", config.db_acquire_timeout_secs);
        println!(
            "  Schema Bootstrap: {}",
            match config.bootstrap_policy() {
                BootstrapPolicy::LogAndContinue => "log and continue",
                BootstrapPolicy::Fatal => "fatal",
            }
        );
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Create the items table once.
async fn cmd_init_schema(config: &Config) -> items_api::Result<()> {
    config.validate()?;

    let store = PgItemStore::connect_lazy(config);
    bootstrap(&store, BootstrapPolicy::Fatal).await?;

    info!("Schema initialized at {}", config.database_target());
    Ok(())
}

/// Run the HTTP service.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> items_api::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }

    config.validate().inspect_err(|e| error!("{}", e))?;

    info!("Backend: {}", config.storage_backend);
    info!("Version: {}", config.app_version());

    // Initialize metrics
    let metrics_handle = metrics::install_recorder()?;
    metrics::init_metrics(&config.app_version(), &config.storage_backend.to_string());
    let _upkeep = metrics::spawn_upkeep(metrics_handle.clone());

    // Storage backend
    let store = build_store(&config);
    bootstrap(store.as_ref(), config.bootstrap_policy()).await?;

    let state = AppState::new(store, ServiceInfo::from_config(&config), metrics_handle);
    let router = create_router(state);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
