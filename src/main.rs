//! Stack status probe entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stackwatch::api::{create_router, AppState};
use stackwatch::client::Dispatcher;
use stackwatch::config::Config;
use stackwatch::metrics;
use stackwatch::services::{AuthClient, ItemClient};
use stackwatch::services::items::NewItem;
use stackwatch::utils::shutdown_signal;
use stackwatch::watch::{check_all, HealthWatcher};

/// Status probe and client for the two-service dev stack.
#[derive(Parser, Debug)]
#[command(name = "stackwatch")]
#[command(about = "Watch and exercise the auth/item service stack")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Advertised host to mirror onto backend addresses.
    #[arg(long, global = true)]
    host: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the watcher and the aggregated status server (default).
    Run {
        /// HTTP server port for the status endpoints.
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds between health-check batches.
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Probe both services once and print the result.
    Health,

    /// Log in against the auth service.
    Login {
        /// Account username.
        #[arg(short, long)]
        username: String,

        /// Account password.
        #[arg(short, long)]
        password: String,
    },

    /// Item service operations.
    Items {
        #[command(subcommand)]
        command: ItemCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    /// List all items.
    List,

    /// Create a new item.
    Add {
        /// Display name.
        #[arg(short, long)]
        name: String,

        /// Optional description.
        #[arg(short, long)]
        description: Option<String>,

        /// Price.
        #[arg(short, long)]
        price: Decimal,

        /// Category label.
        #[arg(short, long)]
        category: String,
    },

    /// Delete an item by identifier.
    Remove {
        /// Item identifier.
        id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Env config steers logging before the real (validated) load happens
    // inside the subcommand handlers.
    let log_config = Config::load().unwrap_or_default();
    let filter = if args.verbose || log_config.verbose {
        EnvFilter::new("stackwatch=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_config.rust_log.clone()))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    metrics::init_metrics();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(args.host).await,
        Some(Command::Health) => cmd_health(args.host).await,
        Some(Command::Login { username, password }) => {
            cmd_login(args.host, &username, &password).await
        }
        Some(Command::Items { command }) => cmd_items(args.host, command).await,
        Some(Command::Run { port, interval }) => cmd_run(args.host, port, interval).await,
        None => cmd_run(args.host, None, None).await,
    }
}

/// Load config and apply CLI overrides.
fn load_config(host_override: Option<String>) -> anyhow::Result<Config> {
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if host_override.is_some() {
        config.advertised_host = host_override;
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config(host: Option<String>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("STACKWATCH - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match load_config(host) {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(e);
        }
    };

    let dispatcher = Dispatcher::new(&config);

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!(
        "  Advertised Host: {}",
        config.advertised_host.as_deref().unwrap_or("(none, loopback)")
    );
    println!("  Auth Service Port: {}", config.auth_port);
    println!("  Item Service Port: {}", config.item_port);
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    println!("  Status Server Port: {}", config.port);
    println!("  Resolved Targets:");
    for endpoint in ["/api/auth/health", "/health"] {
        println!("    {} -> {}", endpoint, dispatcher.target_url(endpoint)?);
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Probe both services once and print the result.
async fn cmd_health(host: Option<String>) -> anyhow::Result<()> {
    let config = load_config(host)?;
    let dispatcher = Dispatcher::new(&config);

    let snapshot = check_all(&dispatcher).await;

    println!("======================================================================");
    println!("STACK HEALTH");
    println!("======================================================================");
    for report in &snapshot.services {
        let target = dispatcher.target_url(&report.endpoint)?;
        match &report.state {
            stackwatch::watch::ServiceState::Healthy { http_status } => {
                println!(
                    "  {:<13} UP    HTTP {} ({}ms)  {}",
                    report.service.to_string(),
                    http_status,
                    report.latency_ms,
                    target
                );
            }
            stackwatch::watch::ServiceState::Unreachable { reason } => {
                println!(
                    "  {:<13} DOWN  {}  {}",
                    report.service.to_string(),
                    reason,
                    target
                );
            }
        }
    }
    println!("======================================================================");

    if snapshot.all_healthy() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("one or more services are unreachable"))
    }
}

/// Log in against the auth service.
async fn cmd_login(host: Option<String>, username: &str, password: &str) -> anyhow::Result<()> {
    let config = load_config(host)?;
    let auth = AuthClient::new(Dispatcher::new(&config));

    let response = auth.login(username, password).await?;

    if response.success {
        println!("Login succeeded");
        if let Some(token) = &response.token {
            println!("  Token: {}", token);
        }
        if let Some(user) = &response.user {
            println!("  User: {} (id {}, role {})", user.username, user.id, user.role);
        }
        Ok(())
    } else {
        let reason = response.message.as_deref().unwrap_or("unknown reason");
        Err(anyhow::anyhow!("login rejected: {}", reason))
    }
}

/// Item service operations.
async fn cmd_items(host: Option<String>, command: ItemCommand) -> anyhow::Result<()> {
    let config = load_config(host)?;
    let items = ItemClient::new(Dispatcher::new(&config));

    match command {
        ItemCommand::List => {
            let listed = items.list().await?;
            if listed.is_empty() {
                println!("No items");
                return Ok(());
            }
            for item in listed {
                println!(
                    "  #{:<4} {:<20} {:>12}  {}",
                    item.id, item.name, item.price, item.category
                );
            }
            Ok(())
        }
        ItemCommand::Add {
            name,
            description,
            price,
            category,
        } => {
            let created = items
                .create(&NewItem {
                    name,
                    description,
                    price,
                    category,
                })
                .await?;
            println!("Created item #{}: {}", created.id, created.name);
            Ok(())
        }
        ItemCommand::Remove { id } => {
            let ack = items.delete(id).await?;
            println!("{}", ack.message);
            Ok(())
        }
    }
}

/// Run the watcher and the aggregated status server.
async fn cmd_run(
    host: Option<String>,
    port_override: Option<u16>,
    interval_override: Option<u64>,
) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config(host)?;

    if let Some(port) = port_override {
        config.port = port;
    }
    if let Some(interval) = interval_override {
        config.poll_interval_secs = interval;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    info!("Configuration loaded successfully");
    info!(
        "Watching auth-service:{} and item-service:{} every {}s",
        config.auth_port, config.item_port, config.poll_interval_secs
    );

    if config.metrics_enabled {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Prometheus exporter listening on {}", metrics_addr);
    }

    let dispatcher = Dispatcher::new(&config);
    let watcher = HealthWatcher::spawn(
        dispatcher,
        Duration::from_secs(config.poll_interval_secs),
    );

    let state = AppState::new(watcher.subscribe());
    let router = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Status server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Tear the repeating trigger down with the server.
    watcher.stop().await;
    info!("stackwatch stopped");

    Ok(())
}
