//! hindsight-exporter - version 0.1.0
//!
//! Prometheus exporter for the hindsight plugin statistics file.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use axum::{routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, ValueEnum};
use hindsight_exporter::{Catalog, HindsightCollector};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};

use cli::{Args, Commands, LogLevel};
use commands::{command_catalog, command_config, command_test};
use config::{resolve_config, show_config, validate_effective_config, Config};
use handlers::{health_handler, metrics_handler, root_handler};
use state::{AppState, SharedState};

/// Picks the log level: CLI flag, then config file, then info.
fn effective_log_level(config: &Config, args: &Args) -> LogLevel {
    if let Some(level) = &args.log_level {
        return level.clone();
    }
    config
        .log_level
        .as_deref()
        .and_then(|s| LogLevel::from_str(s, true).ok())
        .unwrap_or(LogLevel::Info)
}

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(config: &Config, args: &Args) {
    let log_level = effective_log_level(config, args);
    let filter = match log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", log_level);
}

/// Resolves and validates configuration.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    validate_effective_config(&config)
        .map_err(|e| format!("Configuration invalid: {}", e))?;
    Ok(config)
}


/// Builds the registry with the hindsight collector registered on it.
fn build_registry(config: &Config) -> Result<Registry, Box<dyn std::error::Error>> {
    let registry = Registry::new();
    let collector = HindsightCollector::new(
        config.hindsight_path(),
        Catalog::hindsight(),
        config.enable_telemetry.unwrap_or(true),
    )?;
    registry.register(Box::new(collector))?;
    debug!("Prometheus registry initialized");
    Ok(registry)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format.clone());
    }

    match &args.command {
        Some(Commands::Catalog) => return command_catalog(),
        Some(Commands::Config {
            output,
            format,
            commented,
        }) => return command_config(output.clone(), format.clone(), *commented),
        _ => {}
    }

    let config = match load_validated_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    setup_logging(&config, &args);

    if let Some(Commands::Test {
        iterations,
        verbose,
    }) = &args.command
    {
        return command_test(*iterations, *verbose, &config);
    }

    info!("Starting hindsight-exporter");

    let hindsight_path = config.hindsight_path().to_path_buf();
    if !hindsight_path.exists() {
        warn!(
            "⚠️  {} does not exist yet - metrics stay empty until hindsight writes it",
            hindsight_path.display()
        );
    }

    let registry = build_registry(&config)?;

    let addr: SocketAddr = config.socket_addr()?;
    let metrics_path = config.telemetry_path().to_string();

    let state: SharedState = Arc::new(AppState {
        registry,
        config: Arc::new(config.clone()),
        hindsight_path,
        start_time: Instant::now(),
    });

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route(&metrics_path, get(metrics_handler));

    if config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    let app = app.with_state(state);

    if config.enable_tls.unwrap_or(false) {
        // Paths are present, validate_effective_config() checked them.
        let (Some(cert_path), Some(key_path)) =
            (config.tls_cert_path.as_ref(), config.tls_key_path.as_ref())
        else {
            return Err("TLS enabled without tls_cert_path and tls_key_path".into());
        };

        info!("Loading TLS certificate from: {}", cert_path);
        info!("Loading TLS private key from: {}", key_path);

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| {
                error!("Failed to load TLS configuration: {}", e);
                e
            })?;

        info!(
            "providing metrics at https://{}{}",
            addr, metrics_path
        );

        let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        let listener = TcpListener::bind(addr).await?;
        info!(
            "providing metrics at http://{}{}",
            addr, metrics_path
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("Server error: {}", e);
                e
            })?;
    }

    info!("hindsight-exporter stopped gracefully");
    Ok(())
}
