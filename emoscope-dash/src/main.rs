//! emoscope-dash - Sentiment & Emotion Dashboard
//!
//! Serves a single-page dashboard that classifies pasted or uploaded messages
//! by sentiment and emotion and reports aggregate results.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use emoscope_common::config::{load_config, ClassifierBackend};
use emoscope_dash::classifier::ClassifierService;
use emoscope_dash::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for emoscope-dash
#[derive(Parser, Debug)]
#[command(name = "emoscope-dash")]
#[command(about = "Sentiment & emotion dashboard for short text messages")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "EMOSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EMOSCOPE_BIND")]
    bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "EMOSCOPE_PORT")]
    port: Option<u16>,

    /// Classifier backend: inference or lexicon (overrides config)
    #[arg(long, env = "EMOSCOPE_BACKEND")]
    backend: Option<ClassifierBackend>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "EMOSCOPE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, config_source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;

    // Priority: CLI/ENV > TOML > compiled default
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(backend) = args.backend {
        config.classifier.backend = backend;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},tower_http=info", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Emoscope Dashboard (emoscope-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", config_source);

    let classifiers = ClassifierService::from_config(&config.classifier)
        .context("Failed to initialize classifiers")?;
    info!("Classifiers ready: {}", classifiers.describe());

    let state = AppState::new(classifiers, &config);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind, config.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("emoscope-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
