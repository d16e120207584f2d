use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use app::{AppState, ServerConfig, build_app_router};
use services::{AppServices, Catalog, Clock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPort { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

/// Apply command-line overrides on top of the environment configuration.
fn apply_args(
    mut config: ServerConfig,
    mut args: impl Iterator<Item = String>,
) -> Result<ServerConfig, ArgsError> {
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut args, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.database_url = value;
            }
            "--port" => {
                let value = require_value(&mut args, "--port")?;
                config.port = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
            }
            "--syllabus" => {
                let value = require_value(&mut args, "--syllabus")?;
                config.syllabus_path = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(config)
}

fn print_usage() {
    println!(
        "Usage: tracker-server [--db <sqlite_url>] [--port <port>] [--syllabus <path.json>]\n\
         \n\
         Environment: DATABASE_URL, HOST, PORT, REQUEST_TIMEOUT_SECS,\n\
         STORAGE_TIMEOUT_SECS, SYLLABUS_PATH, RUST_LOG"
    );
}

fn load_catalog(config: &ServerConfig) -> Result<Catalog, tracker_core::syllabus::CatalogError> {
    match &config.syllabus_path {
        Some(path) => Catalog::from_json_file(path),
        None => Ok(Catalog::builtin().clone()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info,storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = apply_args(ServerConfig::from_env()?, std::env::args().skip(1))?;
    tracing::info!(host = %config.host, port = config.port, "loaded server configuration");

    let catalog = Arc::new(load_catalog(&config)?);
    tracing::info!(exams = catalog.exam_names().count(), "syllabus catalog ready");

    let services = AppServices::new_sqlite(
        &config.database_url,
        config.storage_timeout(),
        Clock::default(),
        catalog,
    )
    .await?;
    tracing::info!(database_url = %config.database_url, "storage ready");

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let app = build_app_router(AppState::new(services, config));

    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

/// Resolve on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}
