//! Rating Service Main Entry Point
//!
//! Serves vote casting, retraction and rating queries for forum posts and
//! comments over HTTP, backed by PostgreSQL.

use dotenv::dotenv;
use rating_service::server::{self, state::AppState};
use rating_service::{Config, Dependencies, LogFormat, ServiceError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("rating_service=info,rating_service_engine=info,tower_http=info")
    });

    match LogFormat::from_env()? {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .init();

            info!(
                service_name = "rating-service",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with JSON format"
            );
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
                .init();

            info!(
                service_name = "rating-service",
                service_version = env!("CARGO_PKG_VERSION"),
                "Tracing initialized with console output"
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting rating service");

    let config = Config::from_env().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e.into());
        }
    };

    let state = AppState {
        engine: deps.engine,
        caller_id_header: config.caller_id_header.clone(),
    };
    let app = server::create_app(state);

    if let Err(e) = server::run_server(app, config.server_addr).await {
        error!(error = %e, "Server failed");
        return Err(e);
    }
    Ok(())
}
