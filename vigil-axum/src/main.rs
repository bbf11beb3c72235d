use std::{net::SocketAddr, process::ExitCode, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vigil::{LookupConfig, VigilBuilder, VigilConfig};

/// HTTP server for the Vigil API
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "VIGIL_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = vigil::config::DEFAULT_DATABASE_URL)]
    db_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = VigilConfig::from_env()?;
    let lookups = LookupConfig::from_env().with_request_timeout(config.collaborator_timeout);

    let vigil = VigilBuilder::new()
        .with_sqlite(&cli.db_url)
        .await?
        .with_config(&config)?
        .with_mailer_from_env()?
        .with_lookups(&lookups)?
        .apply_migrations(true)
        .warm_cache(true)
        .build()
        .await?;

    let app = vigil_axum::routes(Arc::new(vigil));

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    tracing::info!(address = %cli.bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
