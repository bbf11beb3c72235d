use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vigil::{SqliteRepositoryProvider, Vigil, VigilBuilder, VigilConfig, VigilError};

/// Command line interface for Vigil
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database connection string
    #[arg(long, env = "DATABASE_URL", default_value = vigil::config::DEFAULT_DATABASE_URL)]
    db_url: String,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(clap::Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print the score card of a user as JSON
    Score {
        /// The user's email address
        email: String,
    },
    /// Print the stored breaches of a user as JSON
    Breaches {
        /// The user's email address
        email: String,
    },
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), VigilError> {
    match cli.command {
        Commands::Migrate => {
            println!("Running migrations...");
            let repositories = SqliteRepositoryProvider::connect(&cli.db_url).await?;
            vigil::RepositoryProvider::migrate(&repositories).await?;
            println!("Done");
        }
        Commands::Score { email } => {
            let vigil = open(&cli.db_url).await?;
            print_json(&vigil.score_card(&email).await?)?;
        }
        Commands::Breaches { email } => {
            let vigil = open(&cli.db_url).await?;
            print_json(&vigil.breach_info(&email).await?)?;
        }
        Commands::Version => {
            println!("Vigil v{}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

async fn open(db_url: &str) -> Result<Vigil<SqliteRepositoryProvider>, VigilError> {
    let config = VigilConfig::from_env()?;
    VigilBuilder::new()
        .with_sqlite(db_url)
        .await?
        .with_config(&config)?
        .apply_migrations(true)
        .build()
        .await
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), VigilError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| VigilError::Validation(format!("Failed to render output: {e}")))?;
    println!("{json}");
    Ok(())
}
