use civic_serve::config::ServeConfig;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "civic", about = "Municipal events service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (configured through CIVIC_* environment variables).
    Serve,
    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve => serve(ServeConfig::from_env()).await,
        Command::Openapi => {
            println!("{}", civic_serve::openapi::generate_spec());
            ExitCode::SUCCESS
        }
    }
}

async fn serve(config: ServeConfig) -> ExitCode {
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            error!(path = %parent.display(), %err, "cannot create database directory");
            return ExitCode::FAILURE;
        }
    }
    let events = match civic_serve::load_event_store(&config.db_path, config.seed_demo) {
        Ok(events) => events,
        Err(err) => {
            error!(%err, "failed to load events");
            return ExitCode::FAILURE;
        }
    };
    info!(db_path = %config.db_path, seed_demo = config.seed_demo, "starting civic");
    let state = civic_serve::AppState::new(
        config.db_path.clone(),
        Arc::new(events),
        config.allowed_origins.clone(),
    );
    match civic_serve::serve(state, config.addr()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "serve error");
            ExitCode::FAILURE
        }
    }
}
