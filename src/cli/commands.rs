use crate::{
    logging,
    middleware::CorsMiddleware,
    router::movie_routes,
    runtime_config::RuntimeConfig,
    seed,
    server::{AppService, HttpServer, ServerHandle},
    store::MovieStore,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for the movie catalogue service
#[derive(Parser, Debug)]
#[command(name = "movies-api")]
#[command(about = "In-memory movie catalogue over HTTP", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 1234)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "MOVIES_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// JSON file with the initial catalogue (defaults to the bundled one)
    #[arg(long, env = "MOVIES_SEED_PATH")]
    pub seed: Option<PathBuf>,

    /// Origin allowed to read responses cross-site (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "MOVIES_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,

    /// Base log level when RUST_LOG is unset
    #[arg(long, env = "MOVIES_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands. Without one the server is started.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the route table and exit
    Routes,
    /// Load and validate the seed catalogue, then exit
    CheckSeed,
}

impl Cli {
    /// Address to bind, `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured allow-list, or the built-in one when none was given.
    pub fn cors_policy(&self) -> Result<CorsMiddleware> {
        let origins: Vec<&str> = self
            .allowed_origins
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() {
            return Ok(CorsMiddleware::default());
        }
        CorsMiddleware::new(origins).context("invalid --allowed-origin")
    }
}

/// Parse arguments and run the selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command.clone().unwrap_or(Commands::Serve) {
        Commands::Routes => {
            for route in movie_routes() {
                println!(
                    "{:<7} {:<14} {}",
                    route.method.as_str(),
                    route.path_pattern,
                    route.handler_name
                );
            }
            Ok(())
        }
        Commands::CheckSeed => {
            let store = load_store(cli.seed.as_deref())?;
            println!("seed ok: {} movies", store.len());
            Ok(())
        }
        Commands::Serve => serve(&cli),
    }
}

fn serve(cli: &Cli) -> Result<()> {
    let _log_guard = logging::init_logging(cli.log_level.as_deref())?;

    let runtime = RuntimeConfig::from_env();
    runtime.apply();

    let handle = start_server(cli, runtime.stack_size)?;
    wait_for_shutdown(handle)
}

/// Build the service from `cli` and start listening.
pub fn start_server(cli: &Cli, stack_size: usize) -> Result<ServerHandle> {
    let store = Arc::new(load_store(cli.seed.as_deref())?);
    let cors = cli.cors_policy()?;
    let service =
        AppService::with_store(store, cors, stack_size).context("failed to compile routes")?;

    let addr = cli.bind_addr();
    let handle = HttpServer(service)
        .start(addr.as_str())
        .with_context(|| format!("failed to bind {addr}"))?;
    handle
        .wait_ready()
        .with_context(|| format!("server on {addr} never became ready"))?;
    Ok(handle)
}

fn load_store(seed_path: Option<&Path>) -> Result<MovieStore> {
    let movies = seed::load_seed(seed_path)?;
    let store = MovieStore::from_seed(movies).context("seed catalogue rejected")?;
    info!(
        movies = store.len(),
        seed = ?seed_path,
        "Catalogue loaded"
    );
    Ok(store)
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
