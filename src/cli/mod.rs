//! # CLI Module
//!
//! Command-line entry point for the `movies-api` binary.
//!
//! ```bash
//! # Serve on the default port 1234 with the bundled catalogue
//! movies-api
//!
//! # Custom port, seed file and CORS allow-list
//! movies-api --port 8080 --seed ./movies.json \
//!     --allowed-origin http://localhost:8080 --allowed-origin https://movies.example
//!
//! # Inspect without serving
//! movies-api routes
//! movies-api --seed ./movies.json check-seed
//! ```
//!
//! Every flag also reads an environment variable (`PORT`, `MOVIES_HOST`,
//! `MOVIES_SEED_PATH`, `MOVIES_ALLOWED_ORIGINS`, `MOVIES_LOG_LEVEL`).

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run, run_cli, start_server, Cli, Commands};
