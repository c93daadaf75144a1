//! Structured logging setup.
//!
//! One `tracing` subscriber for the whole process: an `EnvFilter` (honouring
//! `RUST_LOG` when set), then a JSON or pretty `fmt` layer, optionally behind a
//! `tracing-appender` non-blocking writer.

use anyhow::{Context, Result};
use std::env;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything but `pretty` selects JSON.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    pub async_logging: bool,
    /// Extra comma-separated filter directives, e.g. `movies_api::store=debug`
    pub target_filter: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: true,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or unparseable values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("MOVIES_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("MOVIES_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            async_logging: lookup("MOVIES_LOG_ASYNC")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.async_logging),
            target_filter: lookup("MOVIES_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("MOVIES_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }
}

fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    let base = level_filter(&config.log_level);
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(base.to_string()));

    // Connection-level noise (client disconnects etc.) only at warn and above.
    let http_directive: Directive = "may_minihttp=warn"
        .parse()
        .context("invalid built-in log directive")?;
    env_filter = env_filter.add_directive(http_directive);

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',').map(str::trim) {
            if filter.is_empty() {
                continue;
            }
            let directive: Directive = filter
                .parse()
                .with_context(|| format!("invalid log filter directive '{filter}'"))?;
            env_filter = env_filter.add_directive(directive);
        }
    }
    Ok(env_filter)
}

/// Install the global subscriber.
///
/// With async logging the returned guard owns the writer thread; keep it alive
/// until exit or buffered records are lost.
///
/// # Errors
///
/// Fails on an invalid filter directive or if a subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = build_filter(config)?;

    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking),
            Some(guard),
        )
    } else {
        (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout),
            None,
        )
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// [`init_logging_with_config`] with environment settings and an explicit level.
///
/// # Errors
///
/// See [`init_logging_with_config`].
pub fn init_logging(log_level: Option<&str>) -> Result<Option<WorkerGuard>> {
    let mut config = LogConfig::from_env();
    if let Some(level) = log_level {
        config.log_level = level.to_string();
    }
    init_logging_with_config(&config)
}
