//! # Runtime Configuration
//!
//! Environment-driven tuning for the `may` coroutine runtime.
//!
//! ## `MOVIES_STACK_SIZE`
//!
//! Stack size for connection and handler coroutines, in bytes. Accepts
//! decimal (`16384`) or hexadecimal (`0x4000`). Unparseable or zero values
//! fall back to the default of `0x4000` (16 KB).
//!
//! ```rust
//! use movies_api::runtime_config::{parse_stack_size, DEFAULT_STACK_SIZE};
//!
//! assert_eq!(parse_stack_size("0x8000"), 0x8000);
//! assert_eq!(parse_stack_size("bogus"), DEFAULT_STACK_SIZE);
//! ```

use std::env;

use tracing::{info, warn};

/// Default coroutine stack size (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Environment variable holding the coroutine stack size.
pub const STACK_SIZE_ENV: &str = "MOVIES_STACK_SIZE";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(STACK_SIZE_ENV) {
            Ok(val) => RuntimeConfig {
                stack_size: parse_stack_size(&val),
            },
            Err(_) => RuntimeConfig::default(),
        }
    }

    /// Apply to the global `may` scheduler. Call once, before any coroutine is spawned.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
        info!(stack_size = self.stack_size, "Coroutine runtime configured");
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal stack size.
#[must_use]
pub fn parse_stack_size(raw: &str) -> usize {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    };
    match parsed {
        Some(size) if size > 0 => size,
        _ => {
            warn!(value = %raw, default = DEFAULT_STACK_SIZE, "Invalid stack size, using default");
            DEFAULT_STACK_SIZE
        }
    }
}
