#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use handoff_env::{EnvProvider, StandardEnv};
pub use log;
use thiserror::Error;

#[cfg(feature = "macros")]
mod macros;

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: &str = "handoff=debug";
#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: &str = "handoff=info";

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Resolves the filter directive string `init` would use.
#[must_use]
pub fn filter(env: &dyn EnvProvider, default_filter: Option<&str>) -> String {
    env.var("HANDOFF_LOG")
        .or_else(|_| env.var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.unwrap_or(DEFAULT_LOG_LEVEL).to_string())
}

/// Installs the global logger, reading the filter from the process
/// environment.
///
/// # Errors
///
/// * If a global logger was already installed
pub fn init(default_filter: Option<&str>) -> Result<(), InitError> {
    init_with_env(&StandardEnv::new(), default_filter)
}

/// # Errors
///
/// * If a global logger was already installed
pub fn init_with_env(env: &dyn EnvProvider, default_filter: Option<&str>) -> Result<(), InitError> {
    let filter = filter(env, default_filter);

    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp_millis()
        .try_init()?;

    log::debug!("logging initialized with filter {filter:?}");

    Ok(())
}
