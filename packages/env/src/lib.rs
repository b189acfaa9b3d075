#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Environment variable providers.

mod memory;
mod standard;

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

pub use memory::MemoryEnv;
pub use standard::StandardEnv;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("Environment variable '{0}' not found")]
    NotFound(String),
    #[error("Invalid value for environment variable '{name}': {message}")]
    Parse { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, EnvError>;

/// Source of environment variables.
pub trait EnvProvider: Send + Sync {
    /// # Errors
    ///
    /// * If the environment variable is not found
    fn var(&self, name: &str) -> Result<String>;

    fn vars(&self) -> BTreeMap<String, String>;

    fn var_or(&self, name: &str, default: &str) -> String {
        self.var(name).unwrap_or_else(|_| default.to_string())
    }

    /// # Errors
    ///
    /// * If the environment variable is not found
    /// * If the value cannot be parsed to `T`
    fn var_parse<T>(&self, name: &str) -> Result<T>
    where
        Self: Sized,
        T: FromStr,
        T::Err: Display,
    {
        let value = self.var(name)?;
        parse(name, &value)
    }

    /// Falls back to `default` when the variable is missing *or* unparsable.
    fn var_parse_or<T>(&self, name: &str, default: T) -> T
    where
        Self: Sized,
        T: FromStr,
        T::Err: Display,
    {
        self.var_parse(name).unwrap_or(default)
    }

    /// # Errors
    ///
    /// * If the variable exists but cannot be parsed to `T`
    fn var_parse_opt<T>(&self, name: &str) -> Result<Option<T>>
    where
        Self: Sized,
        T: FromStr,
        T::Err: Display,
    {
        var_parse_opt(self, name)
    }

    fn var_exists(&self, name: &str) -> bool {
        self.var(name).is_ok()
    }
}

/// Parses `value` as the contents of variable `name`.
///
/// Usable through `&dyn EnvProvider`, where the generic provided methods
/// are not.
///
/// # Errors
///
/// * If the value cannot be parsed to `T`
pub fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse::<T>().map_err(|e| EnvError::Parse {
        name: name.to_string(),
        message: format!("{value:?}: {e}"),
    })
}

/// Reads and parses `name` from a type-erased provider.
///
/// # Errors
///
/// * If the variable exists but cannot be parsed to `T`
pub fn var_parse_opt<T>(env: &dyn EnvProvider, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env.var(name) {
        Ok(value) => parse(name, &value).map(Some),
        Err(EnvError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
