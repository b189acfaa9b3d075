use std::time::Duration;

use handoff_env::{EnvError, EnvProvider, var_parse_opt};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffConfig {
    pub capacity: usize,
    pub workers: usize,
    pub producers: usize,
    pub consumers: usize,
    pub items: usize,
    pub timeout: Duration,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            capacity: 3,
            workers: 4,
            producers: 2,
            consumers: 2,
            items: 5,
            timeout: Duration::from_millis(250),
        }
    }
}

impl HandoffConfig {
    /// Reads `HANDOFF_*` variables from `env`, keeping the default for each
    /// one that is not set.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Env`] if a variable is set but not a valid number
    /// * [`ConfigError::Zero`] if a count that must be positive is `0`
    pub fn from_env(env: &dyn EnvProvider) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            capacity: var_parse_opt(env, "HANDOFF_CAPACITY")?.unwrap_or(defaults.capacity),
            workers: var_parse_opt(env, "HANDOFF_WORKERS")?.unwrap_or(defaults.workers),
            producers: var_parse_opt(env, "HANDOFF_PRODUCERS")?.unwrap_or(defaults.producers),
            consumers: var_parse_opt(env, "HANDOFF_CONSUMERS")?.unwrap_or(defaults.consumers),
            items: var_parse_opt(env, "HANDOFF_ITEMS")?.unwrap_or(defaults.items),
            timeout: var_parse_opt(env, "HANDOFF_TIMEOUT_MS")?
                .map_or(defaults.timeout, Duration::from_millis),
        };

        config.validate()?;
        log::debug!("config: {config:?}");

        Ok(config)
    }

    /// # Errors
    ///
    /// * [`ConfigError::Zero`] if a count that must be positive is `0`
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Zero {
                name: "HANDOFF_WORKERS",
            });
        }
        if self.producers == 0 {
            return Err(ConfigError::Zero {
                name: "HANDOFF_PRODUCERS",
            });
        }
        if self.consumers == 0 {
            return Err(ConfigError::Zero {
                name: "HANDOFF_CONSUMERS",
            });
        }

        Ok(())
    }
}
