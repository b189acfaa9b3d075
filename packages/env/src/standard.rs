use std::collections::BTreeMap;

use crate::{EnvError, EnvProvider, Result};

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEnv;

impl StandardEnv {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EnvProvider for StandardEnv {
    fn var(&self, name: &str) -> Result<String> {
        std::env::var(name).map_err(|e| {
            log::trace!("StandardEnv: {name}: {e}");
            EnvError::NotFound(name.to_string())
        })
    }

    fn vars(&self) -> BTreeMap<String, String> {
        std::env::vars().collect()
    }
}
