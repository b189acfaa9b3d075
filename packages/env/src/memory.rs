//! In-memory environment.
//!
//! Starts empty (or from the given pairs) and never reads or writes the
//! process environment, so tests using it can run in parallel.

use std::collections::BTreeMap;

use handoff_sync::Shared;

use crate::{EnvError, EnvProvider, Result};

#[derive(Debug, Default)]
pub struct MemoryEnv {
    vars: Shared<BTreeMap<String, String>>,
}

impl MemoryEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_var(&self, name: &str, value: &str) {
        self.vars
            .write(|vars| vars.insert(name.to_string(), value.to_string()));
    }

    pub fn remove_var(&self, name: &str) {
        self.vars.write(|vars| vars.remove(name));
    }

    pub fn clear(&self) {
        self.vars.write(BTreeMap::clear);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect::<BTreeMap<_, _>>();

        log::debug!("MemoryEnv: created with {} variable(s)", vars.len());

        Self {
            vars: Shared::new(vars),
        }
    }
}

impl EnvProvider for MemoryEnv {
    fn var(&self, name: &str) -> Result<String> {
        self.vars
            .read(|vars| vars.get(name).cloned())
            .ok_or_else(|| EnvError::NotFound(name.to_string()))
    }

    fn vars(&self) -> BTreeMap<String, String> {
        self.vars.read(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn set_and_remove() {
        let env = MemoryEnv::new();

        env.set_var("A", "1");
        env.set_var("B", "2");
        env.set_var("A", "3");
        env.remove_var("B");

        assert_eq!(
            env.vars(),
            BTreeMap::from([("A".to_string(), "3".to_string())])
        );
    }

    #[test_log::test]
    fn clear_removes_everything() {
        let env = MemoryEnv::from_iter([("A", "1")]);

        env.clear();

        assert!(env.vars().is_empty());
        assert_eq!(env.var("A"), Err(EnvError::NotFound("A".to_string())));
    }
}
