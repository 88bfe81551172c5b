//! Environment registry

use std::collections::HashMap;

use crate::errors::DeployerError;
use crate::storage::settings::EnvironmentSettings;

/// A named group of foundations sharing deployment policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    /// Push targets in configured order
    pub foundations: Vec<String>,
    pub skip_ssl: bool,
}

/// Immutable environment lookup, built once at startup and shared by all requests
#[derive(Debug, Clone, Default)]
pub struct EnvironmentRegistry {
    environments: HashMap<String, Environment>,
}

impl EnvironmentRegistry {
    pub fn new(environments: impl IntoIterator<Item = Environment>) -> Result<Self, DeployerError> {
        let mut map = HashMap::new();
        for environment in environments {
            if environment.name.trim().is_empty() {
                return Err(DeployerError::ConfigError(
                    "environment name must not be empty".to_string(),
                ));
            }
            let name = environment.name.clone();
            if map.insert(name.clone(), environment).is_some() {
                return Err(DeployerError::ConfigError(format!(
                    "environment '{}' is defined more than once",
                    name
                )));
            }
        }
        Ok(Self { environments: map })
    }

    pub fn from_settings(settings: &[EnvironmentSettings]) -> Result<Self, DeployerError> {
        Self::new(settings.iter().map(|s| Environment {
            name: s.name.clone(),
            foundations: s.foundations.clone(),
            skip_ssl: s.skip_ssl,
        }))
    }

    pub fn lookup(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }

    /// Environment names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.environments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}
