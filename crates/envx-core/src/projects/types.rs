//! Project / environment / variable data model.
//!
//! A [`Project`] is the aggregate root: environments and variables only exist
//! nested inside it and are persisted as part of the one project record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named unit of configuration holding one or more environments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier, also the storage record name. Never changes.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Environment used when the caller names none.
    pub default_env: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Project {
    /// Create a project whose only (empty) environment is also its default.
    pub fn new(name: &str, description: &str, env: &str, now: DateTime<Utc>) -> Self {
        let mut environments = BTreeMap::new();
        environments.insert(env.to_string(), Environment::new(env));

        Self {
            name: name.to_string(),
            description: description.to_string(),
            default_env: env.to_string(),
            created_at: now,
            updated_at: now,
            environments,
        }
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }

    pub fn environment_mut(&mut self, name: &str) -> Option<&mut Environment> {
        self.environments.get_mut(name)
    }

    /// Get an environment, creating it empty if the project doesn't have it yet.
    pub fn environment_or_insert(&mut self, name: &str) -> &mut Environment {
        self.environments
            .entry(name.to_string())
            .or_insert_with(|| Environment::new(name))
    }

    /// Environment names in sorted order.
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Mark the aggregate as modified.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// A named bucket of variables within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, Variable>,
}

impl Environment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            variables: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.variables.get(key)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// A key/value pair with metadata.
///
/// `is_secret` only affects display. The value is stored as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_secret: bool,
    /// When the key was first set. Overwriting the key keeps this timestamp.
    pub created_at: DateTime<Utc>,
    /// When the key was last set.
    pub updated_at: DateTime<Utc>,
}

impl Variable {
    pub fn new(
        key: &str,
        value: &str,
        description: &str,
        is_secret: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            description: description.to_string(),
            is_secret,
            created_at: now,
            updated_at: now,
        }
    }
}
