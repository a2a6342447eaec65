//! Context Seams
//!
//! Read-only capabilities handed to stage bodies alongside the build ledger.
//!
//! Stage actions never see the resolver that produced the environment table;
//! they see an `EnvironmentLookup`, which the application crate implements
//! and tests can replace with a fixed table.

use std::collections::BTreeMap;

use crate::environment::EnvironmentConfig;
use crate::error::{CoreError, CoreResult};

/// Read-only access to resolved environment configuration.
pub trait EnvironmentLookup: Send + Sync {
    /// Returns the configuration for `name` or `UnknownEnvironment`.
    fn get_config(&self, name: &str) -> CoreResult<EnvironmentConfig>;

    /// Names of every resolved environment.
    fn environment_names(&self) -> Vec<String>;
}

/// A fixed environment table, mostly useful in tests and tooling.
impl EnvironmentLookup for BTreeMap<String, EnvironmentConfig> {
    fn get_config(&self, name: &str) -> CoreResult<EnvironmentConfig> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CoreError::unknown_environment(name, self.keys().cloned().collect()))
    }

    fn environment_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}
