//! Environment Configuration
//!
//! Default environment definitions and the layered resolver.

pub mod defaults;
pub mod resolver;

pub use defaults::{default_environment, BaseEnvironment, DEFAULT_ENVIRONMENTS, PRODUCTION};
pub use resolver::EnvironmentConfigResolver;
