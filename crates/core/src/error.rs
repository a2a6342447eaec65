//! Core Error Types
//!
//! Defines the error taxonomy shared by every crate in the Release Cascade
//! workspace. Branch policy lookup never produces one of these (it always
//! falls back); every other component returns them to its caller.

use thiserror::Error;

/// Core error type for the Release Cascade workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Branch is not permitted to deploy to the target environment
    #[error("Policy violation: branch '{branch}' may not deploy to '{environment}' (allowed: {})", .allowed.join(", "))]
    PolicyViolation {
        branch: String,
        environment: String,
        allowed: Vec<String>,
    },

    /// Lookup against an environment absent from the resolved table
    #[error("Unknown environment '{name}' (available: {})", .available.join(", "))]
    UnknownEnvironment { name: String, available: Vec<String> },

    /// One or more recorded quality checks did not pass
    #[error("Quality gate failed: {}", .failed_checks.join(", "))]
    QualityGateFailure { failed_checks: Vec<String> },

    /// Stage action failed; the stage's own error is kept as the source
    #[error("Stage '{stage}' failed: {source}")]
    StageExecution {
        stage: String,
        #[source]
        source: Box<CoreError>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Command execution errors raised by stage bodies
    #[error("Command error: {0}")]
    Command(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a policy violation error
    pub fn policy_violation(
        branch: impl Into<String>,
        environment: impl Into<String>,
        allowed: Vec<String>,
    ) -> Self {
        Self::PolicyViolation {
            branch: branch.into(),
            environment: environment.into(),
            allowed,
        }
    }

    /// Create an unknown environment error
    pub fn unknown_environment(name: impl Into<String>, available: Vec<String>) -> Self {
        Self::UnknownEnvironment {
            name: name.into(),
            available,
        }
    }

    /// Create a quality gate failure naming the failing checks
    pub fn quality_gate(failed_checks: Vec<String>) -> Self {
        Self::QualityGateFailure { failed_checks }
    }

    /// Wrap an error raised by a stage action
    pub fn stage(stage: impl Into<String>, source: CoreError) -> Self {
        Self::StageExecution {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a command error
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Name of the stage this error is attributed to, if any.
    pub fn failed_stage(&self) -> Option<&str> {
        match self {
            Self::StageExecution { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
