//! Error types for the gate crate.

use std::path::PathBuf;

/// Errors that can occur while preparing a gate run.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A rule or config file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The ignore-rule document is not a JSON array of rule records.
    #[error("invalid ignore rules: {0}")]
    InvalidRules(String),

    /// The run configuration file is malformed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for gate results.
pub type GateResult<T> = Result<T, GateError>;
