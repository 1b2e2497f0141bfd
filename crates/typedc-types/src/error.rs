use thiserror::Error;

/// Errors produced while loading a declaration tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid declaration tree at {path}: {reason}")]
    InvalidTree { path: String, reason: String },

    #[error("json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TypeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/// Convenience alias for loader results.
pub type TypeResult<T> = Result<T, TypeError>;
