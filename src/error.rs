//! Error types for level configuration.
//!
//! Generation and motion are infallible; only loading and validating
//! settings can fail.

use thiserror::Error;

use crate::sim::BlockKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown block kind {0:?}")]
    UnknownKind(String),

    #[error("obstacle type set is empty")]
    EmptyTypes,

    #[error("{0:?} is a fixed endpoint and cannot be randomly selected")]
    NotSelectable(BlockKind),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
