//! Error types for world construction and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::collision::ColliderHandle;

/// Errors raised while building or editing a collision world.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("convex hull could not be built from {0} points")]
    DegenerateHull(usize),

    #[error("invalid triangle mesh: {0}")]
    InvalidMesh(String),

    #[error("unknown collider {0:?}")]
    UnknownCollider(ColliderHandle),
}

/// Errors raised while loading or validating movement configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
