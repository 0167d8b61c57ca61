//! Failure taxonomy for content-service reads.

use std::time::Duration;
use thiserror::Error;

/// Error returned by every [`ContentService`](crate::service::ContentService) operation.
///
/// Only `NotFound` is distinguished by callers; the remaining variants are
/// all handled as transport failures.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("refusing to re-enter block {node_id}")]
    Cycle { node_id: String },
    #[error("sync depth limit {max_depth} reached at block {node_id}")]
    DepthExceeded { node_id: String, max_depth: usize },
}

impl ServiceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(format!("malformed response: {}", err))
    }
}
