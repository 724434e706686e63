//! Error kinds for the tree storage engine, surfaced verbatim to callers.

use thiserror::Error;

/// Errors raised by the path algebra, position allocator, mutation
/// protocols, and service facade.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("parent node {0} not found")]
    ParentNotFound(i64),

    #[error("source node {0} not found")]
    SourceNotFound(i64),

    #[error("target node {0} not found")]
    TargetNotFound(i64),

    #[error("cannot move or clone a node into its own descendant")]
    CycleRejected,

    #[error("tree depth {0} exceeds the maximum of {max}", max = crate::engine::path::MAX_DEPTH)]
    DepthExceeded(i32),

    #[error("label cannot be encoded as JSON: {0}")]
    LabelEncoding(#[from] serde_json::Error),

    #[error("label_json exceeds the {limit} byte limit", limit = crate::engine::mutate::MAX_LABEL_JSON_BYTES)]
    LabelTooLarge,

    #[error("bulk load entry references parent {0} before it is declared")]
    BulkLoadInvalidOrder(i64),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("this operation is disabled in production")]
    ForbiddenInProduction,

    #[error("concurrent mutation conflict, retry the request")]
    ConflictRetry,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl TreeError {
    /// Classify a raw database error as a write conflict the caller should
    /// retry, or else an opaque internal failure. Transactions roll back
    /// either way, so no invariant is ever observed broken at rest.
    pub fn from_db_err(err: sea_orm::DbErr) -> Self {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("serialization")
            || lower.contains("deadlock")
            || lower.contains("could not serialize")
        {
            TreeError::ConflictRetry
        } else {
            TreeError::Database(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
