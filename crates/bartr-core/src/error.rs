//! Error taxonomy for the trade-closing core.

use thiserror::Error;
use uuid::Uuid;

/// Protocol errors - what a close request can fail with.
#[derive(Debug, Error)]
pub enum TradeError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("post {post_id} {reason}")]
    InvalidState { post_id: Uuid, reason: &'static str },

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Store-level errors, reported by `TradeStore` implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A state guard in a close batch did not hold at commit time.
    /// The batch was discarded without applying anything.
    #[error("post {post_id} state guard failed at commit")]
    Guard { post_id: Uuid },
}

impl From<StoreError> for TradeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => TradeError::NotFound { entity, id },
            // The post changed state between the pre-read and the commit;
            // to the caller this is the same precondition violation.
            StoreError::Guard { post_id } => TradeError::InvalidState {
                post_id,
                reason: "is not available for closing",
            },
            StoreError::Connection(msg) => TradeError::Storage(msg),
            StoreError::Query(msg) => TradeError::Storage(msg),
        }
    }
}
