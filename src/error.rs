//! Error types for tempograph.

use crate::clock::Timestamp;
use crate::entity::EntityId;
use crate::store::EdgeId;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by graph operations.
///
/// Every error is returned synchronously to the caller. Nothing in the store
/// is transient, so no operation retries internally.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The entity has no versions at all.
    #[error("unknown entity '{0}'")]
    UnknownEntity(EntityId),

    /// The entity exists but has no version at exactly this timestamp.
    #[error("entity '{entity}' has no version at {timestamp}")]
    NoExactVersion {
        entity: EntityId,
        timestamp: Timestamp,
    },

    /// The entity exists but every version is newer than the timestamp.
    #[error("entity '{entity}' has no version at or before {timestamp}")]
    NoVersionAsOf {
        entity: EntityId,
        timestamp: Timestamp,
    },

    /// A projection with a defaulted bound was requested on an empty store.
    #[error("cannot derive a default time window from an empty store")]
    EmptyStoreWindow,

    /// An edge referenced a version that does not exist and the endpoint
    /// policy rejects implicit creation.
    #[error("edge endpoint '{entity}' at {timestamp} does not exist")]
    DanglingEdgeEndpoint {
        entity: EntityId,
        timestamp: Timestamp,
    },

    #[error("unknown edge {0}")]
    UnknownEdge(EdgeId),

    /// The clock only moves forward.
    #[error("clock cannot move backwards from {current} to {requested}")]
    ClockRollback {
        current: Timestamp,
        requested: Timestamp,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphError {
    /// Returns `true` for the "nothing stored under this id" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::UnknownEntity(_)
                | GraphError::NoExactVersion { .. }
                | GraphError::NoVersionAsOf { .. }
                | GraphError::UnknownEdge(_)
        )
    }
}
