//! Entity identities and version keys.

use crate::clock::Timestamp;
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Logical identity of a tracked object (a robot, a shelf, ...).
///
/// Entities are never stored on their own; only their versions are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub const MAX_LEN: usize = 255;

    /// Parses and validates a string as an entity id.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidInput` if the id is empty, longer than
    /// [`EntityId::MAX_LEN`] bytes, or contains a NUL byte.
    pub fn parse<S: Into<String>>(id: S) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(GraphError::InvalidInput("Entity id cannot be empty".into()));
        }

        if id.contains('\0') {
            return Err(GraphError::InvalidInput(
                "Entity id cannot contain null bytes".into(),
            ));
        }

        if id.len() > Self::MAX_LEN {
            return Err(GraphError::InvalidInput(format!(
                "Entity id cannot exceed {} bytes",
                Self::MAX_LEN
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for EntityId {
    type Error = GraphError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one stored version: an entity at an exact timestamp.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub entity: EntityId,
    pub timestamp: Timestamp,
}

impl VersionKey {
    pub fn new(entity: EntityId, timestamp: Timestamp) -> Self {
        Self { entity, timestamp }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.entity, self.timestamp)
    }
}
