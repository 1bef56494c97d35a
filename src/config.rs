//! Configuration and per-write options for tempograph graphs.

use crate::clock::Timestamp;
use serde::de::Error;
use serde::{Deserialize, Serialize};

/// What `write_edge` does when an endpoint version does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPolicy {
    /// Create an empty version for the missing endpoint (logged at `warn`).
    #[default]
    AutoCreate,
    /// Fail with `GraphError::DanglingEdgeEndpoint`.
    Reject,
}

/// How a write to an existing (entity, timestamp) pair treats the stored
/// attributes of that same version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Supplied keys overwrite, the rest of that version's keys stay.
    #[default]
    Merge,
    /// The supplied mapping replaces the version's mapping wholesale.
    Replace,
}

/// Graph configuration
///
/// # Example
///
/// ```rust
/// use tempograph::{Config, EndpointPolicy};
///
/// let json = r#"{ "endpoint_policy": "reject", "write_mode": "replace" }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.endpoint_policy, EndpointPolicy::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub endpoint_policy: EndpointPolicy,

    #[serde(default)]
    pub write_mode: WriteMode,

    /// Attribute keys left out of rendered node labels.
    #[serde(default)]
    pub label_hidden_keys: Vec<String>,
}

impl Config {
    const LARGE_HIDDEN_KEY_COUNT: usize = 64;

    pub fn with_endpoint_policy(mut self, policy: EndpointPolicy) -> Self {
        self.endpoint_policy = policy;
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn with_hidden_label_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.label_hidden_keys.contains(&key) {
            self.label_hidden_keys.push(key);
        }
        if self.label_hidden_keys.len() > Self::LARGE_HIDDEN_KEY_COUNT {
            log::warn!(
                "{} hidden label keys configured; label rendering scans all of them per field",
                self.label_hidden_keys.len()
            );
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.label_hidden_keys.iter().any(|k| k.is_empty()) {
            return Err("Hidden label keys cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_policy: EndpointPolicy::default(),
            write_mode: WriteMode::default(),
            label_hidden_keys: Vec::new(),
        }
    }
}

/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Timestamp of the write (defaults to the graph clock if None)
    pub timestamp: Option<Timestamp>,
}

impl WriteOptions {
    pub fn at(timestamp: Timestamp) -> Self {
        Self {
            timestamp: Some(timestamp),
        }
    }

    /// The explicit timestamp, or `default` when none was given.
    pub fn resolve(opts: Option<&WriteOptions>, default: Timestamp) -> Timestamp {
        opts.and_then(|o| o.timestamp).unwrap_or(default)
    }
}

/// Graph statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Entities with at least one version
    pub entity_count: usize,
    pub version_count: usize,
    pub edge_count: usize,
    /// Successful mutating operations since creation
    pub operations_count: u64,
    /// Versions created implicitly as edge endpoints
    pub auto_created_endpoints: u64,
}

impl GraphStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self) {
        self.operations_count += 1;
    }

    pub fn record_auto_created(&mut self) {
        self.auto_created_endpoints += 1;
    }
}
