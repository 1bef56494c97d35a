//! Graph builder for flexible configuration
//!
//! Assembles a [`TemporalGraph`] (or [`StaticGraph`]) from a [`Config`] and an
//! optional clock start, validating the configuration once up front.

use crate::clock::{Clock, Timestamp};
use crate::config::{Config, EndpointPolicy, WriteMode};
use crate::error::{GraphError, Result};
use crate::graph::{StaticGraph, TemporalGraph};

/// Builder for graph configuration and initial clock time.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: Config,
    clock_start: Option<Timestamp>,
}

impl GraphBuilder {
    /// Create a new builder with default configuration and a wall-clock start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn endpoint_policy(mut self, policy: EndpointPolicy) -> Self {
        self.config = self.config.with_endpoint_policy(policy);
        self
    }

    pub fn write_mode(mut self, mode: WriteMode) -> Self {
        self.config = self.config.with_write_mode(mode);
        self
    }

    /// Hide an attribute key from rendered node labels.
    pub fn hide_label_key(mut self, key: impl Into<String>) -> Self {
        self.config = self.config.with_hidden_label_key(key);
        self
    }

    /// Start the graph clock at `start` instead of the current time.
    pub fn clock_start(mut self, start: Timestamp) -> Self {
        self.clock_start = Some(start);
        self
    }

    /// Build a temporal graph.
    pub fn build(self) -> Result<TemporalGraph> {
        self.config.validate().map_err(GraphError::InvalidConfig)?;
        let clock = match self.clock_start {
            Some(start) => Clock::starting_at(start),
            None => Clock::new(),
        };
        log::debug!(
            "Building temporal graph: clock at {}, {:?} endpoints, {:?} writes",
            clock.now(),
            self.config.endpoint_policy,
            self.config.write_mode
        );
        Ok(TemporalGraph::with_config(self.config, clock))
    }

    /// Build a static graph. The clock start, if any, is ignored.
    pub fn build_static(self) -> Result<StaticGraph> {
        self.config.validate().map_err(GraphError::InvalidConfig)?;
        Ok(StaticGraph::with_config(self.config))
    }
}
