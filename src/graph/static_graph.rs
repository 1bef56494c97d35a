//! Non-temporal knowledge graph.
//!
//! A `StaticGraph` is a [`TemporalGraph`] where every version carries the same
//! fixed timestamp ([`Timestamp::STATIC`]). Each entity therefore has exactly
//! one version and rewrites update it in place.

use super::TemporalGraph;
use crate::attributes::Attributes;
use crate::clock::{Clock, Timestamp};
use crate::compute::projection::{Snapshot, TimeWindow};
use crate::config::{Config, WriteOptions};
use crate::entity::EntityId;
use crate::error::{GraphError, Result};
use crate::store::{Edge, EdgeId};

#[derive(Debug)]
pub struct StaticGraph {
    inner: TemporalGraph,
}

impl StaticGraph {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            inner: TemporalGraph::with_config(config, Clock::starting_at(Timestamp::STATIC)),
        }
    }

    pub fn config(&self) -> &Config {
        self.inner.config()
    }

    /// Insert an entity, or update its attributes if it exists.
    pub fn write_node(&mut self, entity: impl AsRef<str>, attributes: Attributes) -> Result<()> {
        self.inner
            .write_node(entity, attributes, Some(WriteOptions::at(Timestamp::STATIC)))?;
        Ok(())
    }

    /// Update an existing entity.
    ///
    /// # Errors
    ///
    /// `GraphError::UnknownEntity` if the entity was never written.
    pub fn update_node(&mut self, entity: impl AsRef<str>, attributes: Attributes) -> Result<()> {
        let entity = entity.as_ref();
        if !self.inner.contains_entity(entity) {
            return Err(GraphError::UnknownEntity(EntityId::parse(entity)?));
        }
        self.write_node(entity, attributes)
    }

    pub fn add_edge(
        &mut self,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
        relation: impl Into<String>,
        attributes: Attributes,
    ) -> Result<EdgeId> {
        self.inner.write_edge(
            from,
            Timestamp::STATIC,
            to,
            Timestamp::STATIC,
            relation,
            attributes,
        )
    }

    pub fn read_node(&self, entity: impl AsRef<str>) -> Result<&Attributes> {
        self.inner.read_node(entity, Timestamp::STATIC)
    }

    pub fn remove_node(&mut self, entity: impl AsRef<str>) -> Result<Attributes> {
        self.inner.remove_version(entity, Timestamp::STATIC)
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.inner.edge(id)
    }

    pub fn outgoing(&self, entity: impl AsRef<str>) -> Result<Vec<&Edge>> {
        self.inner.outgoing(entity, Timestamp::STATIC)
    }

    pub fn incoming(&self, entity: impl AsRef<str>) -> Result<Vec<&Edge>> {
        self.inner.incoming(entity, Timestamp::STATIC)
    }

    pub fn entities(&self) -> Vec<&EntityId> {
        self.inner.entities()
    }

    pub fn contains_entity(&self, entity: impl AsRef<str>) -> bool {
        self.inner.contains_entity(entity)
    }

    pub fn node_count(&self) -> usize {
        self.inner.entity_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The whole graph as a snapshot. An empty graph yields an empty snapshot.
    pub fn project(&self) -> Result<Snapshot> {
        if self.inner.is_empty() {
            return Ok(Snapshot::empty(Timestamp::STATIC, Timestamp::STATIC));
        }
        self.inner.project(TimeWindow::at(Timestamp::STATIC))
    }

    /// The underlying single-timestamp temporal graph.
    pub fn as_temporal(&self) -> &TemporalGraph {
        &self.inner
    }
}

impl Default for StaticGraph {
    fn default() -> Self {
        Self::new()
    }
}
