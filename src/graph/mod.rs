//! Core graph implementation for tempograph.
//!
//! This module defines the main `TemporalGraph` type: it owns the version
//! store, keeps the temporal index in step with every write, and carries the
//! clock that stamps writes made without an explicit timestamp.

use crate::attributes::Attributes;
use crate::clock::{Clock, Timestamp};
use crate::compute::projection::{self, Snapshot, TimeWindow};
use crate::config::{Config, EndpointPolicy, GraphStats, WriteOptions};
use crate::entity::{EntityId, VersionKey};
use crate::error::{GraphError, Result};
use crate::index::TemporalIndex;
use crate::store::{Edge, EdgeId, VersionStore};
use std::time::Duration;

mod history;
mod knowledge;
mod static_graph;

#[cfg(feature = "sync")]
mod sync;

pub use history::{History, HistoryEntry, HistoryExport};
pub use knowledge::KnowledgeGraph;
pub use static_graph::StaticGraph;

#[cfg(feature = "sync")]
pub use sync::SyncGraph;

/// In-memory temporal knowledge graph.
///
/// Every write lands on a *version*: an entity at an exact timestamp. Older
/// versions stay queryable, and edges bind the two exact versions they were
/// written between.
///
/// # Thread Safety
///
/// `TemporalGraph` is a plain owned value with no interior locking. Share it
/// across threads by wrapping the whole graph in one lock (the `sync`
/// feature provides `SyncGraph` for this).
///
/// # Examples
///
/// ```rust
/// use tempograph::{Attributes, TemporalGraph, Timestamp, TimeWindow};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut graph = TemporalGraph::starting_at(Timestamp::from_secs(0));
///
/// graph.write_node("Robot1", Attributes::new().with("battery", 1.0), None)?;
/// graph.write_node("Shelf1", Attributes::new().with("inventory", 50), None)?;
/// graph.link("Robot1", "Shelf1", "can_access", Attributes::new(), None)?;
///
/// graph.advance_clock(std::time::Duration::from_secs(30));
/// graph.write_node("Robot1", Attributes::new().with("battery", 0.8), None)?;
///
/// assert_eq!(graph.read_latest("Robot1")?.get_f64("battery"), Some(0.8));
/// assert_eq!(graph.history("Robot1").len(), 2);
///
/// let snapshot = graph.project(TimeWindow::at(Timestamp::from_secs(0)))?;
/// assert_eq!(snapshot.node_count(), 2);
/// assert_eq!(snapshot.edge_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TemporalGraph {
    store: VersionStore,
    index: TemporalIndex,
    clock: Clock,
    config: Config,
    stats: GraphStats,
}

impl TemporalGraph {
    /// Empty graph with default configuration and a clock at the current time.
    pub fn new() -> Self {
        Self::with_config(Config::default(), Clock::new())
    }

    /// Empty graph whose clock starts at `start`.
    pub fn starting_at(start: Timestamp) -> Self {
        Self::with_config(Config::default(), Clock::starting_at(start))
    }

    pub(crate) fn with_config(config: Config, clock: Clock) -> Self {
        Self {
            store: VersionStore::new(),
            index: TemporalIndex::new(),
            clock,
            config,
            stats: GraphStats::new(),
        }
    }

    pub fn builder() -> crate::builder::GraphBuilder {
        crate::builder::GraphBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Current clock time, used for writes without an explicit timestamp.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Move the clock forward and return the new time.
    pub fn advance_clock(&mut self, step: Duration) -> Timestamp {
        self.clock.advance(step)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            entity_count: self.index.entity_count(),
            version_count: self.store.len(),
            edge_count: self.store.edge_count(),
            ..self.stats.clone()
        }
    }

    /// Insert or update the version of `entity` at the write timestamp.
    ///
    /// The timestamp comes from `opts`, or from the clock when absent. An
    /// existing version at that exact timestamp is merged or replaced
    /// according to [`Config::write_mode`]; versions at other timestamps are
    /// never touched.
    pub fn write_node(
        &mut self,
        entity: impl AsRef<str>,
        attributes: Attributes,
        opts: Option<WriteOptions>,
    ) -> Result<VersionKey> {
        let entity = EntityId::parse(entity.as_ref())?;
        let timestamp = WriteOptions::resolve(opts.as_ref(), self.clock.now());
        let key = VersionKey::new(entity, timestamp);

        let created = self
            .store
            .put(key.clone(), attributes, self.config.write_mode);
        self.index.record(&key.entity, key.timestamp);
        self.stats.record_operation();

        log::debug!(
            "{} version {}",
            if created { "Created" } else { "Updated" },
            key
        );
        Ok(key)
    }

    /// [`write_node`](Self::write_node) at an explicit timestamp.
    pub fn write_node_at(
        &mut self,
        entity: impl AsRef<str>,
        timestamp: Timestamp,
        attributes: Attributes,
    ) -> Result<VersionKey> {
        self.write_node(entity, attributes, Some(WriteOptions::at(timestamp)))
    }

    /// Same as [`write_node`](Self::write_node); every update of a temporal
    /// graph is a write at some timestamp.
    pub fn update_node(
        &mut self,
        entity: impl AsRef<str>,
        attributes: Attributes,
        opts: Option<WriteOptions>,
    ) -> Result<VersionKey> {
        self.write_node(entity, attributes, opts)
    }

    /// Insert an edge from `from_entity@from_timestamp` to
    /// `to_entity@to_timestamp`.
    ///
    /// Missing endpoint versions are created empty or rejected according to
    /// [`Config::endpoint_policy`]. With `Reject`, nothing is written when
    /// either endpoint is missing.
    pub fn write_edge(
        &mut self,
        from_entity: impl AsRef<str>,
        from_timestamp: Timestamp,
        to_entity: impl AsRef<str>,
        to_timestamp: Timestamp,
        relation: impl Into<String>,
        attributes: Attributes,
    ) -> Result<EdgeId> {
        let from = VersionKey::new(EntityId::parse(from_entity.as_ref())?, from_timestamp);
        let to = VersionKey::new(EntityId::parse(to_entity.as_ref())?, to_timestamp);

        if self.config.endpoint_policy == EndpointPolicy::Reject {
            for endpoint in [&from, &to] {
                if !self.store.contains(endpoint) {
                    return Err(GraphError::DanglingEdgeEndpoint {
                        entity: endpoint.entity.clone(),
                        timestamp: endpoint.timestamp,
                    });
                }
            }
        }

        for endpoint in [&from, &to] {
            if self.store.ensure(endpoint) {
                self.index.record(&endpoint.entity, endpoint.timestamp);
                self.stats.record_auto_created();
                log::warn!("Edge endpoint {} did not exist; created empty version", endpoint);
            }
        }

        let relation = relation.into();
        log::debug!("Adding edge {} -[{}]-> {}", from, relation, to);
        let id = self
            .store
            .insert_edge(from.clone(), to.clone(), relation, attributes)
            .ok_or(GraphError::DanglingEdgeEndpoint {
                entity: from.entity,
                timestamp: from.timestamp,
            })?;
        self.stats.record_operation();
        Ok(id)
    }

    /// Edge between the versions of `from` and `to` at one shared timestamp
    /// (explicit in `opts`, or the clock).
    pub fn link(
        &mut self,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
        relation: impl Into<String>,
        attributes: Attributes,
        opts: Option<WriteOptions>,
    ) -> Result<EdgeId> {
        let timestamp = WriteOptions::resolve(opts.as_ref(), self.clock.now());
        self.write_edge(from, timestamp, to, timestamp, relation, attributes)
    }

    /// Attributes of the version at exactly `timestamp`. There is no fallback
    /// to an earlier version; see [`read_as_of`](Self::read_as_of).
    pub fn read_node(&self, entity: impl AsRef<str>, timestamp: Timestamp) -> Result<&Attributes> {
        let id = self.known_entity(entity.as_ref())?;
        let key = VersionKey::new(id.clone(), timestamp);
        self.store
            .attributes(&key)
            .ok_or_else(|| GraphError::NoExactVersion {
                entity: id.clone(),
                timestamp,
            })
    }

    /// Attributes of the most recent version of `entity`.
    pub fn read_latest(&self, entity: impl AsRef<str>) -> Result<&Attributes> {
        self.latest_version(entity).map(|(_, attrs)| attrs)
    }

    /// Timestamp and attributes of the most recent version of `entity`.
    pub fn latest_version(&self, entity: impl AsRef<str>) -> Result<(Timestamp, &Attributes)> {
        let entity = entity.as_ref();
        let id = self.known_entity(entity)?;
        let timestamp = self
            .index
            .latest_timestamp(entity)
            .ok_or_else(|| GraphError::UnknownEntity(id.clone()))?;
        self.version(id, timestamp)
    }

    /// The latest version of `entity` at or before `timestamp`.
    pub fn read_as_of(
        &self,
        entity: impl AsRef<str>,
        timestamp: Timestamp,
    ) -> Result<(Timestamp, &Attributes)> {
        let entity = entity.as_ref();
        let id = self.known_entity(entity)?;
        let found = self
            .index
            .latest_at_or_before(entity, timestamp)
            .ok_or_else(|| GraphError::NoVersionAsOf {
                entity: id.clone(),
                timestamp,
            })?;
        self.version(id, found)
    }

    /// Ascending timestamps at which `entity` has a version.
    pub fn timestamps_of(&self, entity: impl AsRef<str>) -> Vec<Timestamp> {
        self.index.timestamps_of(entity.as_ref())
    }

    /// Remove one version and every edge touching it.
    pub fn remove_version(
        &mut self,
        entity: impl AsRef<str>,
        timestamp: Timestamp,
    ) -> Result<Attributes> {
        let id = self.known_entity(entity.as_ref())?.clone();
        let key = VersionKey::new(id, timestamp);
        let (attributes, edges) = self.store.remove(&key).ok_or_else(|| {
            GraphError::NoExactVersion {
                entity: key.entity.clone(),
                timestamp,
            }
        })?;
        self.index.forget(&key.entity, timestamp);
        self.stats.record_operation();

        log::debug!("Removed version {} and {} incident edges", key, edges.len());
        Ok(attributes)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let edge = self.store.remove_edge(id).ok_or(GraphError::UnknownEdge(id))?;
        self.stats.record_operation();
        Ok(edge)
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.store.edge(id).ok_or(GraphError::UnknownEdge(id))
    }

    /// Edges leaving the version of `entity` at `timestamp`.
    pub fn outgoing(&self, entity: impl AsRef<str>, timestamp: Timestamp) -> Result<Vec<&Edge>> {
        let key = self.existing_version(entity.as_ref(), timestamp)?;
        Ok(self.store.outgoing(&key).collect())
    }

    /// Edges arriving at the version of `entity` at `timestamp`.
    pub fn incoming(&self, entity: impl AsRef<str>, timestamp: Timestamp) -> Result<Vec<&Edge>> {
        let key = self.existing_version(entity.as_ref(), timestamp)?;
        Ok(self.store.incoming(&key).collect())
    }

    /// All edges, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.store.edges()
    }

    /// Known entities, sorted.
    pub fn entities(&self) -> Vec<&EntityId> {
        self.index.entities()
    }

    pub fn contains_entity(&self, entity: impl AsRef<str>) -> bool {
        self.index.contains_entity(entity.as_ref())
    }

    pub fn entity_count(&self) -> usize {
        self.index.entity_count()
    }

    pub fn version_count(&self) -> usize {
        self.store.len()
    }

    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Earliest and latest timestamp across all versions.
    pub fn time_bounds(&self) -> Option<(Timestamp, Timestamp)> {
        self.index.bounds()
    }

    /// Non-temporal snapshot of `window`. See [`TimeWindow`].
    pub fn project(&self, window: TimeWindow) -> Result<Snapshot> {
        projection::project(
            &self.store,
            &self.index,
            window,
            &self.config.label_hidden_keys,
        )
    }

    /// [`project`](Self::project) over the closed interval `[start, end]`.
    pub fn project_between(&self, start: Timestamp, end: Timestamp) -> Result<Snapshot> {
        self.project(TimeWindow::between(start, end))
    }

    /// Recreate the temporal index from a full scan of the store.
    pub fn rebuild_index(&mut self) {
        self.index = TemporalIndex::rebuild(&self.store);
        log::debug!("Rebuilt temporal index: {} versions", self.index.version_count());
    }

    pub fn index_is_consistent(&self) -> bool {
        self.index.is_consistent_with(&self.store)
    }

    fn known_entity(&self, entity: &str) -> Result<&EntityId> {
        match self.index.entity(entity) {
            Some(id) => Ok(id),
            None => Err(GraphError::UnknownEntity(EntityId::parse(entity)?)),
        }
    }

    fn existing_version(&self, entity: &str, timestamp: Timestamp) -> Result<VersionKey> {
        let id = self.known_entity(entity)?;
        let key = VersionKey::new(id.clone(), timestamp);
        if !self.store.contains(&key) {
            return Err(GraphError::NoExactVersion {
                entity: id.clone(),
                timestamp,
            });
        }
        Ok(key)
    }

    fn version(&self, id: &EntityId, timestamp: Timestamp) -> Result<(Timestamp, &Attributes)> {
        let key = VersionKey::new(id.clone(), timestamp);
        self.store
            .attributes(&key)
            .map(|attrs| (timestamp, attrs))
            .ok_or_else(|| GraphError::NoExactVersion {
                entity: id.clone(),
                timestamp,
            })
    }
}

impl Default for TemporalGraph {
    fn default() -> Self {
        Self::new()
    }
}
