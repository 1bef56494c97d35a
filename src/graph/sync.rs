//! Thread-safe wrapper for sharing one graph between threads.
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! tempograph = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use tempograph::{Attributes, SyncGraph, Timestamp};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = SyncGraph::starting_at(Timestamp::EPOCH);
//!
//! let writer = graph.clone();
//! let handle = thread::spawn(move || {
//!     writer
//!         .write_node("Robot1", Attributes::new().with("battery", 1.0), None)
//!         .unwrap();
//! });
//! handle.join().unwrap();
//!
//! assert_eq!(graph.read_latest("Robot1")?.get_f64("battery"), Some(1.0));
//! # Ok(())
//! # }
//! ```

use super::{History, KnowledgeGraph, TemporalGraph};
use crate::attributes::Attributes;
use crate::clock::Timestamp;
use crate::compute::projection::{Snapshot, TimeWindow};
use crate::config::{Config, GraphStats, WriteOptions};
use crate::entity::VersionKey;
use crate::error::Result;
use crate::store::EdgeId;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Thread-safe wrapper around `TemporalGraph` using `Arc<RwLock<_>>`.
///
/// Reads (lookups, history, projections) run concurrently; writes and clock
/// moves take the lock exclusively, so every write commits fully before any
/// other operation observes the graph. Reads return owned copies.
#[derive(Clone)]
pub struct SyncGraph {
    inner: Arc<RwLock<TemporalGraph>>,
}

impl SyncGraph {
    pub fn new() -> Self {
        Self::from_graph(TemporalGraph::new())
    }

    pub fn starting_at(start: Timestamp) -> Self {
        Self::from_graph(TemporalGraph::starting_at(start))
    }

    pub fn from_graph(graph: TemporalGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    pub fn write_node(
        &self,
        entity: impl AsRef<str>,
        attributes: Attributes,
        opts: Option<WriteOptions>,
    ) -> Result<VersionKey> {
        self.inner.write().write_node(entity, attributes, opts)
    }

    pub fn link(
        &self,
        from: impl AsRef<str>,
        to: impl AsRef<str>,
        relation: impl Into<String>,
        attributes: Attributes,
        opts: Option<WriteOptions>,
    ) -> Result<EdgeId> {
        self.inner.write().link(from, to, relation, attributes, opts)
    }

    pub fn write_edge(
        &self,
        from_entity: impl AsRef<str>,
        from_timestamp: Timestamp,
        to_entity: impl AsRef<str>,
        to_timestamp: Timestamp,
        relation: impl Into<String>,
        attributes: Attributes,
    ) -> Result<EdgeId> {
        self.inner.write().write_edge(
            from_entity,
            from_timestamp,
            to_entity,
            to_timestamp,
            relation,
            attributes,
        )
    }

    pub fn read_node(&self, entity: impl AsRef<str>, timestamp: Timestamp) -> Result<Attributes> {
        self.inner.read().read_node(entity, timestamp).cloned()
    }

    pub fn read_latest(&self, entity: impl AsRef<str>) -> Result<Attributes> {
        self.inner.read().read_latest(entity).cloned()
    }

    pub fn history(&self, entity: impl AsRef<str>) -> History {
        self.inner.read().history(entity)
    }

    pub fn project(&self, window: TimeWindow) -> Result<Snapshot> {
        self.inner.read().project(window)
    }

    pub fn advance_clock(&self, step: Duration) -> Timestamp {
        self.inner.write().advance_clock(step)
    }

    pub fn now(&self) -> Timestamp {
        self.inner.read().now()
    }

    pub fn config(&self) -> Config {
        self.inner.read().config().clone()
    }

    pub fn stats(&self) -> GraphStats {
        self.inner.read().stats()
    }

    /// Run `f` with shared access to the graph.
    pub fn read<R>(&self, f: impl FnOnce(&TemporalGraph) -> R) -> R {
        f(&*self.inner.read())
    }

    /// Run `f` with exclusive access; several writes in `f` are observed by
    /// other threads all at once.
    pub fn write<R>(&self, f: impl FnOnce(&mut TemporalGraph) -> R) -> R {
        f(&mut *self.inner.write())
    }
}

impl Default for SyncGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeGraph for SyncGraph {
    fn is_temporal(&self) -> bool {
        true
    }

    fn write_node(
        &mut self,
        entity: &str,
        attributes: Attributes,
        timestamp: Option<Timestamp>,
    ) -> Result<VersionKey> {
        self.inner
            .write()
            .write_node(entity, attributes, timestamp.map(WriteOptions::at))
    }

    fn write_edge(
        &mut self,
        from: &str,
        from_timestamp: Option<Timestamp>,
        to: &str,
        to_timestamp: Option<Timestamp>,
        relation: &str,
        attributes: Attributes,
    ) -> Result<EdgeId> {
        KnowledgeGraph::write_edge(
            &mut *self.inner.write(),
            from,
            from_timestamp,
            to,
            to_timestamp,
            relation,
            attributes,
        )
    }

    fn read_node(&self, entity: &str, timestamp: Option<Timestamp>) -> Result<Attributes> {
        KnowledgeGraph::read_node(&*self.inner.read(), entity, timestamp)
    }

    fn history(&self, entity: &str) -> History {
        SyncGraph::history(self, entity)
    }

    fn project(&self, window: TimeWindow) -> Result<Snapshot> {
        SyncGraph::project(self, window)
    }
}
