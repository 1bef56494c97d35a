//! Common interface over temporal and static graphs.

use super::{History, StaticGraph, TemporalGraph};
use crate::attributes::Attributes;
use crate::clock::Timestamp;
use crate::compute::projection::{Snapshot, TimeWindow};
use crate::config::WriteOptions;
use crate::entity::{EntityId, VersionKey};
use crate::error::Result;
use crate::store::EdgeId;

/// Operations shared by every knowledge graph flavour.
///
/// Timestamps are optional throughout: a temporal graph fills a missing one
/// from its clock (writes) or the latest version (reads), while a static
/// graph ignores them.
pub trait KnowledgeGraph {
    fn is_temporal(&self) -> bool;

    fn write_node(
        &mut self,
        entity: &str,
        attributes: Attributes,
        timestamp: Option<Timestamp>,
    ) -> Result<VersionKey>;

    /// Edge from `from@from_timestamp` to `to@to_timestamp`. A missing
    /// timestamp means the current clock time.
    fn write_edge(
        &mut self,
        from: &str,
        from_timestamp: Option<Timestamp>,
        to: &str,
        to_timestamp: Option<Timestamp>,
        relation: &str,
        attributes: Attributes,
    ) -> Result<EdgeId>;

    /// Attributes at exactly `timestamp`, or of the latest version if `None`.
    fn read_node(&self, entity: &str, timestamp: Option<Timestamp>) -> Result<Attributes>;

    fn read_latest(&self, entity: &str) -> Result<Attributes> {
        self.read_node(entity, None)
    }

    fn history(&self, entity: &str) -> History;

    fn project(&self, window: TimeWindow) -> Result<Snapshot>;
}

fn write_options(timestamp: Option<Timestamp>) -> Option<WriteOptions> {
    timestamp.map(WriteOptions::at)
}

impl KnowledgeGraph for TemporalGraph {
    fn is_temporal(&self) -> bool {
        true
    }

    fn write_node(
        &mut self,
        entity: &str,
        attributes: Attributes,
        timestamp: Option<Timestamp>,
    ) -> Result<VersionKey> {
        TemporalGraph::write_node(self, entity, attributes, write_options(timestamp))
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
        let now = self.now();
        TemporalGraph::write_edge(
            self,
            from,
            from_timestamp.unwrap_or(now),
            to,
            to_timestamp.unwrap_or(now),
            relation,
            attributes,
        )
    }

    fn read_node(&self, entity: &str, timestamp: Option<Timestamp>) -> Result<Attributes> {
        match timestamp {
            Some(ts) => TemporalGraph::read_node(self, entity, ts).cloned(),
            None => TemporalGraph::read_latest(self, entity).cloned(),
        }
    }

    fn history(&self, entity: &str) -> History {
        TemporalGraph::history(self, entity)
    }

    fn project(&self, window: TimeWindow) -> Result<Snapshot> {
        TemporalGraph::project(self, window)
    }
}

impl KnowledgeGraph for StaticGraph {
    fn is_temporal(&self) -> bool {
        false
    }

    fn write_node(
        &mut self,
        entity: &str,
        attributes: Attributes,
        _timestamp: Option<Timestamp>,
    ) -> Result<VersionKey> {
        StaticGraph::write_node(self, entity, attributes)?;
        Ok(VersionKey::new(EntityId::parse(entity)?, Timestamp::STATIC))
    }

    fn write_edge(
        &mut self,
        from: &str,
        _from_timestamp: Option<Timestamp>,
        to: &str,
        _to_timestamp: Option<Timestamp>,
        relation: &str,
        attributes: Attributes,
    ) -> Result<EdgeId> {
        self.add_edge(from, to, relation, attributes)
    }

    fn read_node(&self, entity: &str, _timestamp: Option<Timestamp>) -> Result<Attributes> {
        StaticGraph::read_node(self, entity).cloned()
    }

    fn history(&self, entity: &str) -> History {
        self.as_temporal().history(entity)
    }

    /// The window is ignored; a static graph always projects whole.
    fn project(&self, _window: TimeWindow) -> Result<Snapshot> {
        StaticGraph::project(self)
    }
}
