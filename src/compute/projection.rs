//! Time-window projection.
//!
//! Collapses every version inside a closed time window down to one node per
//! entity and keeps the edges whose two endpoint versions both fall inside
//! the window. The result is a plain, non-temporal [`Snapshot`] suitable for
//! a renderer or an export adapter.
//!
//! When an entity has several versions in the window, the one with the
//! greatest timestamp wins (last write wins). Callers that need every version
//! should read the entity's history instead.

use crate::attributes::Attributes;
use crate::clock::Timestamp;
use crate::entity::{EntityId, VersionKey};
use crate::error::{GraphError, Result};
use crate::index::TemporalIndex;
use crate::store::{EdgeId, VersionStore};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Closed time interval `[start, end]`. A missing bound defaults to the
/// store's earliest (start) or latest (end) timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl TimeWindow {
    /// The whole store.
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub const fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A single instant.
    pub const fn at(instant: Timestamp) -> Self {
        Self::between(instant, instant)
    }

    pub const fn from(start: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub const fn until(end: Timestamp) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Fill in missing bounds from the index.
    ///
    /// # Errors
    ///
    /// `GraphError::EmptyStoreWindow` if a bound is missing and the index
    /// holds no versions.
    pub fn resolve(&self, index: &TemporalIndex) -> Result<(Timestamp, Timestamp)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok((start, end)),
            (start, end) => {
                let (min, max) = index.bounds().ok_or(GraphError::EmptyStoreWindow)?;
                Ok((start.unwrap_or(min), end.unwrap_or(max)))
            }
        }
    }
}

/// One entity in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedNode {
    pub entity: EntityId,
    /// Timestamp of the version the attributes were taken from.
    pub version: Timestamp,
    pub attributes: Attributes,
}

/// One edge in a snapshot, between entities rather than versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedEdge {
    pub id: EdgeId,
    pub from: EntityId,
    pub to: EntityId,
    pub relation: String,
    pub attributes: Attributes,
}

/// Non-temporal graph derived from a time window.
///
/// Nodes are kept sorted by entity id and edges by edge id, so projecting the
/// same window twice without intervening writes yields identical snapshots.
/// The ordering is re-established when a snapshot is deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub start: Timestamp,
    pub end: Timestamp,
    #[serde(deserialize_with = "sorted_nodes")]
    nodes: Vec<ProjectedNode>,
    #[serde(deserialize_with = "sorted_edges")]
    edges: Vec<ProjectedEdge>,
    /// Attribute keys left out of `node_labels`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hidden_label_keys: Vec<String>,
}

fn sorted_nodes<'de, D>(deserializer: D) -> std::result::Result<Vec<ProjectedNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut nodes = Vec::<ProjectedNode>::deserialize(deserializer)?;
    nodes.sort_by(|a, b| a.entity.cmp(&b.entity));
    Ok(nodes)
}

fn sorted_edges<'de, D>(deserializer: D) -> std::result::Result<Vec<ProjectedEdge>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut edges = Vec::<ProjectedEdge>::deserialize(deserializer)?;
    edges.sort_by_key(|e| e.id);
    Ok(edges)
}

impl Snapshot {
    pub fn empty(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end,
            nodes: Vec::new(),
            edges: Vec::new(),
            hidden_label_keys: Vec::new(),
        }
    }

    /// Projected nodes, ordered by entity id.
    pub fn nodes(&self) -> &[ProjectedNode] {
        &self.nodes
    }

    /// Projected edges, ordered by edge id.
    pub fn edges(&self) -> &[ProjectedEdge] {
        &self.edges
    }

    /// Attribute keys hidden from [`node_labels`](Self::node_labels).
    pub fn hidden_label_keys(&self) -> &[String] {
        &self.hidden_label_keys
    }

    pub fn node(&self, entity: &str) -> Option<&ProjectedNode> {
        self.nodes
            .binary_search_by(|n| n.entity.as_str().cmp(entity))
            .ok()
            .map(|i| &self.nodes[i])
    }

    pub fn contains_node(&self, entity: &str) -> bool {
        self.node(entity).is_some()
    }

    pub fn edges_from<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a ProjectedEdge> + 'a {
        self.edges.iter().filter(move |e| e.from.as_str() == entity)
    }

    pub fn edges_to<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a ProjectedEdge> + 'a {
        self.edges.iter().filter(move |e| e.to.as_str() == entity)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Display label per node: the entity id followed by one `key: value`
    /// line per visible attribute. The kind tag is never shown.
    pub fn node_labels(&self) -> BTreeMap<EntityId, String> {
        self.nodes
            .iter()
            .map(|node| {
                let mut label = node.entity.to_string();
                for line in node.attributes.display_lines(&self.hidden_label_keys) {
                    label.push('\n');
                    label.push_str(&line);
                }
                (node.entity.clone(), label)
            })
            .collect()
    }

    /// Relation label per edge.
    pub fn edge_labels(&self) -> Vec<(EntityId, EntityId, String)> {
        self.edges
            .iter()
            .map(|e| (e.from.clone(), e.to.clone(), e.relation.clone()))
            .collect()
    }

    pub fn title(&self) -> String {
        format!("Temporal Knowledge Graph\n{} to {}", self.start, self.end)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Project the store onto `window`.
pub(crate) fn project(
    store: &VersionStore,
    index: &TemporalIndex,
    window: TimeWindow,
    hidden_label_keys: &[String],
) -> Result<Snapshot> {
    let (start, end) = window.resolve(index)?;
    let mut snapshot = Snapshot::empty(start, end);
    snapshot.hidden_label_keys = hidden_label_keys.to_vec();

    if start > end {
        log::trace!("Empty projection window {} to {}", start, end);
        return Ok(snapshot);
    }

    // Ascending scan: a later version of the same entity overwrites an earlier one.
    let mut winners: BTreeMap<&EntityId, Timestamp> = BTreeMap::new();
    let mut edge_ids: Vec<EdgeId> = Vec::new();
    for (timestamp, entity) in index.versions_between(start, end) {
        winners.insert(entity, timestamp);

        let key = VersionKey::new(entity.clone(), timestamp);
        edge_ids.extend(
            store
                .outgoing(&key)
                .filter(|e| e.to.timestamp >= start && e.to.timestamp <= end)
                .map(|e| e.id),
        );
    }

    for (entity, timestamp) in winners {
        let key = VersionKey::new(entity.clone(), timestamp);
        let Some(attributes) = store.attributes(&key) else {
            log::warn!("Index lists {} but the store has no such version", key);
            continue;
        };
        snapshot.nodes.push(ProjectedNode {
            entity: entity.clone(),
            version: timestamp,
            attributes: attributes.clone(),
        });
    }

    edge_ids.sort_unstable();
    snapshot.edges = edge_ids
        .into_iter()
        .filter_map(|id| store.edge(id))
        .map(|e| ProjectedEdge {
            id: e.id,
            from: e.from.entity.clone(),
            to: e.to.entity.clone(),
            relation: e.relation.clone(),
            attributes: e.attributes.clone(),
        })
        .collect();

    log::trace!(
        "Projected {} to {}: {} nodes, {} edges",
        start,
        end,
        snapshot.nodes.len(),
        snapshot.edges.len()
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteMode;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn key(entity: &str, secs: u64) -> VersionKey {
        VersionKey::new(EntityId::parse(entity).unwrap(), ts(secs))
    }

    fn put(store: &mut VersionStore, index: &mut TemporalIndex, k: &VersionKey, attrs: Attributes) {
        store.put(k.clone(), attrs, WriteMode::Merge);
        index.record(&k.entity, k.timestamp);
    }

    #[test]
    fn test_resolve_defaults_from_index() {
        let mut index = TemporalIndex::new();
        assert!(matches!(
            TimeWindow::all().resolve(&index),
            Err(GraphError::EmptyStoreWindow)
        ));
        assert!(matches!(
            TimeWindow::from(ts(5)).resolve(&index),
            Err(GraphError::EmptyStoreWindow)
        ));
        assert_eq!(
            TimeWindow::between(ts(1), ts(2)).resolve(&index).unwrap(),
            (ts(1), ts(2))
        );

        index.record(&EntityId::parse("A").unwrap(), ts(10));
        index.record(&EntityId::parse("B").unwrap(), ts(40));
        assert_eq!(TimeWindow::all().resolve(&index).unwrap(), (ts(10), ts(40)));
        assert_eq!(TimeWindow::from(ts(20)).resolve(&index).unwrap(), (ts(20), ts(40)));
        assert_eq!(TimeWindow::until(ts(20)).resolve(&index).unwrap(), (ts(10), ts(20)));
    }

    #[test]
    fn test_latest_version_in_window_wins() {
        let mut store = VersionStore::new();
        let mut index = TemporalIndex::new();
        put(&mut store, &mut index, &key("Robot1", 0), Attributes::new().with("battery", 1.0));
        put(&mut store, &mut index, &key("Robot1", 30), Attributes::new().with("battery", 0.8));
        put(&mut store, &mut index, &key("Robot1", 60), Attributes::new().with("battery", 0.6));

        let snapshot = project(&store, &index, TimeWindow::between(ts(0), ts(45)), &[]).unwrap();
        let node = snapshot.node("Robot1").unwrap();
        assert_eq!(node.version, ts(30));
        assert_eq!(node.attributes.get_f64("battery"), Some(0.8));
        assert_eq!(snapshot.node_count(), 1);
    }

    #[test]
    fn test_edges_need_both_endpoints_in_window() {
        let mut store = VersionStore::new();
        let mut index = TemporalIndex::new();
        let r0 = key("Robot1", 0);
        let r30 = key("Robot1", 30);
        let s0 = key("Shelf1", 0);
        for k in [&r0, &r30, &s0] {
            put(&mut store, &mut index, k, Attributes::new());
        }
        store.insert_edge(r0.clone(), s0.clone(), "can_access".into(), Attributes::new());
        store.insert_edge(r0.clone(), r30.clone(), "moved_to".into(), Attributes::new());

        let at_zero = project(&store, &index, TimeWindow::at(ts(0)), &[]).unwrap();
        assert_eq!(at_zero.edge_count(), 1);
        assert_eq!(at_zero.edges()[0].relation, "can_access");

        let both = project(&store, &index, TimeWindow::all(), &[]).unwrap();
        assert_eq!(both.edge_count(), 2);
        assert_eq!(both.edges_from("Robot1").count(), 2);
        assert_eq!(both.edges_to("Robot1").count(), 1);

        let later = project(&store, &index, TimeWindow::at(ts(30)), &[]).unwrap();
        assert_eq!(later.edge_count(), 0);
        assert!(!later.contains_node("Shelf1"));
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let mut store = VersionStore::new();
        let mut index = TemporalIndex::new();
        put(&mut store, &mut index, &key("A", 5), Attributes::new());

        let snapshot = project(&store, &index, TimeWindow::between(ts(10), ts(0)), &[]).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.edge_count(), 0);
    }

    #[test]
    fn test_hidden_keys_survive_json() {
        let mut store = VersionStore::new();
        let mut index = TemporalIndex::new();
        put(
            &mut store,
            &mut index,
            &key("Robot1", 0),
            Attributes::new().with("battery", 1.0).with("serial", "X"),
        );

        let hidden = vec!["serial".to_string()];
        let snapshot = project(&store, &index, TimeWindow::all(), &hidden).unwrap();
        let restored: Snapshot = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(restored.node_labels(), snapshot.node_labels());
        assert_eq!(restored.hidden_label_keys(), ["serial".to_string()]);
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_deserialize_restores_ordering() {
        let json = r#"{
            "start": 0,
            "end": 0,
            "nodes": [
                { "entity": "Shelf1", "version": 0, "attributes": {} },
                { "entity": "Robot1", "version": 0, "attributes": {} }
            ],
            "edges": [
                { "id": 7, "from": "Robot1", "to": "Shelf1", "relation": "b", "attributes": {} },
                { "id": 2, "from": "Robot1", "to": "Shelf1", "relation": "a", "attributes": {} }
            ]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        assert!(snapshot.contains_node("Robot1"));
        assert!(snapshot.contains_node("Shelf1"));
        assert_eq!(snapshot.nodes()[0].entity.as_str(), "Robot1");
        assert_eq!(snapshot.edges()[0].relation, "a");
        assert!(snapshot.hidden_label_keys().is_empty());
    }

    #[test]
    fn test_labels_hide_kind_and_configured_keys() {
        let mut store = VersionStore::new();
        let mut index = TemporalIndex::new();
        put(
            &mut store,
            &mut index,
            &key("Robot1", 0),
            Attributes::new()
                .with_kind("robot")
                .with("battery", 1.0)
                .with("serial", "X-1"),
        );

        let hidden = vec!["serial".to_string()];
        let snapshot = project(&store, &index, TimeWindow::all(), &hidden).unwrap();
        let labels = snapshot.node_labels();
        let label = labels.get("Robot1").unwrap();
        assert_eq!(label, "Robot1\nbattery: 1.0");
        assert_eq!(snapshot.title(), "Temporal Knowledge Graph\n0.000 to 0.000");
    }
}
