//! Version store: the directed multigraph of versions and edges.
//!
//! Versions are keyed by [`VersionKey`] (entity + exact timestamp). Edges
//! connect two specific versions and are kept in insertion order. Each
//! version carries its own adjacency lists so incident edges can be found
//! without scanning the edge table.
//!
//! The store knows nothing about the temporal index; `TemporalGraph` keeps
//! the two in step.

use crate::attributes::Attributes;
use crate::config::WriteMode;
use crate::entity::VersionKey;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of an edge, unique within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u64);

impl EdgeId {
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Directed, labelled relation between two specific versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VersionKey,
    pub to: VersionKey,
    pub relation: String,
    pub attributes: Attributes,
}

type Adjacency = SmallVec<[EdgeId; 4]>;

#[derive(Debug, Clone, Default)]
pub(crate) struct VersionRecord {
    pub attributes: Attributes,
    outgoing: Adjacency,
    incoming: Adjacency,
}

impl VersionRecord {
    fn new(attributes: Attributes) -> Self {
        Self {
            attributes,
            outgoing: Adjacency::new(),
            incoming: Adjacency::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct VersionStore {
    versions: FxHashMap<VersionKey, VersionRecord>,
    edges: BTreeMap<EdgeId, Edge>,
    next_edge_id: u64,
}

impl VersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the version at `key`. Returns `true` if the version
    /// did not exist before.
    pub fn put(&mut self, key: VersionKey, attributes: Attributes, mode: WriteMode) -> bool {
        match self.versions.get_mut(&key) {
            Some(record) => {
                match mode {
                    WriteMode::Merge => record.attributes.merge(attributes),
                    WriteMode::Replace => record.attributes = attributes,
                }
                false
            }
            None => {
                self.versions.insert(key, VersionRecord::new(attributes));
                true
            }
        }
    }

    /// Make sure a version exists at `key`, creating an empty one if needed.
    /// Returns `true` if it had to be created.
    pub fn ensure(&mut self, key: &VersionKey) -> bool {
        if self.versions.contains_key(key) {
            return false;
        }
        self.versions
            .insert(key.clone(), VersionRecord::new(Attributes::new()));
        true
    }

    pub fn contains(&self, key: &VersionKey) -> bool {
        self.versions.contains_key(key)
    }

    pub fn attributes(&self, key: &VersionKey) -> Option<&Attributes> {
        self.versions.get(key).map(|r| &r.attributes)
    }

    /// Add an edge between two existing versions.
    ///
    /// Returns `None` if either endpoint is missing; the caller resolves
    /// endpoints first.
    pub fn insert_edge(
        &mut self,
        from: VersionKey,
        to: VersionKey,
        relation: String,
        attributes: Attributes,
    ) -> Option<EdgeId> {
        if !self.versions.contains_key(&from) || !self.versions.contains_key(&to) {
            return None;
        }

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        if let Some(record) = self.versions.get_mut(&from) {
            record.outgoing.push(id);
        }
        if let Some(record) = self.versions.get_mut(&to) {
            record.incoming.push(id);
        }

        self.edges.insert(
            id,
            Edge {
                id,
                from,
                to,
                relation,
                attributes,
            },
        );
        Some(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Edges leaving the version at `key`, in insertion order.
    pub fn outgoing(&self, key: &VersionKey) -> impl Iterator<Item = &Edge> + '_ {
        self.versions
            .get(key)
            .into_iter()
            .flat_map(|r| r.outgoing.iter())
            .filter_map(|id| self.edges.get(id))
    }

    /// Edges arriving at the version at `key`, in insertion order.
    pub fn incoming(&self, key: &VersionKey) -> impl Iterator<Item = &Edge> + '_ {
        self.versions
            .get(key)
            .into_iter()
            .flat_map(|r| r.incoming.iter())
            .filter_map(|id| self.edges.get(id))
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        if let Some(record) = self.versions.get_mut(&edge.from) {
            record.outgoing.retain(|e| *e != id);
        }
        if let Some(record) = self.versions.get_mut(&edge.to) {
            record.incoming.retain(|e| *e != id);
        }
        Some(edge)
    }

    /// Remove a version together with every edge touching it.
    pub fn remove(&mut self, key: &VersionKey) -> Option<(Attributes, Vec<Edge>)> {
        let record = self.versions.remove(key)?;

        let mut incident: Vec<EdgeId> = record
            .outgoing
            .iter()
            .chain(record.incoming.iter())
            .copied()
            .collect();
        incident.sort_unstable();
        incident.dedup();

        let removed = incident
            .into_iter()
            .filter_map(|id| self.remove_edge(id))
            .collect();
        Some((record.attributes, removed))
    }

    /// All version keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &VersionKey> + '_ {
        self.versions.keys()
    }

    /// All edges, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Timestamp;
    use crate::entity::EntityId;

    fn key(entity: &str, secs: u64) -> VersionKey {
        VersionKey::new(EntityId::parse(entity).unwrap(), Timestamp::from_secs(secs))
    }

    #[test]
    fn test_put_merge_and_replace() {
        let mut store = VersionStore::new();
        let k = key("Robot1", 0);

        assert!(store.put(
            k.clone(),
            Attributes::new().with("battery", 1.0).with("position", (0.0, 0.0)),
            WriteMode::Merge
        ));
        assert!(!store.put(k.clone(), Attributes::new().with("battery", 0.9), WriteMode::Merge));

        let attrs = store.attributes(&k).unwrap();
        assert_eq!(attrs.get_f64("battery"), Some(0.9));
        assert!(attrs.contains_key("position"));

        store.put(k.clone(), Attributes::new().with("battery", 0.7), WriteMode::Replace);
        let attrs = store.attributes(&k).unwrap();
        assert_eq!(attrs.get_f64("battery"), Some(0.7));
        assert!(!attrs.contains_key("position"));
    }

    #[test]
    fn test_multi_edges_between_same_pair() {
        let mut store = VersionStore::new();
        let a = key("Robot1", 0);
        let b = key("Shelf1", 0);
        store.ensure(&a);
        store.ensure(&b);

        let e1 = store
            .insert_edge(a.clone(), b.clone(), "can_access".into(), Attributes::new())
            .unwrap();
        let e2 = store
            .insert_edge(a.clone(), b.clone(), "can_access".into(), Attributes::new())
            .unwrap();
        assert_ne!(e1, e2);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.outgoing(&a).count(), 2);
        assert_eq!(store.incoming(&b).count(), 2);
        assert_eq!(store.incoming(&a).count(), 0);
    }

    #[test]
    fn test_insert_edge_requires_endpoints() {
        let mut store = VersionStore::new();
        let a = key("Robot1", 0);
        store.ensure(&a);
        assert!(store
            .insert_edge(a, key("Ghost", 0), "x".into(), Attributes::new())
            .is_none());
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_remove_drops_incident_edges() {
        let mut store = VersionStore::new();
        let a = key("Robot1", 0);
        let b = key("Shelf1", 0);
        let c = key("Station", 0);
        for k in [&a, &b, &c] {
            store.ensure(k);
        }
        store.insert_edge(a.clone(), b.clone(), "can_access".into(), Attributes::new());
        store.insert_edge(c.clone(), a.clone(), "charges".into(), Attributes::new());
        let kept = store
            .insert_edge(c.clone(), b.clone(), "near".into(), Attributes::new())
            .unwrap();
        // Self-loop appears in both adjacency lists but is removed once.
        store.insert_edge(a.clone(), a.clone(), "self".into(), Attributes::new());

        let (_, removed) = store.remove(&a).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(store.edge_count(), 1);
        assert!(store.edge(kept).is_some());
        assert_eq!(store.outgoing(&c).count(), 1);
        assert_eq!(store.incoming(&b).count(), 1);
        assert!(store.remove(&a).is_none());
    }

    #[test]
    fn test_edges_iterate_in_insertion_order() {
        let mut store = VersionStore::new();
        let a = key("A", 1);
        let b = key("B", 1);
        store.ensure(&a);
        store.ensure(&b);
        for label in ["first", "second", "third"] {
            store.insert_edge(a.clone(), b.clone(), label.into(), Attributes::new());
        }
        let labels: Vec<&str> = store.edges().map(|e| e.relation.as_str()).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }
}
