//! Temporal index over stored versions.
//!
//! Two views of the same set of `(entity, timestamp)` pairs:
//! - per entity, the ascending set of timestamps (latest / history lookups);
//! - per timestamp, the entities that have a version then (window scans and
//!   the global time bounds).
//!
//! The index is derived data. `rebuild` recreates it from a [`VersionStore`]
//! if it is ever suspected to be out of step.

use crate::clock::Timestamp;
use crate::entity::EntityId;
use crate::store::VersionStore;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TemporalIndex {
    by_entity: FxHashMap<EntityId, BTreeSet<Timestamp>>,
    by_time: BTreeMap<Timestamp, BTreeSet<EntityId>>,
}

impl TemporalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version. Idempotent; returns `true` if the pair was new.
    pub fn record(&mut self, entity: &EntityId, timestamp: Timestamp) -> bool {
        let inserted = self
            .by_entity
            .entry(entity.clone())
            .or_default()
            .insert(timestamp);
        if inserted {
            self.by_time
                .entry(timestamp)
                .or_default()
                .insert(entity.clone());
        }
        inserted
    }

    /// Drop a version. Entities left without timestamps disappear entirely.
    pub fn forget(&mut self, entity: &EntityId, timestamp: Timestamp) -> bool {
        let Some(timestamps) = self.by_entity.get_mut(entity) else {
            return false;
        };
        if !timestamps.remove(&timestamp) {
            return false;
        }
        if timestamps.is_empty() {
            self.by_entity.remove(entity);
        }
        if let Some(entities) = self.by_time.get_mut(&timestamp) {
            entities.remove(entity);
            if entities.is_empty() {
                self.by_time.remove(&timestamp);
            }
        }
        true
    }

    /// Ascending timestamps of an entity; empty if the entity is unknown.
    pub fn timestamps_of(&self, entity: &str) -> Vec<Timestamp> {
        self.by_entity
            .get(entity)
            .map(|ts| ts.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Ascending timestamps of an entity within `[start, end]`.
    pub fn timestamps_between(&self, entity: &str, start: Timestamp, end: Timestamp) -> Vec<Timestamp> {
        if start > end {
            return Vec::new();
        }
        self.by_entity
            .get(entity)
            .map(|ts| ts.range(start..=end).copied().collect())
            .unwrap_or_default()
    }

    pub fn latest_timestamp(&self, entity: &str) -> Option<Timestamp> {
        self.by_entity.get(entity)?.last().copied()
    }

    pub fn earliest_timestamp(&self, entity: &str) -> Option<Timestamp> {
        self.by_entity.get(entity)?.first().copied()
    }

    /// Greatest timestamp of `entity` that is `<= at`.
    pub fn latest_at_or_before(&self, entity: &str, at: Timestamp) -> Option<Timestamp> {
        self.by_entity.get(entity)?.range(..=at).next_back().copied()
    }

    pub fn contains(&self, entity: &str, timestamp: Timestamp) -> bool {
        self.by_entity
            .get(entity)
            .is_some_and(|ts| ts.contains(&timestamp))
    }

    /// The stored id for `entity`, if it has any version.
    pub fn entity(&self, entity: &str) -> Option<&EntityId> {
        self.by_entity.get_key_value(entity).map(|(id, _)| id)
    }

    pub fn contains_entity(&self, entity: &str) -> bool {
        self.by_entity.contains_key(entity)
    }

    /// Known entities, sorted.
    pub fn entities(&self) -> Vec<&EntityId> {
        let mut ids: Vec<&EntityId> = self.by_entity.keys().collect();
        ids.sort_unstable();
        ids
    }

    pub fn entity_count(&self) -> usize {
        self.by_entity.len()
    }

    /// Minimum and maximum timestamp across all versions.
    pub fn bounds(&self) -> Option<(Timestamp, Timestamp)> {
        let (min, _) = self.by_time.first_key_value()?;
        let (max, _) = self.by_time.last_key_value()?;
        Some((*min, *max))
    }

    /// Versions with a timestamp in `[start, end]`, ascending by timestamp
    /// and then by entity.
    pub fn versions_between(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> impl Iterator<Item = (Timestamp, &EntityId)> + '_ {
        let range = if start <= end {
            Some(self.by_time.range(start..=end))
        } else {
            None
        };
        range
            .into_iter()
            .flatten()
            .flat_map(|(ts, entities)| entities.iter().map(move |e| (*ts, e)))
    }

    pub fn version_count(&self) -> usize {
        self.by_entity.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_entity.clear();
        self.by_time.clear();
    }

    /// Rebuild the index from a full scan of the store.
    pub fn rebuild(store: &VersionStore) -> Self {
        let mut index = Self::new();
        for key in store.keys() {
            index.record(&key.entity, key.timestamp);
        }
        index
    }

    /// `true` if the index describes exactly the versions in `store`.
    pub fn is_consistent_with(&self, store: &VersionStore) -> bool {
        self.version_count() == store.len()
            && store
                .keys()
                .all(|key| self.contains(key.entity.as_str(), key.timestamp))
    }
}
