//! Per-entity version history.

use super::TemporalGraph;
use crate::attributes::Attributes;
use crate::clock::Timestamp;
use crate::entity::{EntityId, VersionKey};
use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every version of one entity, ordered by timestamp.
pub type History = BTreeMap<Timestamp, Attributes>;

/// One version in a [`HistoryExport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub attributes: Attributes,
}

/// Serializable history of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryExport {
    pub entity: EntityId,
    pub entries: Vec<HistoryEntry>,
}

impl HistoryExport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }
}

impl fmt::Display for HistoryExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} at {}: {}", self.entity, entry.timestamp, entry.attributes)?;
        }
        Ok(())
    }
}

impl TemporalGraph {
    /// Every version of `entity`, oldest first.
    ///
    /// Unknown (or malformed) entity ids yield an empty history rather than
    /// an error. The returned map is a copy; later writes do not affect it.
    pub fn history(&self, entity: impl AsRef<str>) -> History {
        let entity = entity.as_ref();
        let timestamps = self.index.timestamps_of(entity);
        self.collect_versions(entity, timestamps)
    }

    /// Versions of `entity` with a timestamp in `[start, end]`.
    pub fn history_between(
        &self,
        entity: impl AsRef<str>,
        start: Timestamp,
        end: Timestamp,
    ) -> History {
        let entity = entity.as_ref();
        let timestamps = self.index.timestamps_between(entity, start, end);
        self.collect_versions(entity, timestamps)
    }

    /// History of a known entity in serializable form.
    pub fn export_history(&self, entity: impl AsRef<str>) -> Result<HistoryExport> {
        let entity = entity.as_ref();
        let id = match self.index.entity(entity) {
            Some(id) => id.clone(),
            None => return Err(GraphError::UnknownEntity(EntityId::parse(entity)?)),
        };
        let entries = self
            .history(entity)
            .into_iter()
            .map(|(timestamp, attributes)| HistoryEntry {
                timestamp,
                attributes,
            })
            .collect();
        Ok(HistoryExport { entity: id, entries })
    }

    fn collect_versions(&self, entity: &str, timestamps: Vec<Timestamp>) -> History {
        let Some(id) = self.index.entity(entity) else {
            return History::new();
        };
        timestamps
            .into_iter()
            .filter_map(|ts| {
                let key = VersionKey::new(id.clone(), ts);
                self.store.attributes(&key).map(|attrs| (ts, attrs.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ts(secs: u64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    fn robot_graph() -> TemporalGraph {
        let mut g = TemporalGraph::starting_at(ts(0));
        for battery in [1.0, 0.8, 0.6] {
            g.write_node("Robot1", Attributes::new().with_kind("robot").with("battery", battery), None)
                .unwrap();
            g.advance_clock(Duration::from_secs(1800));
        }
        g
    }

    #[test]
    fn test_history_is_ordered() {
        let g = robot_graph();
        let history = g.history("Robot1");
        let timestamps: Vec<Timestamp> = history.keys().copied().collect();
        assert_eq!(timestamps, vec![ts(0), ts(1800), ts(3600)]);

        let (_, last) = history.last_key_value().unwrap();
        assert_eq!(last, g.read_latest("Robot1").unwrap());
    }

    #[test]
    fn test_history_unknown_entity_is_empty() {
        let g = robot_graph();
        assert!(g.history("Robot9").is_empty());
        assert!(g.history("").is_empty());
    }

    #[test]
    fn test_history_is_a_copy() {
        let mut g = robot_graph();
        let before = g.history("Robot1");
        g.write_node_at("Robot1", ts(0), Attributes::new().with("battery", 0.1))
            .unwrap();
        assert_eq!(before[&ts(0)].get_f64("battery"), Some(1.0));
    }

    #[test]
    fn test_history_between() {
        let g = robot_graph();
        let middle = g.history_between("Robot1", ts(1), ts(3600));
        assert_eq!(middle.len(), 2);
        assert!(g.history_between("Robot1", ts(3600), ts(0)).is_empty());
    }

    #[test]
    fn test_export_history() {
        let g = robot_graph();
        let export = g.export_history("Robot1").unwrap();
        assert_eq!(export.entries.len(), 3);
        assert_eq!(export.latest().unwrap().timestamp, ts(3600));

        let rendered = export.to_string();
        let first = rendered.lines().next().unwrap();
        assert_eq!(first, "Robot1 at 0.000: {kind: robot, battery: 1.0}");

        let parsed = HistoryExport::from_json(&export.to_json().unwrap()).unwrap();
        assert_eq!(parsed, export);

        assert!(matches!(
            g.export_history("Robot9"),
            Err(GraphError::UnknownEntity(_))
        ));
    }
}
