//! In-memory temporal knowledge graph with versioned entities, history queries,
//! and time-window projection.
//!
//! ```rust
//! use std::time::Duration;
//! use tempograph::{Attributes, TemporalGraph, Timestamp, TimeWindow};
//!
//! let mut graph = TemporalGraph::starting_at(Timestamp::EPOCH);
//! graph.write_node("Robot1", Attributes::new().with_kind("robot").with("battery", 1.0), None)?;
//! graph.write_node("Shelf1", Attributes::new().with_kind("shelf").with("inventory", 50), None)?;
//! graph.link("Robot1", "Shelf1", "can_access", Attributes::new(), None)?;
//!
//! graph.advance_clock(Duration::from_secs(1800));
//! graph.write_node("Robot1", Attributes::new().with("battery", 0.8), None)?;
//!
//! assert_eq!(graph.history("Robot1").len(), 2);
//! assert!(graph.read_node("Robot1", Timestamp::from_secs(900)).is_err());
//!
//! let snapshot = graph.project(TimeWindow::all())?;
//! assert_eq!(snapshot.node("Robot1").unwrap().version, Timestamp::from_secs(1800));
//! # Ok::<(), tempograph::GraphError>(())
//! ```

pub mod attributes;
pub mod builder;
pub mod clock;
pub mod compute;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod index;
pub mod store;

pub use builder::GraphBuilder;
pub use graph::{History, HistoryEntry, HistoryExport, KnowledgeGraph, StaticGraph, TemporalGraph};
pub use error::{GraphError, Result};

#[cfg(feature = "sync")]
pub use graph::SyncGraph;

pub use attributes::{AttrValue, Attributes};
pub use clock::{Clock, Timestamp};
pub use compute::projection::{ProjectedEdge, ProjectedNode, Snapshot, TimeWindow};
pub use config::{Config, EndpointPolicy, GraphStats, WriteMode, WriteOptions};
pub use entity::{EntityId, VersionKey};
pub use index::TemporalIndex;
pub use store::{Edge, EdgeId, VersionStore};

pub use bytes::Bytes;
pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GraphBuilder, GraphError, KnowledgeGraph, Result, StaticGraph, TemporalGraph};

    #[cfg(feature = "sync")]
    pub use crate::SyncGraph;

    pub use crate::{AttrValue, Attributes, EntityId, Timestamp};

    pub use crate::{Config, EndpointPolicy, WriteMode, WriteOptions};

    pub use crate::{Snapshot, TimeWindow};

    pub use std::time::Duration;
}
