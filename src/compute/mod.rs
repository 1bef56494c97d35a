//! Compute layer for derived views of the graph.
//!
//! Query logic that reads the store and the temporal index but never mutates
//! them:
//! - `projection`: time-window snapshots (one node per entity)

pub mod projection;
