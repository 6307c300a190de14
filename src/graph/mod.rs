//! Graph module for composition graphs.
//!
//! A composition graph is a directed acyclic graph (DAG) where nodes are
//! parameterized transforms and edges carry values (or single components of
//! bundled values) from producers to consumers.

pub mod composition;
pub mod connection;
pub mod structure;
pub mod topology;

#[cfg(test)]
pub(crate) mod test_nodes;

// Re-export commonly used types
pub use composition::{CompositionGraph, GraphSnapshot, NodeHandle, NodeSnapshot, NodeView};
pub use connection::{Connection, Endpoint, Port};
pub use structure::GraphBuilder;
pub use topology::TopologyAnalyzer;
