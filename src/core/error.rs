//! Error types for Chromaflow.
//!
//! Uses thiserror for structured errors with context. The split follows when
//! an error can happen:
//! - [`GraphError`]: while the graph is being built (edges, capabilities, cycles)
//! - [`EvaluationError`]: while a single node evaluates; scoped to that node
//! - [`TypeMismatch`]: a tag-checked payload access that named the wrong type

use crate::core::types::{Capability, TypeTag};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a node ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Unique identifier for a connection in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for Chromaflow.
#[derive(Error, Debug)]
pub enum ChromaflowError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Type mismatch: {0}")]
    TypeMismatch(#[from] TypeMismatch),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A payload was accessed as a type it does not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// Type the caller asked for.
    pub expected: TypeTag,
    /// Type actually stored.
    pub found: TypeTag,
}

impl TypeMismatch {
    /// Create a new mismatch report.
    pub fn new(expected: TypeTag, found: TypeTag) -> Self {
        Self { expected, found }
    }
}

/// Errors related to graph structure, raised while the graph is built or fed.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Port {port} not found on node {node_id}")]
    PortNotFound { node_id: NodeId, port: String },

    #[error("Cycle detected in graph involving nodes: {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("Cannot connect {from_type} to {to_type}")]
    TypeMismatch {
        from_type: Capability,
        to_type: Capability,
    },

    #[error("Port {port} on node {node_id} is already connected")]
    PortAlreadyConnected { node_id: NodeId, port: String },

    #[error("Node {node_id} cannot mix whole-value and per-component inputs")]
    MixedInputPorts { node_id: NodeId },

    #[error("Node {node_id} is missing input components {missing:?}")]
    IncompleteInput { node_id: NodeId, missing: Vec<usize> },

    #[error("Source nodes disagree on the graph input: {first} vs {second}")]
    RootCapabilityConflict { first: Capability, second: Capability },

    #[error("Graph input expects {expected}, got {got}")]
    RootTypeMismatch { expected: Capability, got: Capability },

    #[error("Graph is empty")]
    EmptyGraph,
}

/// Failure of a single node's evaluation.
///
/// These are recoverable: the graph records them as the node's status and
/// keeps the previous output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("input {got} does not match accepted {expected}")]
    InputTypeMismatch { expected: Capability, got: Capability },

    #[error("output {got} does not match declared {expected}")]
    OutputTypeMismatch { expected: Capability, got: Capability },

    #[error("bundle has {len} components, component {index} requested")]
    MissingComponent { index: usize, len: usize },

    #[error("{reason}")]
    Rejected { reason: String },
}

impl From<TypeMismatch> for EvaluationError {
    fn from(mismatch: TypeMismatch) -> Self {
        EvaluationError::InputTypeMismatch {
            expected: Capability::Single(mismatch.expected),
            got: Capability::Single(mismatch.found),
        }
    }
}

impl EvaluationError {
    /// A node refused its current input/parameter combination.
    pub fn rejected(reason: impl Into<String>) -> Self {
        EvaluationError::Rejected {
            reason: reason.into(),
        }
    }
}

/// Errors from loading a session configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Read { path: String, error: std::io::Error },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Configuration names neither a pipeline nor a preset")]
    EmptyPipeline,

    #[error("Invalid control edit '{path}': {reason}")]
    InvalidEdit { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Per-node status surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NodeStatus {
    /// Never evaluated, or invalidated and waiting for the next pass.
    Pending,
    /// Cached output is current.
    Ready,
    /// The last evaluation failed; the previous output (if any) is kept.
    Failed { message: String },
    /// An upstream producer has no current output.
    Blocked,
    /// Fed from the graph input, which has not been set.
    Unconnected,
}

impl NodeStatus {
    /// Whether this status reports a problem.
    pub fn is_problem(&self) -> bool {
        matches!(self, NodeStatus::Failed { .. } | NodeStatus::Blocked)
    }
}

/// Result type alias for Chromaflow operations.
pub type ChromaflowResult<T> = Result<T, ChromaflowError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for node evaluation.
pub type EvaluationResult<T> = Result<T, EvaluationError>;
