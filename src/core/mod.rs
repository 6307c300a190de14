//! Core types and traits of the composition graph.
//!
//! - Type-erased values and capabilities
//! - Node trait and categories
//! - Parameter controls
//! - Error and status types

pub mod controls;
pub mod error;
pub mod node;
pub mod types;

// Re-export commonly used types
pub use controls::{ControlEdit, NoopUi, ParameterUi, ScriptedUi, SliderScale};
pub use error::{
    ChromaflowError, ChromaflowResult, ConfigError, ConnectionId, EvaluationError, GraphError,
    NodeId, NodeStatus, TypeMismatch,
};
pub use node::{Category, Passthrough, TransformNode};
pub use types::{Bundle, Capability, Image, Plane, TypeTag, Value};
