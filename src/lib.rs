//! # Chromaflow - Interactive Composition Graphs
//!
//! Chromaflow composes parameterized transform nodes into a directed acyclic
//! graph and keeps the results current while parameters are edited: only the
//! nodes downstream of an edit are evaluated again.
//!
//! ## Features
//!
//! - **Type-erased values**: any `'static` payload travels between nodes,
//!   tagged with its type and checked when edges are added
//! - **Fan-out and fan-in**: bundle outputs addressed component by component
//! - **Incremental recomputation**: per-node dirty flags and cached outputs
//! - **Failure containment**: a failing node blocks its consumers and nothing else
//! - **Headless controls**: nodes render their parameters through [`core::controls::ParameterUi`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chromaflow::prelude::*;
//!
//! let mut builder = CompositionGraph::builder();
//! let input = builder.add(Passthrough::named("Input", Capability::of::<Image>()));
//! let group = SplitLutMerge::install(&mut builder, ColorType::Rgb)?;
//! builder.connect(input, group.split)?;
//!
//! let mut graph = builder.build()?;
//! graph.set_input(Value::new(image::open("input.png")?.to_rgb8()))?;
//! graph.recompute();
//!
//! // Square the green channel; only "LUT G" and the merge are evaluated again
//! let mut ui = ScriptedUi::new().set_f32("LUT G/power", 2.0);
//! let report = graph.tick(&mut ui);
//! assert_eq!(report.recompute.evaluated.len(), 2);
//!
//! let image = graph.final_output().unwrap().get::<Image>()?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Values, capabilities, the node trait, controls and errors
//! - [`graph`]: Edges, topology analysis, the builder and the runtime graph
//! - [`execution`]: Recomputation pass, progress events and timing
//! - [`filters`]: Filter registry and built-in filters
//! - [`config`]: TOML session files

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod filters;
pub mod graph;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use chromaflow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Bundle, Capability, Image, Plane, TypeTag, Value};

    // Node trait
    pub use crate::core::node::{Category, Passthrough, TransformNode};

    // Controls
    pub use crate::core::controls::{ControlEdit, NoopUi, ParameterUi, ScriptedUi, SliderScale};

    // Errors
    pub use crate::core::error::{
        ChromaflowError, ChromaflowResult, ConfigError, ConnectionId, EvaluationError,
        EvaluationResult, GraphError, GraphResult, NodeId, NodeStatus, TypeMismatch,
    };

    // Graph
    pub use crate::graph::composition::{CompositionGraph, GraphSnapshot, NodeHandle, NodeView};
    pub use crate::graph::connection::{Connection, Endpoint, Port};
    pub use crate::graph::structure::GraphBuilder;
    pub use crate::graph::topology::TopologyAnalyzer;

    // Execution
    pub use crate::execution::engine::{RecomputeOptions, RecomputeReport, TickReport};
    pub use crate::execution::progress::{
        RecomputeEvent, RecomputeObserver, RecomputeStats, SkipReason,
    };

    // Filters
    pub use crate::filters::registry::{FilterFactory, FilterInfo, FilterRegistry};
    pub use crate::filters::builtin::{
        Add, Canny, ColorType, GaussianBlur, Lut, LutChannels, MergeChannels, SplitChannels,
        SplitLutMerge,
    };

    // Configuration
    pub use crate::config::{SessionConfig, PRESETS};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
