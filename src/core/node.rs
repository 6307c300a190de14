//! TransformNode trait and node categories.
//!
//! A transform node is one named, parameterized function from one typed value
//! to another. The graph owns the node, feeds it its input, caches its output
//! and decides when it has to run again; the node itself only computes.

use crate::core::controls::ParameterUi;
use crate::core::error::{EvaluationError, EvaluationResult};
use crate::core::types::{Capability, Value};
use serde::{Deserialize, Serialize};

/// Category for organizing filters in listings and palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Graph input helpers
    Input,
    /// Blur effects
    Blur,
    /// Edge detection
    Edge,
    /// Per-channel split, adjust and merge
    Channels,
    /// Arithmetic on scalars
    Math,
    /// Utility nodes
    Utility,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Input => "Input",
            Category::Blur => "Blur",
            Category::Edge => "Edge",
            Category::Channels => "Channels",
            Category::Math => "Math",
            Category::Utility => "Utility",
        }
    }

    /// Get all categories in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Input,
            Category::Blur,
            Category::Edge,
            Category::Channels,
            Category::Math,
            Category::Utility,
        ]
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Utility
    }
}

/// The core trait for nodes of a composition graph.
///
/// # Contract
///
/// - [`evaluate`](Self::evaluate) is deterministic given the input and the
///   node's current parameters, and must not touch anything but its own
///   inputs. It fails with [`EvaluationError::InputTypeMismatch`] when the
///   input does not match [`input_capability`](Self::input_capability), and
///   with [`EvaluationError::Rejected`] for parameter combinations it cannot
///   handle.
/// - [`render_parameter_controls`](Self::render_parameter_controls) is the only
///   place where parameters change. It returns `true` iff something changed
///   during the call.
/// - [`name`](Self::name) is non-empty and stable; graphs expect it to be
///   unique among their nodes.
/// - Capabilities are fixed for the lifetime of the node.
///
/// `Send + Sync` lets a graph be handed to another thread as a whole; the
/// graph itself is driven from one thread.
///
/// # Example Implementation
///
/// ```ignore
/// struct Scale {
///     factor: f32,
/// }
///
/// impl TransformNode for Scale {
///     fn name(&self) -> &str {
///         "Scale"
///     }
///
///     fn input_capability(&self) -> Capability {
///         Capability::of::<f32>()
///     }
///
///     fn output_capability(&self) -> Capability {
///         Capability::of::<f32>()
///     }
///
///     fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
///         let x = input.get::<f32>()?;
///         Ok(Value::new(x * self.factor))
///     }
///
///     fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
///         ui.slider_f32("factor", &mut self.factor, 0.0..=4.0, SliderScale::Linear)
///     }
/// }
/// ```
///
/// [`EvaluationError::InputTypeMismatch`]: crate::core::error::EvaluationError::InputTypeMismatch
/// [`EvaluationError::Rejected`]: crate::core::error::EvaluationError::Rejected
pub trait TransformNode: Send + Sync {
    /// Display identifier.
    fn name(&self) -> &str;

    /// Category used by registries and listings.
    fn category(&self) -> Category {
        Category::Utility
    }

    /// What the node accepts.
    fn input_capability(&self) -> Capability;

    /// What the node produces.
    fn output_capability(&self) -> Capability;

    /// Apply the function with the current parameters.
    fn evaluate(&self, input: &Value) -> EvaluationResult<Value>;

    /// Render parameter widgets; returns `true` if any parameter changed.
    ///
    /// Nodes without parameters keep the default, which renders nothing.
    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        let _ = ui;
        false
    }
}

/// Identity node that forwards its input unchanged.
///
/// Placed first in a chain it shows the graph input as a node of its own.
#[derive(Debug, Clone)]
pub struct Passthrough {
    name: String,
    capability: Capability,
}

impl Passthrough {
    /// Identity over `capability`, displayed as "Input".
    pub fn new(capability: Capability) -> Self {
        Self::named("Input", capability)
    }

    /// Identity over `capability` with a custom name.
    pub fn named(name: impl Into<String>, capability: Capability) -> Self {
        Self {
            name: name.into(),
            capability,
        }
    }
}

impl TransformNode for Passthrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Input
    }

    fn input_capability(&self) -> Capability {
        self.capability.clone()
    }

    fn output_capability(&self) -> Capability {
        self.capability.clone()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        if !self.capability.accepts(input) {
            return Err(EvaluationError::InputTypeMismatch {
                expected: self.capability.clone(),
                got: Capability::of_value(input),
            });
        }
        Ok(input.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::NoopUi;

    #[test]
    fn test_passthrough_shares_input() {
        let mut node = Passthrough::new(Capability::of::<i64>());
        let input = Value::new(42i64);

        let output = node.evaluate(&input).unwrap();
        assert!(output.ptr_eq(&input));
        assert_eq!(node.name(), "Input");
        assert_eq!(node.category(), Category::Input);
        assert!(!node.render_parameter_controls(&mut NoopUi));
    }

    #[test]
    fn test_passthrough_rejects_wrong_type() {
        let node = Passthrough::named("Numbers", Capability::of::<i64>());

        let result = node.evaluate(&Value::new(1.5f32));
        assert!(matches!(result, Err(EvaluationError::InputTypeMismatch { .. })));
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Blur.display_name(), "Blur");
        assert_eq!(Category::all().len(), 6);
    }
}
