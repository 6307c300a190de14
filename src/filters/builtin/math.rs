//! Arithmetic nodes.

use crate::core::controls::{ParameterUi, SliderScale};
use crate::core::error::EvaluationResult;
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Capability, Value};
use crate::filters::registry::FilterRegistry;

/// Register math nodes.
pub fn register(registry: &mut FilterRegistry) {
    registry.register("add", "Add a constant to an integer", || {
        Box::new(Add::default())
    });
}

/// Adds `what_to_add` to an integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Add {
    what_to_add: f32,
}

impl Add {
    pub fn what_to_add(&self) -> f32 {
        self.what_to_add
    }
}

impl Default for Add {
    fn default() -> Self {
        Self { what_to_add: 1.0 }
    }
}

impl TransformNode for Add {
    fn name(&self) -> &str {
        "Add"
    }

    fn category(&self) -> Category {
        Category::Math
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let x = input.get::<i64>()?;
        Ok(Value::new(x + self.what_to_add.round() as i64))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        ui.slider_f32("what_to_add", &mut self.what_to_add, 0.0..=10.0, SliderScale::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::ScriptedUi;

    #[test]
    fn test_add_default() {
        let add = Add::default();
        let out = add.evaluate(&Value::new(41i64)).unwrap();
        assert_eq!(*out.get::<i64>().unwrap(), 42);
    }

    #[test]
    fn test_add_controls() {
        let mut add = Add::default();
        let mut ui = ScriptedUi::new().set_f32("what_to_add", 12.0);

        assert!(add.render_parameter_controls(&mut ui));
        assert_eq!(add.what_to_add(), 10.0);
        assert_eq!(*add.evaluate(&Value::new(0i64)).unwrap().get::<i64>().unwrap(), 10);
    }
}
