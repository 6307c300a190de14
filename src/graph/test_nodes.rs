//! Small integer nodes shared by the graph and engine tests.

use crate::core::controls::ParameterUi;
use crate::core::error::{EvaluationError, EvaluationResult};
use crate::core::node::TransformNode;
use crate::core::types::{Bundle, Capability, Value};

/// Adds `amount`; rejects its input while `fail` is set.
pub struct Shift {
    pub name: String,
    pub amount: i32,
    pub fail: bool,
}

impl TransformNode for Shift {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        if self.fail {
            return Err(EvaluationError::rejected(format!("{} refuses", self.name)));
        }
        Ok(Value::new(input.get::<i64>()? + i64::from(self.amount)))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        let mut changed = ui.slider_i32("amount", &mut self.amount, -100..=100);
        changed |= ui.checkbox("fail", &mut self.fail);
        changed
    }
}

pub fn shift(name: &str, amount: i32) -> Box<dyn TransformNode> {
    Box::new(Shift {
        name: name.to_string(),
        amount,
        fail: false,
    })
}

/// `x -> [x * 1, x * 2, ...]`.
pub struct Fan {
    pub arity: usize,
}

impl TransformNode for Fan {
    fn name(&self) -> &str {
        "Fan"
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn output_capability(&self) -> Capability {
        Capability::repeated::<i64>(self.arity)
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let x = *input.get::<i64>()?;
        Ok(Value::new(
            (1..=self.arity as i64)
                .map(|k| Value::new(x * k))
                .collect::<Bundle>(),
        ))
    }
}

/// Sums the components of a bundle.
pub struct Gather {
    pub arity: usize,
}

impl TransformNode for Gather {
    fn name(&self) -> &str {
        "Gather"
    }

    fn input_capability(&self) -> Capability {
        Capability::repeated::<i64>(self.arity)
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let bundle = input.get::<Bundle>()?;
        let mut sum = 0i64;
        for index in 0..self.arity {
            sum += bundle.get::<i64>(index)?;
        }
        Ok(Value::new(sum))
    }
}

/// Declares `i64` but produces `f64`.
pub struct Liar;

impl TransformNode for Liar {
    fn name(&self) -> &str {
        "Liar"
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<i64>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        Ok(Value::new(*input.get::<i64>()? as f64))
    }
}
