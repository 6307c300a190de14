//! Lookup tables on normalized channels.
//!
//! The table is a power curve `x -> x^power` over `0.0..=1.0`; a power of 1
//! is the identity.

use crate::core::controls::{ParameterUi, SliderScale};
use crate::core::error::{EvaluationError, EvaluationResult};
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Bundle, Capability, Plane, Value};
use crate::filters::builtin::channels::SharedSelection;
use crate::filters::builtin::color_type::ColorType;
use crate::filters::registry::FilterRegistry;

/// Register lookup table filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register("lut", "Power curve on one normalized channel", || {
        Box::new(Lut::new())
    });
    registry.register(
        "lut_channels",
        "Independent power curve per channel of a split RGB image",
        || Box::new(LutChannels::new(ColorType::Rgb)),
    );
}

const POWER_RANGE: std::ops::RangeInclusive<f32> = 0.0..=10.0;

fn apply_power(plane: &Plane, power: f32) -> Plane {
    let mut out = plane.clone();
    for sample in out.pixels_mut() {
        sample.0[0] = sample.0[0].clamp(0.0, 1.0).powf(power);
    }
    out
}

/// Power slider plus a button restoring the identity.
fn render_power(ui: &mut dyn ParameterUi, power: &mut f32) -> bool {
    let mut changed = ui.slider_f32("power", power, POWER_RANGE, SliderScale::Logarithmic);
    if ui.button("Reset") && *power != 1.0 {
        *power = 1.0;
        changed = true;
    }
    changed
}

/// Power curve applied to a single plane.
pub struct Lut {
    name: String,
    power: f32,
    /// Channel this table works on, shown as a label.
    channel: Option<(SharedSelection, usize)>,
}

impl Lut {
    /// Identity table named "LUT".
    pub fn new() -> Self {
        Self::named("LUT")
    }

    /// Identity table with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            power: 1.0,
            channel: None,
        }
    }

    /// Identity table for channel `index` of a split group; its label follows
    /// the group's current color type.
    pub fn for_channel(name: impl Into<String>, selection: SharedSelection, index: usize) -> Self {
        Self {
            channel: Some((selection, index)),
            ..Self::named(name)
        }
    }

    /// Current exponent; 1.0 is the identity.
    pub fn power(&self) -> f32 {
        self.power
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformNode for Lut {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Channels
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<Plane>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<Plane>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let plane = input.get::<Plane>()?;
        Ok(Value::new(apply_power(plane, self.power)))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        if let Some((selection, index)) = &self.channel {
            let color = selection.read().working_color();
            if let Some(channel) = color.channel_name(*index) {
                ui.label(&format!("Channel {} of {}", channel, color));
            }
        }
        render_power(ui, &mut self.power)
    }
}

/// One power curve per channel of a three channel bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct LutChannels {
    color: ColorType,
    powers: [f32; 3],
}

impl LutChannels {
    /// Identity tables; `color` names the channels in the controls.
    pub fn new(color: ColorType) -> Self {
        Self {
            color,
            powers: [1.0; 3],
        }
    }

    /// Exponent per channel.
    pub fn powers(&self) -> [f32; 3] {
        self.powers
    }
}

impl TransformNode for LutChannels {
    fn name(&self) -> &str {
        "LUT Channels"
    }

    fn category(&self) -> Category {
        Category::Channels
    }

    fn input_capability(&self) -> Capability {
        Capability::repeated::<Plane>(3)
    }

    fn output_capability(&self) -> Capability {
        Capability::repeated::<Plane>(3)
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let bundle = input.get::<Bundle>()?;
        if bundle.len() != self.powers.len() {
            return Err(EvaluationError::rejected(format!(
                "expected {} channels, got {}",
                self.powers.len(),
                bundle.len()
            )));
        }

        let mut channels = Vec::with_capacity(self.powers.len());
        for (index, &power) in self.powers.iter().enumerate() {
            let plane = bundle.get::<Plane>(index)?;
            channels.push(Value::new(apply_power(plane, power)));
        }
        Ok(Value::new(Bundle::new(channels)))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        let mut changed = false;
        for (name, power) in self.color.channel_names().iter().zip(self.powers.iter_mut()) {
            ui.push_scope(name);
            changed |= render_power(ui, power);
            ui.pop_scope();
        }
        changed
    }
}
