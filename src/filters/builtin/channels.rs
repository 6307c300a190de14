//! Splitting images into normalized channels and merging them back.
//!
//! A split and its matching merge share one [`ConversionSelection`]: the
//! split converts into the selected color type before splitting and the
//! merge converts back after merging, so the nodes in between work on the
//! channels of the selected color type.

use crate::core::controls::ParameterUi;
use crate::core::error::{EvaluationError, EvaluationResult, GraphResult, NodeId};
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Bundle, Capability, Image, Plane, Value};
use crate::filters::builtin::color_type::{possible_conversion_pairs, ColorConversionPair, ColorType};
use crate::filters::builtin::lut::Lut;
use crate::filters::registry::FilterRegistry;
use crate::graph::connection::Endpoint;
use crate::graph::structure::GraphBuilder;
use image::{Luma, Rgb};
use parking_lot::RwLock;
use std::sync::Arc;

/// Register channel split and merge.
pub fn register(registry: &mut FilterRegistry) {
    registry.register(
        "split_channels",
        "Split an RGB image into three normalized planes",
        || Box::new(SplitChannels::new(ColorType::Rgb)),
    );
    registry.register(
        "merge_channels",
        "Merge three normalized planes into an RGB image",
        || Box::new(MergeChannels::new(ColorType::Rgb)),
    );
}

/// Number of channels of an [`Image`].
pub const CHANNELS: usize = 3;

/// Optional round trip conversion applied around a split/merge pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSelection {
    input: ColorType,
    pairs: Vec<ColorConversionPair>,
    selected: Option<usize>,
    show: bool,
}

/// Selection shared by a split and its merge.
pub type SharedSelection = Arc<RwLock<ConversionSelection>>;

impl ConversionSelection {
    /// No conversion, for images of color type `input`.
    pub fn new(input: ColorType) -> Self {
        Self {
            input,
            pairs: possible_conversion_pairs(input),
            selected: None,
            show: false,
        }
    }

    /// Wrap in a [`SharedSelection`].
    pub fn shared(input: ColorType) -> SharedSelection {
        Arc::new(RwLock::new(Self::new(input)))
    }

    /// Color type of incoming images.
    pub fn input(&self) -> ColorType {
        self.input
    }

    /// Every round trip available for the input color type.
    pub fn pairs(&self) -> &[ColorConversionPair] {
        &self.pairs
    }

    /// The selected round trip, if any.
    pub fn selected(&self) -> Option<&ColorConversionPair> {
        self.selected.and_then(|index| self.pairs.get(index))
    }

    /// Select the round trip named `name`, or none. Returns `false` for an
    /// unknown name.
    pub fn select(&mut self, name: Option<&str>) -> bool {
        match name {
            None => {
                self.selected = None;
                true
            }
            Some(name) => match self.pairs.iter().position(|pair| pair.name == name) {
                Some(index) => {
                    self.selected = Some(index);
                    true
                }
                None => false,
            },
        }
    }

    /// Color type of the split channels.
    pub fn working_color(&self) -> ColorType {
        self.selected()
            .map(|pair| pair.direct.dst)
            .unwrap_or(self.input)
    }

    /// "Show Color" toggles the conversion choices; "None" and one radio
    /// button per round trip pick the conversion.
    fn render(&mut self, ui: &mut dyn ParameterUi) -> bool {
        ui.checkbox("Show Color", &mut self.show);
        if !self.show {
            return false;
        }

        let mut choice = self.selected;
        if ui.radio_button("None", choice.is_none()) {
            choice = None;
        }
        for (index, pair) in self.pairs.iter().enumerate() {
            if ui.radio_button(&pair.name, choice == Some(index)) {
                choice = Some(index);
            }
        }

        let changed = choice != self.selected;
        self.selected = choice;
        changed
    }
}

/// Splits an image into one normalized plane per channel.
pub struct SplitChannels {
    selection: SharedSelection,
}

impl SplitChannels {
    /// Split images of color type `input`, with its own selection.
    pub fn new(input: ColorType) -> Self {
        Self::with_selection(ConversionSelection::shared(input))
    }

    /// Split using a selection shared with a [`MergeChannels`].
    pub fn with_selection(selection: SharedSelection) -> Self {
        Self { selection }
    }

    /// The conversion selection of this split.
    pub fn selection(&self) -> &SharedSelection {
        &self.selection
    }
}

impl TransformNode for SplitChannels {
    fn name(&self) -> &str {
        "Split Channels"
    }

    fn category(&self) -> Category {
        Category::Channels
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn output_capability(&self) -> Capability {
        Capability::repeated::<Plane>(CHANNELS)
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let image = input.get::<Image>()?;
        let converted = self
            .selection
            .read()
            .selected()
            .map(|pair| pair.direct.apply(image));
        let image = converted.as_ref().unwrap_or(image);

        let (width, height) = image.dimensions();
        let planes = (0..CHANNELS)
            .map(|channel| {
                Value::new(Plane::from_fn(width, height, |x, y| {
                    Luma([f32::from(image.get_pixel(x, y).0[channel]) / 255.0])
                }))
            })
            .collect();
        Ok(Value::new(Bundle::new(planes)))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        self.selection.write().render(ui)
    }
}

/// Merges three normalized planes into an image.
pub struct MergeChannels {
    selection: SharedSelection,
}

impl MergeChannels {
    /// Merge into images of color type `output`, with its own selection.
    pub fn new(output: ColorType) -> Self {
        Self::with_selection(ConversionSelection::shared(output))
    }

    /// Merge using a selection shared with a [`SplitChannels`].
    pub fn with_selection(selection: SharedSelection) -> Self {
        Self { selection }
    }
}

fn to_byte(sample: f32) -> u8 {
    (sample * 255.0).round().clamp(0.0, 255.0) as u8
}

impl TransformNode for MergeChannels {
    fn name(&self) -> &str {
        "Merge Channels"
    }

    fn category(&self) -> Category {
        Category::Channels
    }

    fn input_capability(&self) -> Capability {
        Capability::repeated::<Plane>(CHANNELS)
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let bundle = input.get::<Bundle>()?;
        let planes = [
            bundle.get::<Plane>(0)?,
            bundle.get::<Plane>(1)?,
            bundle.get::<Plane>(2)?,
        ];

        let dimensions = planes[0].dimensions();
        if let Some(other) = planes.iter().find(|plane| plane.dimensions() != dimensions) {
            return Err(EvaluationError::rejected(format!(
                "channel sizes differ: {:?} and {:?}",
                dimensions,
                other.dimensions()
            )));
        }

        let (width, height) = dimensions;
        let merged = Image::from_fn(width, height, |x, y| {
            Rgb(planes.map(|plane| to_byte(plane.get_pixel(x, y).0[0])))
        });

        let restored = match self.selection.read().selected() {
            Some(pair) => pair.inverse.apply(&merged),
            None => merged,
        };
        Ok(Value::new(restored))
    }
}

/// Ids of a split, one [`Lut`] per channel and a merge installed in a builder.
#[derive(Debug, Clone)]
pub struct SplitLutMerge {
    pub split: NodeId,
    pub luts: Vec<NodeId>,
    pub merge: NodeId,
    pub selection: SharedSelection,
}

impl SplitLutMerge {
    /// Add `Split Channels -> LUT <channel> (x3) -> Merge Channels` to
    /// `builder`, wired component by component. The caller connects the
    /// split's input and the merge's output.
    pub fn install(builder: &mut GraphBuilder, input: ColorType) -> GraphResult<Self> {
        let selection = ConversionSelection::shared(input);
        let split = builder.add(SplitChannels::with_selection(selection.clone()));
        let merge = builder.add(MergeChannels::with_selection(selection.clone()));

        let mut luts = Vec::with_capacity(CHANNELS);
        for (index, channel) in input.channel_names().iter().enumerate() {
            let lut = builder.add(Lut::for_channel(
                format!("LUT {}", channel),
                selection.clone(),
                index,
            ));
            builder.connect_ports(Endpoint::component(split, index), Endpoint::whole(lut))?;
            builder.connect_ports(Endpoint::whole(lut), Endpoint::component(merge, index))?;
            luts.push(lut);
        }

        Ok(Self {
            split,
            luts,
            merge,
            selection,
        })
    }
}
