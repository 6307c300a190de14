//! Session configuration.
//!
//! A session names the graph to build (a chain of registered filter ids or a
//! preset), where its input comes from, how recomputation behaves, and a
//! script of control edits replayed one tick at a time.
//!
//! ```toml
//! preset = "split_lut_merge"
//!
//! [input]
//! width = 64
//! height = 48
//!
//! [recompute]
//! slow_node_warning_ms = 50
//!
//! [[ticks]]
//! "LUT G/power" = 2.0
//!
//! [[ticks]]
//! "Split Channels/Show Color" = true
//! "Split Channels/RGB=>HSV=>RGB" = "click"
//! ```

use crate::core::controls::{ControlEdit, ScriptedUi};
use crate::core::error::{ChromaflowResult, ConfigError};
use crate::core::node::Passthrough;
use crate::core::types::{Capability, Image, Value};
use crate::execution::engine::{RecomputeOptions, RecomputeReport, TickReport};
use crate::execution::progress::RecomputeObserver;
use crate::execution::timing::measure;
use crate::filters::builtin::{Canny, ColorType, GaussianBlur, SplitLutMerge};
use crate::filters::registry::FilterRegistry;
use crate::graph::composition::CompositionGraph;
use crate::graph::structure::GraphBuilder;
use image::Rgb;
use indexmap::IndexMap;
use log::Level;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Names accepted by [`SessionConfig::preset`].
pub const PRESETS: &[&str] = &["split_lut_merge", "blur_canny"];

/// Where the graph input comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Image file; a synthetic gradient of `width` x `height` is used when unset.
    pub path: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    /// Fed to graphs whose sources take an integer.
    pub value: i64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            width: 64,
            height: 64,
            value: 0,
        }
    }
}

/// A control edit as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EditValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Only `"click"` is meaningful.
    Text(String),
}

impl EditValue {
    /// Convert into an edit for the widget at `path`.
    pub fn to_edit(&self, path: &str) -> Result<ControlEdit, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEdit {
            path: path.to_string(),
            reason,
        };

        match self {
            EditValue::Bool(value) => Ok(ControlEdit::Bool(*value)),
            EditValue::Int(value) => i32::try_from(*value)
                .map(ControlEdit::Int)
                .map_err(|_| invalid(format!("{} does not fit a slider", value))),
            EditValue::Float(value) => Ok(ControlEdit::Float(*value as f32)),
            EditValue::Text(text) if text.eq_ignore_ascii_case("click") => Ok(ControlEdit::Click),
            EditValue::Text(text) => Err(invalid(format!("expected \"click\", got \"{}\"", text))),
        }
    }
}

/// Control edits applied during one tick, keyed by widget path.
pub type TickEdits = IndexMap<String, EditValue>;

/// A headless session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Filter ids chained in order.
    pub pipeline: Vec<String>,
    /// A named graph from [`PRESETS`]; takes precedence over `pipeline`.
    pub preset: Option<String>,
    pub input: InputConfig,
    pub recompute: RecomputeOptions,
    pub ticks: Vec<TickEdits>,
    /// Where to save the final image, if the terminal node produces one.
    pub output: Option<PathBuf>,
}

/// Everything a session run produced.
pub struct SessionRun {
    pub graph: CompositionGraph,
    /// The pass right after the input was set.
    pub initial: RecomputeReport,
    pub ticks: Vec<TickReport>,
    /// Edits whose widget was never rendered.
    pub unapplied: Vec<String>,
}

impl SessionConfig {
    /// Load a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Configuration running one preset with defaults.
    pub fn for_preset(name: &str) -> Self {
        Self {
            preset: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Build the configured graph with the configured recompute options.
    pub fn build_graph(&self, registry: &FilterRegistry) -> ChromaflowResult<CompositionGraph> {
        let graph = match &self.preset {
            Some(name) => preset(name)?.build()?,
            None => {
                if self.pipeline.is_empty() {
                    return Err(ConfigError::EmptyPipeline.into());
                }
                let nodes = self
                    .pipeline
                    .iter()
                    .map(|id| {
                        registry
                            .create(id)
                            .ok_or_else(|| ConfigError::UnknownFilter(id.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                CompositionGraph::chain(nodes)?
            }
        };
        Ok(graph.with_options(self.recompute.clone()))
    }

    /// Load the input image, or generate the synthetic one.
    pub fn load_input(&self) -> ChromaflowResult<Image> {
        match &self.input.path {
            Some(path) => {
                log::info!("Loading input from {}", path.display());
                Ok(image::open(path)?.to_rgb8())
            }
            None => {
                let (width, height) = (self.input.width, self.input.height);
                if width == 0 || height == 0 {
                    return Err(ConfigError::InvalidInput(format!(
                        "synthetic input must be at least 1x1, got {}x{}",
                        width, height
                    ))
                    .into());
                }
                Ok(gradient(width, height))
            }
        }
    }

    /// One scripted UI per configured tick.
    pub fn scripted_ticks(&self) -> Result<Vec<ScriptedUi>, ConfigError> {
        self.ticks
            .iter()
            .map(|edits| {
                let mut ui = ScriptedUi::new();
                for (path, value) in edits {
                    ui.queue(path.clone(), value.to_edit(path)?);
                }
                Ok(ui)
            })
            .collect()
    }

    /// Build the graph, feed it, settle it and replay every tick.
    pub fn run(&self, registry: &FilterRegistry) -> ChromaflowResult<SessionRun> {
        self.run_observed(registry, None)
    }

    /// Like [`run`](Self::run), reporting every recomputation step to `observer`.
    pub fn run_observed(
        &self,
        registry: &FilterRegistry,
        observer: Option<RecomputeObserver>,
    ) -> ChromaflowResult<SessionRun> {
        let scripts = self.scripted_ticks()?;
        let mut graph = self.build_graph(registry)?;
        if let Some(observer) = observer {
            graph.set_observer(observer);
        }

        // Graphs rooted on anything else stay unconnected
        let root = graph.root_capability().clone();
        if root == Capability::of::<Image>() {
            graph.set_input(Value::new(self.load_input()?))?;
        } else if root == Capability::of::<i64>() {
            graph.set_input(Value::new(self.input.value))?;
        }
        let (initial, _) = measure("initial recompute", Level::Info, || graph.recompute());

        let mut ticks = Vec::with_capacity(scripts.len());
        let mut unapplied = Vec::new();
        for (index, mut ui) in scripts.into_iter().enumerate() {
            let report = graph.tick(&mut ui);
            log::info!(
                "Tick {}: {} changed, {} evaluated",
                index + 1,
                report.changed.len(),
                report.recompute.evaluated.len()
            );
            for path in ui.pending() {
                log::warn!("Tick {}: no widget at '{}'", index + 1, path);
                unapplied.push(path.to_string());
            }
            ticks.push(report);
        }

        Ok(SessionRun {
            graph,
            initial,
            ticks,
            unapplied,
        })
    }
}

/// A builder holding the named preset graph.
pub fn preset(name: &str) -> ChromaflowResult<GraphBuilder> {
    let mut builder = GraphBuilder::new();
    let input = builder.add(Passthrough::named("Input", Capability::of::<Image>()));

    match name {
        "split_lut_merge" => {
            let group = SplitLutMerge::install(&mut builder, ColorType::Rgb)?;
            builder.connect(input, group.split)?;
        }
        "blur_canny" => {
            let blur = builder.add(GaussianBlur::default());
            let canny = builder.add(Canny::default());
            builder.connect(input, blur)?;
            builder.connect(blur, canny)?;
        }
        _ => return Err(ConfigError::UnknownPreset(name.to_string()).into()),
    }

    Ok(builder)
}

/// Red grows left to right, green top to bottom.
fn gradient(width: u32, height: u32) -> Image {
    let scale = |v: u32, size: u32| (v * 255 / size.saturating_sub(1).max(1)) as u8;
    Image::from_fn(width, height, |x, y| {
        Rgb([scale(x, width), scale(y, height), 128])
    })
}
