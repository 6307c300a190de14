//! Built-in filter implementations.
//!
//! This module contains the standard nodes that ship with Chromaflow.

mod blur;
mod channels;
mod color_type;
mod edge;
mod lut;
mod math;

use crate::core::node::Passthrough;
use crate::core::types::{Capability, Image};
use crate::filters::registry::FilterRegistry;

/// Register all built-in filters.
pub fn register_all(registry: &mut FilterRegistry) {
    registry.register("input_image", "Forward the input image unchanged", || {
        Box::new(Passthrough::named("Input Image", Capability::of::<Image>()))
    });
    blur::register(registry);
    edge::register(registry);
    channels::register(registry);
    lut::register(registry);
    math::register(registry);
}

// Re-export for direct access
pub use blur::GaussianBlur;
pub use channels::{
    ConversionSelection, MergeChannels, SharedSelection, SplitChannels, SplitLutMerge, CHANNELS,
};
pub use color_type::{possible_conversion_pairs, ColorConversion, ColorConversionPair, ColorType};
pub use edge::Canny;
pub use lut::{Lut, LutChannels};
pub use math::Add;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Category;

    #[test]
    fn test_builtins_registered() {
        let registry = FilterRegistry::with_builtins();

        for id in [
            "input_image",
            "gaussian_blur",
            "canny",
            "split_channels",
            "merge_channels",
            "lut",
            "lut_channels",
            "add",
        ] {
            assert!(registry.contains(id), "missing {}", id);
        }
        assert_eq!(registry.filters_by_category(Category::Blur), ["gaussian_blur"]);
        assert_eq!(registry.info("split_channels").unwrap().output.matches("ImageBuffer").count(), 3);
    }

    #[test]
    fn test_registered_chain_builds() {
        let registry = FilterRegistry::with_builtins();
        let nodes = ["split_channels", "lut_channels", "merge_channels"]
            .iter()
            .map(|id| registry.create(id).unwrap())
            .collect();

        let graph = crate::graph::CompositionGraph::chain(nodes).unwrap();
        assert_eq!(graph.root_capability(), &Capability::of::<Image>());
    }
}
