//! Edge detection.

use crate::core::controls::ParameterUi;
use crate::core::error::{EvaluationError, EvaluationResult};
use crate::core::node::{Category, TransformNode};
use crate::core::types::{Capability, Image, Value};
use crate::filters::registry::FilterRegistry;
use image::DynamicImage;

/// Register edge filters.
pub fn register(registry: &mut FilterRegistry) {
    registry.register("canny", "Canny edge detector with hysteresis thresholds", || {
        Box::new(Canny::default())
    });
}

/// Canny edge detector. Edges are white on black, in all three channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canny {
    t_lower: i32,
    t_upper: i32,
}

impl Canny {
    /// Lower hysteresis threshold.
    pub fn t_lower(&self) -> i32 {
        self.t_lower
    }

    /// Upper hysteresis threshold.
    pub fn t_upper(&self) -> i32 {
        self.t_upper
    }
}

impl Default for Canny {
    fn default() -> Self {
        Self {
            t_lower: 100,
            t_upper: 200,
        }
    }
}

impl TransformNode for Canny {
    fn name(&self) -> &str {
        "Canny"
    }

    fn category(&self) -> Category {
        Category::Edge
    }

    fn input_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn output_capability(&self) -> Capability {
        Capability::of::<Image>()
    }

    fn evaluate(&self, input: &Value) -> EvaluationResult<Value> {
        let image = input.get::<Image>()?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EvaluationError::rejected(format!(
                "cannot detect edges in an empty {}x{} image",
                width, height
            )));
        }

        if self.t_lower > self.t_upper {
            return Err(EvaluationError::rejected(format!(
                "t_lower ({}) must not exceed t_upper ({})",
                self.t_lower, self.t_upper
            )));
        }

        let gray = image::imageops::grayscale(image);
        let edges = imageproc::edges::canny(&gray, self.t_lower as f32, self.t_upper as f32);

        Ok(Value::new(DynamicImage::ImageLuma8(edges).to_rgb8()))
    }

    fn render_parameter_controls(&mut self, ui: &mut dyn ParameterUi) -> bool {
        let mut changed = ui.slider_i32("t_lower", &mut self.t_lower, 0..=255);
        changed |= ui.slider_i32("t_upper", &mut self.t_upper, 0..=255);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::controls::ScriptedUi;
    use image::Rgb;

    fn half_and_half() -> Image {
        Image::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_canny_finds_vertical_edge() {
        let canny = Canny::default();

        let out = canny.evaluate(&Value::new(half_and_half())).unwrap();
        let out = out.get::<Image>().unwrap();

        let edge_pixels = out.pixels().filter(|p| p.0[0] == 255).count();
        assert!(edge_pixels > 0);
        // Flat regions far from the boundary stay black
        assert_eq!(out.get_pixel(2, 16), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(29, 16), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_canny_rejects_inverted_thresholds() {
        let mut canny = Canny::default();
        let mut ui = ScriptedUi::new().set_i32("t_lower", 250);
        assert!(canny.render_parameter_controls(&mut ui));

        let result = canny.evaluate(&Value::new(half_and_half()));
        assert!(matches!(result, Err(EvaluationError::Rejected { .. })));
        assert_eq!(canny.t_lower(), 250);
    }

    #[test]
    fn test_canny_rejects_empty_image() {
        let canny = Canny::default();

        for (width, height) in [(0, 0), (0, 4), (4, 0)] {
            let result = canny.evaluate(&Value::new(Image::new(width, height)));
            assert!(matches!(result, Err(EvaluationError::Rejected { .. })));
        }
        assert!(canny.evaluate(&Value::new(Image::new(1, 1))).is_ok());
    }
}
